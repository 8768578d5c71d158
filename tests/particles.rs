// Particle field properties over many frames (native, no canvas).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use robot_team::config::ParticleConfig;
use robot_team::particles::{Particle, ParticleField};

#[test]
fn particles_stay_within_one_step_of_bounds() {
    let cfg = ParticleConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let (w, h) = (320.0, 240.0);
    let mut field = ParticleField::seeded(&cfg, w, h, &mut rng);
    for _ in 0..20_000 {
        field.step();
        for p in field.particles() {
            let (sx, sy) = (p.vx.abs(), p.vy.abs());
            assert!(p.x >= -sx - 1e-9 && p.x <= w + sx + 1e-9, "x escaped: {p:?}");
            assert!(p.y >= -sy - 1e-9 && p.y <= h + sy + 1e-9, "y escaped: {p:?}");
        }
    }
}

#[test]
fn crossing_flips_only_the_crossing_axis() {
    let mut rng = SmallRng::seed_from_u64(3);
    let (w, h) = (100.0, 100.0);
    for _ in 0..1000 {
        let mut p = Particle {
            x: rng.gen_range(0.0..=w),
            y: rng.gen_range(0.0..=h),
            vx: rng.gen_range(-0.25..0.25),
            vy: rng.gen_range(-0.25..0.25),
            size: 1.0,
            opacity: 0.5,
        };
        let before = p;
        p.step(w, h);
        let crossed_x = p.x < 0.0 || p.x > w;
        let crossed_y = p.y < 0.0 || p.y > h;
        assert_eq!(p.vx, if crossed_x { -before.vx } else { before.vx });
        assert_eq!(p.vy, if crossed_y { -before.vy } else { before.vy });
        assert_eq!(p.size, before.size);
        assert_eq!(p.opacity, before.opacity);
    }
}

#[test]
fn pool_size_is_fixed() {
    let cfg = ParticleConfig::default();
    let mut rng = SmallRng::seed_from_u64(9);
    let mut field = ParticleField::seeded(&cfg, 640.0, 480.0, &mut rng);
    field.resize(100.0, 100.0);
    for _ in 0..100 {
        field.step();
    }
    assert_eq!(field.particles().len(), cfg.count);
    assert_eq!(field.bounds(), (100.0, 100.0));
}
