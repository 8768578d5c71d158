//! Ambient particle field: a fixed pool of dots drifting inside the viewport.
//!
//! The simulation ([`ParticleField`]) is plain data so it can be stepped and
//! checked without a browser; [`canvas::ParticleSystem`] owns the overlay
//! canvas and the frame loop that drives it.

pub mod canvas;

use rand::Rng;

use crate::config::ParticleConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Radius in pixels.
    pub size: f64,
    pub opacity: f64,
}

impl Particle {
    /// Move one frame, then steer back toward the inside on any axis that left
    /// `[0, width] x [0, height]`.
    pub fn step(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 {
            self.vx = self.vx.abs();
        } else if self.x > width {
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.vy = self.vy.abs();
        } else if self.y > height {
            self.vy = -self.vy.abs();
        }
    }

    pub fn fill_style(&self) -> String {
        format!("rgba(255, 255, 255, {})", self.opacity)
    }
}

pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn seeded<R: Rng>(config: &ParticleConfig, width: f64, height: f64, rng: &mut R) -> Self {
        let particles = (0..config.count)
            .map(|_| Particle {
                x: rng.r#gen::<f64>() * width,
                y: rng.r#gen::<f64>() * height,
                vx: (rng.r#gen::<f64>() - 0.5) * config.max_speed,
                vy: (rng.r#gen::<f64>() - 0.5) * config.max_speed,
                size: config.min_size + rng.r#gen::<f64>() * (config.max_size - config.min_size),
                opacity: config.min_opacity
                    + rng.r#gen::<f64>() * (config.max_opacity - config.min_opacity),
            })
            .collect();
        Self {
            width,
            height,
            particles,
        }
    }

    pub fn from_particles(width: f64, height: f64, particles: Vec<Particle>) -> Self {
        Self {
            width,
            height,
            particles,
        }
    }

    pub fn step(&mut self) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.step(w, h);
        }
    }

    /// New bounds; existing coordinates are left as they are.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
