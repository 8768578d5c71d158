// Integration tests (native) for the `robot-team` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use std::collections::HashSet;

use robot_team::color::Rgb;
use robot_team::{ARM_PALETTE, Config, LEG_PALETTE, darken_color};

#[test]
fn palettes_have_eight_unique_valid_colors() {
    for palette in [ARM_PALETTE, LEG_PALETTE] {
        assert_eq!(palette.len(), 8);
        let unique: HashSet<_> = palette.iter().collect();
        assert_eq!(unique.len(), 8, "duplicate color in palette");
        for c in palette {
            assert!(c.parse::<Rgb>().is_ok(), "invalid palette color {c}");
            assert_eq!(c.len(), 7);
        }
    }
}

#[test]
fn darken_white_twenty_percent() {
    assert_eq!(darken_color("#ffffff", 20.0).unwrap(), "#cccccc");
    assert_eq!(robot_team::darken_color_js("#ffffff", 20.0).unwrap(), "#cccccc");
}

#[test]
fn darken_is_deterministic_and_clamped() {
    for p in 0..=100 {
        let a = darken_color("#808080", p as f64).unwrap();
        let b = darken_color("#808080", p as f64).unwrap();
        assert_eq!(a, b);
        let out: Rgb = a.parse().unwrap();
        let expected = (128 - (2.55f64 * p as f64).round() as i32).max(0) as u8;
        assert_eq!(out, Rgb { r: expected, g: expected, b: expected });
    }
}

#[test]
fn darken_rejects_malformed_color() {
    assert!(darken_color("red", 20.0).is_err());
    assert!(darken_color("#12345z", 20.0).is_err());
}

#[test]
fn default_config_validates() {
    Config::default().validate().unwrap();
}
