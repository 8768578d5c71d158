//! Page configuration. Every field defaults to the stock Super Robot Team
//! behaviour; a JSON document (feature `serde_json`) may override any subset.

use thiserror::Error;

use crate::color::{ARM_PALETTE, LEG_PALETTE, Rgb};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[cfg(feature = "serde_json")]
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} palette is empty")]
    EmptyPalette(&'static str),
    #[error("invalid palette color: {0}")]
    Color(#[from] crate::color::ColorError),
    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: f64 },
}

/// How repeated timers for the same robot and action interact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimerPolicy {
    /// Every call keeps its own timer; an older revert may land after a newer message.
    #[default]
    Independent,
    /// A new call cancels the pending timer of the same kind on the same robot.
    Supersede,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Messages {
    pub ready: String,
    pub eye_closed: String,
    pub arms_changed: String,
    pub legs_changed: String,
    pub greeting: String,
    pub open_eye_label: String,
    pub close_eye_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            ready: "Ready".into(),
            eye_closed: "Eye Closed".into(),
            arms_changed: "Arms Changed".into(),
            legs_changed: "Legs Changed".into(),
            greeting: "Hello World".into(),
            open_eye_label: "Ouvrir œil gauche".into(),
            close_eye_label: "Fermer œil gauche".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    pub arm_palette: Vec<String>,
    pub leg_palette: Vec<String>,
    pub darken_percent: f64,
    pub revert_delay_ms: f64,
    pub speak_revert_ms: f64,
    pub speak_pulse_ms: f64,
    pub blink_interval_ms: f64,
    pub blink_steps: u32,
    pub blink_color: String,
    pub ambient_interval_ms: f64,
    pub ambient_chance: f64,
    pub glow_ms: f64,
    pub timer_policy: TimerPolicy,
    pub messages: Messages,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            arm_palette: ARM_PALETTE.iter().map(|c| c.to_string()).collect(),
            leg_palette: LEG_PALETTE.iter().map(|c| c.to_string()).collect(),
            darken_percent: 20.0,
            revert_delay_ms: 2000.0,
            speak_revert_ms: 3000.0,
            speak_pulse_ms: 500.0,
            blink_interval_ms: 200.0,
            blink_steps: 6,
            blink_color: "#ff0000".into(),
            ambient_interval_ms: 2000.0,
            ambient_chance: 0.1,
            glow_ms: 300.0,
            timer_policy: TimerPolicy::Independent,
            messages: Messages::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParticleConfig {
    pub count: usize,
    /// Velocity per axis is `(r - 0.5) * max_speed` for `r` in [0,1).
    pub max_speed: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
    /// CSS opacity of the whole overlay canvas.
    pub canvas_opacity: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            max_speed: 0.5,
            min_size: 1.0,
            max_size: 4.0,
            min_opacity: 0.2,
            max_opacity: 0.7,
            canvas_opacity: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub robots: RobotConfig,
    pub particles: ParticleConfig,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robots: RobotConfig::default(),
            particles: ParticleConfig::default(),
            log_level: "info".into(),
        }
    }
}

impl Config {
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.robots;
        for (name, palette) in [("arm", &r.arm_palette), ("leg", &r.leg_palette)] {
            if palette.is_empty() {
                return Err(ConfigError::EmptyPalette(name));
            }
            for c in palette {
                c.parse::<Rgb>()?;
            }
        }
        r.blink_color.parse::<Rgb>()?;
        if !(0.0..=1.0).contains(&r.ambient_chance) {
            return Err(ConfigError::Range {
                field: "ambient_chance",
                value: r.ambient_chance,
            });
        }
        if r.blink_interval_ms <= 0.0 {
            return Err(ConfigError::Range {
                field: "blink_interval_ms",
                value: r.blink_interval_ms,
            });
        }
        if r.ambient_interval_ms <= 0.0 {
            return Err(ConfigError::Range {
                field: "ambient_interval_ms",
                value: r.ambient_interval_ms,
            });
        }
        let p = &self.particles;
        if p.max_size < p.min_size {
            return Err(ConfigError::Range {
                field: "max_size",
                value: p.max_size,
            });
        }
        if p.max_opacity < p.min_opacity || p.max_opacity > 1.0 {
            return Err(ConfigError::Range {
                field: "max_opacity",
                value: p.max_opacity,
            });
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.robots.arm_palette.len(), 8);
        assert_eq!(cfg.robots.leg_palette.len(), 8);
        assert_eq!(cfg.particles.count, 50);
        assert_eq!(cfg.log_level(), log::Level::Info);
    }

    #[test]
    fn test_rejects_empty_palette_and_bad_chance() {
        let mut cfg = Config::default();
        cfg.robots.leg_palette.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyPalette("leg"))));

        let mut cfg = Config::default();
        cfg.robots.ambient_chance = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Range { field: "ambient_chance", .. })
        ));

        let mut cfg = Config::default();
        cfg.robots.arm_palette = vec!["#12345".into()];
        assert!(matches!(cfg.validate(), Err(ConfigError::Color(_))));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_partial_json_overrides() {
        let cfg = Config::from_json(
            r#"{"robots":{"timer_policy":"supersede","messages":{"ready":"Prêt"}},"log_level":"debug"}"#,
        )
        .unwrap();
        assert_eq!(cfg.robots.timer_policy, TimerPolicy::Supersede);
        assert_eq!(cfg.robots.messages.ready, "Prêt");
        assert_eq!(cfg.robots.messages.greeting, "Hello World");
        assert_eq!(cfg.robots.revert_delay_ms, 2000.0);
        assert_eq!(cfg.log_level(), log::Level::Debug);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(Config::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            Config::from_json(r#"{"robots":{"arm_palette":[]}}"#),
            Err(ConfigError::EmptyPalette("arm"))
        ));
    }
}
