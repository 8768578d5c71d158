//! Per-robot interaction and animation controller.
//!
//! [`RobotManager`] owns one [`Robot`] record per discovered widget and a
//! [`Scheduler`] holding every pending visual timer (display reverts, speak
//! pulse, blink sequence, ambient glow). It never touches the DOM directly:
//! each robot is reached through a [`RobotView`], implemented for the page by
//! [`dom::DomRobot`] and by recording fakes in tests.

pub mod dom;

use std::collections::BTreeMap;

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::color::{DEFAULT_ARM_COLOR, DEFAULT_LEG_COLOR, limb_gradient};
use crate::config::{RobotConfig, TimerPolicy};
use crate::scheduler::{Scheduler, TaskKey, TaskKind};
use crate::sound::{Cue, SoundSink};

pub const CLOSED_CLASS: &str = "closed";
pub const ACTIVE_CLASS: &str = "active";
pub const GLOW_ON: &str = "0 0 20px #00ff00";
pub const GLOW_OFF: &str = "0 0 10px #00ff00";

const AMBIENT_OWNER: &str = "*";

/// Named sub-elements of a robot widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    LeftEye,
    RightEye,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Display,
    EyeButton,
    ArmButton,
    LegButton,
    SpeakButton,
}

impl Part {
    pub const ALL: [Part; 11] = [
        Part::LeftEye,
        Part::RightEye,
        Part::LeftArm,
        Part::RightArm,
        Part::LeftLeg,
        Part::RightLeg,
        Part::Display,
        Part::EyeButton,
        Part::ArmButton,
        Part::LegButton,
        Part::SpeakButton,
    ];

    /// Class that marks this part inside its robot container.
    pub fn class_name(self) -> &'static str {
        match self {
            Part::LeftEye => "left-eye",
            Part::RightEye => "right-eye",
            Part::LeftArm => "left-arm",
            Part::RightArm => "right-arm",
            Part::LeftLeg => "left-leg",
            Part::RightLeg => "right-leg",
            Part::Display => "chest-display",
            Part::EyeButton => "eye-btn",
            Part::ArmButton => "arm-btn",
            Part::LegButton => "leg-btn",
            Part::SpeakButton => "speak-btn",
        }
    }
}

/// The four control buttons of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Eye,
    Arm,
    Leg,
    Speak,
}

impl Control {
    pub const ALL: [Control; 4] = [Control::Eye, Control::Arm, Control::Leg, Control::Speak];

    pub fn button(self) -> Part {
        match self {
            Control::Eye => Part::EyeButton,
            Control::Arm => Part::ArmButton,
            Control::Leg => Part::LegButton,
            Control::Speak => Part::SpeakButton,
        }
    }

    pub fn cue(self) -> Cue {
        match self {
            Control::Speak => Cue::Success,
            _ => Cue::Click,
        }
    }
}

/// Mutations a robot widget supports. Operations on an absent part are no-ops.
pub trait RobotView {
    fn has(&self, part: Part) -> bool;
    fn set_text(&self, part: Part, text: &str);
    fn set_class(&self, part: Part, class: &str, on: bool);
    fn set_style(&self, part: Part, property: &str, value: &str);
    /// Current inline value, empty when unset; `None` when the part is absent.
    fn style(&self, part: Part, property: &str) -> Option<String>;
}

pub struct Robot<V> {
    pub key: String,
    pub view: V,
    pub is_left_eye_closed: bool,
    pub current_arm_color: String,
    pub current_leg_color: String,
    // Eye colors captured by the running blink; only consulted under TimerPolicy::Supersede.
    blink_originals: Option<(String, String)>,
}

impl<V: RobotView> Robot<V> {
    pub fn new(key: &str, view: V) -> Self {
        Self {
            key: key.to_string(),
            view,
            is_left_eye_closed: false,
            current_arm_color: DEFAULT_ARM_COLOR.to_string(),
            current_leg_color: DEFAULT_LEG_COLOR.to_string(),
            blink_originals: None,
        }
    }

    fn eye_backgrounds(&self) -> (String, String) {
        (
            self.view.style(Part::LeftEye, "background").unwrap_or_default(),
            self.view.style(Part::RightEye, "background").unwrap_or_default(),
        )
    }

    fn set_eyes(&self, property: &str, left: &str, right: &str) {
        self.view.set_style(Part::LeftEye, property, left);
        self.view.set_style(Part::RightEye, property, right);
    }
}

#[derive(Clone, Debug, PartialEq)]
enum RobotTask {
    Revert { robot: String },
    EndSpeakPulse { robot: String },
    Blink { robot: String, step: u32, originals: (String, String) },
    GlowFade { robot: String },
    Ambient,
}

#[derive(Clone, Copy)]
enum Limb {
    Arms,
    Legs,
}

pub struct RobotManager<V> {
    config: RobotConfig,
    robots: BTreeMap<String, Robot<V>>,
    scheduler: Scheduler<RobotTask>,
    sound: Box<dyn SoundSink>,
    rng: SmallRng,
}

impl<V: RobotView> RobotManager<V> {
    pub fn new(config: RobotConfig, sound: Box<dyn SoundSink>, rng: SmallRng, now: f64) -> Self {
        Self {
            config,
            robots: BTreeMap::new(),
            scheduler: Scheduler::new(now),
            sound,
            rng,
        }
    }

    /// Add a robot. A later registration with the same key replaces the earlier one.
    pub fn register(&mut self, key: &str, view: V) {
        if self.robots.insert(key.to_string(), Robot::new(key, view)).is_some() {
            log::warn!("duplicate robot '{key}': later widget replaces earlier");
        }
    }

    pub fn robot(&self, key: &str) -> Option<&Robot<V>> {
        self.robots.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.robots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Button press: run the action, then the matching sound cue. Unknown robots are ignored.
    pub fn press(&mut self, key: &str, control: Control) -> bool {
        if !self.robots.contains_key(key) {
            return false;
        }
        match control {
            Control::Eye => self.toggle_left_eye(key),
            Control::Arm => self.change_arm_color(key),
            Control::Leg => self.change_leg_color(key),
            Control::Speak => self.make_robot_speak(key),
        }
        self.sound.play(control.cue());
        true
    }

    pub fn toggle_left_eye(&mut self, key: &str) {
        let Some(robot) = self.robots.get_mut(key) else {
            return;
        };
        robot.is_left_eye_closed = !robot.is_left_eye_closed;
        let closed = robot.is_left_eye_closed;
        let m = &self.config.messages;
        robot.view.set_class(Part::LeftEye, CLOSED_CLASS, closed);
        if closed {
            robot.view.set_text(Part::EyeButton, &m.open_eye_label);
            robot.view.set_text(Part::Display, &m.eye_closed);
        } else {
            robot.view.set_text(Part::EyeButton, &m.close_eye_label);
            robot.view.set_text(Part::Display, &m.ready);
        }
        log::debug!("{key}: left eye closed={closed}");
    }

    pub fn change_arm_color(&mut self, key: &str) {
        self.change_limb_color(key, Limb::Arms);
    }

    pub fn change_leg_color(&mut self, key: &str) {
        self.change_limb_color(key, Limb::Legs);
    }

    fn change_limb_color(&mut self, key: &str, limb: Limb) {
        let Some(robot) = self.robots.get_mut(key) else {
            return;
        };
        let (palette, parts, message) = match limb {
            Limb::Arms => (
                &self.config.arm_palette,
                [Part::LeftArm, Part::RightArm],
                &self.config.messages.arms_changed,
            ),
            Limb::Legs => (
                &self.config.leg_palette,
                [Part::LeftLeg, Part::RightLeg],
                &self.config.messages.legs_changed,
            ),
        };
        let Some(color) = palette.choose(&mut self.rng).cloned() else {
            return;
        };
        match limb_gradient(&color, self.config.darken_percent) {
            Ok(gradient) => {
                for part in parts {
                    robot.view.set_style(part, "background", &gradient);
                }
            }
            Err(e) => log::warn!("{key}: {e}"),
        }
        robot.view.set_text(Part::Display, message);
        log::debug!("{key}: limb color -> {color}");
        match limb {
            Limb::Arms => robot.current_arm_color = color,
            Limb::Legs => robot.current_leg_color = color,
        }
        let delay = self.config.revert_delay_ms;
        self.schedule_revert(key, delay);
    }

    pub fn make_robot_speak(&mut self, key: &str) {
        let Some(robot) = self.robots.get(key) else {
            return;
        };
        robot.view.set_class(Part::SpeakButton, ACTIVE_CLASS, true);
        robot.view.set_text(Part::Display, &self.config.messages.greeting);

        let pulse = TaskKey::new(key, TaskKind::SpeakPulse);
        if self.config.timer_policy == TimerPolicy::Supersede {
            self.scheduler.cancel_key(&pulse);
        }
        self.scheduler.schedule(
            self.config.speak_pulse_ms,
            Some(pulse),
            RobotTask::EndSpeakPulse {
                robot: key.to_string(),
            },
        );

        self.animate_eyes(key);
        let delay = self.config.speak_revert_ms;
        self.schedule_revert(key, delay);
        log::debug!("{key}: speak");
    }

    /// Blink both eyes `blink_steps` times, then restore the colors seen at call time.
    pub fn animate_eyes(&mut self, key: &str) {
        let Some(robot) = self.robots.get_mut(key) else {
            return;
        };
        let blink = TaskKey::new(key, TaskKind::Blink);
        let originals = match self.config.timer_policy {
            TimerPolicy::Independent => robot.eye_backgrounds(),
            TimerPolicy::Supersede => {
                self.scheduler.cancel_key(&blink);
                let captured = robot
                    .blink_originals
                    .take()
                    .unwrap_or_else(|| robot.eye_backgrounds());
                robot.blink_originals = Some(captured.clone());
                captured
            }
        };
        self.scheduler.schedule(
            self.config.blink_interval_ms,
            Some(blink),
            RobotTask::Blink {
                robot: key.to_string(),
                step: 0,
                originals,
            },
        );
    }

    pub fn add_hover_effect(&mut self, key: &str) {
        self.set_swing(key, "1s");
    }

    pub fn remove_hover_effect(&mut self, key: &str) {
        self.set_swing(key, "3s");
    }

    fn set_swing(&self, key: &str, period: &str) {
        let Some(robot) = self.robots.get(key) else {
            return;
        };
        robot.view.set_style(
            Part::LeftArm,
            "animation",
            &format!("leftArmSwing {period} ease-in-out infinite"),
        );
        robot.view.set_style(
            Part::RightArm,
            "animation",
            &format!("rightArmSwing {period} ease-in-out infinite"),
        );
    }

    /// Start the periodic random eye glow. Calling it again has no effect.
    pub fn start_ambient_animation(&mut self) {
        let key = TaskKey::new(AMBIENT_OWNER, TaskKind::Ambient);
        if self.scheduler.has_pending(&key) {
            return;
        }
        self.scheduler
            .schedule(self.config.ambient_interval_ms, Some(key), RobotTask::Ambient);
    }

    pub fn stop_ambient_animation(&mut self) {
        self.scheduler
            .cancel_key(&TaskKey::new(AMBIENT_OWNER, TaskKind::Ambient));
    }

    /// Run every timer due at or before `now`.
    pub fn advance_to(&mut self, now: f64) {
        while let Some(task) = self.scheduler.pop_due(now) {
            self.run(task);
        }
    }

    fn schedule_revert(&mut self, key: &str, delay: f64) {
        let revert = TaskKey::new(key, TaskKind::RevertDisplay);
        if self.config.timer_policy == TimerPolicy::Supersede {
            self.scheduler.cancel_key(&revert);
        }
        self.scheduler.schedule(
            delay,
            Some(revert),
            RobotTask::Revert {
                robot: key.to_string(),
            },
        );
    }

    fn run(&mut self, task: RobotTask) {
        match task {
            RobotTask::Revert { robot } => {
                if let Some(r) = self.robots.get(&robot) {
                    r.view.set_text(Part::Display, &self.config.messages.ready);
                }
            }
            RobotTask::EndSpeakPulse { robot } => {
                if let Some(r) = self.robots.get(&robot) {
                    r.view.set_class(Part::SpeakButton, ACTIVE_CLASS, false);
                }
            }
            RobotTask::Blink {
                robot,
                step,
                originals,
            } => self.blink_step(robot, step, originals),
            RobotTask::GlowFade { robot } => {
                if let Some(r) = self.robots.get(&robot) {
                    r.set_eyes("box-shadow", GLOW_OFF, GLOW_OFF);
                }
            }
            RobotTask::Ambient => self.ambient_tick(),
        }
    }

    fn blink_step(&mut self, key: String, step: u32, originals: (String, String)) {
        let Some(robot) = self.robots.get_mut(&key) else {
            return;
        };
        let (left, right) = (&originals.0, &originals.1);
        if step >= self.config.blink_steps {
            robot.set_eyes("background", left, right);
            robot.blink_originals = None;
            return;
        }
        if step % 2 == 0 {
            let c = &self.config.blink_color;
            robot.set_eyes("background", c, c);
        } else {
            robot.set_eyes("background", left, right);
        }
        self.scheduler.schedule(
            self.config.blink_interval_ms,
            Some(TaskKey::new(&key, TaskKind::Blink)),
            RobotTask::Blink {
                robot: key,
                step: step + 1,
                originals,
            },
        );
    }

    fn ambient_tick(&mut self) {
        let mut glowing = Vec::new();
        for (key, robot) in &self.robots {
            if robot.is_left_eye_closed {
                continue;
            }
            if self.rng.r#gen::<f64>() < self.config.ambient_chance {
                robot.set_eyes("box-shadow", GLOW_ON, GLOW_ON);
                glowing.push(key.clone());
            }
        }
        for key in glowing {
            let glow = TaskKey::new(&key, TaskKind::Glow);
            self.scheduler
                .schedule(self.config.glow_ms, Some(glow), RobotTask::GlowFade { robot: key });
        }
        self.scheduler.schedule(
            self.config.ambient_interval_ms,
            Some(TaskKey::new(AMBIENT_OWNER, TaskKind::Ambient)),
            RobotTask::Ambient,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct Fake {
        text: RefCell<HashMap<Part, String>>,
        classes: RefCell<HashSet<(Part, String)>>,
        styles: RefCell<HashMap<(Part, String), String>>,
    }

    impl RobotView for Fake {
        fn has(&self, _part: Part) -> bool {
            true
        }
        fn set_text(&self, part: Part, text: &str) {
            self.text.borrow_mut().insert(part, text.to_string());
        }
        fn set_class(&self, part: Part, class: &str, on: bool) {
            let mut c = self.classes.borrow_mut();
            if on {
                c.insert((part, class.to_string()));
            } else {
                c.remove(&(part, class.to_string()));
            }
        }
        fn set_style(&self, part: Part, property: &str, value: &str) {
            self.styles
                .borrow_mut()
                .insert((part, property.to_string()), value.to_string());
        }
        fn style(&self, part: Part, property: &str) -> Option<String> {
            Some(
                self.styles
                    .borrow()
                    .get(&(part, property.to_string()))
                    .cloned()
                    .unwrap_or_default(),
            )
        }
    }

    fn manager(policy: TimerPolicy) -> RobotManager<Fake> {
        let config = RobotConfig {
            timer_policy: policy,
            ..RobotConfig::default()
        };
        let mut m = RobotManager::new(
            config,
            Box::new(crate::sound::Mute),
            SmallRng::seed_from_u64(7),
            0.0,
        );
        m.register("classic", Fake::default());
        m
    }

    fn display(m: &RobotManager<Fake>) -> String {
        m.robot("classic").unwrap().view.text.borrow()[&Part::Display].clone()
    }

    #[test]
    fn test_independent_revert_lands_on_newer_message() {
        let mut m = manager(TimerPolicy::Independent);
        m.change_arm_color("classic");
        m.advance_to(1000.0);
        m.make_robot_speak("classic");
        assert_eq!(display(&m), "Hello World");
        // arm revert (t=2000) overwrites the greeting early
        m.advance_to(2000.0);
        assert_eq!(display(&m), "Ready");
    }

    #[test]
    fn test_supersede_keeps_newer_message() {
        let mut m = manager(TimerPolicy::Supersede);
        m.change_arm_color("classic");
        m.advance_to(1000.0);
        m.make_robot_speak("classic");
        m.advance_to(2000.0);
        assert_eq!(display(&m), "Hello World");
        m.advance_to(4000.0);
        assert_eq!(display(&m), "Ready");
    }

    #[test]
    fn test_overlapping_blinks_capture_stale_color_when_independent() {
        let mut m = manager(TimerPolicy::Independent);
        m.animate_eyes("classic");
        m.advance_to(200.0); // first step: eyes red
        m.animate_eyes("classic"); // captures red as "original"
        m.advance_to(5000.0);
        let bg = m.robot("classic").unwrap().view.style(Part::LeftEye, "background");
        assert_eq!(bg.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_overlapping_blinks_restore_true_color_when_superseding() {
        let mut m = manager(TimerPolicy::Supersede);
        m.animate_eyes("classic");
        m.advance_to(200.0);
        m.animate_eyes("classic");
        m.advance_to(5000.0);
        let bg = m.robot("classic").unwrap().view.style(Part::LeftEye, "background");
        assert_eq!(bg.as_deref(), Some(""));
        assert_eq!(m.pending_timers(), 0);
    }

    #[test]
    fn test_ambient_never_glows_closed_eyes() {
        let mut m = manager(TimerPolicy::Independent);
        m.config.ambient_chance = 1.0;
        m.toggle_left_eye("classic");
        m.start_ambient_animation();
        m.start_ambient_animation();
        assert_eq!(m.pending_timers(), 1);
        m.advance_to(10_000.0);
        let shadow = m.robot("classic").unwrap().view.style(Part::LeftEye, "box-shadow");
        assert_eq!(shadow.as_deref(), Some(""));
    }

    #[test]
    fn test_ambient_glow_pulse_fades_after_300ms() {
        let mut m = manager(TimerPolicy::Independent);
        m.config.ambient_chance = 1.0;
        m.start_ambient_animation();
        m.advance_to(2000.0);
        let eye = |m: &RobotManager<Fake>| {
            m.robot("classic").unwrap().view.style(Part::RightEye, "box-shadow")
        };
        assert_eq!(eye(&m).as_deref(), Some(GLOW_ON));
        m.advance_to(2299.0);
        assert_eq!(eye(&m).as_deref(), Some(GLOW_ON));
        m.advance_to(2300.0);
        assert_eq!(eye(&m).as_deref(), Some(GLOW_OFF));
        m.stop_ambient_animation();
        assert_eq!(m.pending_timers(), 0);
    }

    #[test]
    fn test_ambient_chance_zero_never_glows() {
        let mut m = manager(TimerPolicy::Independent);
        m.config.ambient_chance = 0.0;
        m.start_ambient_animation();
        m.advance_to(60_000.0);
        let shadow = m.robot("classic").unwrap().view.style(Part::LeftEye, "box-shadow");
        assert_eq!(shadow.as_deref(), Some(""));
    }
}
