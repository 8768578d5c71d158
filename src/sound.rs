//! Synthesized sound cues (Web Audio oscillator + gain envelope).

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, OscillatorType};

/// Gain at the start of every beep.
pub const ENVELOPE_START: f32 = 0.3;
/// Gain reached (exponentially) at the end of the beep.
pub const ENVELOPE_END: f32 = 0.01;

/// One scheduled beep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration_ms: f64,
    /// Offset from the moment the cue is played.
    pub delay_ms: f64,
}

impl Tone {
    pub const fn new(frequency: f32, duration_ms: f64, delay_ms: f64) -> Self {
        Self {
            frequency,
            duration_ms,
            delay_ms,
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::new(440.0, 200.0, 0.0)
    }
}

pub const CLICK: &[Tone] = &[Tone::new(800.0, 100.0, 0.0)];

/// Rising C-E-G triad; envelopes overlap.
pub const SUCCESS: &[Tone] = &[
    Tone::new(523.0, 150.0, 0.0),
    Tone::new(659.0, 150.0, 100.0),
    Tone::new(784.0, 200.0, 200.0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Success,
}

impl Cue {
    pub fn tones(self) -> &'static [Tone] {
        match self {
            Cue::Click => CLICK,
            Cue::Success => SUCCESS,
        }
    }
}

/// Anything that can voice a cue. The browser implementation is [`SoundManager`].
pub trait SoundSink {
    fn play(&self, cue: Cue);
}

/// Silent sink, used when no audio is wanted.
pub struct Mute;

impl SoundSink for Mute {
    fn play(&self, _cue: Cue) {}
}

pub struct SoundManager {
    ctx: Option<AudioContext>,
}

impl SoundManager {
    /// Acquire an audio context once. On failure the manager stays silent for good.
    pub fn new() -> Self {
        let ctx = match AudioContext::new() {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("Web Audio API not supported: {e:?}");
                None
            }
        };
        Self { ctx }
    }

    pub fn is_available(&self) -> bool {
        self.ctx.is_some()
    }

    pub fn play_beep(&self, frequency: f32, duration_ms: f64) {
        self.play_tone(Tone::new(frequency, duration_ms, 0.0));
    }

    pub fn play_success_sound(&self) {
        self.play(Cue::Success);
    }

    pub fn play_click_sound(&self) {
        self.play(Cue::Click);
    }

    fn play_tone(&self, tone: Tone) {
        let Some(ctx) = &self.ctx else {
            return;
        };
        // Contexts created before any user gesture start suspended.
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        if let Err(e) = schedule_tone(ctx, tone) {
            log::debug!("beep {} Hz failed: {e:?}", tone.frequency);
        }
    }
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundSink for SoundManager {
    fn play(&self, cue: Cue) {
        for tone in cue.tones() {
            self.play_tone(*tone);
        }
    }
}

fn schedule_tone(ctx: &AudioContext, tone: Tone) -> Result<(), JsValue> {
    let osc = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    osc.set_type(OscillatorType::Sine);
    osc.frequency().set_value(tone.frequency);

    let start = ctx.current_time() + tone.delay_ms / 1000.0;
    let end = start + tone.duration_ms / 1000.0;
    gain.gain().set_value_at_time(ENVELOPE_START, start)?;
    gain.gain().exponential_ramp_to_value_at_time(ENVELOPE_END, end)?;

    osc.start_with_when(start)?;
    osc.stop_with_when(end)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_rising_triad() {
        let f: Vec<f32> = SUCCESS.iter().map(|t| t.frequency).collect();
        assert_eq!(f, vec![523.0, 659.0, 784.0]);
        let d: Vec<f64> = SUCCESS.iter().map(|t| t.delay_ms).collect();
        assert_eq!(d, vec![0.0, 100.0, 200.0]);
        // later tones begin before earlier ones end
        assert!(SUCCESS[1].delay_ms < SUCCESS[0].delay_ms + SUCCESS[0].duration_ms);
    }

    #[test]
    fn test_click_and_default_beep() {
        assert_eq!(Cue::Click.tones(), &[Tone::new(800.0, 100.0, 0.0)]);
        assert_eq!(Tone::default(), Tone::new(440.0, 200.0, 0.0));
        assert!(ENVELOPE_END > 0.0 && ENVELOPE_END < ENVELOPE_START);
    }
}
