//! Alarm chime capabilities: an audible tone and a vibration pulse.
//!
//! Both channels are best effort. Callers log a failed channel and move on.

use crate::config::{TONE_DURATION_SEC, TONE_FREQUENCY_HZ, TONE_GAIN, VIBRATION_PATTERN_MS};
use log::{debug, warn};
use std::fmt;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioScheduledSourceNode, OscillatorType};

/// Failure of a single chime channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChimeError {
    AudioUnavailable(String),
    Audio(String),
    HapticsUnavailable,
}

impl fmt::Display for ChimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChimeError::AudioUnavailable(reason) => {
                write!(f, "Audio output not available: {}", reason)
            }
            ChimeError::Audio(reason) => write!(f, "Failed to play alarm tone: {}", reason),
            ChimeError::HapticsUnavailable => write!(f, "Vibration not available"),
        }
    }
}

impl std::error::Error for ChimeError {}

impl ChimeError {
    fn audio(err: JsValue) -> Self {
        ChimeError::Audio(describe(&err))
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Output channels used for one chime.
pub trait Chime {
    /// Called from the start command, while the user gesture that unlocks
    /// audio on mobile browsers is still active.
    fn prepare(&mut self) {}
    /// Emit one short tone.
    fn tone(&mut self) -> Result<(), ChimeError>;
    /// Trigger one vibration pattern.
    fn pulse(&mut self) -> Result<(), ChimeError>;
}

/// Web Audio + Vibration API backend.
///
/// Owns a single `AudioContext`, created on first use and reused for every
/// tone afterwards.
#[derive(Default)]
pub struct WebChime {
    context: Option<AudioContext>,
}

impl WebChime {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self) -> Result<&AudioContext, ChimeError> {
        if self.context.is_none() {
            let ctx = AudioContext::new()
                .map_err(|e| ChimeError::AudioUnavailable(describe(&e)))?;
            self.context = Some(ctx);
        }
        self.context
            .as_ref()
            .ok_or_else(|| ChimeError::AudioUnavailable("no audio context".to_string()))
    }
}

impl Chime for WebChime {
    fn prepare(&mut self) {
        match self.context() {
            Ok(ctx) => {
                if let Err(e) = ctx.resume() {
                    debug!("Audio context resume refused: {}", describe(&e));
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    fn tone(&mut self) -> Result<(), ChimeError> {
        let ctx = self.context()?;

        let oscillator = ctx.create_oscillator().map_err(ChimeError::audio)?;
        let gain = ctx.create_gain().map_err(ChimeError::audio)?;

        oscillator
            .connect_with_audio_node(&gain)
            .map_err(ChimeError::audio)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(ChimeError::audio)?;

        let now = ctx.current_time();
        oscillator
            .frequency()
            .set_value_at_time(TONE_FREQUENCY_HZ, now)
            .map_err(ChimeError::audio)?;
        oscillator.set_type(OscillatorType::Square);
        gain.gain()
            .set_value_at_time(TONE_GAIN, now)
            .map_err(ChimeError::audio)?;

        let source: &AudioScheduledSourceNode = oscillator.as_ref();
        source.start().map_err(ChimeError::audio)?;
        source
            .stop_with_when(now + TONE_DURATION_SEC)
            .map_err(ChimeError::audio)?;
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), ChimeError> {
        let window = web_sys::window().ok_or(ChimeError::HapticsUnavailable)?;
        let navigator = window.navigator();

        // Safari ships no `vibrate` at all; calling it would throw.
        let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("vibrate"))
            .unwrap_or(false);
        if !supported {
            return Err(ChimeError::HapticsUnavailable);
        }

        let pattern: js_sys::Array = VIBRATION_PATTERN_MS
            .iter()
            .map(|&ms| JsValue::from(ms))
            .collect();
        if navigator.vibrate_with_pattern(&pattern) {
            Ok(())
        } else {
            Err(ChimeError::HapticsUnavailable)
        }
    }
}
