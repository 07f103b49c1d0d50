//! Shared envelope parameter sets.
//!
//! The sampler owns exactly one amplitude (AHDSHR), one filter and one
//! pitch (ADSR) parameter set. Voices read them through a borrowed
//! reference on every call and are told to recompute their coefficients
//! whenever a value changes. The envelope curves themselves belong to the
//! voice implementation.

/// Longest accepted stage duration (seconds).
pub const MAX_STAGE_SECONDS: f32 = 10.0;

/// Which shared envelope a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeTarget {
    /// Amplitude envelope (AHDSHR)
    Amplitude,
    /// Filter cutoff envelope (ADSR)
    Filter,
    /// Pitch envelope (ADSR)
    Pitch,
}

/// One stage of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Hold,
    Decay,
    /// Sustain level as a fraction (0..1), not a duration
    Sustain,
    ReleaseHold,
    Release,
}

/// Durations in seconds plus the control rate they are converted at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    pub attack_seconds: f32,
    pub hold_seconds: f32,
    pub decay_seconds: f32,
    pub sustain_fraction: f32,
    pub release_hold_seconds: f32,
    pub release_seconds: f32,
    control_rate: f32,
}

impl EnvelopeParameters {
    pub fn new(control_rate: f32) -> Self {
        Self {
            attack_seconds: 0.0,
            hold_seconds: 0.0,
            decay_seconds: 0.0,
            sustain_fraction: 1.0,
            release_hold_seconds: 0.0,
            release_seconds: 0.0,
            control_rate,
        }
    }

    /// Rate (Hz) at which envelope stages are stepped.
    pub fn control_rate(&self) -> f32 {
        self.control_rate
    }

    pub fn update_sample_rate(&mut self, control_rate: f32) {
        self.control_rate = control_rate;
    }

    /// Current value of `stage`.
    pub fn get(&self, stage: EnvelopeStage) -> f32 {
        match stage {
            EnvelopeStage::Attack => self.attack_seconds,
            EnvelopeStage::Hold => self.hold_seconds,
            EnvelopeStage::Decay => self.decay_seconds,
            EnvelopeStage::Sustain => self.sustain_fraction,
            EnvelopeStage::ReleaseHold => self.release_hold_seconds,
            EnvelopeStage::Release => self.release_seconds,
        }
    }

    /// Set `stage`, clamping durations to `0..=10` s and sustain to `0..=1`.
    pub fn set(&mut self, stage: EnvelopeStage, value: f32) {
        let value = if value.is_finite() { value } else { 0.0 };
        match stage {
            EnvelopeStage::Attack => self.attack_seconds = clamp_duration(value),
            EnvelopeStage::Hold => self.hold_seconds = clamp_duration(value),
            EnvelopeStage::Decay => self.decay_seconds = clamp_duration(value),
            EnvelopeStage::Sustain => self.sustain_fraction = value.clamp(0.0, 1.0),
            EnvelopeStage::ReleaseHold => self.release_hold_seconds = clamp_duration(value),
            EnvelopeStage::Release => self.release_seconds = clamp_duration(value),
        }
    }

    /// Stage duration expressed in control-rate steps.
    #[inline]
    pub fn stage_steps(&self, stage: EnvelopeStage) -> f32 {
        match stage {
            EnvelopeStage::Sustain => 0.0,
            _ => self.get(stage) * self.control_rate,
        }
    }
}

#[inline]
fn clamp_duration(seconds: f32) -> f32 {
    seconds.clamp(0.0, MAX_STAGE_SECONDS)
}

/// The three envelope sets every voice shares.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeParameterSets {
    pub amplitude: EnvelopeParameters,
    pub filter: EnvelopeParameters,
    pub pitch: EnvelopeParameters,
}

impl EnvelopeParameterSets {
    pub fn new(control_rate: f32) -> Self {
        Self {
            amplitude: EnvelopeParameters::new(control_rate),
            filter: EnvelopeParameters::new(control_rate),
            pitch: EnvelopeParameters::new(control_rate),
        }
    }

    pub fn get(&self, target: EnvelopeTarget) -> &EnvelopeParameters {
        match target {
            EnvelopeTarget::Amplitude => &self.amplitude,
            EnvelopeTarget::Filter => &self.filter,
            EnvelopeTarget::Pitch => &self.pitch,
        }
    }

    pub fn get_mut(&mut self, target: EnvelopeTarget) -> &mut EnvelopeParameters {
        match target {
            EnvelopeTarget::Amplitude => &mut self.amplitude,
            EnvelopeTarget::Filter => &mut self.filter,
            EnvelopeTarget::Pitch => &mut self.pitch,
        }
    }

    pub fn update_sample_rate(&mut self, control_rate: f32) {
        self.amplitude.update_sample_rate(control_rate);
        self.filter.update_sample_rate(control_rate);
        self.pitch.update_sample_rate(control_rate);
    }
}
