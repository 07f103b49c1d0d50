//! Lock-free scalar parameter store.
//!
//! Every modulation and mix setting is one [`AtomicFloat`] written by the
//! control context and read once per block by the render context. Edits
//! racing a block in flight land on the next block; last write wins.
//!
//! Toggles are stored as `0.0` / `1.0` and read back through
//! [`SamplerParams::flag`].

use crate::lockfree::AtomicFloat;

/// How a parameter value maps onto a normalized 0..1 control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterScale {
    #[default]
    Linear,
    /// `real = min * (max/min)^normalized`, requires `min > 0`
    Logarithmic,
    /// `< 0.5` off, `>= 0.5` on
    Toggle,
}

/// Valid range and default of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub scale: ParameterScale,
}

impl ParameterRange {
    pub const fn linear(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            scale: ParameterScale::Linear,
        }
    }

    pub const fn logarithmic(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            scale: ParameterScale::Logarithmic,
        }
    }

    pub const fn toggle(default_on: bool) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            default: if default_on { 1.0 } else { 0.0 },
            scale: ParameterScale::Toggle,
        }
    }

    /// Clamp a real value into range. Toggles snap to 0 or 1; NaN falls
    /// back to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        match self.scale {
            ParameterScale::Toggle => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            _ => value.clamp(self.min, self.max),
        }
    }

    /// Real value → normalized 0..1.
    pub fn normalize(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        match self.scale {
            ParameterScale::Linear | ParameterScale::Toggle => (value - self.min) / span,
            ParameterScale::Logarithmic => {
                (value.ln() - self.min.ln()) / (self.max.ln() - self.min.ln())
            }
        }
    }

    /// Normalized 0..1 → real value.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let n = normalized.clamp(0.0, 1.0);
        match self.scale {
            ParameterScale::Linear => self.min + n * (self.max - self.min),
            ParameterScale::Logarithmic => self.min * (self.max / self.min).powf(n),
            ParameterScale::Toggle => self.clamp(n),
        }
    }
}

/// Identifier of every scalar sampler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ParameterId {
    OverallGain,
    Pan,
    MasterVolume,
    PitchOffset,
    VoiceVibratoDepth,
    VoiceVibratoFrequency,
    CutoffMultiple,
    KeyTracking,
    CutoffEnvelopeStrength,
    FilterEnvelopeVelocityScaling,
    LinearResonance,
    PitchAdsrSemitones,
    GlideRate,
    LfoRate,
    LfoDepth,
    LfoTargetPitch,
    LfoTargetGain,
    LfoTargetFilter,
    FilterEnable,
    RestartVoiceLfo,
    LoopThruRelease,
    Monophonic,
    Legato,
}

/// Number of [`ParameterId`] variants.
pub const PARAMETER_COUNT: usize = 23;

/// Static description of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDef {
    pub id: ParameterId,
    /// Stable machine identifier
    pub identifier: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub range: ParameterRange,
}

const fn def(
    id: ParameterId,
    identifier: &'static str,
    name: &'static str,
    range: ParameterRange,
) -> ParameterDef {
    ParameterDef {
        id,
        identifier,
        name,
        range,
    }
}

#[rustfmt::skip]
static DEFINITIONS: [ParameterDef; PARAMETER_COUNT] = [
    def(ParameterId::OverallGain, "overallGain", "Overall Gain (dB)", ParameterRange::linear(-90.0, 12.0, 0.0)),
    def(ParameterId::Pan, "pan", "Pan", ParameterRange::linear(-1.0, 1.0, 0.0)),
    def(ParameterId::MasterVolume, "masterVolume", "Master Volume", ParameterRange::linear(0.0, 1.0, 1.0)),
    def(ParameterId::PitchOffset, "pitchBend", "Pitch Offset (semitones)", ParameterRange::linear(-24.0, 24.0, 0.0)),
    def(ParameterId::VoiceVibratoDepth, "voiceVibratoDepth", "Voice Vibrato (semitones)", ParameterRange::linear(0.0, 24.0, 0.0)),
    def(ParameterId::VoiceVibratoFrequency, "voiceVibratoFrequency", "Voice Vibrato Speed (Hz)", ParameterRange::linear(0.0, 200.0, 5.0)),
    def(ParameterId::CutoffMultiple, "filterCutoff", "Filter Cutoff Multiple", ParameterRange::logarithmic(1.0, 1000.0, 4.0)),
    def(ParameterId::KeyTracking, "filterKeyTracking", "Filter Key Tracking", ParameterRange::linear(-2.0, 2.0, 1.0)),
    def(ParameterId::CutoffEnvelopeStrength, "filterStrength", "Filter Envelope Strength", ParameterRange::linear(0.0, 1000.0, 20.0)),
    def(ParameterId::FilterEnvelopeVelocityScaling, "filterEnvelopeVelocityScaling", "Filter Envelope Velocity Scaling", ParameterRange::linear(0.0, 1.0, 0.0)),
    def(ParameterId::LinearResonance, "filterResonance", "Filter Resonance", ParameterRange::linear(0.0, 10.0, 0.5)),
    def(ParameterId::PitchAdsrSemitones, "pitchADSRSemitones", "Pitch Envelope Depth (semitones)", ParameterRange::linear(-12.0, 12.0, 0.0)),
    def(ParameterId::GlideRate, "glideRate", "Glide Rate (s/octave)", ParameterRange::linear(0.0, 20.0, 0.0)),
    def(ParameterId::LfoRate, "lfoRate", "LFO Rate (Hz)", ParameterRange::logarithmic(0.1, 200.0, 5.0)),
    def(ParameterId::LfoDepth, "lfoDepth", "LFO Depth", ParameterRange::linear(0.0, 1.0, 0.0)),
    def(ParameterId::LfoTargetPitch, "lfoTargetPitch", "LFO → Pitch", ParameterRange::toggle(false)),
    def(ParameterId::LfoTargetGain, "lfoTargetGain", "LFO → Gain", ParameterRange::toggle(false)),
    def(ParameterId::LfoTargetFilter, "lfoTargetFilter", "LFO → Filter", ParameterRange::toggle(false)),
    def(ParameterId::FilterEnable, "filterEnable", "Filter Enable", ParameterRange::toggle(false)),
    def(ParameterId::RestartVoiceLfo, "restartVoiceLFO", "Restart Voice LFO", ParameterRange::toggle(false)),
    def(ParameterId::LoopThruRelease, "loopThruRelease", "Loop Through Release", ParameterRange::toggle(false)),
    def(ParameterId::Monophonic, "isMonophonic", "Monophonic", ParameterRange::toggle(false)),
    def(ParameterId::Legato, "isLegato", "Legato", ParameterRange::toggle(false)),
];

impl ParameterId {
    /// Every parameter, in declaration order.
    pub const ALL: [ParameterId; PARAMETER_COUNT] = [
        ParameterId::OverallGain,
        ParameterId::Pan,
        ParameterId::MasterVolume,
        ParameterId::PitchOffset,
        ParameterId::VoiceVibratoDepth,
        ParameterId::VoiceVibratoFrequency,
        ParameterId::CutoffMultiple,
        ParameterId::KeyTracking,
        ParameterId::CutoffEnvelopeStrength,
        ParameterId::FilterEnvelopeVelocityScaling,
        ParameterId::LinearResonance,
        ParameterId::PitchAdsrSemitones,
        ParameterId::GlideRate,
        ParameterId::LfoRate,
        ParameterId::LfoDepth,
        ParameterId::LfoTargetPitch,
        ParameterId::LfoTargetGain,
        ParameterId::LfoTargetFilter,
        ParameterId::FilterEnable,
        ParameterId::RestartVoiceLfo,
        ParameterId::LoopThruRelease,
        ParameterId::Monophonic,
        ParameterId::Legato,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static ParameterDef {
        &DEFINITIONS[self.index()]
    }

    pub fn range(self) -> ParameterRange {
        self.def().range
    }

    /// Look up a parameter by its machine identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        DEFINITIONS
            .iter()
            .find(|d| d.identifier == identifier)
            .map(|d| d.id)
    }
}

/// Per-block copy of every scalar parameter.
///
/// Taken once at the top of a render call so a block sees one consistent
/// value per parameter even if the control side writes mid-block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    values: [f32; PARAMETER_COUNT],
}

impl ParamSnapshot {
    #[inline]
    pub fn get(&self, id: ParameterId) -> f32 {
        self.values[id.index()]
    }

    #[inline]
    pub fn flag(&self, id: ParameterId) -> bool {
        self.get(id) >= 0.5
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|i| DEFINITIONS[i].range.default),
        }
    }
}

/// Shared parameter store. One writer, one reader.
#[derive(Debug)]
pub struct SamplerParams {
    values: [AtomicFloat; PARAMETER_COUNT],
}

impl SamplerParams {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicFloat::new(DEFINITIONS[i].range.default)),
        }
    }

    /// Set a parameter, clamped into its range. Returns the stored value.
    pub fn set(&self, id: ParameterId, value: f32) -> f32 {
        let clamped = id.range().clamp(value);
        self.values[id.index()].set(clamped);
        clamped
    }

    #[inline]
    pub fn get(&self, id: ParameterId) -> f32 {
        self.values[id.index()].get()
    }

    pub fn set_flag(&self, id: ParameterId, on: bool) {
        self.set(id, if on { 1.0 } else { 0.0 });
    }

    #[inline]
    pub fn flag(&self, id: ParameterId) -> bool {
        self.get(id) >= 0.5
    }

    /// Set from a normalized 0..1 control value.
    pub fn set_normalized(&self, id: ParameterId, normalized: f32) -> f32 {
        self.set(id, id.range().denormalize(normalized))
    }

    pub fn get_normalized(&self, id: ParameterId) -> f32 {
        id.range().normalize(self.get(id))
    }

    /// Restore every default.
    pub fn reset(&self) {
        for def in &DEFINITIONS {
            self.values[def.id.index()].set(def.range.default);
        }
    }

    /// Copy every value for one render block.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            values: std::array::from_fn(|i| self.values[i].get()),
        }
    }
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self::new()
    }
}
