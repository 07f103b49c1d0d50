//! Events delivered to the render context.

use crate::envelope::{EnvelopeStage, EnvelopeTarget};

/// MIDI CC number of the sustain (damper) pedal.
pub const CC_SUSTAIN: u8 = 64;

/// MIDI CC number of "all sound off".
pub const CC_ALL_SOUND_OFF: u8 = 123;

/// One event for [`CoreSampler::apply`](crate::CoreSampler::apply).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerCommand {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, immediate: bool },
    SustainPedal { down: bool },
    /// Stop every voice at once, from inside the render context
    AllSoundOff,
    SetEnvelope {
        target: EnvelopeTarget,
        stage: EnvelopeStage,
        value: f32,
    },
}

impl SamplerCommand {
    /// Decode a MIDI channel message (any channel).
    ///
    /// Handles note-on (velocity 0 is a note-off), note-off, CC 64 and
    /// CC 123. Everything else returns `None`.
    pub fn from_midi(status: u8, data1: u8, data2: u8) -> Option<Self> {
        let data1 = data1 & 0x7F;
        let data2 = data2 & 0x7F;
        match status & 0xF0 {
            0x90 if data2 > 0 => Some(Self::NoteOn {
                note: data1,
                velocity: data2,
            }),
            0x80 | 0x90 => Some(Self::NoteOff {
                note: data1,
                immediate: false,
            }),
            0xB0 => match data1 {
                CC_SUSTAIN => Some(Self::SustainPedal { down: data2 >= 64 }),
                CC_ALL_SOUND_OFF => Some(Self::AllSoundOff),
                _ => None,
            },
            _ => None,
        }
    }

    /// Decode a raw MIDI message slice of at least three bytes.
    pub fn from_midi_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [status, data1, data2, ..] => Self::from_midi(*status, *data1, *data2),
            _ => None,
        }
    }
}
