//! Real-time kernel for polysampler.
//!
//! Decides which sample regions sound for which notes, assigns voices, and
//! renders stereo blocks. The per-voice DSP is supplied by the caller
//! through [`SamplerVoice`].
//!
//! The crate splits state by context:
//! - [`SampleRepository`] (control): loads regions, builds and publishes key maps
//! - [`CoreSampler`] (render): note dispatch, sustain pedal, block rendering
//! - [`SamplerShared`]: lock-free state both sides read (parameters, tuning,
//!   the published key map, the stop-all gate)
//!
//! Everything reachable from [`CoreSampler`] is RT-safe.
//!
//! # Example
//!
//! ```ignore
//! use polysampler_core::*;
//! use std::sync::Arc;
//!
//! let shared = Arc::new(SamplerShared::new());
//! let mut repo = SampleRepository::new(Arc::clone(&shared));
//! repo.load(&SampleDataDescriptor { /* ... */ })?;
//! repo.build_key_map();
//!
//! let mut sampler = CoreSampler::new(shared, (0..MAX_POLYPHONY).map(|_| MyVoice::new()))?;
//! sampler.play_note(60, 100);
//! sampler.render(&mut left, &mut right);
//! ```

pub mod command;
pub mod envelope;
pub mod error;
pub mod key_map;
pub mod lfo;
pub mod lockfree;
pub mod params;
pub mod pedal;
pub mod region;
pub mod render;
pub mod repository;
pub mod sampler;
pub mod shared;
pub mod tuning;
pub mod voice;

#[cfg(test)]
mod test_support;

pub use command::SamplerCommand;
pub use envelope::{EnvelopeParameterSets, EnvelopeParameters, EnvelopeStage, EnvelopeTarget};
pub use error::{Error, Result};
pub use key_map::{KeyMap, KeyMapStrategy, RegionList};
pub use lfo::{BlockLfo, LfoShape, WavetableLfo};
pub use lockfree::AtomicFloat;
pub use params::{
    ParamSnapshot, ParameterDef, ParameterId, ParameterRange, ParameterScale, SamplerParams,
};
pub use pedal::{SustainLogic, SustainPedalLogic};
pub use region::{SampleDataDescriptor, SampleDescriptor, SampleRegion};
pub use render::{db_to_linear, pan_gains};
pub use repository::SampleRepository;
pub use sampler::{CoreSampler, CHUNK_SIZE, DEFAULT_SAMPLE_RATE};
pub use shared::{SamplerShared, StopAllTicket};
pub use tuning::{note_to_hz, TuningTable};
pub use voice::{
    BlockParams, NoteStart, SamplerVoice, VoicePool, VoiceSlot, VoiceState, MAX_POLYPHONY,
};
