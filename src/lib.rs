//! # polysampler - Real-time Polyphonic Sample Playback
//!
//! Decision-and-orchestration core of a sample-playback synthesizer:
//! picks regions for notes, assigns voices, honors the sustain pedal and
//! renders stereo blocks, while control and audio threads cooperate
//! without locks.
//!
//! ## Architecture
//!
//! polysampler is an umbrella crate that coordinates:
//! - **polysampler-core** - Regions, key maps, voice pool, render pipeline
//! - [`SamplerHandle`] - Control thread: loading, key maps, parameters, note events
//! - [`SamplerProcessor`] - Audio callback: drains events, renders blocks
//!
//! The per-voice DSP is yours: implement [`SamplerVoice`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use polysampler::prelude::*;
//!
//! let (mut handle, mut processor) = SamplerBuilder::new()
//!     .sample_rate(44100.0)
//!     .build(|_| MyVoice::new())?;
//!
//! handle.load_sample(&SampleDataDescriptor {
//!     descriptor: SampleDescriptor { note_number: 60, ..Default::default() },
//!     sample_rate: 44100.0,
//!     channel_count: 1,
//!     frame_count: pcm.len(),
//!     is_interleaved: false,
//!     data: &pcm,
//! })?;
//! handle.build_simple_key_map();
//! handle.note_on(60, 100)?;
//!
//! // In the audio callback
//! processor.process(&mut left, &mut right);
//! ```

mod builder;
mod engine;
mod error;

/// Re-export of polysampler-core for direct access
pub use polysampler_core as core;

pub use builder::{SamplerBuilder, SamplerConfig, DEFAULT_COMMAND_CAPACITY};
pub use engine::{SamplerHandle, SamplerProcessor};
pub use error::{Error, Result};

pub use polysampler_core::{
    // Voice contract
    BlockLfo,
    BlockParams,
    // Render core
    CoreSampler,
    // Envelopes
    EnvelopeParameterSets,
    EnvelopeParameters,
    EnvelopeStage,
    EnvelopeTarget,
    // Key mapping
    KeyMap,
    KeyMapStrategy,
    LfoShape,
    NoteStart,
    // Parameters
    ParameterDef,
    ParameterId,
    ParameterRange,
    // Samples
    SampleDataDescriptor,
    SampleDescriptor,
    SampleRegion,
    SampleRepository,
    SamplerCommand,
    SamplerParams,
    SamplerShared,
    SamplerVoice,
    SustainLogic,
    SustainPedalLogic,
    TuningTable,
    VoiceSlot,
    VoiceState,
    WavetableLfo,
    CHUNK_SIZE,
    MAX_POLYPHONY,
};

/// Common imports.
pub mod prelude {
    pub use crate::{
        EnvelopeStage, EnvelopeTarget, KeyMapStrategy, ParameterId, SampleDataDescriptor,
        SampleDescriptor, SamplerBuilder, SamplerCommand, SamplerHandle, SamplerProcessor,
        SamplerVoice, MAX_POLYPHONY,
    };
    pub use crate::{BlockParams, NoteStart};
    pub use crate::{Error, Result};
}
