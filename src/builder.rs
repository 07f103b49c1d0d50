//! Builder for configuring and constructing a sampler handle pair.

use crate::engine::{SamplerHandle, SamplerProcessor};
use crate::{Error, Result};
use polysampler_core::{
    BlockLfo, CoreSampler, SampleRepository, SamplerShared, SamplerVoice, SustainLogic,
    SustainPedalLogic, WavetableLfo, DEFAULT_SAMPLE_RATE, MAX_POLYPHONY,
};
use ringbuf::{traits::Split, HeapRb};
use std::sync::Arc;

/// Default capacity of the control → render command queue.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;

/// Sampler construction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Output sample rate (Hz)
    pub sample_rate: f64,
    /// Number of voices (1..=64)
    pub polyphony: usize,
    /// Commands buffered between two render blocks
    pub command_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            polyphony: MAX_POLYPHONY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

/// Fluent constructor for [`SamplerHandle`] / [`SamplerProcessor`].
///
/// # Example
///
/// ```ignore
/// use polysampler::prelude::*;
///
/// let (mut handle, mut processor) = SamplerBuilder::new()
///     .sample_rate(48000.0)
///     .polyphony(32)
///     .build(|_| MyVoice::new())?;
///
/// // Control thread
/// handle.load_sample(&descriptor)?;
/// handle.build_key_map();
/// handle.note_on(60, 100)?;
///
/// // Audio callback
/// processor.process(&mut left, &mut right);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SamplerBuilder {
    config: SamplerConfig,
}

impl SamplerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    pub fn polyphony(mut self, voices: usize) -> Self {
        self.config.polyphony = voices;
        self
    }

    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.config.command_capacity = capacity;
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Build with the default pedal logic and sine LFO.
    ///
    /// `voice_factory` is called once per voice index.
    pub fn build<V, F>(self, voice_factory: F) -> Result<(SamplerHandle, SamplerProcessor<V>)>
    where
        V: SamplerVoice,
        F: FnMut(usize) -> V,
    {
        self.build_with(voice_factory, SustainPedalLogic::new(), WavetableLfo::default())
    }

    /// Build with custom sustain logic and LFO.
    pub fn build_with<V, S, L, F>(
        self,
        voice_factory: F,
        pedal: S,
        lfo: L,
    ) -> Result<(SamplerHandle, SamplerProcessor<V, S, L>)>
    where
        V: SamplerVoice,
        S: SustainLogic,
        L: BlockLfo,
        F: FnMut(usize) -> V,
    {
        let config = self.config;
        if config.command_capacity == 0 {
            return Err(Error::Core(polysampler_core::Error::InvalidConfig(
                "command_capacity must be > 0".to_string(),
            )));
        }

        let shared = Arc::new(SamplerShared::new());
        let voices = (0..config.polyphony).map(voice_factory);
        let mut sampler = CoreSampler::with_collaborators(Arc::clone(&shared), voices, pedal, lfo)?;
        sampler.init(config.sample_rate)?;

        let (producer, consumer) = HeapRb::new(config.command_capacity).split();

        tracing::info!(
            sample_rate = config.sample_rate,
            polyphony = config.polyphony,
            command_capacity = config.command_capacity,
            "Sampler built"
        );

        let handle = SamplerHandle::new(
            SampleRepository::new(Arc::clone(&shared)),
            shared,
            producer,
            sampler.envelopes().clone(),
        );
        let processor = SamplerProcessor::new(sampler, consumer);
        Ok((handle, processor))
    }
}
