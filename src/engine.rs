//! Control/render handle pair.
//!
//! [`SamplerHandle`] lives on the control thread: it loads samples,
//! publishes key maps, edits parameters and queues note events.
//! [`SamplerProcessor`] lives in the audio callback: it drains queued
//! events and renders blocks. They share a [`SamplerShared`] and a
//! lock-free SPSC command queue; neither side ever takes a lock.

use crate::{Error, Result};
use polysampler_core::{
    BlockLfo, CoreSampler, EnvelopeParameterSets, EnvelopeParameters, EnvelopeStage,
    EnvelopeTarget, KeyMapStrategy, ParameterId, SampleDataDescriptor, SampleRegion,
    SampleRepository, SamplerCommand, SamplerParams, SamplerShared, SamplerVoice, SustainLogic,
    SustainPedalLogic, WavetableLfo,
};
use ringbuf::{
    traits::{Consumer, Observer, Producer},
    HeapCons, HeapProd,
};
use std::sync::Arc;

/// Busy-spins before yielding while waiting for the render side.
const SPINS_BEFORE_YIELD: u32 = 64;

/// Control-context half of a sampler.
pub struct SamplerHandle {
    repository: SampleRepository,
    shared: Arc<SamplerShared>,
    commands: HeapProd<SamplerCommand>,
    /// Control-side copy of the envelope durations, kept in step with the
    /// commands sent to the render side
    envelopes: EnvelopeParameterSets,
}

impl SamplerHandle {
    pub(crate) fn new(
        repository: SampleRepository,
        shared: Arc<SamplerShared>,
        commands: HeapProd<SamplerCommand>,
        envelopes: EnvelopeParameterSets,
    ) -> Self {
        Self {
            repository,
            shared,
            commands,
            envelopes,
        }
    }

    // =========================================================================
    // Samples and key mapping
    // =========================================================================

    /// Load one region. Call a key-map build once all regions are loaded.
    pub fn load_sample(&mut self, sdd: &SampleDataDescriptor<'_>) -> Result<Arc<SampleRegion>> {
        Ok(self.repository.load(sdd)?)
    }

    /// Invalidate the key map and release every region.
    ///
    /// Voices still playing keep their regions alive; call
    /// [`stop_all_voices`](Self::stop_all_voices) first to release them
    /// on this thread.
    pub fn unload_all_samples(&mut self) {
        self.repository.unload_all();
    }

    /// Map notes by key range.
    pub fn build_key_map(&mut self) {
        self.repository.build_key_map();
    }

    /// Map notes to the nearest-pitched region(s).
    pub fn build_simple_key_map(&mut self) {
        self.repository.build_simple_key_map();
    }

    pub fn key_map_strategy(&self) -> Option<KeyMapStrategy> {
        self.repository.strategy()
    }

    pub fn regions(&self) -> &[Arc<SampleRegion>] {
        self.repository.regions()
    }

    /// Retune one note. Applies to subsequent note-ons.
    pub fn set_note_frequency(&mut self, note: u8, frequency: f32) {
        self.repository.set_note_frequency(note, frequency);
    }

    pub fn note_frequency(&self, note: u8) -> f32 {
        self.shared.tuning().frequency(note)
    }

    // =========================================================================
    // Note events
    // =========================================================================

    /// Queue a command for the render context.
    pub fn send(&mut self, command: SamplerCommand) -> Result<()> {
        self.commands.try_push(command).map_err(|dropped| {
            tracing::warn!(command = ?dropped, "Sampler command queue full, dropping command");
            Error::CommandQueueFull
        })
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> Result<()> {
        self.send(SamplerCommand::NoteOn { note, velocity })
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        self.send(SamplerCommand::NoteOff {
            note,
            immediate: false,
        })
    }

    /// Stop a note without release and regardless of the pedal.
    pub fn note_off_immediate(&mut self, note: u8) -> Result<()> {
        self.send(SamplerCommand::NoteOff {
            note,
            immediate: true,
        })
    }

    pub fn sustain_pedal(&mut self, down: bool) -> Result<()> {
        self.send(SamplerCommand::SustainPedal { down })
    }

    /// Silence every voice at the next block, without waiting.
    pub fn silence(&mut self) -> Result<()> {
        self.send(SamplerCommand::AllSoundOff)
    }

    /// Queue a raw MIDI message. Returns `Ok(false)` for messages the
    /// sampler ignores.
    pub fn send_midi(&mut self, bytes: &[u8]) -> Result<bool> {
        match SamplerCommand::from_midi_bytes(bytes) {
            Some(command) => self.send(command).map(|_| true),
            None => Ok(false),
        }
    }

    /// Commands queued but not yet applied by the render side.
    pub fn pending_commands(&self) -> usize {
        self.commands.occupied_len()
    }

    // =========================================================================
    // Stop-all barrier
    // =========================================================================

    /// Block new note-ons and wait until the render side has stopped every
    /// voice.
    ///
    /// Requires the render side to keep processing blocks; there is no
    /// timeout. Note-ons stay blocked until
    /// [`restart_voices`](Self::restart_voices).
    pub fn stop_all_voices(&self) {
        let ticket = self.shared.begin_stop_all();
        let mut spins = 0u32;
        while !ticket.is_complete(&self.shared) {
            if spins < SPINS_BEFORE_YIELD {
                std::hint::spin_loop();
                spins += 1;
            } else {
                std::thread::yield_now();
            }
        }
        tracing::info!("All voices stopped");
    }

    /// Accept note-ons again after [`stop_all_voices`](Self::stop_all_voices).
    pub fn restart_voices(&self) {
        self.shared.restart_voices();
    }

    pub fn is_stopping_all(&self) -> bool {
        self.shared.is_stopping_all()
    }

    /// Active voices as of the last rendered block.
    pub fn active_voices(&self) -> usize {
        self.shared.active_voices()
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn params(&self) -> &SamplerParams {
        self.shared.params()
    }

    /// Set a scalar parameter; returns the clamped value stored.
    pub fn set_parameter(&self, id: ParameterId, value: f32) -> f32 {
        self.shared.params().set(id, value)
    }

    pub fn parameter(&self, id: ParameterId) -> f32 {
        self.shared.params().get(id)
    }

    pub fn set_monophonic(&self, on: bool) {
        self.shared.params().set_flag(ParameterId::Monophonic, on);
    }

    pub fn set_legato(&self, on: bool) {
        self.shared.params().set_flag(ParameterId::Legato, on);
    }

    /// Change one envelope stage on every voice.
    pub fn set_envelope(
        &mut self,
        target: EnvelopeTarget,
        stage: EnvelopeStage,
        value: f32,
    ) -> Result<()> {
        self.send(SamplerCommand::SetEnvelope {
            target,
            stage,
            value,
        })?;
        self.envelopes.get_mut(target).set(stage, value);
        Ok(())
    }

    /// Envelope values as last sent to the render side, at the control
    /// rate the render side currently runs at.
    pub fn envelope(&self, target: EnvelopeTarget) -> EnvelopeParameters {
        let mut params = *self.envelopes.get(target);
        params.update_sample_rate(self.shared.control_rate());
        params
    }

    pub fn shared(&self) -> &Arc<SamplerShared> {
        &self.shared
    }
}

/// Render-context half of a sampler.
pub struct SamplerProcessor<V, S = SustainPedalLogic, L = WavetableLfo> {
    sampler: CoreSampler<V, S, L>,
    commands: HeapCons<SamplerCommand>,
}

impl<V, S, L> SamplerProcessor<V, S, L>
where
    V: SamplerVoice,
    S: SustainLogic,
    L: BlockLfo,
{
    pub(crate) fn new(sampler: CoreSampler<V, S, L>, commands: HeapCons<SamplerCommand>) -> Self {
        Self { sampler, commands }
    }

    /// Apply queued commands, then render one block.
    ///
    /// RT-safe.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        while let Some(command) = self.commands.try_pop() {
            self.sampler.apply(command);
        }
        self.sampler.render(left, right);
    }

    /// Re-initialize for a new output sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        Ok(self.sampler.init(sample_rate)?)
    }

    pub fn sampler(&self) -> &CoreSampler<V, S, L> {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut CoreSampler<V, S, L> {
        &mut self.sampler
    }
}
