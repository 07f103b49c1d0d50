//! Voice contract and the fixed-size voice pool.
//!
//! The per-voice DSP (sample playback, envelopes, filter, glide) lives
//! behind [`SamplerVoice`]. The pool owns one slot per voice and tracks
//! which note each slot is playing, so allocation decisions never depend
//! on voice internals.
//!
//! All pool methods are RT-safe (no allocations after construction).

use crate::envelope::{EnvelopeParameterSets, EnvelopeParameters, EnvelopeTarget};
use crate::region::SampleRegion;
use std::sync::Arc;

/// Upper bound on simultaneously sounding voices.
pub const MAX_POLYPHONY: usize = 64;

/// Everything a voice needs to begin (or legato-restart) a note.
#[derive(Debug, Clone, Copy)]
pub struct NoteStart<'a> {
    pub note: u8,
    /// Output sample rate (Hz)
    pub sample_rate: f32,
    /// Target pitch after tuning and region detune (Hz)
    pub frequency: f32,
    /// Velocity normalized to 0..1
    pub velocity: f32,
    pub region: &'a Arc<SampleRegion>,
    pub envelopes: &'a EnvelopeParameterSets,
    /// Another key was already held when this note was pressed
    pub another_key_down: bool,
    pub legato: bool,
    /// Glide time in seconds per octave (0 = no glide)
    pub glide_rate: f32,
    pub restart_voice_lfo: bool,
}

/// Per-step settings shared by every voice.
#[derive(Debug, Clone, Copy)]
pub struct BlockParams<'a> {
    /// Frames in this control step, at most [`CHUNK_SIZE`](crate::CHUNK_SIZE)
    pub frames: usize,
    pub envelopes: &'a EnvelopeParameterSets,
    pub master_volume: f32,
    /// Semitones
    pub pitch_offset: f32,
    pub cutoff_multiple: f32,
    pub key_tracking: f32,
    pub cutoff_envelope_strength: f32,
    pub filter_envelope_velocity_scaling: f32,
    pub linear_resonance: f32,
    pub pitch_adsr_semitones: f32,
    pub voice_vibrato_depth: f32,
    pub voice_vibrato_frequency: f32,
    pub glide_rate: f32,
    pub filter_enabled: bool,
    /// Global LFO output already scaled by its depth
    pub lfo_value: f32,
    pub lfo_target_pitch: bool,
    pub lfo_target_gain: bool,
    pub lfo_target_filter: bool,
}

/// Playback voice driven by the sampler.
///
/// The sampler guarantees `prepare_block` and `render_block` are only
/// called between `start` and the block in which `prepare_block` reports
/// completion (or `stop`).
pub trait SamplerVoice: Send {
    /// Called once per sample-rate change.
    fn init(&mut self, sample_rate: f32);

    /// Begin a new note from silence.
    fn start(&mut self, note: &NoteStart<'_>);

    /// Switch a sounding voice to a new note in place (legato/glide).
    fn restart_new_note(&mut self, note: &NoteStart<'_>);

    /// Enter the release phase.
    fn release(&mut self, loop_thru_release: bool);

    /// Silence immediately.
    fn stop(&mut self);

    /// Advance control state by one step of `params.frames` frames.
    /// Returns `true` once the voice has finished and should be stopped
    /// instead of rendered.
    fn prepare_block(&mut self, params: &BlockParams<'_>) -> bool;

    /// Add `left.len()` frames into the output buffers.
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Region gain (dB) applied after `start`.
    fn set_gain(&mut self, gain: f32);

    /// Region pan (-1..1) applied after `start`.
    fn set_pan(&mut self, pan: f32);

    /// Recompute coefficients after a shared envelope changed.
    fn update_envelope(&mut self, target: EnvelopeTarget, params: &EnvelopeParameters);
}

/// Lifecycle of a voice slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    /// Available for allocation
    #[default]
    Idle,
    /// Started and rendering
    Sounding,
    /// Note-off received, still rendering its tail
    Released,
}

/// One voice plus the note bookkeeping the sampler keeps for it.
#[derive(Debug)]
pub struct VoiceSlot<V> {
    voice: V,
    note: Option<u8>,
    state: VoiceState,
}

impl<V: SamplerVoice> VoiceSlot<V> {
    fn new(voice: V) -> Self {
        Self {
            voice,
            note: None,
            state: VoiceState::Idle,
        }
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut V {
        &mut self.voice
    }

    /// Note currently assigned, `None` when idle.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub(crate) fn start(&mut self, note: &NoteStart<'_>) {
        self.voice.start(note);
        self.note = Some(note.note);
        self.state = VoiceState::Sounding;
    }

    pub(crate) fn restart_new_note(&mut self, note: &NoteStart<'_>) {
        self.voice.restart_new_note(note);
        self.note = Some(note.note);
        self.state = VoiceState::Sounding;
    }

    pub(crate) fn release(&mut self, loop_thru_release: bool) {
        if self.state == VoiceState::Sounding {
            self.voice.release(loop_thru_release);
            self.state = VoiceState::Released;
        }
    }

    pub(crate) fn stop(&mut self) {
        self.voice.stop();
        self.note = None;
        self.state = VoiceState::Idle;
    }
}

/// Fixed-capacity voice pool.
#[derive(Debug)]
pub struct VoicePool<V> {
    slots: Box<[VoiceSlot<V>]>,
}

impl<V: SamplerVoice> VoicePool<V> {
    /// Wrap already-constructed voices. Capacity never changes afterwards.
    pub fn new(voices: impl IntoIterator<Item = V>) -> Self {
        Self {
            slots: voices.into_iter().map(VoiceSlot::new).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[VoiceSlot<V>] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [VoiceSlot<V>] {
        &mut self.slots
    }

    /// Index of the first idle slot.
    #[inline]
    pub fn find_idle(&self) -> Option<usize> {
        self.slots.iter().position(VoiceSlot::is_idle)
    }

    /// Number of non-idle slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_idle()).count()
    }

    /// Release or stop every slot playing `note`.
    pub(crate) fn stop_note(&mut self, note: u8, immediate: bool, loop_thru_release: bool) {
        for slot in self.slots.iter_mut().filter(|s| s.note == Some(note)) {
            if immediate {
                slot.stop();
            } else {
                slot.release(loop_thru_release);
            }
        }
    }

    /// Stop every non-idle slot.
    pub(crate) fn stop_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| !s.is_idle()) {
            slot.stop();
        }
    }

    pub(crate) fn init(&mut self, sample_rate: f32, envelopes: &EnvelopeParameterSets) {
        for slot in self.slots.iter_mut() {
            slot.voice.init(sample_rate);
            for target in [
                EnvelopeTarget::Amplitude,
                EnvelopeTarget::Filter,
                EnvelopeTarget::Pitch,
            ] {
                slot.voice.update_envelope(target, envelopes.get(target));
            }
        }
    }

    pub(crate) fn update_envelope(&mut self, target: EnvelopeTarget, params: &EnvelopeParameters) {
        for slot in self.slots.iter_mut() {
            slot.voice.update_envelope(target, params);
        }
    }
}
