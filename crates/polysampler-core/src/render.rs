//! Block render pipeline.
//!
//! Host blocks are split into [`CHUNK_SIZE`]-frame control steps; the LFO
//! and the voices' `prepare_block` run once per step.

use crate::lfo::BlockLfo;
use crate::params::ParameterId;
use crate::pedal::SustainLogic;
use crate::sampler::{CoreSampler, CHUNK_SIZE};
use crate::voice::{BlockParams, SamplerVoice};

/// Decibels to linear gain.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Linear pan law: the opposite side is attenuated, the near side stays
/// at unity.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let left = if pan <= 0.0 { 1.0 } else { 1.0 - pan };
    let right = if pan >= 0.0 { 1.0 } else { 1.0 + pan };
    (left, right)
}

impl<V, S, L> CoreSampler<V, S, L>
where
    V: SamplerVoice,
    S: SustainLogic,
    L: BlockLfo,
{
    /// Render one block into `left` / `right`, overwriting them.
    ///
    /// RT-safe: no allocation, no locks, no logging. Renders
    /// `min(left.len(), right.len())` frames, stepping the LFO and every
    /// voice once per [`CHUNK_SIZE`] frames so control-rate state advances
    /// at `sample_rate / CHUNK_SIZE` whatever the host block size.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        left.fill(0.0);
        right.fill(0.0);

        let p = self.shared.params().snapshot();
        self.lfo.set_frequency(p.get(ParameterId::LfoRate));
        let lfo_depth = p.get(ParameterId::LfoDepth);
        let monophonic = p.flag(ParameterId::Monophonic);

        for (left, right) in left
            .chunks_mut(CHUNK_SIZE)
            .zip(right.chunks_mut(CHUNK_SIZE))
        {
            let lfo_value = self.lfo.next_sample() * lfo_depth;

            if self.shared.is_stopping_all() {
                self.voices.stop_all();
                continue;
            }

            let block = BlockParams {
                frames: left.len(),
                envelopes: &self.envelopes,
                master_volume: p.get(ParameterId::MasterVolume),
                pitch_offset: p.get(ParameterId::PitchOffset),
                cutoff_multiple: p.get(ParameterId::CutoffMultiple),
                key_tracking: p.get(ParameterId::KeyTracking),
                cutoff_envelope_strength: p.get(ParameterId::CutoffEnvelopeStrength),
                filter_envelope_velocity_scaling: p
                    .get(ParameterId::FilterEnvelopeVelocityScaling),
                linear_resonance: p.get(ParameterId::LinearResonance),
                pitch_adsr_semitones: p.get(ParameterId::PitchAdsrSemitones),
                voice_vibrato_depth: p.get(ParameterId::VoiceVibratoDepth),
                voice_vibrato_frequency: p.get(ParameterId::VoiceVibratoFrequency),
                glide_rate: p.get(ParameterId::GlideRate),
                filter_enabled: p.flag(ParameterId::FilterEnable),
                lfo_value,
                lfo_target_pitch: p.flag(ParameterId::LfoTargetPitch),
                lfo_target_gain: p.flag(ParameterId::LfoTargetGain),
                lfo_target_filter: p.flag(ParameterId::LfoTargetFilter),
            };

            for index in 0..self.voices.capacity() {
                let slot = &mut self.voices.slots_mut()[index];
                let Some(note) = slot.note() else { continue };

                if slot.voice_mut().prepare_block(&block) {
                    // Finished: force a note-off for its note
                    if monophonic {
                        slot.stop();
                    } else {
                        self.voices.stop_note(note, true, false);
                    }
                } else {
                    slot.voice_mut().render_block(left, right);
                }
            }
        }

        let gain = db_to_linear(p.get(ParameterId::OverallGain));
        let (pan_left, pan_right) = pan_gains(p.get(ParameterId::Pan));
        let (gain_left, gain_right) = (gain * pan_left, gain * pan_right);
        for sample in left.iter_mut() {
            *sample *= gain_left;
        }
        for sample in right.iter_mut() {
            *sample *= gain_right;
        }

        self.shared
            .publish_render_status(self.voices.active_count());
    }
}
