//! Render-side sampler: note dispatch over the voice pool.
//!
//! `CoreSampler` is owned by the render context. It reads the key map,
//! tuning and scalar parameters from [`SamplerShared`] and owns everything
//! else it touches (voices, pedal state, LFO, envelope sets), so every
//! method here is RT-safe.

use crate::command::SamplerCommand;
use crate::envelope::{EnvelopeParameterSets, EnvelopeStage, EnvelopeTarget};
use crate::error::{Error, Result};
use crate::lfo::{BlockLfo, WavetableLfo};
use crate::params::ParameterId;
use crate::pedal::{SustainLogic, SustainPedalLogic};
use crate::shared::SamplerShared;
use crate::tuning::{cents_to_ratio, NOTE_COUNT};
use crate::voice::{NoteStart, SamplerVoice, VoicePool, VoiceSlot, MAX_POLYPHONY};
use std::sync::Arc;

/// Frames per control-rate step. Envelopes and the global LFO run at
/// `sample_rate / CHUNK_SIZE`.
pub const CHUNK_SIZE: usize = 16;

/// Sample rate used until [`CoreSampler::init`] is called.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Polyphonic sample-playback core.
pub struct CoreSampler<V, S = SustainPedalLogic, L = WavetableLfo> {
    pub(crate) shared: Arc<SamplerShared>,
    pub(crate) voices: VoicePool<V>,
    pub(crate) pedal: S,
    pub(crate) lfo: L,
    pub(crate) envelopes: EnvelopeParameterSets,
    sample_rate: f32,
    last_played_note: Option<u8>,
}

impl<V: SamplerVoice> CoreSampler<V> {
    /// Create a sampler with the default pedal logic and a sine LFO.
    pub fn new(shared: Arc<SamplerShared>, voices: impl IntoIterator<Item = V>) -> Result<Self> {
        Self::with_collaborators(
            shared,
            voices,
            SustainPedalLogic::new(),
            WavetableLfo::default(),
        )
    }
}

impl<V, S, L> CoreSampler<V, S, L>
where
    V: SamplerVoice,
    S: SustainLogic,
    L: BlockLfo,
{
    /// Create a sampler with custom pedal logic and LFO.
    ///
    /// Accepts between 1 and [`MAX_POLYPHONY`] voices.
    pub fn with_collaborators(
        shared: Arc<SamplerShared>,
        voices: impl IntoIterator<Item = V>,
        pedal: S,
        lfo: L,
    ) -> Result<Self> {
        let voices = VoicePool::new(voices);
        if voices.capacity() == 0 || voices.capacity() > MAX_POLYPHONY {
            return Err(Error::InvalidConfig(format!(
                "polyphony must be 1..={}, got {}",
                MAX_POLYPHONY,
                voices.capacity()
            )));
        }

        let control_rate = (DEFAULT_SAMPLE_RATE / CHUNK_SIZE as f64) as f32;
        let mut sampler = Self {
            shared,
            voices,
            pedal,
            lfo,
            envelopes: EnvelopeParameterSets::new(control_rate),
            sample_rate: DEFAULT_SAMPLE_RATE as f32,
            last_played_note: None,
        };
        sampler.init(DEFAULT_SAMPLE_RATE)?;
        Ok(sampler)
    }

    /// Prepare for a (new) output sample rate. Re-initializes every voice.
    pub fn init(&mut self, sample_rate: f64) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate as f32;
        let control_rate = (sample_rate / CHUNK_SIZE as f64) as f32;

        self.envelopes.update_sample_rate(control_rate);
        self.shared.set_control_rate(control_rate);
        self.lfo
            .init(control_rate, self.shared.params().get(ParameterId::LfoRate));
        self.voices.init(self.sample_rate, &self.envelopes);
        Ok(())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn shared(&self) -> &Arc<SamplerShared> {
        &self.shared
    }

    /// Voice slots, in allocation order.
    pub fn voices(&self) -> &[VoiceSlot<V>] {
        self.voices.slots()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_count()
    }

    pub fn pedal(&self) -> &S {
        &self.pedal
    }

    pub fn envelopes(&self) -> &EnvelopeParameterSets {
        &self.envelopes
    }

    /// Most recent note started in monophonic mode.
    pub fn last_played_note(&self) -> Option<u8> {
        self.last_played_note
    }

    /// Dispatch one command.
    pub fn apply(&mut self, command: SamplerCommand) {
        match command {
            SamplerCommand::NoteOn { note, velocity } => self.play_note(note, velocity),
            SamplerCommand::NoteOff { note, immediate } => self.stop_note(note, immediate),
            SamplerCommand::SustainPedal { down } => self.sustain_pedal(down),
            SamplerCommand::AllSoundOff => self.all_sound_off(),
            SamplerCommand::SetEnvelope {
                target,
                stage,
                value,
            } => self.set_envelope(target, stage, value),
        }
    }

    /// Key pressed.
    pub fn play_note(&mut self, note: u8, velocity: u8) {
        if note as usize >= NOTE_COUNT {
            return;
        }
        let another_key_down = self.pedal.is_any_key_down();
        self.pedal.key_down_action(note);
        self.play(note, velocity.min(127), another_key_down);
    }

    /// Key released. `immediate` bypasses the pedal and the release phase.
    pub fn stop_note(&mut self, note: u8, immediate: bool) {
        if note as usize >= NOTE_COUNT {
            return;
        }
        if immediate || self.pedal.key_up_action(note) {
            self.stop(note, immediate);
        }
    }

    /// Sustain pedal moved. Pedal-up releases every note that is only
    /// sounding because the pedal held it.
    pub fn sustain_pedal(&mut self, down: bool) {
        if down {
            self.pedal.pedal_down();
            return;
        }
        for note in 0..NOTE_COUNT as u8 {
            if self.pedal.is_note_sustaining(note) {
                self.stop(note, false);
            }
        }
        self.pedal.pedal_up();
    }

    /// Silence every voice now.
    pub fn all_sound_off(&mut self) {
        self.voices.stop_all();
    }

    /// Change one envelope stage and notify every voice.
    pub fn set_envelope(&mut self, target: EnvelopeTarget, stage: EnvelopeStage, value: f32) {
        let params = self.envelopes.get_mut(target);
        params.set(stage, value);
        self.voices.update_envelope(target, params);
    }

    fn play(&mut self, note: u8, velocity: u8, another_key_down: bool) {
        if self.shared.is_stopping_all() {
            return;
        }

        let key_map = self.shared.key_map();
        if !key_map.is_valid() {
            return;
        }

        let params = self.shared.params();
        let monophonic = params.flag(ParameterId::Monophonic);
        let legato = params.flag(ParameterId::Legato);
        let glide_rate = params.get(ParameterId::GlideRate);
        let restart_voice_lfo = params.flag(ParameterId::RestartVoiceLfo);
        let tuned = self.shared.tuning().frequency(note);
        let normalized_velocity = velocity as f32 / 127.0;

        if monophonic {
            let Some(region) = key_map.lookup_first(note, velocity) else {
                return;
            };
            let start = NoteStart {
                note,
                sample_rate: self.sample_rate,
                frequency: tuned * cents_to_ratio(region.note_detune()),
                velocity: normalized_velocity,
                region,
                envelopes: &self.envelopes,
                another_key_down,
                legato,
                glide_rate,
                restart_voice_lfo,
            };

            let slot = &mut self.voices.slots_mut()[0];
            if slot.note().is_some() {
                slot.restart_new_note(&start);
            } else {
                slot.start(&start);
            }
            slot.voice_mut().set_gain(region.gain());
            slot.voice_mut().set_pan(region.pan());
            self.last_played_note = Some(note);
            return;
        }

        for region in key_map.lookup(note, velocity) {
            let Some(index) = self.voices.find_idle() else {
                // Pool exhausted: remaining regions are dropped too
                break;
            };
            let start = NoteStart {
                note,
                sample_rate: self.sample_rate,
                frequency: tuned * cents_to_ratio(region.note_detune()),
                velocity: normalized_velocity,
                region,
                envelopes: &self.envelopes,
                another_key_down,
                legato,
                glide_rate,
                restart_voice_lfo,
            };

            let slot = &mut self.voices.slots_mut()[index];
            slot.start(&start);
            slot.voice_mut().set_gain(region.gain());
            slot.voice_mut().set_pan(region.pan());
        }
    }

    pub(crate) fn stop(&mut self, note: u8, immediate: bool) {
        let loop_thru_release = self.shared.params().flag(ParameterId::LoopThruRelease);

        if self.shared.params().flag(ParameterId::Monophonic) {
            let slot = &mut self.voices.slots_mut()[0];
            if slot.note() == Some(note) {
                if immediate {
                    slot.stop();
                } else {
                    slot.release(loop_thru_release);
                }
            }
        } else {
            self.voices.stop_note(note, immediate, loop_thru_release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::SampleDescriptor;
    use crate::repository::SampleRepository;
    use crate::test_support::{data_descriptor, ProbeVoice};
    use crate::tuning::note_to_hz;
    use crate::voice::VoiceState;
    use approx::assert_relative_eq;

    fn setup(polyphony: usize) -> (SampleRepository, CoreSampler<ProbeVoice>) {
        let shared = Arc::new(SamplerShared::new());
        let repo = SampleRepository::new(Arc::clone(&shared));
        let sampler =
            CoreSampler::new(shared, (0..polyphony).map(|_| ProbeVoice::default())).unwrap();
        (repo, sampler)
    }

    fn load(repo: &mut SampleRepository, descriptor: SampleDescriptor) {
        repo.load(&data_descriptor(descriptor, &[0.0; 32])).unwrap();
    }

    fn sounding(sampler: &CoreSampler<ProbeVoice>) -> Vec<u8> {
        sampler.voices().iter().filter_map(|s| s.note()).collect()
    }

    #[test]
    fn test_rejects_bad_polyphony_and_sample_rate() {
        let shared = Arc::new(SamplerShared::new());
        assert!(matches!(
            CoreSampler::new(Arc::clone(&shared), Vec::<ProbeVoice>::new()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(CoreSampler::new(
            Arc::clone(&shared),
            (0..MAX_POLYPHONY + 1).map(|_| ProbeVoice::default())
        )
        .is_err());

        let mut sampler = CoreSampler::new(shared, [ProbeVoice::default()]).unwrap();
        assert_eq!(sampler.init(0.0), Err(Error::InvalidSampleRate(0.0)));
        assert!(sampler.init(f64::NAN).is_err());
        assert!(sampler.init(48000.0).is_ok());
        assert_eq!(sampler.voices()[0].voice().sample_rate, 48000.0);
        assert_relative_eq!(sampler.envelopes().amplitude.control_rate(), 3000.0);
        assert_relative_eq!(sampler.shared().control_rate(), 3000.0);
    }

    #[test]
    fn test_poly_note_on_applies_detune_velocity_gain_pan() {
        let (mut repo, mut sampler) = setup(4);
        load(
            &mut repo,
            SampleDescriptor {
                note_number: 60,
                note_detune: 100.0,
                gain: -6.0,
                pan: 0.25,
                ..Default::default()
            },
        );
        repo.build_key_map();

        sampler.play_note(60, 127);
        let slot = &sampler.voices()[0];
        assert_eq!(slot.state(), VoiceState::Sounding);
        let start = slot.voice().last_start.unwrap();
        assert_eq!(start.note, 60);
        assert_relative_eq!(start.frequency, note_to_hz(61), epsilon = 0.01);
        assert_relative_eq!(start.velocity, 1.0);
        assert_eq!(slot.voice().gain, -6.0);
        assert_eq!(slot.voice().pan, 0.25);
    }

    #[test]
    fn test_note_on_without_valid_map_is_noop() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        // Loaded but never mapped
        sampler.play_note(60, 100);
        assert_eq!(sampler.active_voice_count(), 0);
    }

    #[test]
    fn test_velocity_layers_trigger_one_voice_each() {
        let (mut repo, mut sampler) = setup(8);
        load(
            &mut repo,
            SampleDescriptor {
                min_velocity: 0,
                max_velocity: 127,
                ..Default::default()
            },
        );
        load(
            &mut repo,
            SampleDescriptor {
                min_velocity: 100,
                max_velocity: 127,
                ..Default::default()
            },
        );
        repo.build_key_map();

        sampler.play_note(60, 50);
        assert_eq!(sampler.active_voice_count(), 1);
        sampler.play_note(62, 110);
        assert_eq!(sampler.active_voice_count(), 3);
    }

    #[test]
    fn test_poly_exhaustion_drops_note() {
        let (mut repo, mut sampler) = setup(MAX_POLYPHONY);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        for note in 0..MAX_POLYPHONY as u8 {
            sampler.play_note(note, 100);
        }
        assert_eq!(sampler.active_voice_count(), MAX_POLYPHONY);

        let before: Vec<_> = sampler.voices().iter().map(|s| s.voice().starts).collect();
        sampler.play_note(100, 100);
        let after: Vec<_> = sampler.voices().iter().map(|s| s.voice().starts).collect();
        assert_eq!(before, after);
        assert!(!sounding(&sampler).contains(&100));
    }

    #[test]
    fn test_mono_legato_reuses_slot_zero() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();
        sampler.shared().params().set_flag(ParameterId::Monophonic, true);
        sampler.shared().params().set_flag(ParameterId::Legato, true);

        sampler.play_note(60, 100);
        sampler.play_note(64, 100);

        let slot = &sampler.voices()[0];
        assert_eq!(slot.voice().starts, 1);
        assert_eq!(slot.voice().restarts, 1);
        assert_eq!(slot.note(), Some(64));
        let start = slot.voice().last_start.unwrap();
        assert!(start.another_key_down);
        assert!(start.legato);
        assert_eq!(sampler.active_voice_count(), 1);
        assert_eq!(sampler.last_played_note(), Some(64));
    }

    #[test]
    fn test_mono_note_off_only_matches_current_note() {
        let (mut repo, mut sampler) = setup(2);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();
        sampler.shared().params().set_flag(ParameterId::Monophonic, true);

        sampler.play_note(60, 100);
        sampler.play_note(64, 100);
        sampler.stop_note(60, false);
        assert_eq!(sampler.voices()[0].state(), VoiceState::Sounding);

        sampler.stop_note(64, false);
        assert_eq!(sampler.voices()[0].state(), VoiceState::Released);
    }

    #[test]
    fn test_note_off_release_versus_immediate() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();
        sampler
            .shared()
            .params()
            .set_flag(ParameterId::LoopThruRelease, true);

        sampler.play_note(60, 100);
        sampler.stop_note(60, false);
        let slot = &sampler.voices()[0];
        assert_eq!(slot.state(), VoiceState::Released);
        assert!(slot.voice().last_loop_thru_release);

        sampler.play_note(62, 100);
        sampler.stop_note(62, true);
        assert!(sampler.voices()[1].is_idle());
        assert_eq!(sampler.voices()[1].voice().stops, 1);
    }

    #[test]
    fn test_sustain_pedal_defers_note_off() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        sampler.sustain_pedal(true);
        sampler.play_note(60, 100);
        sampler.stop_note(60, false);
        assert_eq!(sampler.voices()[0].state(), VoiceState::Sounding);
        assert!(sampler.pedal().is_note_sustaining(60));

        sampler.sustain_pedal(false);
        assert_eq!(sampler.voices()[0].state(), VoiceState::Released);
    }

    #[test]
    fn test_repressed_note_survives_pedal_up() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        sampler.sustain_pedal(true);
        sampler.play_note(60, 100);
        sampler.stop_note(60, false);
        sampler.play_note(60, 100);
        sampler.sustain_pedal(false);

        assert!(sampler
            .voices()
            .iter()
            .filter(|s| s.note() == Some(60))
            .all(|s| s.state() == VoiceState::Sounding));
    }

    #[test]
    fn test_immediate_stop_bypasses_pedal() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        sampler.sustain_pedal(true);
        sampler.play_note(60, 100);
        sampler.stop_note(60, true);
        assert!(sampler.voices()[0].is_idle());
    }

    #[test]
    fn test_stop_all_gate_blocks_note_on() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        let _ticket = sampler.shared().begin_stop_all();
        sampler.play_note(60, 100);
        assert_eq!(sampler.active_voice_count(), 0);

        sampler.shared().restart_voices();
        sampler.play_note(60, 100);
        assert_eq!(sampler.active_voice_count(), 1);
    }

    #[test]
    fn test_set_envelope_notifies_every_voice() {
        let (_repo, mut sampler) = setup(3);
        let before = sampler.voices()[0].voice().envelope_updates;

        sampler.set_envelope(EnvelopeTarget::Amplitude, EnvelopeStage::Attack, 0.25);
        assert_eq!(sampler.envelopes().amplitude.attack_seconds, 0.25);
        for slot in sampler.voices() {
            assert_eq!(slot.voice().envelope_updates, before + 1);
            assert_eq!(slot.voice().last_amp_attack, 0.25);
        }
    }

    #[test]
    fn test_apply_dispatches_commands() {
        let (mut repo, mut sampler) = setup(4);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();

        sampler.apply(SamplerCommand::NoteOn {
            note: 60,
            velocity: 90,
        });
        sampler.apply(SamplerCommand::NoteOn {
            note: 64,
            velocity: 90,
        });
        assert_eq!(sampler.active_voice_count(), 2);

        sampler.apply(SamplerCommand::AllSoundOff);
        assert_eq!(sampler.active_voice_count(), 0);

        sampler.apply(SamplerCommand::SetEnvelope {
            target: EnvelopeTarget::Filter,
            stage: EnvelopeStage::Sustain,
            value: 0.5,
        });
        assert_eq!(sampler.envelopes().filter.sustain_fraction, 0.5);
    }

    #[test]
    fn test_retuned_note_plays_new_frequency() {
        let (mut repo, mut sampler) = setup(2);
        load(&mut repo, SampleDescriptor::default());
        repo.build_key_map();
        repo.set_note_frequency(60, 250.0);

        sampler.play_note(60, 100);
        let start = sampler.voices()[0].voice().last_start.unwrap();
        assert_relative_eq!(start.frequency, 250.0);
    }
}
