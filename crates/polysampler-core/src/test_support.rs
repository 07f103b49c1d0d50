//! Test doubles shared by the unit tests.

use crate::envelope::{EnvelopeParameters, EnvelopeTarget};
use crate::region::{SampleDataDescriptor, SampleDescriptor, SampleRegion};
use crate::voice::{BlockParams, NoteStart, SamplerVoice};
use std::sync::Arc;

/// What a voice was last started with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartRecord {
    pub note: u8,
    pub frequency: f32,
    pub velocity: f32,
    pub region_note: u8,
    pub another_key_down: bool,
    pub legato: bool,
}

/// Voice that records every call and writes a constant level.
#[derive(Debug, Clone)]
pub struct ProbeVoice {
    pub sample_rate: f32,
    pub starts: u32,
    pub restarts: u32,
    pub releases: u32,
    pub stops: u32,
    pub last_start: Option<StartRecord>,
    pub last_loop_thru_release: bool,
    pub gain: f32,
    pub pan: f32,
    pub envelope_updates: u32,
    pub last_amp_attack: f32,
    pub blocks_prepared: u32,
    pub last_lfo_value: f32,
    pub last_master_volume: f32,
    /// Control steps after release before reporting finished
    pub release_tail_blocks: u32,
    blocks_since_release: Option<u32>,
    /// Added to every output sample
    pub level: f32,
}

impl Default for ProbeVoice {
    fn default() -> Self {
        Self {
            sample_rate: 0.0,
            starts: 0,
            restarts: 0,
            releases: 0,
            stops: 0,
            last_start: None,
            last_loop_thru_release: false,
            gain: 0.0,
            pan: 0.0,
            envelope_updates: 0,
            last_amp_attack: 0.0,
            blocks_prepared: 0,
            last_lfo_value: 0.0,
            last_master_volume: 0.0,
            release_tail_blocks: 1,
            blocks_since_release: None,
            level: 0.5,
        }
    }
}

impl ProbeVoice {
    fn record(&mut self, note: &NoteStart<'_>) {
        self.blocks_since_release = None;
        self.last_start = Some(StartRecord {
            note: note.note,
            frequency: note.frequency,
            velocity: note.velocity,
            region_note: note.region.note_number(),
            another_key_down: note.another_key_down,
            legato: note.legato,
        });
    }
}

impl SamplerVoice for ProbeVoice {
    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn start(&mut self, note: &NoteStart<'_>) {
        self.starts += 1;
        self.record(note);
    }

    fn restart_new_note(&mut self, note: &NoteStart<'_>) {
        self.restarts += 1;
        self.record(note);
    }

    fn release(&mut self, loop_thru_release: bool) {
        self.releases += 1;
        self.last_loop_thru_release = loop_thru_release;
        self.blocks_since_release = Some(0);
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.blocks_since_release = None;
    }

    fn prepare_block(&mut self, params: &BlockParams<'_>) -> bool {
        self.blocks_prepared += 1;
        self.last_lfo_value = params.lfo_value;
        self.last_master_volume = params.master_volume;
        match self.blocks_since_release.as_mut() {
            Some(blocks) => {
                *blocks += 1;
                *blocks >= self.release_tail_blocks
            }
            None => false,
        }
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l += self.level;
            *r += self.level;
        }
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn set_pan(&mut self, pan: f32) {
        self.pan = pan;
    }

    fn update_envelope(&mut self, target: EnvelopeTarget, params: &EnvelopeParameters) {
        self.envelope_updates += 1;
        if target == EnvelopeTarget::Amplitude {
            self.last_amp_attack = params.attack_seconds;
        }
    }
}

/// Mono region rooted at `note`, covering the whole keyboard.
pub fn region(note: u8) -> Arc<SampleRegion> {
    region_with(SampleDescriptor {
        note_number: note,
        ..Default::default()
    })
}

pub fn region_with(descriptor: SampleDescriptor) -> Arc<SampleRegion> {
    Arc::new(
        SampleRegion::from_descriptor(&data_descriptor(descriptor, &[0.0; 16])).unwrap(),
    )
}

pub fn data_descriptor(descriptor: SampleDescriptor, data: &[f32]) -> SampleDataDescriptor<'_> {
    SampleDataDescriptor {
        descriptor,
        sample_rate: 44100.0,
        channel_count: 1,
        frame_count: data.len(),
        is_interleaved: false,
        data,
    }
}
