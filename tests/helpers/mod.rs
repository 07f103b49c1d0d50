//! Test helpers and fixtures for polysampler integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (unity gain, pan law)
//! - `DSP_EPSILON` (1e-4): dB conversions
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use polysampler::core::AtomicFloat;
use polysampler::prelude::*;
use polysampler::{EnvelopeParameters, SamplerProcessor};
use std::sync::Arc;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 256;

/// Constant output written by every sounding [`TestVoice`].
pub const VOICE_LEVEL: f32 = 0.25;

/// Minimal voice: writes a constant level, finishes [`RELEASE_FRAMES`]
/// after release, and remembers how it was started.
#[derive(Debug, Clone, Default)]
pub struct TestVoice {
    pub note: Option<u8>,
    pub frequency: f32,
    pub velocity: f32,
    pub region_note: u8,
    pub starts: u32,
    pub restarts: u32,
    pub stops: u32,
    pub released: bool,
    pub release_frames_left: usize,
    pub amp_release_seconds: f32,
    /// Master volume of the last prepared step, readable from other threads
    pub master_volume_seen: Arc<AtomicFloat>,
}

/// Host blocks a released [`TestVoice`] keeps sounding.
pub const RELEASE_BLOCKS: usize = 2;

/// Frames a released [`TestVoice`] keeps sounding.
pub const RELEASE_FRAMES: usize = RELEASE_BLOCKS * TEST_BUFFER_SIZE;

impl SamplerVoice for TestVoice {
    fn init(&mut self, _sample_rate: f32) {}

    fn start(&mut self, note: &NoteStart<'_>) {
        self.starts += 1;
        self.begin(note);
    }

    fn restart_new_note(&mut self, note: &NoteStart<'_>) {
        self.restarts += 1;
        self.begin(note);
    }

    fn release(&mut self, _loop_thru_release: bool) {
        self.released = true;
        self.release_frames_left = RELEASE_FRAMES;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.note = None;
        self.released = false;
    }

    fn prepare_block(&mut self, params: &BlockParams<'_>) -> bool {
        self.master_volume_seen.set(params.master_volume);
        if !self.released {
            return false;
        }
        if self.release_frames_left == 0 {
            return true;
        }
        self.release_frames_left = self.release_frames_left.saturating_sub(params.frames);
        false
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for s in left.iter_mut() {
            *s += VOICE_LEVEL;
        }
        for s in right.iter_mut() {
            *s += VOICE_LEVEL;
        }
    }

    fn set_gain(&mut self, _gain: f32) {}

    fn set_pan(&mut self, _pan: f32) {}

    fn update_envelope(&mut self, target: EnvelopeTarget, params: &EnvelopeParameters) {
        if target == EnvelopeTarget::Amplitude {
            self.amp_release_seconds = params.release_seconds;
        }
    }
}

impl TestVoice {
    fn begin(&mut self, note: &NoteStart<'_>) {
        self.note = Some(note.note);
        self.frequency = note.frequency;
        self.velocity = note.velocity;
        self.region_note = note.region.note_number();
        self.released = false;
    }
}

/// Route control-path logs to the test harness output. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a handle pair with `polyphony` test voices.
pub fn test_sampler(polyphony: usize) -> (SamplerHandle, SamplerProcessor<TestVoice>) {
    init_tracing();
    SamplerBuilder::new()
        .sample_rate(TEST_SAMPLE_RATE)
        .polyphony(polyphony)
        .build(|_| TestVoice::default())
        .expect("Failed to create test sampler")
}

/// Render one block and return (left, right).
pub fn render_block(processor: &mut SamplerProcessor<TestVoice>) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0; TEST_BUFFER_SIZE];
    let mut right = vec![0.0; TEST_BUFFER_SIZE];
    processor.process(&mut left, &mut right);
    (left, right)
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Mono descriptor over `data` with the given metadata.
pub fn mono_sample(descriptor: SampleDescriptor, data: &[f32]) -> SampleDataDescriptor<'_> {
    SampleDataDescriptor {
        descriptor,
        sample_rate: TEST_SAMPLE_RATE as f32,
        channel_count: 1,
        frame_count: data.len(),
        is_interleaved: false,
        data,
    }
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that every sample is below the silence threshold.
pub fn assert_silence(samples: &[f32], context: &str) {
    let p = peak(samples);
    assert!(
        p < tolerances::SILENCE_THRESHOLD,
        "{}: expected silence, peak was {}",
        context,
        p
    );
}
