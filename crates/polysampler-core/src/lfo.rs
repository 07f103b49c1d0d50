//! Global control-rate LFO.
//!
//! The sampler pulls one LFO sample per [`CHUNK_SIZE`](crate::CHUNK_SIZE)
//! frames and shares the scaled value with every voice. The oscillator runs at the control rate
//! (`sample_rate / CHUNK_SIZE`).

use std::f32::consts::TAU;

/// Table resolution of [`WavetableLfo`].
pub const LFO_TABLE_SIZE: usize = 256;

/// Block-rate modulation source.
pub trait BlockLfo: Send {
    /// Prepare for a control rate (Hz) and initial frequency.
    fn init(&mut self, control_rate: f32, frequency: f32);

    fn set_frequency(&mut self, frequency: f32);

    /// Next output in `-1..=1`, advancing one control step.
    fn next_sample(&mut self) -> f32;
}

/// Waveform loaded into a [`WavetableLfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoShape {
    #[default]
    Sine,
    Triangle,
    Sawtooth,
}

impl LfoShape {
    #[inline]
    fn evaluate(self, phase: f32) -> f32 {
        match self {
            LfoShape::Sine => (phase * TAU).sin(),
            LfoShape::Triangle => {
                let p = phase * 4.0;
                if p < 1.0 {
                    p
                } else if p < 3.0 {
                    2.0 - p
                } else {
                    p - 4.0
                }
            }
            LfoShape::Sawtooth => phase * 2.0 - 1.0,
        }
    }
}

/// Table-lookup oscillator with linear interpolation.
#[derive(Debug, Clone)]
pub struct WavetableLfo {
    table: Box<[f32; LFO_TABLE_SIZE]>,
    phase: f32,
    increment: f32,
    frequency: f32,
    control_rate: f32,
}

impl WavetableLfo {
    pub fn new(shape: LfoShape) -> Self {
        let table = Box::new(std::array::from_fn(|i| {
            shape.evaluate(i as f32 / LFO_TABLE_SIZE as f32)
        }));
        Self {
            table,
            phase: 0.0,
            increment: 0.0,
            frequency: 0.0,
            control_rate: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    fn update_increment(&mut self) {
        self.increment = if self.control_rate > 0.0 {
            self.frequency / self.control_rate
        } else {
            0.0
        };
    }
}

impl Default for WavetableLfo {
    fn default() -> Self {
        Self::new(LfoShape::Sine)
    }
}

impl BlockLfo for WavetableLfo {
    fn init(&mut self, control_rate: f32, frequency: f32) {
        self.control_rate = control_rate;
        self.frequency = frequency;
        self.phase = 0.0;
        self.update_increment();
    }

    #[inline]
    fn set_frequency(&mut self, frequency: f32) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.update_increment();
        }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let position = self.phase * LFO_TABLE_SIZE as f32;
        let index = (position as usize).min(LFO_TABLE_SIZE - 1);
        let frac = position - index as f32;
        let a = self.table[index];
        let b = self.table[(index + 1) % LFO_TABLE_SIZE];

        self.phase += self.increment;
        self.phase -= self.phase.floor();

        a + (b - a) * frac
    }
}
