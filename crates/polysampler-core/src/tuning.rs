//! Per-note tuning table.
//!
//! Maps each of the 128 MIDI notes to the frequency the sampler should
//! play it at. Defaults to 12-tone equal temperament; any note can be
//! retuned from the control context while rendering continues. A retune
//! affects the next note-on and the next key-map build, never a sounding
//! voice.

use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

/// Reference pitch for A4.
pub const A4_FREQ: f32 = 440.0;

/// MIDI note number for A4.
pub const A4_NOTE: u8 = 69;

/// Number of MIDI notes.
pub const NOTE_COUNT: usize = 128;

/// 12-TET frequency of a MIDI note.
#[inline]
pub fn note_to_hz(note: u8) -> f32 {
    A4_FREQ * 2.0_f32.powf((note as f32 - A4_NOTE as f32) / 12.0)
}

/// Frequency ratio for a detune amount in cents.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}

/// Lock-free tuning table, one atomic frequency per note.
#[derive(Debug)]
pub struct TuningTable {
    freq_table: [AtomicF32; NOTE_COUNT],
}

impl TuningTable {
    /// Create a table tuned to 12-TET with A4 = 440 Hz.
    pub fn equal_temperament() -> Self {
        Self {
            freq_table: std::array::from_fn(|n| AtomicF32::new(note_to_hz(n as u8))),
        }
    }

    /// Target frequency for `note`.
    ///
    /// Notes above 127 fold onto the top of the table.
    #[inline]
    pub fn frequency(&self, note: u8) -> f32 {
        let index = (note as usize).min(NOTE_COUNT - 1);
        self.freq_table[index].load(Ordering::Acquire)
    }

    /// Override the frequency of a single note. Out-of-range notes and
    /// non-positive frequencies are ignored.
    pub fn set_note_frequency(&self, note: u8, frequency: f32) {
        if (note as usize) >= NOTE_COUNT || !frequency.is_finite() || frequency <= 0.0 {
            return;
        }
        self.freq_table[note as usize].store(frequency, Ordering::Release);
    }

    /// Restore 12-TET for every note.
    pub fn reset(&self) {
        for (n, slot) in self.freq_table.iter().enumerate() {
            slot.store(note_to_hz(n as u8), Ordering::Release);
        }
    }
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::equal_temperament()
    }
}
