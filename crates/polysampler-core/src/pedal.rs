//! Sustain pedal key-state tracking.
//!
//! Decides whether a key-up should actually stop its note. While the pedal
//! is down, released keys keep sounding ("sustaining") until pedal-up.

use crate::tuning::NOTE_COUNT;

/// Key-state tracker consulted by note dispatch.
pub trait SustainLogic: Send {
    /// True if any key is physically held.
    fn is_any_key_down(&self) -> bool;

    /// Record a key press.
    fn key_down_action(&mut self, note: u8);

    /// Record a key release. Returns `true` if the note should stop now,
    /// `false` if the pedal defers it.
    fn key_up_action(&mut self, note: u8) -> bool;

    /// True if `note` is sounding only because the pedal holds it.
    fn is_note_sustaining(&self, note: u8) -> bool;

    fn pedal_down(&mut self);

    /// Lift the pedal. Callers stop sustaining notes *before* this.
    fn pedal_up(&mut self);

    fn is_pedal_down(&self) -> bool;
}

/// Default per-note pedal logic.
#[derive(Debug, Clone)]
pub struct SustainPedalLogic {
    key_down: [bool; NOTE_COUNT],
    playing: [bool; NOTE_COUNT],
    pedal: bool,
}

impl SustainPedalLogic {
    pub fn new() -> Self {
        Self {
            key_down: [false; NOTE_COUNT],
            playing: [false; NOTE_COUNT],
            pedal: false,
        }
    }
}

impl Default for SustainPedalLogic {
    fn default() -> Self {
        Self::new()
    }
}

impl SustainLogic for SustainPedalLogic {
    fn is_any_key_down(&self) -> bool {
        self.key_down.iter().any(|&down| down)
    }

    fn key_down_action(&mut self, note: u8) {
        let Some(n) = index(note) else { return };
        self.key_down[n] = true;
        self.playing[n] = true;
    }

    fn key_up_action(&mut self, note: u8) -> bool {
        let Some(n) = index(note) else { return true };
        self.key_down[n] = false;
        if self.pedal {
            return false;
        }
        self.playing[n] = false;
        true
    }

    fn is_note_sustaining(&self, note: u8) -> bool {
        index(note).is_some_and(|n| self.playing[n] && !self.key_down[n])
    }

    fn pedal_down(&mut self) {
        self.pedal = true;
    }

    fn pedal_up(&mut self) {
        for n in 0..NOTE_COUNT {
            if !self.key_down[n] {
                self.playing[n] = false;
            }
        }
        self.pedal = false;
    }

    fn is_pedal_down(&self) -> bool {
        self.pedal
    }
}

#[inline]
fn index(note: u8) -> Option<usize> {
    let n = note as usize;
    (n < NOTE_COUNT).then_some(n)
}
