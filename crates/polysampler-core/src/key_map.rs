//! MIDI note → sample region index.
//!
//! Two build strategies fill the same 128-entry table:
//! - **Nearest pitch**: every note maps to the region(s) whose native pitch
//!   is closest to the note's tuned frequency. Exact ties keep all of them.
//! - **Key range**: every note maps to each region whose key range, in Hz,
//!   contains the note's tuned frequency. Notes outside every range stay
//!   empty.
//!
//! A map is invalid from the moment a rebuild starts until it finishes.
//! Lookups against an invalid map return nothing. The control context
//! builds maps off to the side and publishes them whole (see
//! [`SamplerShared`](crate::SamplerShared)), so the render context never
//! observes a partial build.

use crate::region::SampleRegion;
use crate::tuning::{TuningTable, NOTE_COUNT};
use smallvec::SmallVec;
use std::sync::Arc;

/// Regions mapped to a single note, in load order.
pub type RegionList = SmallVec<[Arc<SampleRegion>; 4]>;

/// Which algorithm produced a key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMapStrategy {
    /// Closest native pitch wins; ties keep every closest region
    #[default]
    NearestPitch,
    /// Region key ranges decide membership
    KeyRange,
}

/// 128-entry note → region table.
#[derive(Debug, Clone)]
pub struct KeyMap {
    entries: [RegionList; NOTE_COUNT],
    valid: bool,
}

impl KeyMap {
    /// An empty, invalid map.
    pub fn new() -> Self {
        Self {
            entries: std::array::from_fn(|_| RegionList::new()),
            valid: false,
        }
    }

    /// Build a fresh map with `strategy`.
    pub fn build(
        strategy: KeyMapStrategy,
        regions: &[Arc<SampleRegion>],
        tuning: &TuningTable,
    ) -> Self {
        let mut map = Self::new();
        match strategy {
            KeyMapStrategy::NearestPitch => map.rebuild_nearest_pitch(regions, tuning),
            KeyMapStrategy::KeyRange => map.rebuild_key_ranges(regions, tuning),
        }
        map
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Drop every mapping and mark the map invalid.
    pub fn clear(&mut self) {
        self.valid = false;
        for entry in &mut self.entries {
            entry.clear();
        }
    }

    /// Map each note to the regions at minimal pitch distance.
    pub fn rebuild_nearest_pitch(&mut self, regions: &[Arc<SampleRegion>], tuning: &TuningTable) {
        self.clear();

        for (note, entry) in self.entries.iter_mut().enumerate() {
            let target = tuning.frequency(note as u8);
            let Some(min_distance) = regions
                .iter()
                .map(|r| pitch_distance(r, target))
                .min_by(f32::total_cmp)
            else {
                continue;
            };

            entry.extend(
                regions
                    .iter()
                    .filter(|r| pitch_distance(r, target) == min_distance)
                    .cloned(),
            );
        }

        self.valid = true;
    }

    /// Map each note to every region whose key range contains its frequency.
    pub fn rebuild_key_ranges(&mut self, regions: &[Arc<SampleRegion>], tuning: &TuningTable) {
        self.clear();

        for (note, entry) in self.entries.iter_mut().enumerate() {
            let frequency = tuning.frequency(note as u8);
            entry.extend(
                regions
                    .iter()
                    .filter(|r| {
                        let (low, high) = r.key_range_hz();
                        frequency >= low && frequency <= high
                    })
                    .cloned(),
            );
        }

        self.valid = true;
    }

    /// Every region mapped to `note`, ignoring velocity.
    pub fn regions_for_note(&self, note: u8) -> &[Arc<SampleRegion>] {
        match self.entries.get(note as usize) {
            Some(entry) if self.valid => entry.as_slice(),
            _ => &[],
        }
    }

    /// Regions for `note` whose velocity layer accepts `velocity`.
    ///
    /// RT-safe: iterates in place, no allocation.
    pub fn lookup(&self, note: u8, velocity: u8) -> impl Iterator<Item = &Arc<SampleRegion>> {
        self.regions_for_note(note)
            .iter()
            .filter(move |r| r.accepts_velocity(velocity))
    }

    /// First matching region for `note`, in list order.
    pub fn lookup_first(&self, note: u8, velocity: u8) -> Option<&Arc<SampleRegion>> {
        match self.regions_for_note(note) {
            [] => None,
            [only] => only.accepts_velocity(velocity).then_some(only),
            many => many.iter().find(|r| r.accepts_velocity(velocity)),
        }
    }

    /// Number of notes with at least one mapped region.
    pub fn mapped_note_count(&self) -> usize {
        if !self.valid {
            return 0;
        }
        self.entries.iter().filter(|e| !e.is_empty()).count()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn pitch_distance(region: &SampleRegion, target_hz: f32) -> f32 {
    (region.native_pitch_hz() - target_hz).abs()
}
