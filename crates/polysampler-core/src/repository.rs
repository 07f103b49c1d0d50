//! Control-side owner of loaded sample regions.
//!
//! Loads regions, builds key maps from them and publishes each finished
//! map to the render context in a single swap. Lives on the control
//! context; nothing here is RT-safe.

use crate::error::Result;
use crate::key_map::{KeyMap, KeyMapStrategy};
use crate::region::{SampleDataDescriptor, SampleRegion};
use crate::shared::SamplerShared;
use std::sync::Arc;

/// Loaded regions plus the key map built from them.
#[derive(Debug)]
pub struct SampleRepository {
    shared: Arc<SamplerShared>,
    regions: Vec<Arc<SampleRegion>>,
    strategy: Option<KeyMapStrategy>,
    /// Replaced maps the render side may still hold; each is dropped here
    /// once this is the last reference
    retired: Vec<Arc<KeyMap>>,
}

impl SampleRepository {
    pub fn new(shared: Arc<SamplerShared>) -> Self {
        Self {
            shared,
            regions: Vec::new(),
            strategy: None,
            retired: Vec::new(),
        }
    }

    /// Validate, de-interleave and append one region.
    ///
    /// The key map is not rebuilt; call one of the build methods once all
    /// regions are loaded.
    pub fn load(&mut self, sdd: &SampleDataDescriptor<'_>) -> Result<Arc<SampleRegion>> {
        let region = match SampleRegion::from_descriptor(sdd) {
            Ok(region) => Arc::new(region),
            Err(e) => {
                tracing::warn!(
                    note = sdd.descriptor.note_number,
                    frames = sdd.frame_count,
                    channels = sdd.channel_count,
                    "Rejected sample: {}",
                    e
                );
                return Err(e);
            }
        };

        tracing::debug!(
            note = region.note_number(),
            keys = ?(region.min_note()..=region.max_note()),
            velocity = ?(region.min_velocity(), region.max_velocity()),
            frames = region.frame_count(),
            channels = region.channel_count(),
            "Loaded sample region"
        );
        self.regions.push(Arc::clone(&region));
        Ok(region)
    }

    /// Invalidate the key map, then release every region.
    ///
    /// Stop all voices first: a voice still holding a region keeps it
    /// alive, and its last reference would then drop on the render thread.
    pub fn unload_all(&mut self) {
        self.publish(KeyMap::new());
        let count = self.regions.len();
        self.regions.clear();
        self.strategy = None;
        tracing::info!(regions = count, "Unloaded all samples");
    }

    /// Map every note to the region(s) with the nearest native pitch.
    pub fn build_simple_key_map(&mut self) {
        self.build(KeyMapStrategy::NearestPitch);
    }

    /// Map every note to the regions whose key range contains it.
    pub fn build_key_map(&mut self) {
        self.build(KeyMapStrategy::KeyRange);
    }

    /// Build and publish a key map with `strategy`.
    pub fn build(&mut self, strategy: KeyMapStrategy) {
        let map = KeyMap::build(strategy, &self.regions, self.shared.tuning());
        tracing::debug!(
            ?strategy,
            regions = self.regions.len(),
            mapped_notes = map.mapped_note_count(),
            "Built key map"
        );
        self.publish(map);
        self.strategy = Some(strategy);
    }

    /// Rebuild with the last strategy, e.g. after retuning notes.
    pub fn rebuild(&mut self) {
        if let Some(strategy) = self.strategy {
            self.build(strategy);
        }
    }

    /// Retune a single note. Affects subsequent note-ons; key maps pick it
    /// up on the next build.
    pub fn set_note_frequency(&self, note: u8, frequency: f32) {
        self.shared.tuning().set_note_frequency(note, frequency);
    }

    pub fn regions(&self) -> &[Arc<SampleRegion>] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Strategy of the currently published map, if one was built.
    pub fn strategy(&self) -> Option<KeyMapStrategy> {
        self.strategy
    }

    pub fn shared(&self) -> &Arc<SamplerShared> {
        &self.shared
    }

    fn publish(&mut self, map: KeyMap) {
        // The swap settles outstanding render-side guards into real
        // references, so a count of 1 means nobody else can reach the map
        let previous = self.shared.publish_key_map(Arc::new(map));
        self.retired.push(previous);
        self.retired.retain(|map| Arc::strong_count(map) > 1);
    }
}
