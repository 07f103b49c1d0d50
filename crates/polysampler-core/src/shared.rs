//! State shared by the control and render contexts.
//!
//! Everything here is lock-free: parameters and tuning are atomics, the
//! key map is published whole through `ArcSwap`, and the stop-all gate is
//! a handshake between an atomic flag and two render-side counters.

use crate::key_map::KeyMap;
use crate::lockfree::AtomicFloat;
use crate::params::SamplerParams;
use crate::sampler::{CHUNK_SIZE, DEFAULT_SAMPLE_RATE};
use crate::tuning::TuningTable;
use arc_swap::{ArcSwap, Guard};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared sampler state, held behind an `Arc` by both contexts.
#[derive(Debug)]
pub struct SamplerShared {
    params: SamplerParams,
    tuning: TuningTable,
    key_map: ArcSwap<KeyMap>,
    control_rate: AtomicFloat,
    stopping_all: AtomicBool,
    active_voices: AtomicUsize,
    blocks_rendered: AtomicU64,
}

impl SamplerShared {
    pub fn new() -> Self {
        Self {
            params: SamplerParams::new(),
            tuning: TuningTable::equal_temperament(),
            key_map: ArcSwap::from_pointee(KeyMap::new()),
            control_rate: AtomicFloat::new((DEFAULT_SAMPLE_RATE / CHUNK_SIZE as f64) as f32),
            stopping_all: AtomicBool::new(false),
            active_voices: AtomicUsize::new(0),
            blocks_rendered: AtomicU64::new(0),
        }
    }

    pub fn params(&self) -> &SamplerParams {
        &self.params
    }

    pub fn tuning(&self) -> &TuningTable {
        &self.tuning
    }

    /// Control rate (Hz) the render side was last initialized with.
    pub fn control_rate(&self) -> f32 {
        self.control_rate.get()
    }

    pub(crate) fn set_control_rate(&self, control_rate: f32) {
        self.control_rate.set(control_rate);
    }

    /// Current key map. Lock-free; safe on the render path.
    #[inline]
    pub fn key_map(&self) -> Guard<Arc<KeyMap>> {
        self.key_map.load()
    }

    /// Replace the key map, returning the previous one.
    pub fn publish_key_map(&self, map: Arc<KeyMap>) -> Arc<KeyMap> {
        self.key_map.swap(map)
    }

    // Stop-all handshake. The gate store and the block-counter load in
    // `begin_stop_all` use SeqCst so that the render block counted two
    // blocks later is guaranteed to observe the gate.

    /// Raise the stop-all gate and return a ticket for polling completion.
    pub fn begin_stop_all(&self) -> StopAllTicket {
        self.stopping_all.store(true, Ordering::SeqCst);
        StopAllTicket {
            start_block: self.blocks_rendered.load(Ordering::SeqCst),
        }
    }

    /// Lower the stop-all gate so note-ons are accepted again.
    pub fn restart_voices(&self) {
        self.stopping_all.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopping_all(&self) -> bool {
        self.stopping_all.load(Ordering::SeqCst)
    }

    /// Called by the render context at the end of every block.
    #[inline]
    pub fn publish_render_status(&self, active_voices: usize) {
        self.active_voices.store(active_voices, Ordering::SeqCst);
        self.blocks_rendered.fetch_add(1, Ordering::SeqCst);
    }

    /// Active voice count as of the last completed block.
    pub fn active_voices(&self) -> usize {
        self.active_voices.load(Ordering::SeqCst)
    }

    pub fn blocks_rendered(&self) -> u64 {
        self.blocks_rendered.load(Ordering::SeqCst)
    }
}

impl Default for SamplerShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of a stop-all request, polled until the render side has drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAllTicket {
    start_block: u64,
}

impl StopAllTicket {
    /// True once a block that began after the gate was raised has
    /// completed with every voice idle.
    ///
    /// The block in flight when the gate went up may have missed it, so
    /// two completed blocks are required before the active count counts.
    pub fn is_complete(&self, shared: &SamplerShared) -> bool {
        shared.blocks_rendered() >= self.start_block + 2 && shared.active_voices() == 0
    }
}
