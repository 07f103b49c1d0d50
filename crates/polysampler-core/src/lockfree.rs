//! Lock-free primitives shared between the control and render contexts.

use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

/// Cache-line aligned atomic f32.
///
/// One writer (control), one reader (render). Reads happen once per block.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_atomic_float_visible_across_threads() {
        let value = Arc::new(AtomicFloat::new(0.0));
        let writer = Arc::clone(&value);

        std::thread::spawn(move || writer.set(0.75))
            .join()
            .unwrap();

        assert_eq!(value.get(), 0.75);
    }

    #[test]
    fn test_cache_line_alignment() {
        assert_eq!(std::mem::align_of::<AtomicFloat>(), 64);
    }
}
