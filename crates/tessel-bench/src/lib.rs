//! Benchmark inputs for Tessel buffers.
//!
//! Provides deterministic buffers for benchmarks:
//!
//! - [`random_values`]: seeded pseudo-random `u64`s
//! - [`reference_buffer`]: 10K elements, the size most benches run at
//! - [`resize_schedule`]: a seeded sequence of grow/shrink targets

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessel_buffer::DynamicBuffer;

/// Element count of [`reference_buffer`].
pub const REFERENCE_LEN: usize = 10_000;

/// `len` pseudo-random values from `seed`.
pub fn random_values(len: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.next_u64()).collect()
}

/// A buffer of [`REFERENCE_LEN`] seeded values.
pub fn reference_buffer(seed: u64) -> DynamicBuffer<u64> {
    DynamicBuffer::from(random_values(REFERENCE_LEN, seed))
}

/// `steps` resize targets in `1..=max_len`, seeded.
///
/// Consecutive targets always differ, so every step reallocates. `max_len`
/// is raised to 2 if smaller.
pub fn resize_schedule(steps: usize, max_len: usize, seed: u64) -> Vec<usize> {
    let max_len = max_len.max(2);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut schedule: Vec<usize> = Vec::with_capacity(steps);
    while schedule.len() < steps {
        let target = (rng.next_u64() % max_len as u64) as usize + 1;
        if schedule.last() != Some(&target) {
            schedule.push(target);
        }
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_deterministic() {
        assert_eq!(random_values(32, 7), random_values(32, 7));
        assert_ne!(random_values(32, 7), random_values(32, 8));
        assert_eq!(reference_buffer(1), reference_buffer(1));
    }

    #[test]
    fn schedule_never_repeats_a_target() {
        let schedule = resize_schedule(200, 64, 42);
        assert_eq!(schedule.len(), 200);
        assert!(schedule.iter().all(|&n| (1..=64).contains(&n)));
        assert!(schedule.windows(2).all(|pair| pair[0] != pair[1]));
    }
}
