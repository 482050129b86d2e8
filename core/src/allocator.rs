//! Number pool allocation.
//!
//! Pure computation over a snapshot of the claimed-number set. The caller
//! owns re-validating and committing the returned numbers atomically
//! against the store; a snapshot can go stale under concurrency.

use crate::error::{RaffleError, Result};
use crate::types::TicketNumber;
use rand::Rng;
use std::collections::HashSet;

/// Draws `count` distinct unclaimed numbers from `[1, pool_size]`.
///
/// Computes the complement of `claimed` within the pool and samples an
/// unbiased `count`-subset via a partial Fisher–Yates shuffle. The order
/// of the returned numbers carries no meaning.
///
/// # Errors
///
/// Returns [`RaffleError::InsufficientPool`] when fewer than `count`
/// numbers remain unclaimed.
#[allow(clippy::cast_possible_truncation)] // complement size is bounded by pool_size
pub fn draw_numbers<R: Rng + ?Sized>(
    claimed: &HashSet<TicketNumber>,
    count: u32,
    pool_size: u32,
    rng: &mut R,
) -> Result<Vec<TicketNumber>> {
    let mut free: Vec<TicketNumber> = (1..=pool_size)
        .filter_map(TicketNumber::new)
        .filter(|number| !claimed.contains(number))
        .collect();

    let available = free.len() as u32;
    if available < count {
        return Err(RaffleError::InsufficientPool {
            requested: count,
            available,
        });
    }

    // Partial Fisher–Yates: only the first `count` slots need shuffling.
    let count = count as usize;
    for i in 0..count {
        let j = rng.gen_range(i..free.len());
        free.swap(i, j);
    }
    free.truncate(count);
    Ok(free)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn claimed_from(numbers: &[u32]) -> HashSet<TicketNumber> {
        numbers.iter().copied().filter_map(TicketNumber::new).collect()
    }

    #[test]
    fn draws_requested_count_of_distinct_numbers() {
        let mut rng = StdRng::seed_from_u64(7);
        let claimed = claimed_from(&[1, 2, 3]);
        let drawn = draw_numbers(&claimed, 5, 20, &mut rng).unwrap();

        assert_eq!(drawn.len(), 5);
        let unique: HashSet<_> = drawn.iter().collect();
        assert_eq!(unique.len(), 5);
        for number in &drawn {
            assert!(!claimed.contains(number));
            assert!(number.get() >= 1 && number.get() <= 20);
        }
    }

    #[test]
    fn fails_when_pool_is_too_small() {
        let mut rng = StdRng::seed_from_u64(7);
        let claimed = claimed_from(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let result = draw_numbers(&claimed, 3, 10, &mut rng);

        assert_eq!(
            result,
            Err(RaffleError::InsufficientPool {
                requested: 3,
                available: 2,
            })
        );
    }

    #[test]
    fn drains_the_pool_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        let claimed = claimed_from(&[2, 4]);
        let mut drawn = draw_numbers(&claimed, 8, 10, &mut rng).unwrap();
        drawn.sort_unstable();

        let expected: Vec<TicketNumber> = [1u32, 3, 5, 6, 7, 8, 9, 10]
            .into_iter()
            .filter_map(TicketNumber::new)
            .collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn zero_count_is_always_satisfiable() {
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = draw_numbers(&HashSet::new(), 0, 10, &mut rng).unwrap();
        assert!(drawn.is_empty());
    }

    #[test]
    fn every_free_number_is_reachable() {
        // With one free slot the allocator has no choice; exercise the
        // boundary where gen_range spans a single index.
        let mut rng = StdRng::seed_from_u64(7);
        let claimed = claimed_from(&[1, 2, 4, 5]);
        let drawn = draw_numbers(&claimed, 1, 5, &mut rng).unwrap();
        assert_eq!(drawn[0].get(), 3);
    }

    proptest! {
        #[test]
        fn drawn_numbers_are_distinct_and_unclaimed(
            claimed_raw in proptest::collection::hash_set(1u32..=100, 0..60),
            count in 0u32..40,
            seed in any::<u64>(),
        ) {
            let claimed: HashSet<TicketNumber> =
                claimed_raw.iter().copied().filter_map(TicketNumber::new).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let available = 100 - claimed.len() as u32;

            match draw_numbers(&claimed, count, 100, &mut rng) {
                Ok(drawn) => {
                    prop_assert_eq!(drawn.len() as u32, count);
                    let unique: HashSet<_> = drawn.iter().copied().collect();
                    prop_assert_eq!(unique.len(), drawn.len());
                    prop_assert!(drawn.iter().all(|n| !claimed.contains(n)));
                    prop_assert!(drawn.iter().all(|n| n.get() >= 1 && n.get() <= 100));
                }
                Err(RaffleError::InsufficientPool { requested, available: reported }) => {
                    prop_assert_eq!(requested, count);
                    prop_assert_eq!(reported, available);
                    prop_assert!(available < count);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}
