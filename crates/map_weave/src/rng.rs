//! Small randomness helpers shared by the generation steps.
//!
//! Steps take `&mut dyn RngCore` so callers control determinism: a full run is
//! a pure function of the supplied seed and the step order.
use rand::RngCore;

/// Uniform integer in `[lo, hi]`, both inclusive. Returns `lo` for empty ranges.
#[inline]
pub fn range_inclusive(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    let span = (hi as i64 - lo as i64 + 1) as u64;
    lo + (rng.next_u64() % span) as i32
}

/// True with probability `percent` out of 100.
#[inline]
pub fn percent_check(rng: &mut dyn RngCore, percent: u32) -> bool {
    if percent == 0 {
        return false;
    }
    if percent >= 100 {
        return true;
    }
    range_inclusive(rng, 1, 100) as u32 <= percent
}

/// Uniform index into a slice of length `len`. Returns 0 for empty slices.
#[inline]
pub fn index(rng: &mut dyn RngCore, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    (rng.next_u64() % len as u64) as usize
}

/// Fisher-Yates shuffle.
pub fn shuffle<T>(rng: &mut dyn RngCore, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = index(rng, i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn range_inclusive_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = range_inclusive(&mut rng, -3, 9);
            assert!((-3..=9).contains(&v));
        }
    }

    #[test]
    fn range_inclusive_collapses_empty_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(range_inclusive(&mut rng, 5, 5), 5);
        assert_eq!(range_inclusive(&mut rng, 5, 2), 5);
    }

    #[test]
    fn percent_check_extremes() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(!percent_check(&mut rng, 0));
        assert!(percent_check(&mut rng, 100));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut items: Vec<u32> = (0..32).collect();
        shuffle(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn determinism_for_same_seed() {
        let mut a = StdRng::seed_from_u64(123);
        let mut b = StdRng::seed_from_u64(123);
        let va: Vec<i32> = (0..16).map(|_| range_inclusive(&mut a, 0, 99)).collect();
        let vb: Vec<i32> = (0..16).map(|_| range_inclusive(&mut b, 0, 99)).collect();
        assert_eq!(va, vb);
    }
}
