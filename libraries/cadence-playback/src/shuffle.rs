//! Shuffle order generation
//!
//! A shuffle order is a permutation of queue indices that starts with the
//! current track, followed by a Fisher-Yates shuffle of every other index.

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Build a traversal order for a queue of `len` tracks
///
/// The current index (if any) is pinned to the front so that enabling
/// shuffle never changes what is playing.
pub fn shuffled_order(current: Option<usize>, len: usize) -> Vec<usize> {
    shuffled_order_with(current, len, &mut thread_rng())
}

/// Same as [`shuffled_order`] with a caller-provided RNG
pub fn shuffled_order_with<R: Rng + ?Sized>(
    current: Option<usize>,
    len: usize,
    rng: &mut R,
) -> Vec<usize> {
    let current = current.filter(|&index| index < len);

    let mut rest: Vec<usize> = (0..len).filter(|&i| Some(i) != current).collect();
    rest.shuffle(rng);

    let mut order = Vec::with_capacity(len);
    order.extend(current);
    order.extend(rest);
    order
}

/// Pick where a newly appended index lands in a shuffle order
///
/// Returns a slot in the not-yet-played part, i.e. strictly after `position`
/// and at most `order_len` (append at the end).
pub fn insertion_slot(position: usize, order_len: usize) -> usize {
    let low = (position + 1).min(order_len);
    thread_rng().gen_range(low..=order_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_permutation(order: &[usize], len: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn current_track_leads_the_order() {
        for current in 0..5 {
            let order = shuffled_order(Some(current), 5);
            assert_eq!(order[0], current);
            assert!(is_permutation(&order, 5));
        }
    }

    #[test]
    fn no_current_shuffles_everything() {
        let order = shuffled_order(None, 8);
        assert!(is_permutation(&order, 8));
    }

    #[test]
    fn out_of_range_current_is_ignored() {
        let order = shuffled_order(Some(10), 3);
        assert!(is_permutation(&order, 3));
    }

    #[test]
    fn empty_queue_has_empty_order() {
        assert!(shuffled_order(None, 0).is_empty());
        assert!(shuffled_order(Some(0), 0).is_empty());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = shuffled_order_with(Some(2), 20, &mut StdRng::seed_from_u64(7));
        let b = shuffled_order_with(Some(2), 20, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_actually_reorders() {
        // 19! orderings; the identity coming out twice in a row is not a thing
        let identity: Vec<usize> = (0..20).collect();
        let differs = (0..2).any(|_| shuffled_order(Some(0), 20) != identity);
        assert!(differs);
    }

    #[test]
    fn insertion_slot_stays_in_unplayed_part() {
        for _ in 0..100 {
            let slot = insertion_slot(2, 6);
            assert!((3..=6).contains(&slot));
        }
        assert_eq!(insertion_slot(5, 6), 6);
        assert_eq!(insertion_slot(0, 0), 0);
    }
}
