//! Play-order resolution over queue indices.
//!
//! The queue itself is never reordered; shuffle is a permutation of indices
//! laid over it, rebuilt when shuffle is toggled or the queue is replaced.
//! Wrapping at either end is the caller's decision (repeat-all).

use rand::Rng;
use rand::seq::SliceRandom;

/// Ordered traversal of queue indices.
#[derive(Clone, Debug)]
pub(crate) struct PlayOrder {
    order: Vec<usize>,
}

impl PlayOrder {
    /// Natural queue order.
    pub(crate) fn linear(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    /// Random permutation; when `anchor` is set, that index plays first.
    pub(crate) fn shuffled(len: usize, anchor: Option<usize>, rng: &mut impl Rng) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        if let Some(anchor) = anchor {
            if let Some(pos) = order.iter().position(|&i| i == anchor) {
                order.remove(pos);
                order.insert(0, anchor);
            }
        }
        Self { order }
    }

    /// First index in play order, if any.
    pub(crate) fn first(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// Index following `current`; wraps to the front when `wrap` is set.
    pub(crate) fn next_after(&self, current: usize, wrap: bool) -> Option<usize> {
        let pos = self.order.iter().position(|&i| i == current)?;
        match self.order.get(pos + 1) {
            Some(&next) => Some(next),
            None if wrap => self.first(),
            None => None,
        }
    }

    /// Index preceding `current`; wraps to the back when `wrap` is set.
    pub(crate) fn previous_before(&self, current: usize, wrap: bool) -> Option<usize> {
        let pos = self.order.iter().position(|&i| i == current)?;
        if pos > 0 {
            self.order.get(pos - 1).copied()
        } else if wrap {
            self.order.last().copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn linear_walks_queue_in_order() {
        let order = PlayOrder::linear(3);
        assert_eq!(order.first(), Some(0));
        assert_eq!(order.next_after(0, false), Some(1));
        assert_eq!(order.next_after(1, false), Some(2));
        assert_eq!(order.next_after(2, false), None);
    }

    #[test]
    fn next_wraps_when_requested() {
        let order = PlayOrder::linear(3);
        assert_eq!(order.next_after(2, true), Some(0));
        assert_eq!(order.previous_before(0, true), Some(2));
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = PlayOrder::shuffled(8, None, &mut rng);
        let mut seen: Vec<usize> = Vec::new();
        let mut walk = order.first();
        while let Some(i) = walk {
            seen.push(i);
            walk = order.next_after(i, false);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn shuffled_keeps_anchor_first() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let order = PlayOrder::shuffled(5, Some(3), &mut rng);
            assert_eq!(order.first(), Some(3));
        }
    }

    #[test]
    fn empty_order_has_no_positions() {
        let order = PlayOrder::linear(0);
        assert_eq!(order.first(), None);
        assert_eq!(order.next_after(0, true), None);
    }
}
