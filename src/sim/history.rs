//! Fixed-capacity rolling history used by the spawn directors

/// Ring buffer of the last `N` picks (oldest overwritten first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHistory<T: Copy + PartialEq, const N: usize> {
    slots: [Option<T>; N],
    write: usize,
}

impl<T: Copy + PartialEq, const N: usize> Default for RingHistory<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq, const N: usize> RingHistory<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [None; N],
            write: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        self.slots[self.write] = Some(value);
        self.write = (self.write + 1) % N;
    }

    /// How many recorded picks equal `value`
    pub fn count(&self, value: T) -> usize {
        self.slots.iter().filter(|s| **s == Some(value)).count()
    }

    /// Most recent pick
    pub fn last(&self) -> Option<T> {
        if N == 0 {
            return None;
        }
        self.slots[(self.write + N - 1) % N]
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.write = 0;
    }

    /// Picks from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..N).filter_map(move |i| self.slots[(self.write + i) % N])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut h: RingHistory<u8, 3> = RingHistory::new();
        assert!(h.is_empty());
        assert_eq!(h.last(), None);
        for v in [1, 2, 3, 4] {
            h.push(v);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(h.last(), Some(4));
        assert_eq!(h.count(1), 0);
        h.push(4);
        assert_eq!(h.count(4), 2);
        h.clear();
        assert!(h.is_empty());
    }
}
