// history.rs - Detects a grid repeating one of its recent generations

pub const HISTORY_LEN: usize = 10;

/// Ring of the last `HISTORY_LEN` grid hashes.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    hashes: [u64; HISTORY_LEN],
    count: usize,
}

impl CycleDetector {
    /// Records `hash` and reports whether it was already among the recent
    /// ones. A repeat is not recorded again.
    pub fn observe(&mut self, hash: u64) -> bool {
        let seen = self.hashes[..self.count.min(HISTORY_LEN)].contains(&hash);
        if !seen {
            self.hashes[self.count % HISTORY_LEN] = hash;
            self.count += 1;
        }
        seen
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spots_repeats_within_window() {
        let mut history = CycleDetector::default();
        assert!(!history.observe(1));
        assert!(!history.observe(2));
        assert!(history.observe(1));
    }

    #[test]
    fn forgets_old_hashes() {
        let mut history = CycleDetector::default();
        for hash in 0..=HISTORY_LEN as u64 {
            assert!(!history.observe(hash));
        }
        // 0 was overwritten by the eleventh hash
        assert!(!history.observe(0));
        assert!(history.observe(HISTORY_LEN as u64));
    }

    #[test]
    fn unused_slots_do_not_match() {
        let mut history = CycleDetector::default();
        assert!(!history.observe(0));
        history.reset();
        assert!(!history.observe(0));
    }
}
