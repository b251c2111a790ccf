//! Two-level local-history predictor: a per-pc history table feeding a
//! pattern history table of two-bit counters

use super::BranchPredictor;
use super::BranchStats;
use super::TwoBit;

pub struct LocalHistoryPredictor {
    local_history: Vec<u32>,
    pattern_table: Vec<TwoBit>,
    local_bits: u32,
    pattern_bits: u32,
    stats: BranchStats,
}

impl LocalHistoryPredictor {
    pub fn new(local_bits: u32, pattern_bits: u32) -> Self {
        Self {
            local_history: vec![0; 1 << local_bits],
            pattern_table: vec![TwoBit::WeaklyNot; 1 << pattern_bits],
            local_bits,
            pattern_bits,
            stats: BranchStats::default(),
        }
    }

    fn local_index(&self, pc: u32) -> usize {
        ((pc >> 2) & ((1 << self.local_bits) - 1)) as usize
    }

    fn pattern_index(&self, local_history: u32) -> usize {
        (local_history & ((1 << self.pattern_bits) - 1)) as usize
    }
}

impl BranchPredictor for LocalHistoryPredictor {
    fn predict(&self, pc: u32, _target: u32) -> bool {
        let history = self.local_history[self.local_index(pc)];
        self.pattern_table[self.pattern_index(history)].taken()
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let predicted = self.predict(pc, target);
        self.stats.record(predicted == taken);

        let local_index = self.local_index(pc);
        let history = self.local_history[local_index];
        let pattern_index = self.pattern_index(history);

        // Counter first, then shift the outcome into this pc's history
        self.pattern_table[pattern_index] = self.pattern_table[pattern_index].step(taken);
        self.local_history[local_index] =
            ((history << 1) | taken as u32) & ((1 << self.pattern_bits) - 1);
    }

    fn reset(&mut self) {
        self.local_history.fill(0);
        self.pattern_table.fill(TwoBit::WeaklyNot);
        self.stats = BranchStats::default();
    }

    fn stats(&self) -> BranchStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learns_periodic_pattern() {
        // Alternating T,N becomes perfectly predictable once each history
        // pattern has trained its own counter
        let mut p = LocalHistoryPredictor::new(4, 4);
        let mut tail_misses = 0;
        for i in 0..48 {
            let taken = i % 2 == 0;
            let before = p.stats().mispredicted;
            p.update(0x40, taken, 0x20);
            if i >= 24 && p.stats().mispredicted > before {
                tail_misses += 1;
            }
        }
        assert_eq!(tail_misses, 0);
    }

    #[test]
    fn test_histories_are_per_pc() {
        let mut p = LocalHistoryPredictor::new(4, 4);
        // Train pc A always taken
        for _ in 0..8 {
            p.update(0x40, true, 0x20);
        }
        // A fresh pc still sees the initial all-zero history
        assert_eq!(p.local_history[p.local_index(0x44)], 0);
    }

    #[test]
    fn test_history_width_is_bounded() {
        let mut p = LocalHistoryPredictor::new(4, 3);
        for _ in 0..10 {
            p.update(0x40, true, 0x20);
        }
        assert!(p.local_history[p.local_index(0x40)] <= 0b111);
    }
}
