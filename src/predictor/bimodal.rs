//! Bimodal predictors: a table of per-pc counters indexed by the word
//! address, in one-bit and two-bit saturating flavours.

use super::BranchPredictor;
use super::BranchStats;
use super::TwoBit;

/// One-bit bimodal predictor: each entry remembers the last outcome
pub struct OneBitPredictor {
    table: Vec<bool>,
    index_mask: u32,
    stats: BranchStats,
}

impl OneBitPredictor {
    pub fn new(index_bits: u32) -> Self {
        let size = 1usize << index_bits;
        Self { table: vec![false; size], index_mask: (size - 1) as u32, stats: BranchStats::default() }
    }

    fn index(&self, pc: u32) -> usize {
        ((pc >> 2) & self.index_mask) as usize
    }
}

impl BranchPredictor for OneBitPredictor {
    fn predict(&self, pc: u32, _target: u32) -> bool {
        self.table[self.index(pc)]
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let predicted = self.predict(pc, target);
        self.stats.record(predicted == taken);

        let index = self.index(pc);
        self.table[index] = taken;
    }

    fn reset(&mut self) {
        self.table.fill(false);
        self.stats = BranchStats::default();
    }

    fn stats(&self) -> BranchStats {
        self.stats
    }
}

/// Two-bit bimodal predictor; entries start weakly not taken
pub struct TwoBitPredictor {
    table: Vec<TwoBit>,
    index_mask: u32,
    stats: BranchStats,
}

impl TwoBitPredictor {
    pub fn new(index_bits: u32) -> Self {
        let size = 1usize << index_bits;
        Self {
            table: vec![TwoBit::WeaklyNot; size],
            index_mask: (size - 1) as u32,
            stats: BranchStats::default(),
        }
    }

    fn index(&self, pc: u32) -> usize {
        ((pc >> 2) & self.index_mask) as usize
    }
}

impl BranchPredictor for TwoBitPredictor {
    fn predict(&self, pc: u32, _target: u32) -> bool {
        self.table[self.index(pc)].taken()
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let predicted = self.predict(pc, target);
        self.stats.record(predicted == taken);

        let index = self.index(pc);
        self.table[index] = self.table[index].step(taken);
    }

    fn reset(&mut self) {
        self.table.fill(TwoBit::WeaklyNot);
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
    fn test_one_bit_tracks_last_outcome() {
        let mut p = OneBitPredictor::new(4);
        assert!(!p.predict(0x40, 0));

        p.update(0x40, true, 0);
        assert!(p.predict(0x40, 0));
        p.update(0x40, false, 0);
        assert!(!p.predict(0x40, 0));
    }

    #[test]
    fn test_one_bit_aliasing() {
        // 4 index bits: pcs 0x00 and 0x40 share entry 0
        let mut p = OneBitPredictor::new(4);
        p.update(0x00, true, 0);
        assert!(p.predict(0x40, 0));
    }

    #[test]
    fn test_two_bit_needs_two_misses_to_flip() {
        let mut p = TwoBitPredictor::new(4);

        // WeaklyNot -> WeaklyTaken -> StronglyTaken
        p.update(0x40, true, 0);
        assert!(p.predict(0x40, 0));
        p.update(0x40, true, 0);

        // One not-taken leaves the prediction at taken
        p.update(0x40, false, 0);
        assert!(p.predict(0x40, 0));
        p.update(0x40, false, 0);
        assert!(!p.predict(0x40, 0));
    }

    #[test]
    fn test_two_bit_learning_pattern() {
        // A branch alternating T,T,T,N at one pc; from WeaklyNot the
        // predictor should settle well above 20/32 correct
        let mut p = TwoBitPredictor::new(6);
        let pattern = [true, true, true, false];
        for i in 0..32 {
            p.update(0x100, pattern[i % 4], 0x80);
        }
        let s = p.stats();
        assert_eq!(s.total, 32);
        assert!(s.correct > 20, "correct = {}", s.correct);
    }
}
