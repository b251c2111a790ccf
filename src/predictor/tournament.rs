//! Tournament predictor: a per-pc chooser arbitrating between a gshare and
//! a local-history predictor. The sub-predictors are owned by composition
//! and both are trained on every branch.

use super::BranchPredictor;
use super::BranchStats;
use super::GsharePredictor;
use super::LocalHistoryPredictor;
use super::TwoBit;

pub struct TournamentPredictor {
    global: GsharePredictor,
    local: LocalHistoryPredictor,
    choice: Vec<TwoBit>,
    choice_mask: u32,
    stats: BranchStats,
}

impl TournamentPredictor {
    pub fn new(choice_bits: u32) -> Self {
        let size = 1usize << choice_bits;
        Self {
            global: GsharePredictor::new(12, 12),
            local: LocalHistoryPredictor::new(10, 10),
            // Chooser starts one step into the local half
            choice: vec![TwoBit::WeaklyNot; size],
            choice_mask: (size - 1) as u32,
            stats: BranchStats::default(),
        }
    }

    fn choice_index(&self, pc: u32) -> usize {
        ((pc >> 2) & self.choice_mask) as usize
    }

    /// Statistics of the gshare sub-predictor
    pub fn global_stats(&self) -> BranchStats {
        self.global.stats()
    }

    /// Statistics of the local-history sub-predictor
    pub fn local_stats(&self) -> BranchStats {
        self.local.stats()
    }
}

impl BranchPredictor for TournamentPredictor {
    fn predict(&self, pc: u32, target: u32) -> bool {
        if self.choice[self.choice_index(pc)].taken() {
            self.global.predict(pc, target)
        } else {
            self.local.predict(pc, target)
        }
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let global_prediction = self.global.predict(pc, target);
        let local_prediction = self.local.predict(pc, target);
        let chosen = self.predict(pc, target);

        self.stats.record(chosen == taken);

        // When exactly one sub-predictor was right, nudge the chooser
        // toward it: up for global, down for local
        let index = self.choice_index(pc);
        if global_prediction == taken && local_prediction != taken {
            self.choice[index] = self.choice[index].on_taken();
        } else if local_prediction == taken && global_prediction != taken {
            self.choice[index] = self.choice[index].on_not_taken();
        }

        self.global.update(pc, taken, target);
        self.local.update(pc, taken, target);
    }

    fn reset(&mut self) {
        self.global.reset();
        self.local.reset();
        self.choice.fill(TwoBit::WeaklyNot);
        self.stats = BranchStats::default();
    }

    fn stats(&self) -> BranchStats {
        self.stats
    }
}
