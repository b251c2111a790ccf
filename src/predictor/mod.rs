//! Branch prediction subsystem: static policies, bimodal tables, gshare,
//! local-history and a tournament hybrid, behind one capability set.

pub mod bimodal;
pub mod gshare;
pub mod local;
pub mod tournament;

pub use bimodal::OneBitPredictor;
pub use bimodal::TwoBitPredictor;
pub use gshare::GsharePredictor;
pub use local::LocalHistoryPredictor;
pub use tournament::TournamentPredictor;

/// Prediction statistics, advanced only by `update`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BranchStats {
    pub total: u64,
    pub correct: u64,
    pub mispredicted: u64,
}

impl BranchStats {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        } else {
            self.mispredicted += 1;
        }
    }

    /// Fraction of correct predictions, 0.0 when nothing was recorded
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Two-bit saturating counter
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TwoBit {
    StronglyNot = 0,
    WeaklyNot = 1,
    WeaklyTaken = 2,
    StronglyTaken = 3,
}

impl TwoBit {
    /// Taken is predicted in the upper half of the state space
    pub fn taken(self) -> bool {
        self >= TwoBit::WeaklyTaken
    }

    /// Saturating increment toward StronglyTaken
    pub fn on_taken(self) -> Self {
        match self {
            TwoBit::StronglyNot => TwoBit::WeaklyNot,
            TwoBit::WeaklyNot => TwoBit::WeaklyTaken,
            TwoBit::WeaklyTaken => TwoBit::StronglyTaken,
            TwoBit::StronglyTaken => TwoBit::StronglyTaken,
        }
    }

    /// Saturating decrement toward StronglyNot
    pub fn on_not_taken(self) -> Self {
        match self {
            TwoBit::StronglyTaken => TwoBit::WeaklyTaken,
            TwoBit::WeaklyTaken => TwoBit::WeaklyNot,
            TwoBit::WeaklyNot => TwoBit::StronglyNot,
            TwoBit::StronglyNot => TwoBit::StronglyNot,
        }
    }

    pub fn step(self, taken: bool) -> Self {
        if taken {
            self.on_taken()
        } else {
            self.on_not_taken()
        }
    }
}

/// Capability set shared by every predictor variant.
///
/// `predict` is a pure query; `update` recomputes the prediction for the
/// given pc before advancing any state, so statistics never depend on a
/// cached earlier answer.
pub trait BranchPredictor {
    fn predict(&self, pc: u32, target: u32) -> bool;
    fn update(&mut self, pc: u32, taken: bool, target: u32);
    fn reset(&mut self);
    fn stats(&self) -> BranchStats;
}

/// Constant-answer predictor (static taken / static not-taken)
pub struct StaticPredictor {
    prediction: bool,
    stats: BranchStats,
}

impl StaticPredictor {
    pub fn new(prediction: bool) -> Self {
        Self { prediction, stats: BranchStats::default() }
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict(&self, _pc: u32, _target: u32) -> bool {
        self.prediction
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let predicted = self.predict(pc, target);
        self.stats.record(predicted == taken);
    }

    fn reset(&mut self) {
        self.stats = BranchStats::default();
    }

    fn stats(&self) -> BranchStats {
        self.stats
    }
}

/// Backward taken, forward not taken
pub struct BtfnPredictor {
    stats: BranchStats,
}

impl BtfnPredictor {
    pub fn new() -> Self {
        Self { stats: BranchStats::default() }
    }
}

impl Default for BtfnPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor for BtfnPredictor {
    fn predict(&self, pc: u32, target: u32) -> bool {
        target < pc
    }

    fn update(&mut self, pc: u32, taken: bool, target: u32) {
        let predicted = self.predict(pc, target);
        self.stats.record(predicted == taken);
    }

    fn reset(&mut self) {
        self.stats = BranchStats::default();
    }

    fn stats(&self) -> BranchStats {
        self.stats
    }
}

/// Predictor variant selector with its parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictorKind {
    StaticNotTaken,
    StaticTaken,
    Btfn,
    OneBit { index_bits: u32 },
    TwoBitSat { index_bits: u32 },
    Gshare { history_bits: u32, index_bits: u32 },
    LocalHistory { local_bits: u32, pattern_bits: u32 },
    Tournament { choice_bits: u32 },
}

impl Default for PredictorKind {
    fn default() -> Self {
        PredictorKind::StaticNotTaken
    }
}

/// Builds a predictor variant from its tag and parameters
pub fn build(kind: PredictorKind) -> Box<dyn BranchPredictor> {
    match kind {
        PredictorKind::StaticNotTaken => Box::new(StaticPredictor::new(false)),
        PredictorKind::StaticTaken => Box::new(StaticPredictor::new(true)),
        PredictorKind::Btfn => Box::new(BtfnPredictor::new()),
        PredictorKind::OneBit { index_bits } => Box::new(OneBitPredictor::new(index_bits)),
        PredictorKind::TwoBitSat { index_bits } => Box::new(TwoBitPredictor::new(index_bits)),
        PredictorKind::Gshare { history_bits, index_bits } => {
            Box::new(GsharePredictor::new(history_bits, index_bits))
        }
        PredictorKind::LocalHistory { local_bits, pattern_bits } => {
            Box::new(LocalHistoryPredictor::new(local_bits, pattern_bits))
        }
        PredictorKind::Tournament { choice_bits } => {
            Box::new(TournamentPredictor::new(choice_bits))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_predictors() {
        let mut nt = StaticPredictor::new(false);
        nt.update(0x40, true, 0x80);
        nt.update(0x40, false, 0x80);
        assert_eq!(nt.stats(), BranchStats { total: 2, correct: 1, mispredicted: 1 });

        let t = StaticPredictor::new(true);
        assert!(t.predict(0x40, 0x80));
    }

    #[test]
    fn test_btfn_direction() {
        let p = BtfnPredictor::new();
        assert!(p.predict(0x100, 0x0c0)); // backward
        assert!(!p.predict(0x100, 0x140)); // forward
    }

    #[test]
    fn test_two_bit_counter_fsm() {
        use TwoBit::*;

        // Transitions match the four-state FSM
        assert_eq!(WeaklyNot.on_taken(), WeaklyTaken);
        assert_eq!(WeaklyTaken.on_taken(), StronglyTaken);
        assert_eq!(StronglyTaken.on_not_taken(), WeaklyTaken);
        assert_eq!(WeaklyTaken.on_not_taken(), WeaklyNot);
        assert_eq!(WeaklyNot.on_not_taken(), StronglyNot);

        // Saturation at both ends
        assert_eq!(StronglyTaken.on_taken(), StronglyTaken);
        assert_eq!(StronglyNot.on_not_taken(), StronglyNot);

        assert!(WeaklyTaken.taken() && StronglyTaken.taken());
        assert!(!WeaklyNot.taken() && !StronglyNot.taken());
    }

    #[test]
    fn test_stats_identities() {
        let mut p = BtfnPredictor::new();
        for i in 0..17u32 {
            p.update(0x100, i % 3 == 0, 0x0c0);
        }
        let s = p.stats();
        assert_eq!(s.correct + s.mispredicted, s.total);
        assert!((s.accuracy() - s.correct as f64 / s.total as f64).abs() < 1e-12);
    }

    #[test]
    fn test_factory_dispatch() {
        let p = build(PredictorKind::StaticTaken);
        assert!(p.predict(0, 4));
        let p = build(PredictorKind::TwoBitSat { index_bits: 4 });
        assert!(!p.predict(0, 4)); // starts weakly not taken
        let p = build(PredictorKind::Tournament { choice_bits: 4 });
        assert_eq!(p.stats().total, 0);
    }
}
