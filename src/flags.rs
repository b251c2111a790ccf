use std::path::PathBuf;
use std::str::FromStr;

use crate::predictor::PredictorKind;

xflags::xflags! {
    /// Cycle-accurate MIPS-I pipeline simulator.
    cmd mipsim {
        /// Path to the program image (one 32-bit hex word per line).
        required program: PathBuf

        /// Step cycle by cycle, printing the machine state between cycles.
        optional --step

        /// Enable the five-stage pipeline model.
        optional --pipeline

        /// Report branch prediction statistics after the run.
        optional --branch-pred

        /// Branch predictor type:
        /// static|1bit|2bit|gshare|local|tournament
        optional --pred-type kind: PredArg

        /// Print detailed per-cycle information while simulating.
        optional -v, --verbose
    }
}

#[derive(Debug)]
pub enum PredArg {
    Static,
    OneBit,
    TwoBit,
    Gshare,
    Local,
    Tournament,
}

impl FromStr for PredArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(PredArg::Static),
            "1bit" => Ok(PredArg::OneBit),
            "2bit" => Ok(PredArg::TwoBit),
            "gshare" => Ok(PredArg::Gshare),
            "local" => Ok(PredArg::Local),
            "tournament" => Ok(PredArg::Tournament),
            _ => Err(format!(
                "Invalid predictor type: '{}'. Expected one of static|1bit|2bit|gshare|local|tournament.",
                s
            )),
        }
    }
}

impl From<PredArg> for PredictorKind {
    fn from(val: PredArg) -> Self {
        match val {
            PredArg::Static => PredictorKind::StaticNotTaken,
            PredArg::OneBit => PredictorKind::OneBit { index_bits: 10 },
            PredArg::TwoBit => PredictorKind::TwoBitSat { index_bits: 10 },
            PredArg::Gshare => PredictorKind::Gshare { history_bits: 10, index_bits: 10 },
            PredArg::Local => PredictorKind::LocalHistory { local_bits: 10, pattern_bits: 10 },
            PredArg::Tournament => PredictorKind::Tournament { choice_bits: 10 },
        }
    }
}
