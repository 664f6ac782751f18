//! Examination scoring and pathway eligibility.
//!
//! All formulas are deterministic functions of the stat vector and a few
//! auxiliary choices. O-Level and N-Level scores follow the L1R5 / EMB3
//! convention: lower is better.

use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::stats::StatVector;

/// PSLE placement thresholds, highest first.
pub const PSLE_IP_THRESHOLD: f64 = 90.0;
pub const PSLE_EXPRESS_THRESHOLD: f64 = 70.0;
pub const PSLE_NA_THRESHOLD: f64 = 50.0;

/// O-Level cut-offs (inclusive, lower is better).
pub const O_LEVEL_JC_CUTOFF: f64 = 20.0;
pub const O_LEVEL_POLY_CUTOFF: f64 = 26.0;
pub const O_LEVEL_ITE_CUTOFF: f64 = 35.0;

/// N-Level cut-offs (inclusive, lower is better).
pub const N_LEVEL_SEC_FIVE_CUTOFF: f64 = 11.0;
pub const N_LEVEL_NA_ITE_CUTOFF: f64 = 19.0;
pub const N_LEVEL_NT_ITE_CUTOFF: f64 = 15.0;

/// Secondary-school streams assigned after the PSLE.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stream {
    IntegratedProgramme,
    Express,
    NormalAcademic,
    NormalTechnical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamKind {
    Psle,
    OLevel,
    NLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub kind: ExamKind,
    pub score: f64,
}

/// Post-secondary options, ordered from most to least selective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pathway {
    JuniorCollege,
    Polytechnic,
    SecondaryFive,
    Ite,
    Work,
}

impl Pathway {
    pub fn label(self) -> &'static str {
        match self {
            Pathway::JuniorCollege => "Junior College",
            Pathway::Polytechnic => "Polytechnic",
            Pathway::SecondaryFive => "Secondary 5",
            Pathway::Ite => "ITE",
            Pathway::Work => "Work",
        }
    }

    /// Years spent in the pathway before graduating.
    pub fn duration_years(self) -> u8 {
        match self {
            Pathway::JuniorCollege => 2,
            Pathway::Polytechnic => 3,
            Pathway::SecondaryFive => 1,
            Pathway::Ite => 2,
            Pathway::Work => 0,
        }
    }
}

/// PSLE composite: academic skill plus a tenth of the top CCA skill.
pub fn psle_score(stats: &StatVector, top_cca_skill: f64) -> f64 {
    stats.academic_skill() + 0.1 * top_cca_skill
}

/// Map a PSLE composite onto a stream by descending thresholds.
pub fn psle_placement(score: f64) -> Stream {
    if score >= PSLE_IP_THRESHOLD {
        Stream::IntegratedProgramme
    } else if score >= PSLE_EXPRESS_THRESHOLD {
        Stream::Express
    } else if score >= PSLE_NA_THRESHOLD {
        Stream::NormalAcademic
    } else {
        Stream::NormalTechnical
    }
}

/// L1R5-style O-Level aggregate in `[6, 45]`.
pub fn o_level_score(stats: &StatVector, tuition_count: u8, cca_skill: f64) -> f64 {
    let health = stats.health();
    let stress = stats.stress();
    let mut score = 45.0 - 0.4 * stats.academic_skill() - 2.0 * f64::from(tuition_count);
    if health > 70.0 {
        score -= 2.0;
    }
    if health > 85.0 {
        score -= 1.0;
    }
    if stats.leadership() > 60.0 {
        score -= 2.0;
    }
    if cca_skill > 60.0 {
        score -= 1.0;
    }
    if cca_skill > 80.0 {
        score -= 1.0;
    }
    if stress > 70.0 {
        score += 3.0;
    }
    if stress > 85.0 {
        score += 2.0;
    }
    score.clamp(6.0, 45.0).round()
}

/// EMB3-style N-Level aggregate in `[4, 20]`.
pub fn n_level_score(stats: &StatVector, tuition_count: u8) -> f64 {
    let mut score = 20.0 - 0.3 * stats.academic_skill() - 1.5 * f64::from(tuition_count);
    if stats.stress() > 70.0 {
        score += 2.0;
    }
    score.clamp(4.0, 20.0).round()
}

/// Score the player's current snapshot for `kind`.
pub fn compute_exam_score(player: &Player, kind: ExamKind) -> f64 {
    let stats = player.stats();
    match kind {
        ExamKind::Psle => psle_score(stats, player.cca_skill()),
        ExamKind::OLevel => o_level_score(stats, player.tuition_subjects, player.cca_skill()),
        ExamKind::NLevel => n_level_score(stats, player.tuition_subjects),
    }
}

/// The exam a student sits at the end of secondary school, if any.
pub fn exit_exam(stream: Stream, sec_five: bool) -> Option<ExamKind> {
    match stream {
        Stream::IntegratedProgramme => None,
        Stream::Express => Some(ExamKind::OLevel),
        Stream::NormalAcademic if sec_five => Some(ExamKind::OLevel),
        Stream::NormalAcademic | Stream::NormalTechnical => Some(ExamKind::NLevel),
    }
}

/// Pathways unlocked by an exam result, most selective first. `Work` is
/// always available; Integrated Programme students go straight to JC.
pub fn eligible_pathways(result: Option<&ExamResult>, stream: Stream) -> Vec<Pathway> {
    if stream == Stream::IntegratedProgramme {
        return vec![Pathway::JuniorCollege];
    }
    let mut out = Vec::new();
    match result {
        Some(ExamResult {
            kind: ExamKind::OLevel,
            score,
        }) => {
            if *score <= O_LEVEL_JC_CUTOFF {
                out.push(Pathway::JuniorCollege);
            }
            if *score <= O_LEVEL_POLY_CUTOFF {
                out.push(Pathway::Polytechnic);
            }
            if *score <= O_LEVEL_ITE_CUTOFF {
                out.push(Pathway::Ite);
            }
        }
        Some(ExamResult {
            kind: ExamKind::NLevel,
            score,
        }) => match stream {
            Stream::NormalAcademic => {
                if *score <= N_LEVEL_SEC_FIVE_CUTOFF {
                    out.push(Pathway::SecondaryFive);
                }
                if *score <= N_LEVEL_NA_ITE_CUTOFF {
                    out.push(Pathway::Ite);
                }
            }
            _ => {
                if *score <= N_LEVEL_NT_ITE_CUTOFF {
                    out.push(Pathway::Ite);
                }
            }
        },
        Some(ExamResult {
            kind: ExamKind::Psle,
            ..
        })
        | None => {}
    }
    out.push(Pathway::Work);
    out
}
