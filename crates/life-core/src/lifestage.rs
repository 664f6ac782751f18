//! Life-stage calendar and the transitions between stages.
//!
//! [`advance_calendar`] ages the player by one year and reports a
//! [`Milestone`] when the current stage has run its course;
//! [`resolve_milestone`] performs the automatic transition (sitting the
//! exam where one is due) and [`choose_pathway`] applies the one decision
//! the player makes: where to go after secondary school.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::exams::{self, ExamKind, ExamResult, Pathway, Stream};
use crate::player::{
    CareerRecord, Gender, NationalServiceRecord, Player, PostSecondaryRecord, UniversityRecord,
};
use crate::{ProgressionError, SimConfig};

pub const PRIMARY_YEARS: u8 = 6;
pub const SECONDARY_YEARS: u8 = 4;
pub const NATIONAL_SERVICE_YEARS: u8 = 2;
pub const UNIVERSITY_YEARS: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    PrimarySchool,
    SecondarySchool,
    PostSecondary,
    NationalService,
    University,
    Career,
    Retirement,
}

impl LifeStage {
    /// Stages in which the player draws a daily school allowance.
    pub fn is_schooling(self) -> bool {
        matches!(
            self,
            LifeStage::PrimarySchool
                | LifeStage::SecondarySchool
                | LifeStage::PostSecondary
                | LifeStage::University
        )
    }
}

/// Where the player is in their life.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage: LifeStage,
    /// One-based year within the current stage.
    pub year_in_stage: u8,
    /// Years lived since the game started.
    pub total_years: u32,
    /// Set after secondary school until [`choose_pathway`] is called.
    pub awaiting_pathway: bool,
}

impl StageProgress {
    pub fn start() -> Self {
        Self {
            stage: LifeStage::PrimarySchool,
            year_in_stage: 1,
            total_years: 0,
            awaiting_pathway: false,
        }
    }
}

/// End-of-stage events raised by [`advance_calendar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    PrimaryComplete,
    SecondaryComplete,
    PostSecondaryComplete,
    NationalServiceComplete,
    UniversityComplete,
    Retired,
}

/// Length of the player's current stage in years; `None` for open-ended stages.
pub fn stage_length(player: &Player) -> Option<u8> {
    match player.progress.stage {
        LifeStage::PrimarySchool => Some(PRIMARY_YEARS),
        LifeStage::SecondarySchool => Some(SECONDARY_YEARS + u8::from(player.secondary.sec_five)),
        LifeStage::PostSecondary => player
            .post_secondary
            .as_ref()
            .map(|p| p.pathway.duration_years()),
        LifeStage::NationalService => Some(NATIONAL_SERVICE_YEARS),
        LifeStage::University => Some(UNIVERSITY_YEARS),
        LifeStage::Career | LifeStage::Retirement => None,
    }
}

/// Age the player by one year and report whether the current stage ended.
///
/// The stage itself is left unchanged when a milestone is returned; the
/// caller follows up with [`resolve_milestone`].
pub fn advance_calendar(mut player: Player, config: &SimConfig) -> (Player, Option<Milestone>) {
    player.age = player.age.saturating_add(1);
    player.progress.total_years = player.progress.total_years.saturating_add(1);
    if let Some(ns) = player.national_service.as_mut() {
        if player.progress.stage == LifeStage::NationalService {
            ns.months_served = ns.months_served.saturating_add(12);
        }
    }

    if player.progress.stage == LifeStage::Career {
        if player.age >= config.retirement_age {
            return (player, Some(Milestone::Retired));
        }
        player.progress.year_in_stage = player.progress.year_in_stage.saturating_add(1);
        return (player, None);
    }

    let milestone = match stage_length(&player) {
        Some(len) if player.progress.year_in_stage >= len => match player.progress.stage {
            LifeStage::PrimarySchool => Some(Milestone::PrimaryComplete),
            LifeStage::SecondarySchool => Some(Milestone::SecondaryComplete),
            LifeStage::PostSecondary => Some(Milestone::PostSecondaryComplete),
            LifeStage::NationalService => Some(Milestone::NationalServiceComplete),
            LifeStage::University => Some(Milestone::UniversityComplete),
            LifeStage::Career | LifeStage::Retirement => None,
        },
        _ => None,
    };
    if milestone.is_none() {
        player.progress.year_in_stage = player.progress.year_in_stage.saturating_add(1);
    }
    (player, milestone)
}

fn enter_stage(mut player: Player, stage: LifeStage) -> Player {
    info!(from = ?player.progress.stage, to = ?stage, age = player.age, "stage transition");
    player.progress.stage = stage;
    player.progress.year_in_stage = 1;
    player.progress.awaiting_pathway = false;
    player
}

/// Perform the automatic transition for `milestone`.
///
/// Returns the exam sat along the way, if any. After secondary school the
/// player is left awaiting a pathway choice.
pub fn resolve_milestone(
    mut player: Player,
    milestone: Milestone,
) -> (Player, Option<ExamResult>) {
    match milestone {
        Milestone::PrimaryComplete => {
            let score = exams::compute_exam_score(&player, ExamKind::Psle);
            let stream = exams::psle_placement(score);
            info!(score, ?stream, "PSLE placement");
            player.secondary.psle_score = Some(score);
            player.secondary.stream = Some(stream);
            let player = enter_stage(player, LifeStage::SecondarySchool);
            (
                player,
                Some(ExamResult {
                    kind: ExamKind::Psle,
                    score,
                }),
            )
        }
        Milestone::SecondaryComplete => {
            let stream = player.secondary.stream.unwrap_or(Stream::Express);
            let result = exams::exit_exam(stream, player.secondary.sec_five).map(|kind| {
                ExamResult {
                    kind,
                    score: exams::compute_exam_score(&player, kind),
                }
            });
            if let Some(r) = &result {
                info!(kind = ?r.kind, score = r.score, "exam results released");
            }
            player.secondary.exam = result;
            player.progress.awaiting_pathway = true;
            (player, result)
        }
        Milestone::PostSecondaryComplete => {
            if let Some(ps) = player.post_secondary.as_mut() {
                ps.graduated = true;
            }
            (after_post_secondary(player), None)
        }
        Milestone::NationalServiceComplete => {
            let qualified = player
                .post_secondary
                .as_ref()
                .map_or(false, |p| {
                    p.graduated && matches!(p.pathway, Pathway::JuniorCollege | Pathway::Polytechnic)
                });
            if qualified {
                (enter_university(player), None)
            } else {
                (enter_career(player), None)
            }
        }
        Milestone::UniversityComplete => {
            let academic = player.stats().academic_skill();
            if let Some(u) = player.university.as_mut() {
                u.gpa = (2.0 + academic * 0.03).min(5.0);
                u.graduated = true;
            }
            (enter_career(player), None)
        }
        Milestone::Retired => (enter_stage(player, LifeStage::Retirement), None),
    }
}

fn after_post_secondary(player: Player) -> Player {
    if player.gender == Gender::Male {
        let vocation = if player.stats().health() >= 75.0 {
            "Infantry"
        } else {
            "Logistics"
        };
        let mut player = enter_stage(player, LifeStage::NationalService);
        player.national_service = Some(NationalServiceRecord {
            vocation: vocation.to_string(),
            months_served: 0,
        });
        return player;
    }
    let university_bound = player.post_secondary.as_ref().map_or(false, |p| {
        matches!(p.pathway, Pathway::JuniorCollege | Pathway::Polytechnic)
    });
    if university_bound {
        enter_university(player)
    } else {
        enter_career(player)
    }
}

fn enter_university(player: Player) -> Player {
    let academic = player.stats().academic_skill();
    let course = if academic >= 80.0 {
        "Computer Science"
    } else if academic >= 60.0 {
        "Business"
    } else {
        "Arts and Social Sciences"
    };
    let mut player = enter_stage(player, LifeStage::University);
    player.university = Some(UniversityRecord {
        course: course.to_string(),
        gpa: 0.0,
        graduated: false,
    });
    player
}

/// Starting occupation and monthly salary for the highest qualification held.
pub fn starting_job(player: &Player) -> (&'static str, Decimal) {
    if player.university.as_ref().map_or(false, |u| u.graduated) {
        return ("Executive", Decimal::new(4500, 0));
    }
    match player.post_secondary.as_ref().filter(|p| p.graduated).map(|p| p.pathway) {
        Some(Pathway::Polytechnic) => ("Associate Engineer", Decimal::new(3200, 0)),
        Some(Pathway::JuniorCollege) => ("Administrative Officer", Decimal::new(2500, 0)),
        Some(Pathway::Ite) => ("Technician", Decimal::new(2200, 0)),
        _ => ("Retail Assistant", Decimal::new(1800, 0)),
    }
}

fn enter_career(player: Player) -> Player {
    let (occupation, salary) = starting_job(&player);
    let mut player = enter_stage(player, LifeStage::Career);
    player.career = Some(CareerRecord {
        occupation: occupation.to_string(),
        monthly_salary: salary,
        years_employed: 0,
    });
    player
}

/// Commit the post-secondary choice. Only valid while a decision is pending
/// and only for pathways the exam result unlocked.
pub fn choose_pathway(mut player: Player, pathway: Pathway) -> Result<Player, ProgressionError> {
    if !player.progress.awaiting_pathway {
        return Err(ProgressionError::NoDecisionPending);
    }
    let stream = player.secondary.stream.unwrap_or(Stream::Express);
    let eligible = exams::eligible_pathways(player.secondary.exam.as_ref(), stream);
    if !eligible.contains(&pathway) {
        return Err(ProgressionError::PathwayNotEligible(pathway));
    }
    info!(?pathway, "pathway chosen");
    match pathway {
        Pathway::SecondaryFive => {
            player.secondary.sec_five = true;
            player.progress.year_in_stage = player.progress.year_in_stage.saturating_add(1);
            player.progress.awaiting_pathway = false;
            Ok(player)
        }
        Pathway::Work => Ok(enter_career(player)),
        _ => {
            player.post_secondary = Some(PostSecondaryRecord {
                pathway,
                graduated: false,
            });
            Ok(enter_stage(player, LifeStage::PostSecondary))
        }
    }
}
