#![deny(warnings)]

//! Session facade over the life simulation.
//!
//! [`LifeEngine`] owns the configuration and the one seeded RNG, so a run is
//! reproducible from `SimConfig::rng_seed` alone. Player snapshots are passed
//! in and handed back; the engine keeps no player state of its own.

use life_core::lifestage::{self, advance_calendar, resolve_milestone};
use life_core::progression::{self, point_budget};
use life_core::{
    achievements, exams, selector, switch_cca, AchievementId, Allocation, CcaKind, EventId, ExamKind,
    ExamResult, LifeStage, MealChoice, Milestone, NewPlayer, Pathway, PersonalityTrait, Player,
    ProgressionError, SimConfig, StatDelta, Stream, ValidationError, YearPlan,
};
use life_econ::{cpf, BallotOutcome, PortfolioSummary, TradeError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything that happened in one call to [`LifeEngine::advance_year`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct YearReport {
    pub player: Player,
    /// Stat change from the year's allocation, meals and tuition.
    pub delta: StatDelta,
    pub milestone: Option<Milestone>,
    pub exam: Option<ExamResult>,
    pub unlocked: Vec<AchievementId>,
}

pub struct LifeEngine {
    config: SimConfig,
    rng: ChaCha8Rng,
}

impl LifeEngine {
    pub fn new(config: SimConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn create_player(&mut self, new: NewPlayer) -> Result<Player, ValidationError> {
        let player = life_core::create_player(new, &mut self.rng)?;
        info!(name = %player.name, ses = ?player.ses, allowance = %player.daily_allowance, "player created");
        Ok(player)
    }

    /// Focus points the player must spend this year.
    pub fn point_budget(&self, player: &Player) -> u8 {
        point_budget(player.progress.stage, &self.config)
    }

    /// Play one year: allocation, income for working adults, the calendar
    /// (with any exam or stage change it triggers) and achievements.
    pub fn advance_year(&mut self, player: &Player, plan: &YearPlan) -> Result<YearReport, ProgressionError> {
        if player.progress.awaiting_pathway {
            return Err(ProgressionError::DecisionPending);
        }
        plan.allocation.validate(self.point_budget(player))?;

        let mut next = player.clone();
        if next.progress.stage == LifeStage::Career {
            next = self.work_year(next);
        }
        let (next, delta) = progression::advance_year(next, plan, &self.config);
        let (next, milestone) = advance_calendar(next, &self.config);
        let (next, exam) = match milestone {
            Some(m) => resolve_milestone(next, m),
            None => (next, None),
        };
        let (next, unlocked) = self.unlock(next);
        Ok(YearReport {
            player: next,
            delta,
            milestone,
            exam,
            unlocked,
        })
    }

    /// Twelve months of take-home pay and CPF, then the yearly raise.
    fn work_year(&self, player: Player) -> Player {
        let Some(salary) = player.career.as_ref().map(|c| c.monthly_salary) else {
            return player;
        };
        let take_home = cpf::take_home_pay(salary, player.age) * Decimal::from(12);
        let mut player = cpf::accumulate_cpf(player, 12).with_stats_delta(&StatDelta {
            wealth: take_home,
            work_experience: 1.0,
            ..StatDelta::default()
        });
        let raise = Decimal::ONE + self.config.salary_raise_pct / Decimal::from(100);
        if let Some(career) = player.career.as_mut() {
            career.monthly_salary = (career.monthly_salary * raise).round_dp(2);
            career.years_employed += 1;
        }
        player
    }

    fn unlock(&self, player: Player) -> (Player, Vec<AchievementId>) {
        let before = player.achievements.clone();
        let year = player.progress.total_years;
        let player = achievements::evaluate(player, year);
        let unlocked = player
            .achievements
            .iter()
            .filter(|a| a.unlocked && !before.is_unlocked(a.id))
            .map(|a| a.id)
            .collect();
        (player, unlocked)
    }

    pub fn select_random_event(&mut self, player: &Player) -> Option<EventId> {
        selector::select_event(player, life_core::events::catalog(), &mut self.rng).map(|e| e.id)
    }

    pub fn apply_event_effects(&mut self, player: Player, id: EventId) -> Player {
        selector::apply_event_by_id(player, id, &mut self.rng)
    }

    /// Unlock achievements, stamped with the player's cumulative year.
    pub fn evaluate_achievements(&self, player: Player) -> Player {
        self.unlock(player).0
    }

    pub fn compute_exam_score(&self, player: &Player, kind: ExamKind) -> f64 {
        exams::compute_exam_score(player, kind)
    }

    pub fn eligible_pathways(&self, result: Option<&ExamResult>, stream: Stream) -> Vec<Pathway> {
        exams::eligible_pathways(result, stream)
    }

    pub fn choose_pathway(&self, player: &Player, pathway: Pathway) -> Result<Player, ProgressionError> {
        lifestage::choose_pathway(player.clone(), pathway)
    }

    pub fn switch_cca(&self, player: Player, kind: CcaKind) -> Player {
        switch_cca(player, kind)
    }

    pub fn buy_asset(&self, player: &Player, item_id: &str, quantity: u32) -> Result<Player, TradeError> {
        life_econ::buy_asset(player, item_id, quantity).map_err(rejected)
    }

    pub fn sell_asset(&self, player: &Player, asset_id: &str, quantity: Option<u32>) -> Result<Player, TradeError> {
        life_econ::sell_asset(player, asset_id, quantity).map_err(rejected)
    }

    pub fn buy_liability(&self, player: &Player, item_id: &str) -> Result<Player, TradeError> {
        life_econ::buy_liability(player, item_id).map_err(rejected)
    }

    pub fn accumulate_cpf(&self, player: Player, months: u32) -> Player {
        life_econ::accumulate_cpf(player, months)
    }

    pub fn apply_annual_returns(&mut self, player: Player) -> Player {
        life_econ::apply_annual_returns(player, &mut self.rng)
    }

    pub fn process_monthly_payments(&self, player: Player) -> Player {
        life_econ::process_monthly_payments(player)
    }

    pub fn ballot_bto(&mut self, player: &Player) -> Result<(Player, BallotOutcome), TradeError> {
        life_econ::ballot_bto(player, &mut self.rng).map_err(rejected)
    }

    pub fn summarize(&self, player: &Player) -> PortfolioSummary {
        life_econ::summarize(player)
    }

    /// Play `years` years with the [`Autopilot`] policy.
    pub fn run_years(&mut self, player: Player, years: u32, pilot: &Autopilot) -> Result<Player, ProgressionError> {
        let mut player = player;
        for _ in 0..years {
            player = pilot.prepare(self, player)?;
            let plan = pilot.plan_for(self.point_budget(&player));
            let report = self.advance_year(&player, &plan)?;
            player = report.player;
            if let Some(id) = self.select_random_event(&player) {
                player = self.apply_event_effects(player, id);
            }
            if player.progress.stage == LifeStage::Career {
                player = pilot.manage_money(self, player);
            }
            player = self.evaluate_achievements(player);
            info!(
                age = player.age,
                grade = %player.grade(),
                wealth = %player.stats().wealth(),
                "year complete"
            );
        }
        Ok(player)
    }
}

fn rejected(err: TradeError) -> TradeError {
    warn!(%err, "purchase rejected");
    err
}

/// Fixed decision policy used to play a whole life unattended.
#[derive(Clone, Debug)]
pub struct Autopilot {
    pub meal: MealChoice,
    pub tuition_subjects: u8,
    /// Cash kept aside before investing the rest.
    pub cash_buffer: Decimal,
    /// Age from which a single player enters the BTO ballot.
    pub ballot_age: u8,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            meal: MealChoice::Healthy,
            tuition_subjects: 1,
            cash_buffer: Decimal::new(10_000, 0),
            ballot_age: 30,
        }
    }
}

impl Autopilot {
    /// Spread the budget 4:3:3 over academics, CCA and social life.
    pub fn plan_for(&self, budget: u8) -> YearPlan {
        // Shares never exceed `budget`, so they fit back into u8.
        let share = |tenths: u16| (u16::from(budget) * tenths / 10) as u8;
        let academic = share(4);
        let cca = share(3);
        YearPlan {
            allocation: Allocation::new(academic, cca, budget - academic - cca),
            meal: self.meal,
            tuition_subjects: self.tuition_subjects,
        }
    }

    fn prepare(&self, engine: &LifeEngine, player: Player) -> Result<Player, ProgressionError> {
        let mut player = player;
        if player.cca.is_none() && player.progress.stage == LifeStage::PrimarySchool {
            let kind = if player.has_trait(PersonalityTrait::Athletic) {
                CcaKind::Football
            } else if player.has_trait(PersonalityTrait::Creative) {
                CcaKind::Band
            } else {
                CcaKind::Robotics
            };
            player = engine.switch_cca(player, kind);
        }
        if player.progress.awaiting_pathway {
            let stream = player.secondary.stream.unwrap_or(Stream::Express);
            let options = engine.eligible_pathways(player.secondary.exam.as_ref(), stream);
            let pick = options.first().copied().unwrap_or(Pathway::Work);
            player = engine.choose_pathway(&player, pick)?;
        }
        Ok(player)
    }

    fn manage_money(&self, engine: &mut LifeEngine, player: Player) -> Player {
        let mut player = player;
        for _ in 0..12 {
            player = engine.process_monthly_payments(player);
        }
        player = engine.apply_annual_returns(player);

        let spare = player.stats().wealth() - self.cash_buffer;
        if let Some(item) = life_econ::find_item("sti-etf") {
            if spare >= item.min_investment {
                let quantity = (spare / item.price).floor().to_u32().unwrap_or(u32::MAX);
                match engine.buy_asset(&player, item.id, quantity) {
                    Ok(next) => player = next,
                    Err(err) => debug!(%err, "autopilot skipped investing"),
                }
            }
        }

        let wants_home = player.family.married || player.age >= self.ballot_age;
        if wants_home && player.housing.home == life_core::Housing::WithParents {
            if let Ok((next, _)) = engine.ballot_bto(&player) {
                player = next;
            }
        }
        player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{Gender, SesClass};
    use proptest::prelude::*;

    fn new_player(ses: SesClass) -> NewPlayer {
        NewPlayer {
            name: "Aisyah".into(),
            avatar: "tiger".into(),
            gender: Gender::Female,
            ses,
            traits: vec![PersonalityTrait::Disciplined],
        }
    }

    fn balanced() -> YearPlan {
        Autopilot::default().plan_for(10)
    }

    #[test]
    fn autopilot_plans_spend_large_budgets_exactly() {
        let pilot = Autopilot::default();
        for budget in [0u8, 10, 64, 70, 255] {
            let plan = pilot.plan_for(budget);
            assert_eq!(plan.allocation.total(), u32::from(budget));
            assert!(plan.allocation.validate(budget).is_ok());
        }
        let plan = pilot.plan_for(70);
        assert_eq!(plan.allocation, Allocation::new(28, 21, 21));
    }

    #[test]
    fn large_configured_budget_runs_on_autopilot() {
        let config = SimConfig {
            general_point_budget: 70,
            secondary_point_budget: 70,
            ..SimConfig::default()
        };
        let mut engine = LifeEngine::new(config);
        let p = engine.create_player(new_player(SesClass::Middle)).unwrap();
        let p = engine.run_years(p, 8, &Autopilot::default()).unwrap();
        assert_eq!(p.progress.total_years, 8);
    }

    #[test]
    fn advance_rejects_bad_allocation_without_touching_player() {
        let mut engine = LifeEngine::new(SimConfig::default());
        let p = engine.create_player(new_player(SesClass::Middle)).unwrap();
        let plan = YearPlan {
            allocation: Allocation::new(5, 5, 5),
            ..balanced()
        };
        let err = engine.advance_year(&p, &plan).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::Invalid(ValidationError::AllocationBudget {
                expected: 10,
                actual: 15
            })
        );
        assert_eq!(p.progress.total_years, 0);
    }

    #[test]
    fn primary_school_runs_into_psle() {
        let mut engine = LifeEngine::new(SimConfig::default());
        let mut p = engine.create_player(new_player(SesClass::Upper)).unwrap();
        let mut milestones = Vec::new();
        for _ in 0..6 {
            let report = engine.advance_year(&p, &balanced()).unwrap();
            milestones.extend(report.milestone);
            if let Some(exam) = report.exam {
                assert_eq!(exam.kind, ExamKind::Psle);
            }
            p = report.player;
        }
        assert_eq!(milestones, vec![Milestone::PrimaryComplete]);
        assert_eq!(p.progress.stage, LifeStage::SecondarySchool);
        assert_eq!(p.age, 13);
        assert!(p.secondary.stream.is_some());
    }

    #[test]
    fn pending_pathway_blocks_the_year() {
        let mut engine = LifeEngine::new(SimConfig::default());
        let mut p = engine.create_player(new_player(SesClass::Middle)).unwrap();
        p.progress.awaiting_pathway = true;
        assert_eq!(
            engine.advance_year(&p, &balanced()).unwrap_err(),
            ProgressionError::DecisionPending
        );
    }

    #[test]
    fn working_year_pays_salary_and_cpf() {
        let mut engine = LifeEngine::new(SimConfig::default());
        let mut p = engine.create_player(new_player(SesClass::Middle)).unwrap();
        p.age = 30;
        p.progress.stage = LifeStage::Career;
        p.career = Some(life_core::player::CareerRecord {
            occupation: "Executive".into(),
            monthly_salary: Decimal::new(5000, 0),
            years_employed: 0,
        });
        let report = engine.advance_year(&p, &balanced()).unwrap();
        let next = report.player;
        // 12 x (5000 - 1000) take-home, less 365 x 5 on meals
        let expected = p.stats().wealth() + Decimal::new(48_000, 0) - Decimal::new(1825, 0);
        assert_eq!(next.stats().wealth(), expected);
        assert_eq!(next.cpf.total(), Decimal::new(1850 * 12, 0));
        let career = next.career.as_ref().unwrap();
        assert_eq!(career.monthly_salary, Decimal::new(5150, 0));
        assert_eq!(career.years_employed, 1);
        assert_eq!(next.stats().work_experience(), 1.0);
    }

    #[test]
    fn same_seed_same_life() {
        let run = || {
            let mut engine = LifeEngine::new(SimConfig {
                rng_seed: 99,
                ..SimConfig::default()
            });
            let p = engine.create_player(new_player(SesClass::Lower)).unwrap();
            engine.run_years(p, 30, &Autopilot::default()).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn autopilot_reaches_working_life() {
        let mut engine = LifeEngine::new(SimConfig::default());
        let p = engine.create_player(new_player(SesClass::Upper)).unwrap();
        let p = engine.run_years(p, 25, &Autopilot::default()).unwrap();
        assert_eq!(p.progress.stage, LifeStage::Career);
        assert!(p.career.is_some());
        assert!(p.cpf.total() > Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn any_seed_keeps_the_player_valid(seed in 0u64..64, years in 1u32..60) {
            let mut engine = LifeEngine::new(SimConfig { rng_seed: seed, ..SimConfig::default() });
            let p = engine.create_player(new_player(SesClass::Middle)).unwrap();
            let p = engine.run_years(p, years, &Autopilot::default()).unwrap();
            prop_assert_eq!(life_core::validate_player(&p), Ok(()));
            prop_assert_eq!(p.progress.total_years, years);
            let unlocked_years: Vec<u32> = p.achievements.iter().filter_map(|a| a.unlocked_year).collect();
            prop_assert!(unlocked_years.iter().all(|y| *y <= years));
        }
    }
}
