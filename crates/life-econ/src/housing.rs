//! BTO flat ballot.

use life_core::{FlatType, Housing, Player};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::TradeError;

pub const BASE_SUCCESS_PROBABILITY: f64 = 0.25;
pub const BOOSTED_SUCCESS_PROBABILITY: f64 = 0.35;

/// Cash or CPF ordinary balance at which the ballot odds improve.
pub fn boost_threshold() -> Decimal {
    Decimal::new(20_000, 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallotOutcome {
    pub success: bool,
    pub probability: f64,
    pub flat: Option<FlatType>,
}

pub fn success_probability(player: &Player) -> f64 {
    if player.stats().wealth() >= boost_threshold() || player.cpf.ordinary >= boost_threshold() {
        BOOSTED_SUCCESS_PROBABILITY
    } else {
        BASE_SUCCESS_PROBABILITY
    }
}

/// Flat size for the household.
pub fn flat_for_household(size: u8) -> FlatType {
    match size {
        0..=2 => FlatType::TwoRoomFlexi,
        3 => FlatType::ThreeRoom,
        4 => FlatType::FourRoom,
        _ => FlatType::FiveRoom,
    }
}

/// Enter the ballot once. Every attempt is counted; a win moves the player
/// into a flat sized for their household.
pub fn ballot_bto<R: Rng>(player: &Player, rng: &mut R) -> Result<(Player, BallotOutcome), TradeError> {
    if matches!(player.housing.home, Housing::Bto(_)) {
        return Err(TradeError::AlreadyOwnsHome);
    }
    let probability = success_probability(player);
    let success = rng.gen_bool(probability);
    let mut next = player.clone();
    next.housing.ballot_attempts = next.housing.ballot_attempts.saturating_add(1);
    let flat = success.then(|| flat_for_household(next.family.household_size()));
    if let Some(flat) = flat {
        next.housing.home = Housing::Bto(flat);
    }
    info!(
        success,
        probability,
        attempts = next.housing.ballot_attempts,
        "BTO ballot"
    );
    Ok((
        next,
        BallotOutcome {
            success,
            probability,
            flat,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_player;
    use life_core::StatDelta;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn savings_boost_the_odds() {
        let p = test_player();
        assert_eq!(success_probability(&p), BASE_SUCCESS_PROBABILITY);
        let saver = p.clone().with_stats_delta(&StatDelta {
            wealth: Decimal::new(19_000, 0),
            ..StatDelta::default()
        });
        assert_eq!(success_probability(&saver), BOOSTED_SUCCESS_PROBABILITY);
        let mut cpf_saver = p;
        cpf_saver.cpf.ordinary = Decimal::new(20_000, 0);
        assert_eq!(success_probability(&cpf_saver), BOOSTED_SUCCESS_PROBABILITY);
    }

    #[test]
    fn household_size_picks_the_flat() {
        assert_eq!(flat_for_household(1), FlatType::TwoRoomFlexi);
        assert_eq!(flat_for_household(3), FlatType::ThreeRoom);
        assert_eq!(flat_for_household(4), FlatType::FourRoom);
        assert_eq!(flat_for_household(7), FlatType::FiveRoom);
    }

    #[test]
    fn balloting_until_success_then_refuses() {
        let mut p = test_player();
        p.family.married = true;
        p.family.children = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut attempts = 0;
        loop {
            let (next, outcome) = ballot_bto(&p, &mut rng).unwrap();
            attempts += 1;
            assert_eq!(next.housing.ballot_attempts, attempts);
            p = next;
            if outcome.success {
                assert_eq!(outcome.flat, Some(FlatType::ThreeRoom));
                break;
            }
            assert!(attempts < 100);
        }
        assert_eq!(p.housing.home, Housing::Bto(FlatType::ThreeRoom));
        assert_eq!(ballot_bto(&p, &mut rng).unwrap_err(), TradeError::AlreadyOwnsHome);
    }

    #[test]
    fn success_rate_matches_probability() {
        let p = test_player();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let wins = (0..10_000)
            .filter(|_| ballot_bto(&p, &mut rng).unwrap().1.success)
            .count();
        let rate = wins as f64 / 10_000.0;
        assert!((rate - BASE_SUCCESS_PROBABILITY).abs() < 0.02, "{rate}");
    }
}
