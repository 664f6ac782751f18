//! Eligibility filtering and weighted random selection over the event catalog.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::events::{self, EventDefinition, EventId, FamilyChange};
use crate::player::Player;
use crate::stats::StatDelta;

/// Catalog entries whose predicates hold for `player`, minus once-only
/// events already in the history. Catalog order is preserved.
pub fn eligible_events<'a>(player: &Player, catalog: &'a [EventDefinition]) -> Vec<&'a EventDefinition> {
    catalog
        .iter()
        .filter(|e| e.eligibility.admits(player))
        .filter(|e| !(e.id.is_once_only() && player.event_history.contains(&e.id)))
        .collect()
}

/// Pick one eligible event with probability proportional to its weight.
///
/// `None` means nothing happens this period.
pub fn select_event<'a, R: Rng>(
    player: &Player,
    catalog: &'a [EventDefinition],
    rng: &mut R,
) -> Option<&'a EventDefinition> {
    let eligible = eligible_events(player, catalog);
    let total: f64 = eligible.iter().map(|e| e.weight.max(0.0)).sum();
    if eligible.is_empty() || total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen_range(0.0..total);
    for &event in &eligible {
        roll -= event.weight.max(0.0);
        if roll <= 0.0 {
            debug!(event = ?event.id, candidates = eligible.len(), "event selected");
            return Some(event);
        }
    }
    // Float residue can leave a sliver past the last weight.
    eligible.last().copied()
}

/// The delta an event applies, rolled fresh when the event has an override.
pub fn resolve_effect<R: Rng>(event: &EventDefinition, rng: &mut R) -> StatDelta {
    match events::effect_override(event.id) {
        Some(generate) => generate(event, rng as &mut dyn RngCore),
        None => event.delta.clone(),
    }
}

/// Apply an event: stats, then relationships, then family, then history.
pub fn apply_event<R: Rng>(player: Player, event: &EventDefinition, rng: &mut R) -> Player {
    let delta = resolve_effect(event, rng);
    let mut player = player.with_stats_delta(&delta);
    player.relationships = player.relationships.apply_effects(&event.relationships);
    match event.family {
        Some(FamilyChange::Marriage) => player.family.married = true,
        Some(FamilyChange::Child) => {
            player.family.children = player.family.children.saturating_add(1)
        }
        None => {}
    }
    player.event_history.push(event.id);
    player
}

/// Look up `id` in the catalog and apply it; unknown ids leave the player unchanged.
pub fn apply_event_by_id<R: Rng>(player: Player, id: EventId, rng: &mut R) -> Player {
    match events::find(id) {
        Some(event) => apply_event(player, event, rng),
        None => player,
    }
}
