//! To-hit resolution.
//!
//! Every attack produces a [`ToHitData`]: a base number, the modifiers that
//! applied in the order they were checked, an [`Outcome`], and the hit
//! table and side the attack will roll on. Conditions that make an attack
//! impossible are checked first; the first one found wins and no modifiers
//! are collected after it.

mod los;
mod physical;
mod weapon;

pub use los::{line_of_sight, LosData};
pub use physical::{
    charge_damage, charge_to_hit, dfa_damage, dfa_to_hit, kick_damage, kick_to_hit, punch_damage, punch_to_hit,
    push_to_hit,
};
pub use weapon::weapon_to_hit;

use serde::{Deserialize, Serialize};

use crate::board::WoodsDensity;
use crate::damage::{HitTable, Side};
use crate::entity::{Entity, EntityId, MovementMode};
use crate::error::{GameError, Result};
use crate::game::GameView;
use crate::hex::arc_of;

/// Highest target number that can still be rolled on 2d6.
pub const MAX_TARGET_NUMBER: i32 = 12;

/// Target numbers at or below this always hit.
pub const AUTOMATIC_SUCCESS_NUMBER: i32 = 2;

/// One modifier and why it applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToHitModifier {
    /// Amount added to the target number.
    pub value: i32,
    /// Why.
    pub reason: String,
}

/// Whether the attack can be rolled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// Roll 2d6 against the target number.
    #[default]
    Normal,
    /// The attack cannot be made.
    Impossible(String),
    /// The attack can be declared but cannot hit.
    AutomaticFail(String),
    /// The attack hits without a roll.
    AutomaticSuccess(String),
}

/// Result of a to-hit computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToHitData {
    /// Base target number.
    pub base: i32,
    /// Where the base number comes from.
    pub base_reason: String,
    /// Modifiers in the order they were applied.
    pub modifiers: Vec<ToHitModifier>,
    /// Whether and how the attack resolves.
    pub outcome: Outcome,
    /// Hit table a successful attack rolls on.
    pub hit_table: HitTable,
    /// Side of the target that is struck.
    pub side: Side,
}

impl ToHitData {
    /// Start from a base number.
    #[must_use]
    pub fn new(base: i32, reason: impl Into<String>) -> Self {
        Self {
            base,
            base_reason: reason.into(),
            modifiers: Vec::new(),
            outcome: Outcome::Normal,
            hit_table: HitTable::Normal,
            side: Side::Front,
        }
    }

    /// An attack that cannot be made.
    #[must_use]
    pub fn impossible(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Impossible(reason.into()),
            ..Self::new(0, "impossible")
        }
    }

    /// Add a modifier. Zero-valued modifiers are not recorded.
    pub fn add_modifier(&mut self, value: i32, reason: impl Into<String>) {
        if value != 0 {
            self.modifiers.push(ToHitModifier {
                value,
                reason: reason.into(),
            });
        }
    }

    /// Target number: base plus all modifiers.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.base + self.modifiers.iter().map(|modifier| modifier.value).sum::<i32>()
    }

    /// Whether the attack can be made at all.
    #[must_use]
    pub fn is_possible(&self) -> bool {
        !matches!(self.outcome, Outcome::Impossible(_))
    }

    /// Settle the outcome from the final target number.
    fn finish(mut self) -> Self {
        if self.outcome == Outcome::Normal {
            let value = self.value();
            if value > MAX_TARGET_NUMBER {
                self.outcome = Outcome::AutomaticFail(format!("target number {value} above {MAX_TARGET_NUMBER}"));
            } else if value <= AUTOMATIC_SUCCESS_NUMBER {
                self.outcome = Outcome::AutomaticSuccess(format!("target number {value}"));
            }
        }
        self
    }
}

// ============================================================================
// Shared lookups and modifiers
// ============================================================================

/// Attacker and target, both present in the game.
fn resolve_pair(game: &dyn GameView, attacker: EntityId, target: EntityId) -> Result<(&Entity, &Entity)> {
    let attacker_entity = game
        .entity_by_id(attacker)
        .ok_or(GameError::EntityNotFound(attacker))?;
    let target_entity = game.entity_by_id(target).ok_or(GameError::EntityNotFound(target))?;
    Ok((attacker_entity, target_entity))
}

/// Impossibility checks every attack starts with.
fn basic_impossibility(attacker: &Entity, target: &Entity) -> Option<&'static str> {
    if attacker.id == target.id {
        return Some("cannot target self");
    }
    if target.is_destroyed() {
        return Some("target destroyed");
    }
    if attacker.is_destroyed() {
        return Some("attacker destroyed");
    }
    None
}

fn attacker_movement(data: &mut ToHitData, attacker: &Entity) {
    match attacker.turn.movement {
        MovementMode::Stationary => {}
        MovementMode::Walked => data.add_modifier(1, "attacker walked"),
        MovementMode::Ran => data.add_modifier(2, "attacker ran"),
        MovementMode::Jumped => data.add_modifier(3, "attacker jumped"),
    }
}

/// Target movement modifier from hexes moved.
#[must_use]
pub const fn target_movement_modifier(hexes_moved: u32) -> i32 {
    match hexes_moved {
        0..=2 => 0,
        3 | 4 => 1,
        5 | 6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

fn target_movement(data: &mut ToHitData, target: &Entity) {
    data.add_modifier(
        target_movement_modifier(target.turn.hexes_moved),
        format!("target moved {} hexes", target.turn.hexes_moved),
    );
    if target.turn.movement == MovementMode::Jumped {
        data.add_modifier(1, "target jumped");
    }
}

fn target_terrain(data: &mut ToHitData, game: &dyn GameView, target: &Entity) {
    let Some(hex) = game.hex_at(target.position) else {
        return;
    };
    if hex.water_depth() > 0 {
        data.add_modifier(-1, "target in water");
    }
    match hex.woods() {
        Some(WoodsDensity::Light) => data.add_modifier(1, "target in light woods"),
        Some(WoodsDensity::Heavy) => data.add_modifier(2, "target in heavy woods"),
        None => {}
    }
}

fn target_immobile(data: &mut ToHitData, target: &Entity) {
    if target.is_immobile() {
        data.add_modifier(-4, "target immobile");
    }
}

fn target_prone(data: &mut ToHitData, attacker: &Entity, target: &Entity) {
    if target.turn.prone {
        if attacker.position.is_adjacent(target.position) {
            data.add_modifier(-2, "target prone and adjacent");
        } else {
            data.add_modifier(1, "target prone");
        }
    }
}

/// Side of the target facing the attacker.
fn target_side(attacker: &Entity, target: &Entity) -> Side {
    Side::from_arc(arc_of(target.position, target.facing, attacker.position))
}
