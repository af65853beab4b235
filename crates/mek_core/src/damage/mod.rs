//! Hit-location and damage resolution.
//!
//! A landed attack is resolved in two steps: [`roll_location`] picks where
//! it hits, then [`resolve_hit`] applies the damage. Damage runs down armor
//! and internal structure and transfers along the archetype's static
//! transfer table; internal damage and through-armor criticals roll on the
//! critical tables. Everything that happens is recorded as a
//! [`DamageEvent`].

mod critical;
mod hit_log;
pub mod tables;
mod transfer;

pub use critical::VehicleCritical;
pub use hit_log::{HitLogSink, WriterSink};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dice::DiceRoller;
use crate::entity::{Archetype, DestructionCause, Entity, EntityId, EquipmentId, Location, Points, SlotKind};
use crate::error::{GameError, Result};
use crate::hex::Arc;
use crate::options::GameOptions;

/// Which hit table an attack rolls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HitTable {
    /// Full-body 2d6 table.
    #[default]
    Normal,
    /// Upper-body 1d6 table.
    Punch,
    /// Legs-only 1d6 table.
    Kick,
}

/// Side of the target the attack strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Front.
    #[default]
    Front,
    /// Left side.
    Left,
    /// Right side.
    Right,
    /// Rear.
    Rear,
}

impl Side {
    /// Side corresponding to the target's arc the attacker stands in.
    #[must_use]
    pub const fn from_arc(arc: Arc) -> Self {
        match arc {
            Arc::Front => Self::Front,
            Arc::Left => Self::Left,
            Arc::Right => Self::Right,
            Arc::Rear => Self::Rear,
        }
    }

    /// Vehicle location facing this side.
    #[must_use]
    pub const fn vehicle_location(self) -> Location {
        match self {
            Self::Front => Location::Front,
            Self::Left => Location::Left,
            Self::Right => Location::Right,
            Self::Rear => Location::Rear,
        }
    }
}

/// Where a hit landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitData {
    /// Location struck.
    pub location: Location,
    /// Whether rear armor takes the hit.
    pub rear: bool,
    /// Table rolled on.
    pub table: HitTable,
    /// Side attacked.
    pub side: Side,
    /// Dice total.
    pub roll: u32,
    /// Whether the roll allows a through-armor critical.
    pub through_armor_critical: bool,
}

impl HitData {
    /// A hit at a known location, without a roll.
    #[must_use]
    pub const fn at(location: Location, rear: bool) -> Self {
        Self {
            location,
            rear,
            table: HitTable::Normal,
            side: if rear { Side::Rear } else { Side::Front },
            roll: 0,
            through_armor_critical: false,
        }
    }
}

/// Something that happened while resolving damage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageEvent {
    /// Armor absorbed damage.
    ArmorDamaged {
        /// Location.
        location: Location,
        /// Rear armor.
        rear: bool,
        /// Points absorbed.
        amount: u32,
        /// Armor left.
        remaining: u32,
    },
    /// Internal structure absorbed damage.
    InternalDamaged {
        /// Location.
        location: Location,
        /// Points absorbed.
        amount: u32,
        /// Internal structure left.
        remaining: u32,
    },
    /// A location's internal structure ran out.
    LocationDestroyed {
        /// Location.
        location: Location,
    },
    /// Excess damage moved to the parent location.
    DamageTransferred {
        /// Source location.
        from: Location,
        /// Parent location.
        to: Location,
        /// Points moved.
        amount: u32,
    },
    /// Excess damage was lost.
    DamageAbsorbed {
        /// Location the damage stopped at.
        location: Location,
        /// Points lost.
        amount: u32,
    },
    /// A through-armor critical was triggered.
    ThroughArmorCritical {
        /// Location checked.
        location: Location,
    },
    /// A critical check was rolled.
    CriticalCheck {
        /// Location.
        location: Location,
        /// Dice total.
        roll: u32,
        /// Critical hits awarded.
        hits: u32,
    },
    /// A critical slot was destroyed.
    CriticalHit {
        /// Location.
        location: Location,
        /// Slot index.
        slot: usize,
        /// What occupied it.
        kind: SlotKind,
    },
    /// A limb or the head was blown off by a critical roll.
    LimbBlownOff {
        /// Location.
        location: Location,
    },
    /// An ammunition bin exploded.
    AmmoExplosion {
        /// Location of the bin.
        location: Location,
        /// The bin.
        equipment: EquipmentId,
        /// Damage dealt.
        damage: u32,
        /// Whether CASE kept it in the location.
        contained: bool,
    },
    /// The crew took damage.
    PilotDamaged {
        /// Hits taken.
        hits: u32,
    },
    /// A vehicle critical was rolled.
    VehicleCritical {
        /// Location.
        location: Location,
        /// Dice total.
        roll: u32,
        /// Effect.
        effect: VehicleCritical,
    },
    /// The unit was destroyed.
    UnitDestroyed {
        /// Cause.
        cause: DestructionCause,
    },
}

/// Everything that happened to one entity while resolving a hit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageReport {
    /// Entity damaged.
    pub entity: EntityId,
    /// Events in order.
    pub events: Vec<DamageEvent>,
}

impl DamageReport {
    /// Empty report.
    #[must_use]
    pub const fn new(entity: EntityId) -> Self {
        Self {
            entity,
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: DamageEvent) {
        self.events.push(event);
    }

    /// Whether the unit was destroyed.
    #[must_use]
    pub fn unit_destroyed(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, DamageEvent::UnitDestroyed { .. }))
    }

    /// Locations destroyed, in order.
    #[must_use]
    pub fn destroyed_locations(&self) -> Vec<Location> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DamageEvent::LocationDestroyed { location } => Some(*location),
                _ => None,
            })
            .collect()
    }

    /// Total damage moved between locations.
    #[must_use]
    pub fn transferred(&self) -> u32 {
        self.events
            .iter()
            .map(|event| match event {
                DamageEvent::DamageTransferred { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Locations whose internal structure took damage, first occurrence order.
    #[must_use]
    pub fn internal_damaged_locations(&self) -> Vec<Location> {
        let mut locations = Vec::new();
        for event in &self.events {
            if let DamageEvent::InternalDamaged { location, .. } = event {
                if !locations.contains(location) {
                    locations.push(*location);
                }
            }
        }
        locations
    }
}

/// Roll a hit location on an entity.
///
/// Vehicle turret results fall to the attacked side when the vehicle has
/// no turret.
pub fn roll_location(entity: &Entity, table: HitTable, side: Side, dice: &mut dyn DiceRoller) -> HitData {
    let caps = entity.caps();
    let roll = dice.roll_d6((caps.hit_dice)(table));
    let (mut location, through_armor_critical) = (caps.hit_location)(table, side, roll);
    if !entity.has_location(location) {
        location = side.vehicle_location();
    }
    let rear = side == Side::Rear && entity.armor(location, true) != Points::NotApplicable;

    HitData {
        location,
        rear,
        table,
        side,
        roll,
        through_armor_critical,
    }
}

/// Apply damage at a location, transferring the excess. Rolls nothing.
///
/// # Errors
///
/// Returns [`GameError::NoSuchLocation`] when the entity lacks the location.
pub fn apply_damage(entity: &mut Entity, location: Location, rear: bool, damage: u32) -> Result<DamageReport> {
    let mut report = DamageReport::new(entity.id);
    transfer::run(
        entity,
        transfer::Strike::new(location, rear, damage),
        &mut report,
    )?;
    Ok(report)
}

/// Resolve a landed hit: apply damage, roll criticals, and log the result.
///
/// # Errors
///
/// Returns [`GameError::NoSuchLocation`] when the hit names a location the
/// entity lacks. Log sink failures are not errors.
pub fn resolve_hit(
    entity: &mut Entity,
    hit: &HitData,
    damage: u32,
    options: &GameOptions,
    dice: &mut dyn DiceRoller,
    log: Option<&mut dyn HitLogSink>,
) -> Result<DamageReport> {
    if !entity.has_location(hit.location) {
        return Err(GameError::NoSuchLocation {
            entity: entity.id,
            location: hit.location,
        });
    }

    let mut report = DamageReport::new(entity.id);
    transfer::run(
        entity,
        transfer::Strike::new(hit.location, hit.rear, damage),
        &mut report,
    )?;

    if entity.archetype() == Archetype::Mech {
        for location in report.internal_damaged_locations() {
            if entity.is_destroyed() {
                break;
            }
            if !entity.is_location_lost(location) {
                critical::critical_check(entity, location, dice, &mut report)?;
            }
        }
    }

    if hit.through_armor_critical && !entity.is_destroyed() {
        critical::through_armor_critical(entity, hit, options, dice, &mut report)?;
    }

    debug!(
        entity = entity.id,
        location = %hit.location,
        damage,
        events = report.events.len(),
        destroyed = entity.is_destroyed(),
        "Resolved hit"
    );

    if let Some(sink) = log {
        hit_log::write_hit(sink, entity, hit, damage, &report);
    }
    Ok(report)
}
