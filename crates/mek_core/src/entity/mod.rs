//! Unit model.
//!
//! An [`Entity`] is one combat unit: identity and position, crew, per-turn
//! state, and the damage state of every location its archetype defines.
//! Movement points are derived from the damage state on every read.

mod archetype;
mod builder;
mod equipment;
mod location;

pub use archetype::{
    Archetype, ArchetypeCaps, LocationSpec, MotiveType, TransferTarget, HOVER_CAPS, INFANTRY_CAPS,
    MECH_CAPS, TRACKED_CAPS, WHEELED_CAPS,
};
pub use builder::{mech_internal_structure, EntityBuilder};
pub use equipment::{EquipmentId, MountError, Mounted};
pub use location::{CriticalSlot, Location, LocationState, Points, SlotKind, SystemType};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{EquipmentData, MiscKind};
use crate::error::{GameError, Result};
use crate::hex::{Facing, HexCoord};
use crate::math::{div_ceil, times_one_and_half_ceil};

/// Unique identifier for an entity within a game.
pub type EntityId = u64;

/// Engine criticals that stop the engine.
pub const ENGINE_DESTROYED_HITS: usize = 3;
/// Gyro criticals that destroy the gyro.
pub const GYRO_DESTROYED_HITS: usize = 2;
/// Sensor criticals that blind the unit.
pub const SENSORS_DESTROYED_HITS: usize = 2;
/// Pilot hits that kill the crew.
pub const CREW_KILLED_HITS: u32 = 6;
/// Heat sinks built into every mech engine.
pub const ENGINE_HEAT_SINKS: u32 = 10;

/// How the unit moved this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Did not move.
    #[default]
    Stationary,
    /// Walked (or cruised).
    Walked,
    /// Ran (or flanked).
    Ran,
    /// Jumped.
    Jumped,
}

/// Crew skills and condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crew {
    /// Gunnery skill; lower is better.
    pub gunnery: u32,
    /// Piloting (or driving) skill; lower is better.
    pub piloting: u32,
    /// Damage taken.
    pub hits: u32,
    /// Whether the crew is unconscious.
    pub unconscious: bool,
}

impl Crew {
    /// A healthy crew.
    #[must_use]
    pub const fn new(gunnery: u32, piloting: u32) -> Self {
        Self {
            gunnery,
            piloting,
            hits: 0,
            unconscious: false,
        }
    }
}

impl Default for Crew {
    fn default() -> Self {
        Self::new(4, 5)
    }
}

/// State that is reset or re-declared every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TurnState {
    /// Movement mode used this turn.
    pub movement: MovementMode,
    /// Hexes moved this turn.
    pub hexes_moved: u32,
    /// Whether the unit is lying down.
    pub prone: bool,
    /// Whether the unit is shut down.
    pub shutdown: bool,
    /// Arm a prone mech props itself on.
    pub propping_arm: Option<Location>,
}

/// Vehicle-only damage state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Motive hits, each costing one cruise MP.
    pub motive_hits: u32,
    /// Motive system destroyed.
    pub immobilized: bool,
    /// Engine hit.
    pub engine_hit: bool,
    /// Turret jammed.
    pub turret_locked: bool,
    /// Crew stunned.
    pub crew_stunned: bool,
}

/// Why a unit left play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    /// A location whose loss is fatal was destroyed.
    LocationLost(Location),
    /// Cockpit critical.
    CockpitDestroyed,
    /// Third engine critical.
    EngineDestroyed,
    /// Ammunition explosion.
    AmmoExplosion,
    /// Crew killed.
    CrewKilled,
    /// Withdrawn from play.
    Withdrawn,
}

/// A combat unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, assigned when added to a game.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Owning player.
    pub owner: u32,
    /// Team; units on the same team are allied.
    pub team: u32,
    /// Board position.
    pub position: HexCoord,
    /// Facing.
    pub facing: Facing,
    /// Absolute elevation of the unit's base.
    pub elevation: i32,
    /// Crew.
    pub crew: Crew,
    /// Current heat.
    pub heat: u32,
    /// Per-turn state.
    pub turn: TurnState,
    /// Vehicle damage state; unused by other archetypes.
    pub vehicle: VehicleState,
    archetype: Archetype,
    tonnage: u32,
    base_walk: u32,
    base_jump: u32,
    locations: Vec<LocationState>,
    equipment: Vec<Mounted>,
    destroyed: Option<DestructionCause>,
}

impl Entity {
    // ========================================================================
    // Identity
    // ========================================================================

    /// Archetype.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Capability table of the archetype.
    #[must_use]
    pub const fn caps(&self) -> &'static ArchetypeCaps {
        self.archetype.caps()
    }

    /// Weight in tons (troopers for infantry).
    #[must_use]
    pub const fn tonnage(&self) -> u32 {
        self.tonnage
    }

    /// Whether `other` is on the same team.
    #[must_use]
    pub const fn is_allied(&self, other: &Self) -> bool {
        self.team == other.team
    }

    /// Whether the unit has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed.is_some()
    }

    /// Why the unit was destroyed.
    #[must_use]
    pub const fn destruction_cause(&self) -> Option<DestructionCause> {
        self.destroyed
    }

    /// Remove the unit from play. The first cause sticks.
    pub fn destroy(&mut self, cause: DestructionCause) {
        if self.destroyed.is_none() {
            info!(entity = self.id, name = %self.name, ?cause, "Entity destroyed");
            self.destroyed = Some(cause);
        }
    }

    // ========================================================================
    // Locations
    // ========================================================================

    /// All locations in archetype order.
    #[must_use]
    pub fn locations(&self) -> &[LocationState] {
        &self.locations
    }

    /// State of one location.
    #[must_use]
    pub fn location_state(&self, location: Location) -> Option<&LocationState> {
        self.locations
            .iter()
            .find(|state| state.location == location && state.original_internal != Points::NotApplicable)
    }

    /// Whether the unit has this location.
    #[must_use]
    pub fn has_location(&self, location: Location) -> bool {
        self.location_state(location).is_some()
    }

    fn location_index(&self, location: Location) -> Result<usize> {
        self.locations
            .iter()
            .position(|state| state.location == location && state.original_internal != Points::NotApplicable)
            .ok_or(GameError::NoSuchLocation {
                entity: self.id,
                location,
            })
    }

    pub(crate) fn location_state_mut(&mut self, location: Location) -> Result<&mut LocationState> {
        let index = self.location_index(location)?;
        Ok(&mut self.locations[index])
    }

    /// Current armor; [`Points::NotApplicable`] for a missing location or
    /// a location without rear armor.
    #[must_use]
    pub fn armor(&self, location: Location, rear: bool) -> Points {
        self.location_state(location).map_or(Points::NotApplicable, |state| {
            if rear {
                state.rear_armor
            } else {
                state.armor
            }
        })
    }

    /// Armor the location was built with.
    #[must_use]
    pub fn original_armor(&self, location: Location, rear: bool) -> Points {
        self.location_state(location).map_or(Points::NotApplicable, |state| {
            if rear {
                state.original_rear_armor
            } else {
                state.original_armor
            }
        })
    }

    /// Current internal structure.
    #[must_use]
    pub fn internal(&self, location: Location) -> Points {
        self.location_state(location)
            .map_or(Points::NotApplicable, |state| state.internal)
    }

    /// Internal structure the location was built with.
    #[must_use]
    pub fn original_internal(&self, location: Location) -> Points {
        self.location_state(location)
            .map_or(Points::NotApplicable, |state| state.original_internal)
    }

    /// Overwrite armor.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchLocation`] for a location the unit does not
    /// have and [`GameError::ExceedsOriginal`] when `value` is above the
    /// original armor.
    pub fn set_armor(&mut self, location: Location, rear: bool, value: Points) -> Result<()> {
        let state = self.location_state_mut(location)?;
        let original = if rear {
            state.original_rear_armor
        } else {
            state.original_armor
        };
        check_not_above_original(location, value, original)?;
        if rear {
            state.rear_armor = value;
        } else {
            state.armor = value;
        }
        Ok(())
    }

    /// Overwrite internal structure.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoSuchLocation`] for a location the unit does not
    /// have and [`GameError::ExceedsOriginal`] when `value` is above the
    /// original internal structure.
    pub fn set_internal(&mut self, location: Location, value: Points) -> Result<()> {
        let state = self.location_state_mut(location)?;
        check_not_above_original(location, value, state.original_internal)?;
        state.internal = value;
        Ok(())
    }

    /// Whether the location is permanently destroyed.
    #[must_use]
    pub fn is_location_destroyed(&self, location: Location) -> bool {
        self.internal(location) == Points::Destroyed
    }

    /// Whether the location was destroyed this phase.
    #[must_use]
    pub fn is_location_doomed(&self, location: Location) -> bool {
        self.internal(location) == Points::Doomed
    }

    /// Whether the location is destroyed or doomed, i.e. non-functional.
    #[must_use]
    pub fn is_location_lost(&self, location: Location) -> bool {
        self.internal(location).is_lost()
    }

    /// Mark a location doomed along with its armor.
    pub(crate) fn doom_location(&mut self, location: Location) -> Result<()> {
        let state = self.location_state_mut(location)?;
        state.internal = Points::Doomed;
        for armor in [&mut state.armor, &mut state.rear_armor] {
            if *armor != Points::NotApplicable {
                *armor = Points::Doomed;
            }
        }
        Ok(())
    }

    /// Sum of current armor, front and rear.
    #[must_use]
    pub fn total_armor(&self) -> u32 {
        self.locations
            .iter()
            .map(|state| state.armor.value() + state.rear_armor.value())
            .sum()
    }

    /// Sum of original armor, front and rear.
    #[must_use]
    pub fn total_original_armor(&self) -> u32 {
        self.locations
            .iter()
            .map(|state| state.original_armor.value() + state.original_rear_armor.value())
            .sum()
    }

    /// Sum of current internal structure.
    #[must_use]
    pub fn total_internal(&self) -> u32 {
        self.locations.iter().map(|state| state.internal.value()).sum()
    }

    /// Sum of original internal structure.
    #[must_use]
    pub fn total_original_internal(&self) -> u32 {
        self.locations
            .iter()
            .map(|state| state.original_internal.value())
            .sum()
    }

    // ========================================================================
    // Critical slots
    // ========================================================================

    /// A critical slot, `None` when the location or index does not exist.
    #[must_use]
    pub fn critical_slot(&self, location: Location, index: usize) -> Option<&CriticalSlot> {
        self.location_state(location)?.slots.get(index)
    }

    pub(crate) fn critical_slot_mut(&mut self, location: Location, index: usize) -> Option<&mut CriticalSlot> {
        let state_index = self.location_index(location).ok()?;
        self.locations[state_index].slots.get_mut(index)
    }

    /// Undamaged slots of a kind in a location.
    #[must_use]
    pub fn good_criticals(&self, kind: SlotKind, location: Location) -> usize {
        self.location_state(location).map_or(0, |state| {
            state
                .slots
                .iter()
                .filter(|slot| slot.kind == kind && !slot.destroyed)
                .count()
        })
    }

    /// Destroyed slots of a kind in a location.
    #[must_use]
    pub fn hit_criticals(&self, kind: SlotKind, location: Location) -> usize {
        self.location_state(location).map_or(0, |state| {
            state
                .slots
                .iter()
                .filter(|slot| slot.kind == kind && slot.destroyed)
                .count()
        })
    }

    /// Undamaged slots of a kind across all locations that are still intact.
    #[must_use]
    pub fn good_criticals_anywhere(&self, kind: SlotKind) -> usize {
        self.locations
            .iter()
            .filter(|state| !state.is_lost())
            .map(|state| self.good_criticals(kind, state.location))
            .sum()
    }

    /// Destroyed slots of a system across all locations.
    #[must_use]
    pub fn system_hits(&self, system: SystemType) -> usize {
        self.locations
            .iter()
            .map(|state| self.hit_criticals(SlotKind::System(system), state.location))
            .sum()
    }

    /// Engine criticals taken.
    #[must_use]
    pub fn engine_hits(&self) -> usize {
        self.system_hits(SystemType::Engine)
    }

    /// Gyro criticals taken.
    #[must_use]
    pub fn gyro_hits(&self) -> usize {
        self.system_hits(SystemType::Gyro)
    }

    /// Sensor criticals taken.
    #[must_use]
    pub fn sensor_hits(&self) -> usize {
        self.system_hits(SystemType::Sensors)
    }

    /// Whether an actuator in a limb has been hit.
    #[must_use]
    pub fn actuator_hit(&self, location: Location, actuator: SystemType) -> bool {
        self.hit_criticals(SlotKind::System(actuator), location) > 0
    }

    /// Whether the unit could stand up if it were prone.
    #[must_use]
    pub fn can_stand(&self) -> bool {
        self.archetype.is_mech()
            && !(self.is_location_lost(Location::LeftLeg) && self.is_location_lost(Location::RightLeg))
            && self.gyro_hits() < GYRO_DESTROYED_HITS
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Base walking MP.
    #[must_use]
    pub const fn base_walk_mp(&self) -> u32 {
        self.base_walk
    }

    /// Base jumping MP.
    #[must_use]
    pub const fn base_jump_mp(&self) -> u32 {
        self.base_jump
    }

    /// Current walking (cruising) MP.
    #[must_use]
    pub fn walk_mp(&self) -> u32 {
        match self.archetype {
            Archetype::Mech => self.mech_walk_mp(),
            Archetype::Vehicle(_) => {
                if self.vehicle.engine_hit || self.vehicle.immobilized {
                    0
                } else {
                    self.base_walk.saturating_sub(self.vehicle.motive_hits)
                }
            }
            Archetype::Infantry => self.base_walk,
        }
    }

    fn mech_walk_mp(&self) -> u32 {
        let legs_lost = [Location::LeftLeg, Location::RightLeg]
            .into_iter()
            .filter(|&leg| self.is_location_lost(leg))
            .count();

        let walk = match legs_lost {
            2 => 0,
            1 => 1,
            _ => {
                let hips = self.system_hits(SystemType::Hip);
                let mut walk = self.base_walk;
                for _ in 0..hips {
                    walk = div_ceil(walk, 2);
                }
                if hips >= 2 {
                    walk = 0;
                }
                let actuators = [SystemType::UpperLeg, SystemType::LowerLeg, SystemType::Foot]
                    .into_iter()
                    .map(|actuator| self.system_hits(actuator))
                    .sum::<usize>();
                walk.saturating_sub(actuators as u32)
            }
        };

        if self.engine_hits() >= ENGINE_DESTROYED_HITS {
            return 0;
        }
        walk.saturating_sub(self.heat / 5)
    }

    /// Current running (flanking) MP.
    #[must_use]
    pub fn run_mp(&self) -> u32 {
        match self.archetype {
            Archetype::Infantry => self.walk_mp(),
            _ => times_one_and_half_ceil(self.walk_mp()),
        }
    }

    /// Current jumping MP.
    #[must_use]
    pub fn jump_mp(&self) -> u32 {
        match self.archetype {
            Archetype::Mech => {
                if self.engine_hits() >= ENGINE_DESTROYED_HITS {
                    0
                } else {
                    self.base_jump.min(self.functioning_misc(MiscKind::JumpJet))
                }
            }
            Archetype::Vehicle(_) => 0,
            Archetype::Infantry => self.base_jump,
        }
    }

    /// Whether the unit cannot move or dodge at all this turn.
    #[must_use]
    pub fn is_immobile(&self) -> bool {
        self.turn.shutdown
            || self.crew.unconscious
            || (self.archetype.is_vehicle() && self.vehicle.immobilized)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// All mounted equipment.
    #[must_use]
    pub fn equipment(&self) -> &[Mounted] {
        &self.equipment
    }

    /// One mounted item.
    #[must_use]
    pub fn mounted(&self, id: EquipmentId) -> Option<&Mounted> {
        self.equipment.get(id)
    }

    pub(crate) fn mounted_mut(&mut self, id: EquipmentId) -> Option<&mut Mounted> {
        self.equipment.get_mut(id)
    }

    /// Mount equipment, optionally at a location.
    ///
    /// Slot-bearing locations allocate the item's slots from the first free
    /// ones; nothing changes unless the mount succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`MountError`] when the location is missing, destroyed or
    /// lacks free slots.
    pub fn mount(
        &mut self,
        data: EquipmentData,
        location: Option<Location>,
        rear_mounted: bool,
    ) -> std::result::Result<EquipmentId, MountError> {
        let id = self.equipment.len();
        if let Some(location) = location {
            let index = self
                .location_index(location)
                .map_err(|_| MountError::NoSuchLocation(location))?;
            let state = &mut self.locations[index];
            if state.is_lost() {
                return Err(MountError::LocationDestroyed(location));
            }
            if !state.slots.is_empty() {
                let free: Vec<usize> = state
                    .slots
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.kind == SlotKind::Empty)
                    .map(|(index, _)| index)
                    .collect();
                if free.len() < data.slots as usize {
                    return Err(MountError::LocationFull {
                        location,
                        needed: data.slots,
                        free: free.len() as u32,
                    });
                }
                for &slot in free.iter().take(data.slots as usize) {
                    state.slots[slot] = CriticalSlot::equipment(id);
                }
            }
        }
        self.equipment.push(Mounted::new(data, location, rear_mounted));
        Ok(id)
    }

    /// Link an ammunition bin to an ammo-fed weapon.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::InvalidAmmoLink`] unless `weapon` is a weapon and
    /// `ammo` is a bin of the ammunition it consumes.
    pub fn link_ammo(&mut self, weapon: EquipmentId, ammo: EquipmentId) -> std::result::Result<(), MountError> {
        let invalid = MountError::InvalidAmmoLink { weapon, ammo };
        let weapon_type = self
            .equipment
            .get(weapon)
            .and_then(|mounted| mounted.data.weapon())
            .and_then(|stats| stats.ammo_type.as_ref())
            .ok_or_else(|| invalid.clone())?;
        let matches = self
            .equipment
            .get(ammo)
            .and_then(|mounted| mounted.data.ammo())
            .is_some_and(|stats| &stats.ammo_type == weapon_type);
        if !matches {
            return Err(invalid);
        }
        self.equipment[weapon].ammo_link = Some(ammo);
        Ok(())
    }

    /// Whether a mounted item works: not destroyed and its location intact.
    #[must_use]
    pub fn is_equipment_functional(&self, id: EquipmentId) -> bool {
        self.equipment.get(id).is_some_and(|mounted| {
            !mounted.destroyed && mounted.location.map_or(true, |loc| !self.is_location_lost(loc))
        })
    }

    /// Ids of all weapons.
    pub fn weapons(&self) -> impl Iterator<Item = EquipmentId> + '_ {
        self.equipment
            .iter()
            .enumerate()
            .filter(|(_, mounted)| mounted.data.weapon().is_some())
            .map(|(id, _)| id)
    }

    /// Number of working items of a miscellaneous kind.
    #[must_use]
    pub fn functioning_misc(&self, kind: MiscKind) -> u32 {
        (0..self.equipment.len())
            .filter(|&id| self.equipment[id].data.is_misc(kind) && self.is_equipment_functional(id))
            .count() as u32
    }

    /// Whether CASE protects a location.
    #[must_use]
    pub fn has_case(&self, location: Location) -> bool {
        (0..self.equipment.len()).any(|id| {
            let mounted = &self.equipment[id];
            mounted.data.is_misc(MiscKind::Case)
                && mounted.location == Some(location)
                && self.is_equipment_functional(id)
        })
    }

    /// Heat dissipated per turn, `None` for units that do not track heat.
    #[must_use]
    pub fn heat_dissipation(&self) -> Option<u32> {
        self.archetype
            .is_mech()
            .then(|| ENGINE_HEAT_SINKS + self.functioning_misc(MiscKind::HeatSink))
    }

    /// Whether the weapon consumes ammunition.
    #[must_use]
    pub fn needs_ammo(&self, weapon: EquipmentId) -> bool {
        self.equipment
            .get(weapon)
            .and_then(|mounted| mounted.data.weapon())
            .is_some_and(|stats| stats.ammo_type.is_some())
    }

    /// Ammunition bin the weapon would draw from: the linked bin if it still
    /// has shots, otherwise the first working bin of the right type.
    #[must_use]
    pub fn ammo_for(&self, weapon: EquipmentId) -> Option<EquipmentId> {
        let ammo_type = self.equipment.get(weapon)?.data.weapon()?.ammo_type.as_ref()?;
        let usable = |id: EquipmentId| {
            let mounted = &self.equipment[id];
            mounted.shots_left > 0
                && self.is_equipment_functional(id)
                && mounted.data.ammo().is_some_and(|stats| &stats.ammo_type == ammo_type)
        };
        if let Some(link) = self.equipment[weapon].ammo_link {
            if usable(link) {
                return Some(link);
            }
        }
        (0..self.equipment.len()).find(|&id| usable(id))
    }

    /// Whether any equipment in a location fired this turn.
    #[must_use]
    pub fn fired_from(&self, location: Location) -> bool {
        self.equipment
            .iter()
            .any(|mounted| mounted.location == Some(location) && mounted.fired_this_turn)
    }

    /// Fire a weapon: mark it fired, spend a shot and add its heat.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if `weapon` is not a weapon and
    /// [`GameError::InvalidState`] if it cannot fire.
    pub fn fire_weapon(&mut self, weapon: EquipmentId) -> Result<()> {
        let heat = self
            .equipment
            .get(weapon)
            .and_then(|mounted| mounted.data.weapon())
            .map(|stats| stats.heat)
            .ok_or_else(|| GameError::InvalidArgument(format!("equipment {weapon} is not a weapon")))?;

        if !self.is_equipment_functional(weapon) || self.equipment[weapon].fired_this_turn {
            return Err(GameError::InvalidState(format!(
                "weapon {weapon} on entity {} cannot fire",
                self.id
            )));
        }
        if self.needs_ammo(weapon) {
            let bin = self.ammo_for(weapon).ok_or_else(|| {
                GameError::InvalidState(format!("weapon {weapon} on entity {} has no ammo", self.id))
            })?;
            self.equipment[bin].shots_left -= 1;
        }

        self.equipment[weapon].fired_this_turn = true;
        if self.archetype.is_mech() {
            self.heat += heat;
        }
        Ok(())
    }

    // ========================================================================
    // Crew and phases
    // ========================================================================

    /// Apply pilot hits; six kill the crew.
    pub fn damage_crew(&mut self, hits: u32) {
        self.crew.hits += hits;
        if self.crew.hits >= CREW_KILLED_HITS {
            self.destroy(DestructionCause::CrewKilled);
        }
    }

    /// Finalise the phase: doomed locations become destroyed.
    pub fn end_phase(&mut self) {
        for state in &mut self.locations {
            for points in [&mut state.armor, &mut state.rear_armor, &mut state.internal] {
                if *points == Points::Doomed {
                    *points = Points::Destroyed;
                }
            }
        }
    }

    /// Start a new turn: clear movement and firing declarations.
    pub fn new_turn(&mut self) {
        self.turn.movement = MovementMode::Stationary;
        self.turn.hexes_moved = 0;
        for mounted in &mut self.equipment {
            mounted.fired_this_turn = false;
        }
    }
}

fn check_not_above_original(location: Location, value: Points, original: Points) -> Result<()> {
    if let Points::Intact(requested) = value {
        let allowed = matches!(original, Points::Intact(points) if requested <= points);
        if !allowed {
            return Err(GameError::ExceedsOriginal {
                location,
                requested: requested as i32,
                original: original.raw(),
            });
        }
    }
    Ok(())
}
