//! Standard unit construction.

use tracing::debug;

use super::archetype::{Archetype, MotiveType};
use super::location::{CriticalSlot, Location, LocationState, Points, SystemType};
use super::{Crew, Entity, EntityId, TurnState, VehicleState};
use crate::data::{EquipmentData, MiscKind};
use crate::error::{GameError, Result};
use crate::hex::{Facing, HexCoord};
use crate::math::div_ceil;

/// Head internal structure for every mech.
const MECH_HEAD_INTERNAL: u32 = 3;
/// Maximum head armor for every mech.
const MECH_HEAD_MAX_ARMOR: u32 = 9;

/// Mech internal structure by tonnage: center torso, side torso, arm, leg.
const MECH_INTERNAL_TABLE: [(u32, [u32; 4]); 17] = [
    (20, [6, 5, 3, 4]),
    (25, [8, 6, 4, 6]),
    (30, [10, 7, 5, 7]),
    (35, [11, 8, 6, 8]),
    (40, [12, 10, 6, 10]),
    (45, [14, 11, 7, 11]),
    (50, [16, 12, 8, 12]),
    (55, [18, 13, 9, 13]),
    (60, [20, 14, 10, 14]),
    (65, [21, 15, 10, 15]),
    (70, [22, 15, 11, 15]),
    (75, [23, 16, 12, 16]),
    (80, [25, 17, 13, 17]),
    (85, [27, 18, 14, 18]),
    (90, [29, 19, 15, 19]),
    (95, [30, 20, 16, 20]),
    (100, [31, 21, 17, 21]),
];

/// Internal structure of a mech location at a tonnage.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] for a tonnage that is not a
/// multiple of 5 between 20 and 100, or for a non-mech location.
pub fn mech_internal_structure(tonnage: u32, location: Location) -> Result<u32> {
    let row = MECH_INTERNAL_TABLE
        .iter()
        .find(|(tons, _)| *tons == tonnage)
        .map(|(_, row)| row)
        .ok_or_else(|| GameError::InvalidArgument(format!("no mech internal structure for {tonnage} tons")))?;
    match location {
        Location::Head => Ok(MECH_HEAD_INTERNAL),
        Location::CenterTorso => Ok(row[0]),
        Location::LeftTorso | Location::RightTorso => Ok(row[1]),
        Location::LeftArm | Location::RightArm => Ok(row[2]),
        Location::LeftLeg | Location::RightLeg => Ok(row[3]),
        other => Err(GameError::InvalidArgument(format!("{other} is not a mech location"))),
    }
}

fn standard_slots(location: Location) -> &'static [SystemType] {
    use SystemType::{
        Cockpit, Engine, Foot, Gyro, Hand, Hip, LifeSupport, LowerArm, LowerLeg, Sensors,
        Shoulder, UpperArm, UpperLeg,
    };
    match location {
        Location::Head => &[LifeSupport, Sensors, Cockpit],
        Location::CenterTorso => &[Engine, Engine, Engine, Gyro, Gyro, Gyro, Gyro, Engine, Engine, Engine],
        Location::LeftArm | Location::RightArm => &[Shoulder, UpperArm, LowerArm, Hand],
        Location::LeftLeg | Location::RightLeg => &[Hip, UpperLeg, LowerLeg, Foot],
        _ => &[],
    }
}

/// Builds entities with standard internal structure and critical layout.
///
/// ```
/// use mek_core::entity::{EntityBuilder, Location};
///
/// let mech = EntityBuilder::mech("Centurion", 50)
///     .walk(4)
///     .crew(4, 5)
///     .standard_armor()
///     .build()
///     .unwrap();
/// assert_eq!(mech.run_mp(), 6);
/// assert!(mech.has_location(Location::LeftTorso));
/// ```
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    id: EntityId,
    name: String,
    archetype: Archetype,
    tonnage: u32,
    walk: u32,
    jump: u32,
    crew: Crew,
    owner: u32,
    team: u32,
    position: HexCoord,
    facing: Facing,
    elevation: i32,
    turret: bool,
    standard_armor: bool,
    armor: Vec<(Location, u32, Option<u32>)>,
    equipment: Vec<(EquipmentData, Option<Location>, bool)>,
}

impl EntityBuilder {
    fn new(name: impl Into<String>, archetype: Archetype, tonnage: u32, walk: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            archetype,
            tonnage,
            walk,
            jump: 0,
            crew: Crew::default(),
            owner: 0,
            team: 0,
            position: HexCoord::default(),
            facing: Facing::North,
            elevation: 0,
            turret: false,
            standard_armor: false,
            armor: Vec::new(),
            equipment: Vec::new(),
        }
    }

    /// A mech of 20 to 100 tons.
    #[must_use]
    pub fn mech(name: impl Into<String>, tonnage: u32) -> Self {
        Self::new(name, Archetype::Mech, tonnage, 4)
    }

    /// A ground vehicle.
    #[must_use]
    pub fn vehicle(name: impl Into<String>, motive: MotiveType, tonnage: u32) -> Self {
        Self::new(name, Archetype::Vehicle(motive), tonnage, 5)
    }

    /// An infantry platoon of `troopers` soldiers.
    #[must_use]
    pub fn infantry(name: impl Into<String>, troopers: u32) -> Self {
        Self::new(name, Archetype::Infantry, troopers, 1)
    }

    /// Entity id.
    #[must_use]
    pub const fn id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Owner and team.
    #[must_use]
    pub const fn side(mut self, owner: u32, team: u32) -> Self {
        self.owner = owner;
        self.team = team;
        self
    }

    /// Position and facing.
    #[must_use]
    pub const fn at(mut self, position: HexCoord, facing: Facing) -> Self {
        self.position = position;
        self.facing = facing;
        self
    }

    /// Absolute elevation.
    #[must_use]
    pub const fn elevation(mut self, elevation: i32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Base walking MP.
    #[must_use]
    pub const fn walk(mut self, walk: u32) -> Self {
        self.walk = walk;
        self
    }

    /// Base jumping MP; mechs need a jump jet per point.
    #[must_use]
    pub const fn jump(mut self, jump: u32) -> Self {
        self.jump = jump;
        self
    }

    /// Gunnery and piloting skills.
    #[must_use]
    pub const fn crew(mut self, gunnery: u32, piloting: u32) -> Self {
        self.crew = Crew::new(gunnery, piloting);
        self
    }

    /// Give a vehicle a turret.
    #[must_use]
    pub const fn turret(mut self, turret: bool) -> Self {
        self.turret = turret;
        self
    }

    /// Armor a location explicitly; overrides [`Self::standard_armor`].
    #[must_use]
    pub fn armor(mut self, location: Location, front: u32, rear: Option<u32>) -> Self {
        self.armor.retain(|(loc, _, _)| *loc != location);
        self.armor.push((location, front, rear));
        self
    }

    /// Fill every location not armored explicitly with its maximum armor.
    #[must_use]
    pub const fn standard_armor(mut self) -> Self {
        self.standard_armor = true;
        self
    }

    /// Mount equipment facing forward.
    #[must_use]
    pub fn equip(mut self, data: EquipmentData, location: Location) -> Self {
        self.equipment.push((data, Some(location), false));
        self
    }

    /// Mount equipment facing the rear arc.
    #[must_use]
    pub fn equip_rear(mut self, data: EquipmentData, location: Location) -> Self {
        self.equipment.push((data, Some(location), true));
        self
    }

    fn internal_for(&self, location: Location) -> Result<Points> {
        match self.archetype {
            Archetype::Mech => mech_internal_structure(self.tonnage, location).map(Points::Intact),
            Archetype::Vehicle(_) if location == Location::Turret && !self.turret => Ok(Points::NotApplicable),
            Archetype::Vehicle(_) => Ok(Points::Intact(div_ceil(self.tonnage, 10))),
            Archetype::Infantry => Ok(Points::Intact(self.tonnage)),
        }
    }

    fn validate_tonnage(&self) -> Result<()> {
        let max = match self.archetype {
            Archetype::Mech => 100,
            Archetype::Vehicle(MotiveType::Tracked) => 100,
            Archetype::Vehicle(MotiveType::Wheeled) => 80,
            Archetype::Vehicle(MotiveType::Hover) => 50,
            Archetype::Infantry => 30,
        };
        if self.tonnage == 0 || self.tonnage > max {
            return Err(GameError::InvalidArgument(format!(
                "{} cannot weigh {}",
                self.archetype.caps().name,
                self.tonnage
            )));
        }
        Ok(())
    }

    /// Front and rear armor for a location, checked against its limits.
    fn armor_for(&self, location: Location, internal: u32, has_rear: bool) -> Result<(Points, Points)> {
        if self.archetype == Archetype::Infantry {
            return Ok((Points::NotApplicable, Points::NotApplicable));
        }

        let max_total = match (self.archetype, location) {
            (Archetype::Mech, Location::Head) => MECH_HEAD_MAX_ARMOR,
            _ => internal * 2,
        };
        let explicit = self.armor.iter().find(|(loc, _, _)| *loc == location);
        let (front, rear) = match explicit {
            Some(&(_, front, rear)) => (front, rear),
            None if self.standard_armor && has_rear => {
                let rear = max_total / 4;
                (max_total - rear, Some(rear))
            }
            None if self.standard_armor => (max_total, None),
            None => (0, None),
        };

        if rear.is_some() && !has_rear {
            return Err(GameError::InvalidArgument(format!("{location} has no rear armor")));
        }
        let total = front + rear.unwrap_or(0);
        if total > max_total {
            return Err(GameError::InvalidArgument(format!(
                "{location} armor {total} exceeds maximum {max_total}"
            )));
        }

        let rear_points = if has_rear {
            Points::Intact(rear.unwrap_or(0))
        } else {
            Points::NotApplicable
        };
        Ok((Points::Intact(front), rear_points))
    }

    /// Build the entity.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an out-of-range tonnage,
    /// over-armored locations, armor on locations the unit lacks, or a mech
    /// with fewer jump jets than jump MP; returns [`GameError::Mount`] when
    /// equipment does not fit.
    pub fn build(self) -> Result<Entity> {
        self.validate_tonnage()?;
        let caps = self.archetype.caps();

        for (location, _, _) in &self.armor {
            if caps.location_spec(*location).is_none() {
                return Err(GameError::InvalidArgument(format!(
                    "{} has no location {location}",
                    caps.name
                )));
            }
        }

        let mut locations = Vec::with_capacity(caps.locations.len());
        for spec in caps.locations {
            let internal = self.internal_for(spec.location)?;
            let state = if internal == Points::NotApplicable {
                LocationState::new(spec.location, Points::NotApplicable, Points::NotApplicable, internal, 0)
            } else {
                let (armor, rear) = self.armor_for(spec.location, internal.value(), spec.rear_armor)?;
                let mut state = LocationState::new(spec.location, armor, rear, internal, spec.slots);
                if self.archetype.is_mech() {
                    for (slot, system) in state.slots.iter_mut().zip(standard_slots(spec.location)) {
                        *slot = CriticalSlot::system(*system);
                    }
                }
                state
            };
            locations.push(state);
        }
        if self.archetype.is_mech() {
            // Second sensors and life support pair fill the back of the head.
            if let Some(head) = locations.iter_mut().find(|state| state.location == Location::Head) {
                head.slots[4] = CriticalSlot::system(SystemType::Sensors);
                head.slots[5] = CriticalSlot::system(SystemType::LifeSupport);
            }
        }

        let mut entity = Entity {
            id: self.id,
            name: self.name,
            owner: self.owner,
            team: self.team,
            position: self.position,
            facing: self.facing,
            elevation: self.elevation,
            crew: self.crew,
            heat: 0,
            turn: TurnState::default(),
            vehicle: VehicleState::default(),
            archetype: self.archetype,
            tonnage: self.tonnage,
            base_walk: self.walk,
            base_jump: self.jump,
            locations,
            equipment: Vec::new(),
            destroyed: None,
        };

        for (data, location, rear) in self.equipment {
            entity.mount(data, location, rear)?;
        }

        if entity.archetype.is_mech() {
            let jets = entity.functioning_misc(MiscKind::JumpJet);
            if jets < entity.base_jump {
                return Err(GameError::InvalidArgument(format!(
                    "jump MP {} needs {} jump jets, {jets} mounted",
                    entity.base_jump, entity.base_jump
                )));
            }
        }

        debug!(
            name = %entity.name,
            archetype = caps.name,
            tonnage = entity.tonnage,
            armor = entity.total_armor(),
            internal = entity.total_internal(),
            "Built entity"
        );
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EquipmentCatalog;
    use crate::entity::{MountError, SlotKind};

    #[test]
    fn test_internal_structure_table() {
        assert_eq!(mech_internal_structure(20, Location::CenterTorso).unwrap(), 6);
        assert_eq!(mech_internal_structure(100, Location::LeftLeg).unwrap(), 21);
        assert_eq!(mech_internal_structure(65, Location::Head).unwrap(), 3);
        assert!(mech_internal_structure(52, Location::Head).is_err());
        assert!(mech_internal_structure(15, Location::Head).is_err());
        assert!(mech_internal_structure(50, Location::Turret).is_err());
    }

    #[test]
    fn test_standard_armor_limits() {
        let mech = EntityBuilder::mech("Atlas", 100).standard_armor().build().unwrap();
        assert_eq!(mech.armor(Location::Head, false), Points::Intact(9));
        // CT: 2 * 31 = 62, a quarter to the rear
        assert_eq!(mech.armor(Location::CenterTorso, false), Points::Intact(47));
        assert_eq!(mech.armor(Location::CenterTorso, true), Points::Intact(15));
        assert_eq!(mech.armor(Location::LeftArm, false), Points::Intact(34));
    }

    #[test]
    fn test_over_armored_location_rejected() {
        let result = EntityBuilder::mech("Heavy Head", 50)
            .armor(Location::Head, 10, None)
            .build();
        assert!(matches!(result, Err(GameError::InvalidArgument(_))));

        let result = EntityBuilder::mech("Heavy CT", 50)
            .armor(Location::CenterTorso, 25, Some(8))
            .build();
        assert!(matches!(result, Err(GameError::InvalidArgument(_))));

        let result = EntityBuilder::mech("Rear Arm", 50)
            .armor(Location::LeftArm, 4, Some(2))
            .build();
        assert!(matches!(result, Err(GameError::InvalidArgument(_))));
    }

    #[test]
    fn test_vehicle_turret_optional() {
        let tank = EntityBuilder::vehicle("Tank", MotiveType::Tracked, 50)
            .turret(true)
            .standard_armor()
            .build()
            .unwrap();
        assert!(tank.has_location(Location::Turret));
        assert_eq!(tank.internal(Location::Front), Points::Intact(5));

        let apc = EntityBuilder::vehicle("APC", MotiveType::Wheeled, 10)
            .build()
            .unwrap();
        assert!(!apc.has_location(Location::Turret));
        assert_eq!(apc.internal(Location::Turret), Points::NotApplicable);
    }

    #[test]
    fn test_vehicle_weight_limits() {
        assert!(EntityBuilder::vehicle("Big Hover", MotiveType::Hover, 60).build().is_err());
        assert!(EntityBuilder::vehicle("Hover", MotiveType::Hover, 50).build().is_ok());
    }

    #[test]
    fn test_infantry_has_no_armor() {
        let platoon = EntityBuilder::infantry("Foot", 28).build().unwrap();
        assert_eq!(platoon.internal(Location::Squad), Points::Intact(28));
        assert_eq!(platoon.armor(Location::Squad, false), Points::NotApplicable);
        assert_eq!(platoon.run_mp(), 1);
    }

    #[test]
    fn test_head_layout() {
        let mech = EntityBuilder::mech("Head", 30).build().unwrap();
        let kinds: Vec<SlotKind> = mech
            .location_state(Location::Head)
            .unwrap()
            .slots()
            .iter()
            .map(|slot| slot.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SlotKind::System(SystemType::LifeSupport),
                SlotKind::System(SystemType::Sensors),
                SlotKind::System(SystemType::Cockpit),
                SlotKind::Empty,
                SlotKind::System(SystemType::Sensors),
                SlotKind::System(SystemType::LifeSupport),
            ]
        );
    }

    #[test]
    fn test_jump_needs_jets() {
        let result = EntityBuilder::mech("No Jets", 40).jump(3).build();
        assert!(matches!(result, Err(GameError::InvalidArgument(_))));
    }

    #[test]
    fn test_mount_failure_surfaces() {
        let catalog = EquipmentCatalog::standard().unwrap();
        let result = EntityBuilder::mech("Overloaded", 50)
            .equip(catalog.require("ac_20").unwrap(), Location::LeftLeg)
            .build();
        assert!(matches!(
            result,
            Err(GameError::Mount(MountError::LocationFull { .. }))
        ));
    }
}
