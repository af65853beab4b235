//! The three compilation passes.

use tracing::{debug, trace};

use super::cost::terrain_cost;
use super::{CompiledPath, CompiledStep, IllegalReason, MoveType, PilotingReason, StepType};
use crate::board::{Board, TerrainKind};
use crate::entity::{Entity, EntityId, Location, SystemType};
use crate::error::{GameError, Result};
use crate::game::GameView;
use crate::hex::{direction, translate, HexCoord};

/// Compile a step sequence for an entity.
///
/// # Errors
///
/// Returns [`GameError::EntityNotFound`] if the game has no such entity.
/// Illegal steps are not errors; they are marked in the returned path.
pub fn compile_path(game: &dyn GameView, entity_id: EntityId, steps: &[StepType]) -> Result<CompiledPath> {
    let entity = game
        .entity_by_id(entity_id)
        .ok_or(GameError::EntityNotFound(entity_id))?;

    let mut working = position_pass(game.board(), entity, steps);
    legality_pass(game, entity, &mut working);
    stacking_pass(game, entity, &mut working);

    let path = CompiledPath {
        entity: entity_id,
        steps: working.into_iter().map(|work| work.step).collect(),
    };
    debug!(
        entity = entity_id,
        steps = path.len(),
        legal = path.is_legal(),
        mp = path.total_mp(),
        "Compiled path"
    );
    Ok(path)
}

/// A step plus what the later passes need to know about it.
struct Working {
    step: CompiledStep,
    on_board: bool,
    climb: i32,
    jumping: bool,
}

fn is_hostile(entity: &Entity, other: &Entity) -> bool {
    other.id != entity.id && other.team != entity.team
}

fn hostile_at(game: &dyn GameView, entity: &Entity, coord: HexCoord) -> bool {
    game.entities_at(coord)
        .into_iter()
        .any(|other| is_hostile(entity, other))
}

// ============================================================================
// Pass 1: position and cost
// ============================================================================

fn position_pass(board: &Board, entity: &Entity, steps: &[StepType]) -> Vec<Working> {
    let walk_mp = entity.walk_mp();
    let mut position = entity.position;
    let mut facing = entity.facing;
    let mut elevation = entity.elevation;
    let mut prone = entity.turn.prone;
    let mut mp_used = 0;
    let mut jumping = false;
    let mut free_turn = false;

    let mut working = Vec::with_capacity(steps.len());
    for &step in steps {
        let mut on_board = true;
        let mut climb = 0;

        match step {
            StepType::TurnLeft | StepType::TurnRight => {
                facing = if step == StepType::TurnLeft {
                    facing.counter_clockwise()
                } else {
                    facing.clockwise()
                };
                if !jumping && !free_turn {
                    mp_used += 1;
                }
                free_turn = false;
            }
            StepType::StartJump => jumping = true,
            StepType::GetUp => {
                mp_used += 2;
                prone = false;
                free_turn = true;
            }
            StepType::Forward | StepType::Backward | StepType::Charge(_) | StepType::DeathFromAbove(_) => {
                let heading = if step == StepType::Backward {
                    facing.opposite()
                } else {
                    facing
                };
                let next = translate(position, heading);
                match board.hex(next) {
                    Some(hex) => {
                        climb = hex.elevation - elevation;
                        mp_used += if jumping {
                            1
                        } else {
                            terrain_cost(hex, direction(next, position)) + climb.unsigned_abs()
                        };
                        elevation = hex.elevation;
                    }
                    None => {
                        on_board = false;
                        mp_used += 1;
                    }
                }
                position = next;
                free_turn = false;
            }
        }

        let move_type = if jumping {
            MoveType::Jump
        } else if mp_used > walk_mp {
            MoveType::Run
        } else {
            MoveType::Walk
        };
        trace!(?step, %position, mp_used, ?move_type, "Position pass");

        working.push(Working {
            step: CompiledStep {
                step,
                position,
                facing,
                elevation,
                mp_used,
                move_type,
                prone,
                illegal_reason: None,
                piloting: Vec::new(),
            },
            on_board,
            climb,
            jumping,
        });
    }
    working
}

// ============================================================================
// Pass 2: legality and piloting rolls
// ============================================================================

/// Per-path facts the legality checks share.
struct Legality<'a> {
    game: &'a dyn GameView,
    entity: &'a Entity,
    run_mp: u32,
    jump_mp: u32,
    start_elevation: i32,
    last: usize,
}

impl Legality<'_> {
    fn check(&self, index: usize, work: &Working, prone_before: bool) -> Option<IllegalReason> {
        let entity = self.entity;
        let step = work.step.step;

        if entity.is_immobile() {
            return Some(IllegalReason::Immobile);
        }

        match step {
            StepType::StartJump => {
                if index != 0 {
                    return Some(IllegalReason::JumpNotFirst);
                }
                if self.jump_mp == 0 {
                    return Some(IllegalReason::NoJumpMp);
                }
                if prone_before {
                    return Some(IllegalReason::Prone);
                }
            }
            StepType::GetUp => {
                if !prone_before {
                    return Some(IllegalReason::NotProne);
                }
                if !entity.can_stand() {
                    return Some(IllegalReason::CannotStand);
                }
            }
            StepType::TurnLeft | StepType::TurnRight => {}
            StepType::Forward | StepType::Backward | StepType::Charge(_) | StepType::DeathFromAbove(_) => {
                if prone_before {
                    return Some(IllegalReason::Prone);
                }
            }
        }

        let allowance = if work.jumping { self.jump_mp } else { self.run_mp };
        if work.step.mp_used > allowance {
            return Some(IllegalReason::ExceedsMp);
        }

        if step.enters_hex() {
            return self.check_entry(index, work);
        }
        None
    }

    fn check_entry(&self, index: usize, work: &Working) -> Option<IllegalReason> {
        let step = work.step.step;
        let position = work.step.position;
        let caps = self.entity.caps();

        if !work.on_board {
            return Some(IllegalReason::OffBoard);
        }
        let hex = self.game.hex_at(position)?;

        if work.jumping {
            if hex.ceiling() > self.start_elevation + self.jump_mp as i32 {
                return Some(IllegalReason::JumpTooHigh);
            }
        } else if work.climb.abs() > caps.max_elevation_change {
            return Some(IllegalReason::ElevationChange);
        }

        if step == StepType::Backward {
            if work.climb != 0 {
                return Some(IllegalReason::BackwardElevation);
            }
            if work.step.move_type == MoveType::Run {
                return Some(IllegalReason::BackwardWhileRunning);
            }
        }

        if (caps.prohibited)(hex) && (!work.jumping || index == self.last) {
            return Some(IllegalReason::ProhibitedTerrain);
        }

        match step {
            StepType::Charge(target) => {
                if index != self.last {
                    return Some(IllegalReason::ChargeNotLast);
                }
                if work.jumping {
                    return Some(IllegalReason::ChargeAfterJump);
                }
                if !self.target_in_hex(target, position) {
                    return Some(IllegalReason::TargetNotInHex);
                }
            }
            StepType::DeathFromAbove(target) => {
                if !work.jumping {
                    return Some(IllegalReason::DeathFromAboveWithoutJump);
                }
                if index != self.last {
                    return Some(IllegalReason::DeathFromAboveNotLast);
                }
                if !self.target_in_hex(target, position) {
                    return Some(IllegalReason::TargetNotInHex);
                }
            }
            _ => {
                if !work.jumping && hostile_at(self.game, self.entity, position) {
                    return Some(IllegalReason::Occupied);
                }
            }
        }
        None
    }

    fn target_in_hex(&self, target: EntityId, position: HexCoord) -> bool {
        self.game
            .entities_at(position)
            .into_iter()
            .any(|other| other.id == target && other.id != self.entity.id)
    }

    fn piloting(&self, index: usize, work: &Working) -> Vec<PilotingReason> {
        let entity = self.entity;
        let mut reasons = Vec::new();
        if !entity.archetype().is_mech() {
            return reasons;
        }
        let step = work.step.step;
        let landing = !work.jumping || index == self.last;

        if step.enters_hex() && landing {
            if let Some(hex) = self.game.hex_at(work.step.position) {
                if hex.contains(TerrainKind::Rubble) {
                    reasons.push(PilotingReason::Rubble);
                }
                if hex.water_depth() >= 2 {
                    reasons.push(PilotingReason::DeepWater);
                }
            }
        }
        if matches!(step, StepType::TurnLeft | StepType::TurnRight)
            && work.step.move_type == MoveType::Run
            && (entity.gyro_hits() > 0 || hip_hit(entity))
        {
            reasons.push(PilotingReason::RunningTurnDamaged);
        }
        if step == StepType::GetUp {
            reasons.push(PilotingReason::StandingUp);
        }
        if work.jumping && index == self.last && (entity.gyro_hits() > 0 || leg_damaged(entity)) {
            reasons.push(PilotingReason::JumpLandingDamaged);
        }
        reasons
    }
}

fn hip_hit(entity: &Entity) -> bool {
    [Location::LeftLeg, Location::RightLeg]
        .into_iter()
        .any(|leg| entity.actuator_hit(leg, SystemType::Hip))
}

fn leg_damaged(entity: &Entity) -> bool {
    const LEG_ACTUATORS: [SystemType; 4] = [
        SystemType::Hip,
        SystemType::UpperLeg,
        SystemType::LowerLeg,
        SystemType::Foot,
    ];
    [Location::LeftLeg, Location::RightLeg].into_iter().any(|leg| {
        entity.is_location_lost(leg) || LEG_ACTUATORS.iter().any(|&actuator| entity.actuator_hit(leg, actuator))
    })
}

fn legality_pass(game: &dyn GameView, entity: &Entity, working: &mut [Working]) {
    let rules = Legality {
        game,
        entity,
        run_mp: entity.run_mp(),
        jump_mp: entity.jump_mp(),
        start_elevation: entity.elevation,
        last: working.len().saturating_sub(1),
    };

    let mut prone = entity.turn.prone;
    let mut failed = false;
    for (index, work) in working.iter_mut().enumerate() {
        let reason = if failed {
            Some(IllegalReason::AfterIllegalStep)
        } else {
            rules.check(index, work, prone)
        };

        match reason {
            Some(reason) => {
                failed = true;
                work.step.illegal_reason = Some(reason);
                work.step.move_type = MoveType::Illegal;
                trace!(index, ?reason, "Illegal step");
            }
            None => {
                work.step.piloting = rules.piloting(index, work);
                prone = work.step.prone;
            }
        }
    }
}

// ============================================================================
// Pass 3: stacking, from the end of the path
// ============================================================================

fn stacking_pass(game: &dyn GameView, entity: &Entity, working: &mut [Working]) {
    let legal_prefix = working
        .iter_mut()
        .rev()
        .skip_while(|work| work.step.illegal_reason.is_some());
    for work in legal_prefix {
        if work.step.step.is_attack() || !hostile_at(game, entity, work.step.position) {
            break;
        }
        work.step.illegal_reason = Some(IllegalReason::StackingViolation);
        work.step.move_type = MoveType::Illegal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, Terrain};
    use crate::entity::{EntityBuilder, MotiveType};
    use crate::game::Game;
    use crate::hex::Facing;

    const START: HexCoord = HexCoord::new(4, 8);

    fn game_with(builder: EntityBuilder) -> (Game, EntityId) {
        let mut game = Game::default();
        let id = game.add_entity(builder.at(START, Facing::North).build().unwrap()).unwrap();
        (game, id)
    }

    fn set_hex(game: &mut Game, coord: HexCoord, hex: Hex) {
        game.board_mut().set_hex(coord, hex).unwrap();
    }

    #[test]
    fn test_empty_path() {
        let (game, id) = game_with(EntityBuilder::mech("Walker", 50));
        let path = compile_path(&game, id, &[]).unwrap();
        assert!(path.is_empty());
        assert!(path.last_legal().is_none());
        assert_eq!(path.total_mp(), 0);
    }

    #[test]
    fn test_unknown_entity() {
        let game = Game::default();
        assert!(matches!(
            compile_path(&game, 7, &[StepType::Forward]),
            Err(GameError::EntityNotFound(7))
        ));
    }

    #[test]
    fn test_walk_then_run_then_illegal() {
        // Walk 2, run 3.
        let (game, id) = game_with(EntityBuilder::mech("Walker", 50).walk(2));
        let path = compile_path(&game, id, &[StepType::Forward; 4]).unwrap();
        let types: Vec<MoveType> = path.steps().iter().map(|step| step.move_type).collect();
        assert_eq!(
            types,
            vec![MoveType::Walk, MoveType::Walk, MoveType::Run, MoveType::Illegal]
        );
        assert_eq!(path.steps()[3].illegal_reason, Some(IllegalReason::ExceedsMp));
        assert_eq!(path.total_mp(), 3);
    }

    #[test]
    fn test_turns_cost_one() {
        let (game, id) = game_with(EntityBuilder::mech("Walker", 50));
        let path = compile_path(&game, id, &[StepType::TurnLeft, StepType::Forward]).unwrap();
        let last = path.last_legal().unwrap();
        assert_eq!(last.mp_used, 2);
        assert_eq!(last.facing, Facing::NorthWest);
    }

    #[test]
    fn test_illegality_is_sticky() {
        let (mut game, id) = game_with(EntityBuilder::mech("Walker", 50));
        set_hex(&mut game, HexCoord::new(4, 7), Hex::new(3));
        let path = compile_path(
            &game,
            id,
            &[StepType::Forward, StepType::TurnLeft, StepType::TurnRight],
        )
        .unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::ElevationChange));
        assert!(path.steps()[1..]
            .iter()
            .all(|step| step.illegal_reason == Some(IllegalReason::AfterIllegalStep)));
    }

    #[test]
    fn test_off_board() {
        let mut game = Game::default();
        let id = game
            .add_entity(
                EntityBuilder::mech("Edge", 50)
                    .at(HexCoord::new(0, 0), Facing::North)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let path = compile_path(&game, id, &[StepType::Forward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::OffBoard));
    }

    #[test]
    fn test_backward_restrictions() {
        let (mut game, id) = game_with(EntityBuilder::mech("Walker", 50));
        set_hex(&mut game, HexCoord::new(4, 9), Hex::new(1));
        let path = compile_path(&game, id, &[StepType::Backward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::BackwardElevation));

        let (game, id) = game_with(EntityBuilder::mech("Walker", 50).walk(2));
        let path = compile_path(&game, id, &[StepType::Backward; 3]).unwrap();
        assert!(path.steps()[1].is_legal());
        assert_eq!(path.steps()[2].illegal_reason, Some(IllegalReason::BackwardWhileRunning));
    }

    #[test]
    fn test_jump_rules() {
        let catalog = crate::data::EquipmentCatalog::standard().unwrap();
        let jet = catalog.require("jump_jet").unwrap();
        let builder = EntityBuilder::mech("Jumper", 50)
            .jump(3)
            .equip(jet.clone(), Location::LeftLeg)
            .equip(jet.clone(), Location::RightLeg)
            .equip(jet, Location::CenterTorso);
        let (mut game, id) = game_with(builder);
        set_hex(&mut game, HexCoord::new(4, 7), Hex::new(2).with(Terrain::new(TerrainKind::Woods, 2)));

        let path = compile_path(
            &game,
            id,
            &[StepType::StartJump, StepType::Forward, StepType::TurnLeft, StepType::Forward],
        )
        .unwrap();
        assert!(path.is_legal());
        assert_eq!(path.total_mp(), 2);
        assert!(path.steps().iter().skip(1).all(|step| step.move_type == MoveType::Jump));

        let path = compile_path(&game, id, &[StepType::Forward, StepType::StartJump]).unwrap();
        assert_eq!(path.steps()[1].illegal_reason, Some(IllegalReason::JumpNotFirst));

        set_hex(&mut game, HexCoord::new(4, 7), Hex::new(4));
        let path = compile_path(&game, id, &[StepType::StartJump, StepType::Forward]).unwrap();
        assert_eq!(path.steps()[1].illegal_reason, Some(IllegalReason::JumpTooHigh));
    }

    #[test]
    fn test_jump_without_jets() {
        let (game, id) = game_with(EntityBuilder::mech("Walker", 50));
        let path = compile_path(&game, id, &[StepType::StartJump]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::NoJumpMp));
    }

    #[test]
    fn test_prone_and_get_up() {
        let (mut game, id) = game_with(EntityBuilder::mech("Faller", 50));
        game.entity_mut(id).unwrap().turn.prone = true;

        let path = compile_path(&game, id, &[StepType::Forward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::Prone));

        let path = compile_path(&game, id, &[StepType::GetUp, StepType::TurnLeft, StepType::Forward]).unwrap();
        assert!(path.is_legal());
        assert_eq!(path.steps()[0].piloting, vec![PilotingReason::StandingUp]);
        // The turn straight after standing is free.
        assert_eq!(path.steps()[1].mp_used, 2);
        assert_eq!(path.total_mp(), 3);

        game.entity_mut(id).unwrap().turn.prone = false;
        let path = compile_path(&game, id, &[StepType::GetUp]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::NotProne));
    }

    #[test]
    fn test_hostile_hex_blocks_but_allies_do_not() {
        let (mut game, id) = game_with(EntityBuilder::mech("Walker", 50));
        let ahead = HexCoord::new(4, 7);
        let enemy = game
            .add_entity(
                EntityBuilder::mech("Enemy", 50)
                    .side(2, 2)
                    .at(ahead, Facing::South)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let path = compile_path(&game, id, &[StepType::Forward, StepType::Forward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::Occupied));

        let path = compile_path(&game, id, &[StepType::Charge(enemy)]).unwrap();
        assert!(path.is_legal());

        game.entity_mut(enemy).unwrap().team = 0;
        let path = compile_path(&game, id, &[StepType::Forward, StepType::Forward]).unwrap();
        assert!(path.is_legal());
    }

    #[test]
    fn test_jump_landing_on_hostile_is_stacking_violation() {
        let catalog = crate::data::EquipmentCatalog::standard().unwrap();
        let (mut game, id) = game_with(
            EntityBuilder::mech("Jumper", 50)
                .jump(1)
                .equip(catalog.require("jump_jet").unwrap(), Location::CenterTorso),
        );
        game.add_entity(
            EntityBuilder::mech("Enemy", 50)
                .side(2, 2)
                .at(HexCoord::new(4, 7), Facing::South)
                .build()
                .unwrap(),
        )
        .unwrap();
        let path = compile_path(&game, id, &[StepType::StartJump, StepType::Forward, StepType::TurnRight]).unwrap();
        assert!(path.steps()[0].is_legal());
        assert_eq!(path.steps()[1].illegal_reason, Some(IllegalReason::StackingViolation));
        assert_eq!(path.steps()[2].illegal_reason, Some(IllegalReason::StackingViolation));
    }

    #[test]
    fn test_stacking_checked_from_end_of_legal_prefix() {
        let catalog = crate::data::EquipmentCatalog::standard().unwrap();
        let (mut game, id) = game_with(
            EntityBuilder::mech("Jumper", 50)
                .jump(1)
                .equip(catalog.require("jump_jet").unwrap(), Location::CenterTorso),
        );
        game.add_entity(
            EntityBuilder::mech("Enemy", 50)
                .side(2, 2)
                .at(HexCoord::new(4, 7), Facing::South)
                .build()
                .unwrap(),
        )
        .unwrap();
        let path = compile_path(&game, id, &[StepType::StartJump, StepType::Forward, StepType::Forward]).unwrap();
        assert!(path.steps()[0].is_legal());
        assert_eq!(path.steps()[1].illegal_reason, Some(IllegalReason::StackingViolation));
        assert_eq!(path.steps()[2].illegal_reason, Some(IllegalReason::ExceedsMp));
        assert_eq!(path.last_legal().map(|step| step.position), Some(START));
    }

    #[test]
    fn test_charge_rules() {
        let (game, id) = game_with(EntityBuilder::mech("Walker", 50));
        let path = compile_path(&game, id, &[StepType::Charge(99), StepType::Forward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::ChargeNotLast));

        let path = compile_path(&game, id, &[StepType::Charge(99)]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::TargetNotInHex));

        let path = compile_path(&game, id, &[StepType::DeathFromAbove(99)]).unwrap();
        assert_eq!(
            path.steps()[0].illegal_reason,
            Some(IllegalReason::DeathFromAboveWithoutJump)
        );
    }

    #[test]
    fn test_vehicle_prohibited_terrain() {
        let (mut game, id) = game_with(EntityBuilder::vehicle("Car", MotiveType::Wheeled, 30));
        set_hex(&mut game, HexCoord::new(4, 7), Hex::new(0).with(Terrain::new(TerrainKind::Woods, 1)));
        let path = compile_path(&game, id, &[StepType::Forward]).unwrap();
        assert_eq!(path.steps()[0].illegal_reason, Some(IllegalReason::ProhibitedTerrain));
    }

    #[test]
    fn test_piloting_for_rubble_and_deep_water() {
        let (mut game, id) = game_with(EntityBuilder::mech("Walker", 50).walk(6));
        set_hex(&mut game, HexCoord::new(4, 7), Hex::new(0).with(Terrain::new(TerrainKind::Rubble, 1)));
        set_hex(&mut game, HexCoord::new(4, 6), Hex::new(0).with(Terrain::new(TerrainKind::Water, 2)));
        let path = compile_path(&game, id, &[StepType::Forward, StepType::Forward]).unwrap();
        assert!(path.is_legal());
        assert_eq!(path.steps()[0].piloting, vec![PilotingReason::Rubble]);
        assert_eq!(path.steps()[1].piloting, vec![PilotingReason::DeepWater]);
        assert_eq!(path.total_mp(), 6);
    }

    #[test]
    fn test_apply_commits_legal_prefix() {
        let (mut game, id) = game_with(EntityBuilder::mech("Walker", 50).walk(2));
        let path = compile_path(&game, id, &[StepType::Forward; 4]).unwrap();
        let entity = game.entity_mut(id).unwrap();
        path.apply(entity).unwrap();
        assert_eq!(entity.position, HexCoord::new(4, 5));
        assert_eq!(entity.turn.hexes_moved, 3);
        assert_eq!(entity.turn.movement, crate::entity::MovementMode::Ran);
    }
}
