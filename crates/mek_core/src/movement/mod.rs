//! Movement validation.
//!
//! A proposed move is a sequence of [`StepType`]s. [`compile_path`] walks it
//! against the entity's current state and the board and returns a
//! [`CompiledPath`]: each step's resulting position, facing and elevation,
//! the MP spent so far, the gait it implies, and whether it is legal.
//!
//! Compilation runs three passes:
//!
//! 1. position and cost,
//! 2. legality and piloting rolls, front to back,
//! 3. stacking, back to front from the end of the path.
//!
//! Once a step is illegal every later step is illegal too.

mod compile;
mod cost;

pub use compile::compile_path;
pub use cost::{step_cost, terrain_cost};

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, MovementMode};
use crate::error::{GameError, Result};
use crate::hex::{Facing, HexCoord};

/// One step of a proposed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    /// Rotate one hexside counter-clockwise.
    TurnLeft,
    /// Rotate one hexside clockwise.
    TurnRight,
    /// Move one hex ahead.
    Forward,
    /// Move one hex back without turning.
    Backward,
    /// Begin a jump; must be the first step.
    StartJump,
    /// Stand up from prone.
    GetUp,
    /// Move one hex ahead into the target's hex, ramming it.
    Charge(EntityId),
    /// Jump one hex ahead onto the target.
    DeathFromAbove(EntityId),
}

impl StepType {
    /// Whether the step moves the unit into another hex.
    #[must_use]
    pub const fn enters_hex(self) -> bool {
        matches!(
            self,
            Self::Forward | Self::Backward | Self::Charge(_) | Self::DeathFromAbove(_)
        )
    }

    /// Whether the step ends in an attack on a unit in the destination.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::Charge(_) | Self::DeathFromAbove(_))
    }
}

/// Gait a step is taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// Within walking MP.
    Walk,
    /// Beyond walking MP.
    Run,
    /// Jumping.
    Jump,
    /// Not allowed.
    Illegal,
}

/// Why a step is illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IllegalReason {
    /// An earlier step was illegal.
    AfterIllegalStep,
    /// The unit cannot move at all.
    Immobile,
    /// MP spent exceeds the allowance for the gait.
    ExceedsMp,
    /// Destination is off the board.
    OffBoard,
    /// Elevation change is more than the unit can climb in one step.
    ElevationChange,
    /// Destination holds a hostile unit.
    Occupied,
    /// Jump destination is higher than the jump can reach.
    JumpTooHigh,
    /// Backward step that changes elevation.
    BackwardElevation,
    /// Backward step while running.
    BackwardWhileRunning,
    /// The unit cannot enter this terrain.
    ProhibitedTerrain,
    /// A jump has to start with the first step.
    JumpNotFirst,
    /// The unit has no working jump MP.
    NoJumpMp,
    /// Only turning and standing up are possible while prone.
    Prone,
    /// Standing up while already standing.
    NotProne,
    /// The unit is unable to stand.
    CannotStand,
    /// A charge has to be the last step.
    ChargeNotLast,
    /// Charging is not possible while jumping.
    ChargeAfterJump,
    /// A death from above needs a jump.
    DeathFromAboveWithoutJump,
    /// A death from above has to be the last step.
    DeathFromAboveNotLast,
    /// The attack target is not in the destination hex.
    TargetNotInHex,
    /// The path ends stacked with a hostile unit.
    StackingViolation,
}

/// Why a step requires a piloting roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PilotingReason {
    /// Entering rubble.
    Rubble,
    /// Entering water of depth 2 or more.
    DeepWater,
    /// Turning while running with a damaged gyro or hip.
    RunningTurnDamaged,
    /// Standing up.
    StandingUp,
    /// Landing a jump with a damaged gyro or leg.
    JumpLandingDamaged,
}

/// One step after compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompiledStep {
    /// The step.
    pub step: StepType,
    /// Position after the step.
    pub position: HexCoord,
    /// Facing after the step.
    pub facing: Facing,
    /// Elevation after the step.
    pub elevation: i32,
    /// MP spent from the start of the path through this step.
    pub mp_used: u32,
    /// Gait, or [`MoveType::Illegal`].
    pub move_type: MoveType,
    /// Whether the unit is prone after the step.
    pub prone: bool,
    /// Why the step is illegal, if it is.
    pub illegal_reason: Option<IllegalReason>,
    /// Piloting rolls the step requires.
    pub piloting: Vec<PilotingReason>,
}

impl CompiledStep {
    /// Whether the step is legal.
    #[must_use]
    pub const fn is_legal(&self) -> bool {
        self.illegal_reason.is_none()
    }
}

/// A compiled move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompiledPath {
    /// Entity moving.
    pub entity: EntityId,
    steps: Vec<CompiledStep>,
}

impl CompiledPath {
    /// All steps in order.
    #[must_use]
    pub fn steps(&self) -> &[CompiledStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last step of the legal prefix.
    #[must_use]
    pub fn last_legal(&self) -> Option<&CompiledStep> {
        self.steps.iter().take_while(|step| step.is_legal()).last()
    }

    /// Whether every step is legal.
    #[must_use]
    pub fn is_legal(&self) -> bool {
        self.steps.iter().all(CompiledStep::is_legal)
    }

    /// MP spent by the legal prefix.
    #[must_use]
    pub fn total_mp(&self) -> u32 {
        self.last_legal().map_or(0, |step| step.mp_used)
    }

    /// Hexes entered by the legal prefix.
    #[must_use]
    pub fn hexes_moved(&self) -> u32 {
        self.steps
            .iter()
            .take_while(|step| step.is_legal())
            .filter(|step| step.step.enters_hex())
            .count() as u32
    }

    /// Movement mode the legal prefix commits the unit to.
    #[must_use]
    pub fn movement_mode(&self) -> MovementMode {
        match self.last_legal().map(|step| step.move_type) {
            Some(MoveType::Jump) => MovementMode::Jumped,
            Some(MoveType::Run) => MovementMode::Ran,
            Some(MoveType::Walk) => MovementMode::Walked,
            Some(MoveType::Illegal) | None => MovementMode::Stationary,
        }
    }

    /// Commit the legal prefix to the entity it was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if `entity` is not the unit the
    /// path was compiled for.
    pub fn apply(&self, entity: &mut Entity) -> Result<()> {
        if entity.id != self.entity {
            return Err(GameError::InvalidArgument(format!(
                "path for entity {} applied to entity {}",
                self.entity, entity.id
            )));
        }
        if let Some(last) = self.last_legal() {
            entity.position = last.position;
            entity.facing = last.facing;
            entity.elevation = last.elevation;
            entity.turn.prone = last.prone;
        }
        entity.turn.movement = self.movement_mode();
        entity.turn.hexes_moved = self.hexes_moved();
        Ok(())
    }
}
