//! Game state container.
//!
//! Rules queries read the game through [`GameView`] so hosts can supply
//! their own state store. [`Game`] is the reference implementation used by
//! the tests and by simple drivers.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Board, Hex};
use crate::entity::{DestructionCause, Entity, EntityId};
use crate::error::{GameError, Result};
use crate::hex::HexCoord;
use crate::options::GameOptions;

/// Read-only view of a game, as needed by the rules.
pub trait GameView {
    /// Entity by id, destroyed or not.
    fn entity_by_id(&self, id: EntityId) -> Option<&Entity>;

    /// Entities still in play standing in a hex, in id order.
    fn entities_at(&self, coord: HexCoord) -> Vec<&Entity>;

    /// Hex at a coordinate.
    fn hex_at(&self, coord: HexCoord) -> Option<&Hex> {
        self.board().hex(coord)
    }

    /// The board.
    fn board(&self) -> &Board;

    /// Ruleset flags.
    fn options(&self) -> &GameOptions;
}

/// A board, its options and the units on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    options: GameOptions,
    entities: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
    turn: u32,
}

impl Game {
    /// Empty game on a board.
    #[must_use]
    pub fn new(board: Board, options: GameOptions) -> Self {
        Self {
            board,
            options,
            entities: BTreeMap::new(),
            next_id: 1,
            turn: 1,
        }
    }

    /// Current turn number, starting at 1.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Mutable board, for explicit terrain edits.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Mutable options.
    pub fn options_mut(&mut self) -> &mut GameOptions {
        &mut self.options
    }

    /// Add an entity, assigning it the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OffBoard`] if the entity stands off the board.
    pub fn add_entity(&mut self, mut entity: Entity) -> Result<EntityId> {
        if !self.board.contains(entity.position) {
            return Err(GameError::OffBoard(entity.position));
        }
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        debug!(id, name = %entity.name, position = %entity.position, "Added entity");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Remove an entity entirely.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if there is no such entity.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity> {
        self.entities.remove(&id).ok_or(GameError::EntityNotFound(id))
    }

    /// Take an entity out of play without removing its record.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if there is no such entity.
    pub fn withdraw(&mut self, id: EntityId) -> Result<()> {
        let entity = self.entity_mut(id)?;
        entity.destroy(DestructionCause::Withdrawn);
        info!(id, "Entity withdrawn");
        Ok(())
    }

    /// Entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if there is no such entity.
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(GameError::EntityNotFound(id))
    }

    /// Mutable entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if there is no such entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(&id).ok_or(GameError::EntityNotFound(id))
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Entities still in play.
    pub fn active_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|entity| !entity.is_destroyed())
    }

    /// End of a phase: doomed locations become destroyed.
    pub fn end_phase(&mut self) {
        for entity in self.entities.values_mut() {
            entity.end_phase();
        }
    }

    /// Advance to the next turn.
    pub fn new_turn(&mut self) {
        self.end_phase();
        self.turn += 1;
        for entity in self.entities.values_mut() {
            entity.new_turn();
        }
        debug!(turn = self.turn, "New turn");
    }

    /// Hash of the game state for desync detection.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);
        self.board.hash(&mut hasher);
        self.options.hash(&mut hasher);

        // BTreeMap iterates in id order.
        self.entities.len().hash(&mut hasher);
        for (id, entity) in &self.entities {
            id.hash(&mut hasher);
            entity.hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the game to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Serialization(format!("Failed to serialize game: {e}")))
    }

    /// Deserialize a game from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if decoding fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| GameError::Serialization(format!("Failed to deserialize game: {e}")))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Board::default(), GameOptions::default())
    }
}

impl GameView for Game {
    fn entity_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn entities_at(&self, coord: HexCoord) -> Vec<&Entity> {
        self.active_entities()
            .filter(|entity| entity.position == coord)
            .collect()
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn options(&self) -> &GameOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::apply_damage;
    use crate::entity::{EntityBuilder, Location};
    use crate::hex::Facing;

    fn game_with_two() -> (Game, EntityId, EntityId) {
        let mut game = Game::default();
        let a = game
            .add_entity(
                EntityBuilder::mech("Alpha", 50)
                    .at(HexCoord::new(2, 2), Facing::South)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let b = game
            .add_entity(
                EntityBuilder::mech("Bravo", 50)
                    .side(1, 1)
                    .at(HexCoord::new(2, 5), Facing::North)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        (game, a, b)
    }

    #[test]
    fn test_add_entity_assigns_ids() {
        let (game, a, b) = game_with_two();
        assert_eq!((a, b), (1, 2));
        assert_eq!(game.entity(b).unwrap().name, "Bravo");
        assert!(matches!(game.entity(9), Err(GameError::EntityNotFound(9))));
    }

    #[test]
    fn test_add_entity_off_board() {
        let mut game = Game::default();
        let entity = EntityBuilder::mech("Lost", 50)
            .at(HexCoord::new(-1, 0), Facing::North)
            .build()
            .unwrap();
        assert!(matches!(game.add_entity(entity), Err(GameError::OffBoard(_))));
    }

    #[test]
    fn test_entities_at_skips_withdrawn() {
        let (mut game, a, _) = game_with_two();
        assert_eq!(game.entities_at(HexCoord::new(2, 2)).len(), 1);
        game.withdraw(a).unwrap();
        assert!(game.entities_at(HexCoord::new(2, 2)).is_empty());
        assert!(game.entity_by_id(a).is_some());
    }

    #[test]
    fn test_new_turn_finalises_damage() {
        let (mut game, a, _) = game_with_two();
        apply_damage(game.entity_mut(a).unwrap(), Location::LeftArm, false, 20).unwrap();
        game.new_turn();
        assert_eq!(game.turn(), 2);
        assert!(game.entity(a).unwrap().is_location_destroyed(Location::LeftArm));
    }

    #[test]
    fn test_serialize_round_trip_keeps_hash() {
        let (mut game, _, b) = game_with_two();
        apply_damage(game.entity_mut(b).unwrap(), Location::CenterTorso, true, 3).unwrap();
        let bytes = game.serialize().unwrap();
        let restored = Game::deserialize(&bytes).unwrap();
        assert_eq!(restored, game);
        assert_eq!(restored.state_hash(), game.state_hash());
    }

    #[test]
    fn test_state_hash_changes_with_damage() {
        let (mut game, a, _) = game_with_two();
        let before = game.state_hash();
        apply_damage(game.entity_mut(a).unwrap(), Location::RightLeg, false, 1).unwrap();
        assert_ne!(before, game.state_hash());
    }

    #[test]
    fn test_deserialize_garbage() {
        assert!(matches!(
            Game::deserialize(&[0xff, 0x01]),
            Err(GameError::Serialization(_))
        ));
    }
}
