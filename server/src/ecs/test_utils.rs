//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Shared fixtures for system unit tests

use crate::config::Configuration;
use crate::ecs::components::{
    Companion, Creature, Health, ItemPickup, Player, Position, StatusEffects,
};
use crate::ecs::context::{COMPANION_HEALTH, companion_bundle};
use crate::ecs::systems::TickContext;
use crate::ecs::{EcsEntity, FlatTerrain, GameWorld, Terrain};
use menagerie_common::{Archetype, CompanionId, ItemStack, PlayerId};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A bare world plus the pieces a [`TickContext`] borrows
pub struct TestWorld {
    pub world: GameWorld,
    pub config: Configuration,
    pub terrain: Box<dyn Terrain>,
    pub rng: StdRng,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_terrain(Box::new(FlatTerrain::default()))
    }

    pub fn with_terrain(terrain: Box<dyn Terrain>) -> Self {
        Self {
            world: GameWorld::new(),
            config: Configuration::default(),
            terrain,
            rng: StdRng::seed_from_u64(42),
        }
    }

    pub fn tick_context(&mut self) -> TickContext<'_> {
        TickContext {
            world: &mut self.world,
            config: &self.config,
            terrain: self.terrain.as_ref(),
            rng: &mut self.rng,
        }
    }

    pub fn companion(&mut self, archetype: Archetype, position: Position) -> EcsEntity {
        let companion = Companion::new(CompanionId::new(), archetype, 0);
        self.world.spawn(companion_bundle(
            companion,
            position,
            Health::new(COMPANION_HEALTH),
        ))
    }

    pub fn tamed_companion(
        &mut self,
        archetype: Archetype,
        owner: PlayerId,
        position: Position,
    ) -> EcsEntity {
        let entity = self.companion(archetype, position);
        if let Ok(mut companion) = self.world.get::<&mut Companion>(entity) {
            companion.tame(owner);
        }
        entity
    }

    pub fn player(&mut self, position: Position) -> (EcsEntity, PlayerId) {
        let id = PlayerId::new();
        (self.player_with_id(id, position), id)
    }

    pub fn player_with_id(&mut self, id: PlayerId, position: Position) -> EcsEntity {
        self.world.spawn((
            Player { id },
            position,
            Health::new(20.0),
            StatusEffects::new(),
        ))
    }

    pub fn monster(&mut self, position: Position) -> EcsEntity {
        self.world
            .spawn((Creature::monster(), position, Health::new(20.0)))
    }

    pub fn animal(&mut self, position: Position) -> EcsEntity {
        self.world
            .spawn((Creature::animal(), position, Health::new(10.0)))
    }

    pub fn pickup(&mut self, stack: ItemStack, position: Position) -> EcsEntity {
        self.world.spawn((ItemPickup(stack), position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_has_full_bundle() {
        let mut test = TestWorld::new();
        let entity = test.companion(Archetype::Collector, Position::default());

        assert!(test.world.get::<&Companion>(entity).is_ok());
        assert!(test.world.get::<&StatusEffects>(entity).is_ok());
        assert!(
            test.world
                .get::<&crate::ecs::systems::MovementController>(entity)
                .is_ok()
        );
    }
}
