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

//! Systems driven once per tick by the world context

mod command;
pub mod features;
mod movement;
mod sync;
mod targeting;

pub use command::*;
pub use features::{FeatureKind, FeatureModule, FeatureTimer};
pub use movement::*;
pub use sync::*;
pub use targeting::*;

use crate::config::Configuration;
use crate::ecs::components::{Companion, CompanionError, Position};
use crate::ecs::{EcsEntity, GameWorld, Terrain};
use hecs::{Component, Ref, RefMut};
use rand::rngs::StdRng;

/// Everything a per-companion step may touch
pub struct TickContext<'a> {
    pub world: &'a mut GameWorld,
    pub config: &'a Configuration,
    pub terrain: &'a dyn Terrain,
    pub rng: &'a mut StdRng,
}

pub(crate) fn component<T: Component>(
    world: &GameWorld,
    entity: EcsEntity,
) -> Result<Ref<'_, T>, CompanionError> {
    if !world.contains(entity) {
        return Err(CompanionError::NoSuchEntity(entity));
    }
    world
        .get::<&T>(entity)
        .map_err(|_| CompanionError::missing::<T>(entity))
}

pub(crate) fn component_mut<T: Component>(
    world: &GameWorld,
    entity: EcsEntity,
) -> Result<RefMut<'_, T>, CompanionError> {
    if !world.contains(entity) {
        return Err(CompanionError::NoSuchEntity(entity));
    }
    world
        .get::<&mut T>(entity)
        .map_err(|_| CompanionError::missing::<T>(entity))
}

pub(crate) fn position_of(world: &GameWorld, entity: EcsEntity) -> Result<Position, CompanionError> {
    component::<Position>(world, entity).map(|p| *p)
}

pub(crate) fn companion_of(
    world: &GameWorld,
    entity: EcsEntity,
) -> Result<Ref<'_, Companion>, CompanionError> {
    component::<Companion>(world, entity)
}
