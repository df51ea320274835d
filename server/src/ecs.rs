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

//! Entity Component System for the companion simulation
//!
//! Every living companion, player, creature and item lying in the world is an
//! entity in one hecs [`World`]. Components are plain data; systems are free
//! functions or small structs that are driven once per tick by
//! [`context::WorldContext`].

pub use hecs::{Entity, Query, QueryBorrow, QueryOne, World};

pub type EcsEntity = Entity;

pub type GameWorld = World;

pub mod components;
pub mod context;
pub mod effects;
pub mod registry;
pub mod systems;
pub mod terrain;

pub use context::WorldContext;
pub use effects::SideEffect;
pub use registry::EntityRegistry;
pub use terrain::{FlatTerrain, Terrain};

#[cfg(test)]
pub mod test_utils;
