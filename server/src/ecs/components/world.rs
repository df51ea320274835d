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

//! Host world entities companions interact with

use hecs::Entity;
use menagerie_common::{ItemStack, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatureKind {
    Monster,
    Animal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub kind: CreatureKind,
}

impl Creature {
    pub fn monster() -> Self {
        Self {
            kind: CreatureKind::Monster,
        }
    }

    pub fn animal() -> Self {
        Self {
            kind: CreatureKind::Animal,
        }
    }
}

/// A host animal (not a companion) that a player has tamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamedAnimal {
    pub owner: PlayerId,
}

/// An item stack lying in the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPickup(pub ItemStack);

/// Set on a companion when something attacks it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provoked {
    pub by: Entity,
    pub ticks_remaining: u32,
}
