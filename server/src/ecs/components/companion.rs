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

use hecs::Entity;
use menagerie_common::progression::level_for_experience;
use menagerie_common::{
    AggressionLevel, Archetype, CompanionId, CompanionSnapshot, PlayerId, Skin,
};
use thiserror::Error;

use super::{Health, Inventory, InventoryError};
use crate::ecs::registry::RegistryError;

/// Errors raised while operating on a single companion
///
/// At the tick boundary these are logged and the companion is skipped for
/// that step; they never abort the whole tick.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("Unknown companion {0}")]
    UnknownCompanion(CompanionId),

    #[error("Entity {0:?} no longer exists")]
    NoSuchEntity(Entity),

    #[error("Entity {entity:?} is missing component {component}")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("Invalid health {current}/{maximum}")]
    InvalidHealth { current: f32, maximum: f32 },

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CompanionError {
    pub fn missing<T>(entity: Entity) -> Self {
        CompanionError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }
}

/// The authoritative record of one companion
///
/// Ownership and aggression are private so every change goes through the
/// methods below, which keep the aggression level inside the archetype's
/// supported set and pin untamed companions to their wild level.
#[derive(Debug, Clone)]
pub struct Companion {
    pub id: CompanionId,
    pub archetype: Archetype,
    pub variant: u8,
    pub skin: Skin,
    owner: Option<PlayerId>,
    pub ordered_to_stay: bool,
    aggression: AggressionLevel,
    experience: u64,
    pub inventory: Inventory,

    // Runtime state, rebuilt after a load
    pub target: Option<Entity>,
    pub anger_ticks: u32,
    pub charge: u32,
}

impl Companion {
    /// Create a wild companion
    pub fn new(id: CompanionId, archetype: Archetype, variant: u8) -> Self {
        Self {
            id,
            archetype,
            variant,
            skin: Skin::default(),
            owner: None,
            ordered_to_stay: false,
            aggression: archetype.aggression_profile().wild(),
            experience: 0,
            inventory: Inventory::with_capacity(archetype.inventory_capacity()),
            target: None,
            anger_ticks: 0,
            charge: 0,
        }
    }

    /// Rebuild a record from saved parts
    ///
    /// The inventory must match the archetype's capacity. An aggression level
    /// that breaks the ownership invariants is replaced with the archetype's
    /// wild or tamed default rather than rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CompanionId,
        archetype: Archetype,
        variant: u8,
        skin: Skin,
        owner: Option<PlayerId>,
        ordered_to_stay: bool,
        aggression: AggressionLevel,
        experience: u64,
        inventory: Inventory,
    ) -> Result<Self, CompanionError> {
        let expected = archetype.inventory_capacity();
        if inventory.capacity() != expected {
            return Err(InventoryError::CapacityMismatch {
                expected,
                found: inventory.capacity(),
            }
            .into());
        }

        let profile = archetype.aggression_profile();
        let aggression = match owner {
            None => profile.wild(),
            Some(_) => profile.validate(aggression).unwrap_or_else(|| {
                tracing::warn!(
                    "Companion {} saved with unsupported aggression {}, using {}",
                    id,
                    aggression,
                    profile.default_level()
                );
                profile.default_level()
            }),
        };

        Ok(Self {
            id,
            archetype,
            variant,
            skin,
            owner,
            ordered_to_stay: owner.is_some() && ordered_to_stay,
            aggression,
            experience,
            inventory,
            target: None,
            anger_ticks: 0,
            charge: 0,
        })
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn is_tamed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// Transfer ownership and reset aggression to the tamed default
    pub fn tame(&mut self, owner: PlayerId) {
        self.owner = Some(owner);
        self.aggression = self.archetype.aggression_profile().default_level();
        self.disengage();
    }

    /// Return the companion to the wild
    pub fn release(&mut self) {
        self.owner = None;
        self.aggression = self.archetype.aggression_profile().wild();
        self.ordered_to_stay = false;
        self.disengage();
    }

    /// Drop the current target along with any anger and charge held for it
    pub fn disengage(&mut self) {
        self.target = None;
        self.anger_ticks = 0;
        self.charge = 0;
    }

    pub fn aggression(&self) -> AggressionLevel {
        self.aggression
    }

    /// Advance to the next supported aggression level
    ///
    /// Untamed companions keep their wild level.
    pub fn cycle_aggression(&mut self) -> bool {
        if !self.is_tamed() {
            return false;
        }
        let next = self.archetype.aggression_profile().next(self.aggression);
        self.change_aggression(next);
        true
    }

    /// Set a specific level; unsupported levels are ignored
    pub fn set_aggression(&mut self, level: AggressionLevel) -> bool {
        if !self.is_tamed() {
            return false;
        }
        match self.archetype.aggression_profile().validate(level) {
            Some(level) => {
                self.change_aggression(level);
                true
            }
            None => false,
        }
    }

    /// A new level takes effect on the next target selection from scratch
    fn change_aggression(&mut self, level: AggressionLevel) {
        if level != self.aggression {
            self.aggression = level;
            self.disengage();
        }
    }

    pub fn toggle_stay(&mut self) -> bool {
        self.ordered_to_stay = !self.ordered_to_stay;
        self.ordered_to_stay
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn add_experience(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
    }

    pub fn reset_experience(&mut self) {
        self.experience = 0;
    }

    pub fn level(&self) -> u32 {
        level_for_experience(self.experience)
    }

    pub fn charging(&self) -> bool {
        self.charge > 0
    }

    pub fn snapshot(&self, health: Option<&Health>) -> CompanionSnapshot {
        let (current, maximum) = health.map_or((0.0, 0.0), |h| (h.current, h.maximum));
        CompanionSnapshot {
            id: self.id,
            archetype: self.archetype,
            variant: self.variant,
            skin: self.skin.clone(),
            owner: self.owner,
            ordered_to_stay: self.ordered_to_stay,
            aggression: self.aggression,
            experience: self.experience,
            level: self.level(),
            inventory: self.inventory.slots().to_vec(),
            health: current,
            max_health: maximum,
            charging: self.charging(),
        }
    }
}

/// Marker for companions with unsaved changes
#[derive(Debug, Clone, Copy, Default)]
pub struct Dirty;
