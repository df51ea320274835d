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

//! Bidirectional mapping between companion ids and ECS entities

use crate::ecs::EcsEntity;
use menagerie_common::CompanionId;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Entity {0:?} is already registered")]
    EntityTaken(EcsEntity),

    #[error("Companion {0} is already registered")]
    IdTaken(CompanionId),
}

/// Maps persistent [`CompanionId`]s to runtime entity handles
///
/// Entity handles are only valid for the lifetime of the world; ids survive
/// saves and reloads. Every companion in the world is registered here exactly
/// once.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    id_to_entity: HashMap<CompanionId, EcsEntity>,
    entity_to_id: HashMap<EcsEntity, CompanionId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping between an ECS entity and its companion id
    ///
    /// Fails without changing anything if either side is already registered.
    pub fn register(&mut self, entity: EcsEntity, id: CompanionId) -> Result<(), RegistryError> {
        if self.entity_to_id.contains_key(&entity) {
            return Err(RegistryError::EntityTaken(entity));
        }
        if self.id_to_entity.contains_key(&id) {
            return Err(RegistryError::IdTaken(id));
        }

        self.id_to_entity.insert(id, entity);
        self.entity_to_id.insert(entity, id);

        Ok(())
    }

    pub fn unregister_entity(&mut self, entity: EcsEntity) -> Option<CompanionId> {
        let id = self.entity_to_id.remove(&entity)?;
        self.id_to_entity.remove(&id);
        Some(id)
    }

    pub fn unregister_id(&mut self, id: CompanionId) -> Option<EcsEntity> {
        let entity = self.id_to_entity.remove(&id)?;
        self.entity_to_id.remove(&entity);
        Some(entity)
    }

    pub fn get_entity(&self, id: CompanionId) -> Option<EcsEntity> {
        self.id_to_entity.get(&id).copied()
    }

    pub fn get_id(&self, entity: EcsEntity) -> Option<CompanionId> {
        self.entity_to_id.get(&entity).copied()
    }

    pub fn contains_id(&self, id: CompanionId) -> bool {
        self.id_to_entity.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entity_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_to_id.is_empty()
    }

    /// All registered companion ids, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = CompanionId> + '_ {
        self.id_to_entity.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (CompanionId, EcsEntity)> + '_ {
        self.id_to_entity.iter().map(|(id, entity)| (*id, *entity))
    }
}
