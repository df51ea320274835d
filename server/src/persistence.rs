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

//! File-backed companion persistence
//!
//! Each companion is stored as one JSON document at
//! `<save_dir>/companions/<uuid>.json`. Only durable state is written;
//! targets, timers, charge and movement are rebuilt when a companion is
//! loaded back into the world.

use crate::ecs::components::{
    Companion, CompanionError, Health, Inventory, InventoryError, Position,
};
use crate::ecs::context::WorldContext;
use crate::ecs::systems::component;
use crate::ecs::{EcsEntity, GameWorld};
use menagerie_common::{
    AggressionLevel, Archetype, CompanionId, ItemStack, PlayerId, Skin,
};
use metrics::counter;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed save data: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unsupported save version {0}")]
    Version(u32),

    #[error("Invalid companion {id}: {source}")]
    Invalid {
        id: CompanionId,
        #[source]
        source: CompanionError,
    },
}

/// Durable state of one companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionSave {
    pub version: u32,
    pub id: CompanionId,
    pub archetype: Archetype,
    pub variant: u8,
    pub skin: Skin,
    pub owner: Option<PlayerId>,
    pub ordered_to_stay: bool,
    pub aggression: AggressionLevel,
    pub experience: u64,
    pub inventory: Vec<Option<ItemStack>>,
    pub position: Vector3<f32>,
    pub health: Health,
}

impl CompanionSave {
    /// Capture the durable parts of a companion entity
    pub fn capture(world: &GameWorld, entity: EcsEntity) -> Result<Self, CompanionError> {
        let companion = component::<Companion>(world, entity)?;
        let position = component::<Position>(world, entity)?;
        let health = component::<Health>(world, entity)?;
        Ok(Self {
            version: SAVE_VERSION,
            id: companion.id,
            archetype: companion.archetype,
            variant: companion.variant,
            skin: companion.skin.clone(),
            owner: companion.owner(),
            ordered_to_stay: companion.ordered_to_stay,
            aggression: companion.aggression(),
            experience: companion.experience(),
            inventory: companion.inventory.slots().to_vec(),
            position: position.0,
            health: *health,
        })
    }

    /// Validate and rebuild the components
    pub fn into_parts(self) -> Result<(Companion, Position, Health), PersistenceError> {
        if self.version != SAVE_VERSION {
            return Err(PersistenceError::Version(self.version));
        }
        let id = self.id;
        let invalid = |source: CompanionError| PersistenceError::Invalid { id, source };
        if !self.health.is_valid() {
            return Err(invalid(CompanionError::InvalidHealth {
                current: self.health.current,
                maximum: self.health.maximum,
            }));
        }

        let inventory = Inventory::from_slots(self.inventory)
            .map_err(|e: InventoryError| invalid(e.into()))?;
        let companion = Companion::restore(
            self.id,
            self.archetype,
            self.variant,
            self.skin,
            self.owner,
            self.ordered_to_stay,
            self.aggression,
            self.experience,
            inventory,
        )
        .map_err(invalid)?;
        let health = Health::with_current(self.health.current, self.health.maximum);
        Ok((companion, Position(self.position), health))
    }
}

pub struct PersistenceManager {
    save_dir: PathBuf,
    auto_save_interval: u64,
}

impl PersistenceManager {
    pub fn new(save_dir: impl Into<PathBuf>, auto_save_interval: u64) -> Self {
        Self {
            save_dir: save_dir.into(),
            auto_save_interval,
        }
    }

    pub fn companions_dir(&self) -> PathBuf {
        self.save_dir.join("companions")
    }

    pub fn path_for(&self, id: CompanionId) -> PathBuf {
        self.companions_dir().join(format!("{}.json", id))
    }

    pub fn auto_save_interval(&self) -> u64 {
        self.auto_save_interval
    }

    /// Write one save, replacing any previous file atomically
    #[tracing::instrument(level = "debug", skip(self, save), fields(id = %save.id))]
    pub async fn save(&self, save: &CompanionSave) -> Result<(), PersistenceError> {
        let dir = self.companions_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.path_for(save.id);
        let staging = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(save)?;
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &path).await?;

        counter!("menagerie.persistence.saved").increment(1);
        Ok(())
    }

    /// Save a batch, logging failures; returns how many were written
    pub async fn save_all(&self, saves: &[CompanionSave]) -> usize {
        let mut saved = 0;
        for save in saves {
            match self.save(save).await {
                Ok(()) => saved += 1,
                Err(e) => tracing::error!("Failed to save companion {}: {}", save.id, e),
            }
        }
        saved
    }

    pub async fn load(&self, id: CompanionId) -> Result<CompanionSave, PersistenceError> {
        read_save(&self.path_for(id)).await
    }

    /// Load every readable save
    ///
    /// A single bad file is logged and skipped. A missing save directory is
    /// an empty world.
    #[tracing::instrument(level = "info", skip(self), fields(dir = %self.save_dir.display()))]
    pub async fn load_all(&self) -> Result<Vec<CompanionSave>, PersistenceError> {
        let dir = self.companions_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No save directory at {}, starting empty", dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut saves = Vec::new();
        let mut failed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_save(&path).await {
                Ok(save) => saves.push(save),
                Err(e) => {
                    failed += 1;
                    tracing::error!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} companion saves", saves.len());
        if failed > 0 {
            tracing::warn!("{} companion saves failed to load", failed);
        }
        Ok(saves)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: CompanionId) -> Result<(), PersistenceError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write every dirty companion and delete files of removed ones
    pub async fn auto_save(&self, context: &Mutex<WorldContext>) -> usize {
        let (saves, removed) = {
            let mut context = context.lock().await;
            (context.take_dirty_saves(), context.take_removed())
        };

        let removed: HashSet<CompanionId> = removed.into_iter().collect();
        for id in &removed {
            if let Err(e) = self.delete(*id).await {
                tracing::error!("Failed to delete save for {}: {}", id, e);
            }
        }

        let saves: Vec<CompanionSave> = saves
            .into_iter()
            .filter(|save| !removed.contains(&save.id))
            .collect();
        if saves.is_empty() {
            return 0;
        }

        tracing::info!("Auto-saving {} dirty companions", saves.len());
        let saved = self.save_all(&saves).await;
        tracing::info!("Auto-save completed: {} companions saved", saved);
        saved
    }

    pub fn start_auto_save_task(self: Arc<Self>, context: Arc<Mutex<WorldContext>>) -> JoinHandle<()> {
        let interval = self.auto_save_interval.max(1);

        let handle = tokio::spawn(async move {
            let mut interval_timer =
                tokio::time::interval(tokio::time::Duration::from_secs(interval));
            // The first tick completes immediately
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;
                self.auto_save(&context).await;
            }
        });

        tracing::info!("Auto-save task started (interval: {}s)", interval);
        handle
    }
}

async fn read_save(path: &Path) -> Result<CompanionSave, PersistenceError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
