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

//! World context
//!
//! Owns the hecs world and everything keyed by it: the id registry, feature
//! modules, sync cache and sessions. All simulation happens through
//! `&mut WorldContext`, so command handling and ticking never interleave.

use crate::config::{Configuration, Role};
use crate::ecs::components::{
    Bounds, Companion, CompanionError, Dirty, Health, Orientation, Position, Provoked,
    StatusEffects, Velocity,
};
use crate::ecs::registry::EntityRegistry;
use crate::ecs::systems::{
    self, CommandOutcome, FeatureModule, MovementController, SyncSystem, TickContext,
};
use crate::ecs::{EcsEntity, FlatTerrain, GameWorld, SideEffect, Terrain};
use crate::persistence::{CompanionSave, PersistenceError};
use crate::profile::{ProfileError, ProfileService};
use crate::session::{OutboundSender, SessionManager};
use menagerie_common::{
    Archetype, ClientMessage, CompanionId, CompanionSnapshot, PlayerId, ResolvedProfile,
    ServerMessage, Skin, SkinSource,
};
use metrics::gauge;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default maximum health for a freshly spawned companion
pub const COMPANION_HEALTH: f32 = 20.0;

/// Result of an asynchronous profile lookup, applied on the next tick
#[derive(Debug)]
pub struct ProfileResolution {
    pub companion: CompanionId,
    pub issuer: PlayerId,
    pub player_name: String,
    pub result: Result<ResolvedProfile, ProfileError>,
}

pub(crate) fn companion_bundle(
    companion: Companion,
    position: Position,
    health: Health,
) -> impl hecs::DynamicBundle {
    let movement = MovementController::for_archetype(companion.archetype);
    (
        companion,
        position,
        Velocity::default(),
        Orientation::default(),
        Bounds::default(),
        health,
        StatusEffects::new(),
        movement,
    )
}

/// One companion's share of a tick: targeting, steering, ability, movement
fn step_companion(
    ctx: &mut TickContext<'_>,
    module: &mut FeatureModule,
) -> Result<Vec<SideEffect>, CompanionError> {
    let entity = module.companion();
    systems::update_target(ctx, entity)?;
    systems::steer(ctx, entity)?;
    let mut effects = module.tick(ctx)?;
    effects.extend(systems::step_movement(ctx, entity)?);
    Ok(effects)
}

pub struct WorldContext {
    world: GameWorld,
    registry: EntityRegistry,
    config: Configuration,
    features: HashMap<CompanionId, FeatureModule>,
    sync: SyncSystem,
    sessions: SessionManager,
    rng: StdRng,
    terrain: Box<dyn Terrain>,
    profiles: Option<Arc<ProfileService>>,
    profile_tx: mpsc::UnboundedSender<ProfileResolution>,
    profile_rx: mpsc::UnboundedReceiver<ProfileResolution>,
    removed: Vec<CompanionId>,
    ticks: u64,
}

impl WorldContext {
    pub fn new(config: Configuration) -> Self {
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (profile_tx, profile_rx) = mpsc::unbounded_channel();
        Self {
            world: GameWorld::new(),
            registry: EntityRegistry::new(),
            config,
            features: HashMap::new(),
            sync: SyncSystem::new(),
            sessions: SessionManager::new(),
            rng,
            terrain: Box::new(FlatTerrain::default()),
            profiles: None,
            profile_tx,
            profile_rx,
            removed: Vec::new(),
            ticks: 0,
        }
    }

    pub fn with_terrain(mut self, terrain: Box<dyn Terrain>) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_profile_service(mut self, profiles: Arc<ProfileService>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    /// Direct world access for the host: players, creatures and pickups live
    /// here alongside companions
    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sync(&self) -> &SyncSystem {
        &self.sync
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn companion_count(&self) -> usize {
        self.registry.len()
    }

    pub fn entity_of(&self, id: CompanionId) -> Option<EcsEntity> {
        self.registry.get_entity(id)
    }

    pub fn feature(&self, id: CompanionId) -> Option<&FeatureModule> {
        self.features.get(&id)
    }

    /// Current snapshot of one companion
    pub fn snapshot(&self, id: CompanionId) -> Option<CompanionSnapshot> {
        let entity = self.registry.get_entity(id)?;
        let companion = self.world.get::<&Companion>(entity).ok()?;
        let health = self.world.get::<&Health>(entity).ok();
        Some(companion.snapshot(health.as_deref()))
    }

    /// Swap in a new configuration between ticks
    pub fn reload_config(&mut self, config: Configuration) {
        tracing::info!("Reloading configuration");
        self.config = config;
    }

    // ============================================================================
    // Companion lifecycle
    // ============================================================================

    /// Spawn a wild companion
    pub fn spawn_companion(
        &mut self,
        archetype: Archetype,
        variant: u8,
        position: Position,
    ) -> Result<CompanionId, CompanionError> {
        let companion = Companion::new(CompanionId::new(), archetype, variant);
        let id = companion.id;
        let entity = self.insert_companion(companion, position, Health::new(COMPANION_HEALTH))?;
        self.mark_dirty(entity);
        tracing::info!("Spawned {} companion {}", archetype, id);
        Ok(id)
    }

    /// Rebuild a saved companion
    pub fn restore_companion(&mut self, save: CompanionSave) -> Result<CompanionId, PersistenceError> {
        let id = save.id;
        let (companion, position, health) = save.into_parts()?;
        self.insert_companion(companion, position, health)
            .map_err(|source| PersistenceError::Invalid { id, source })?;
        tracing::debug!("Restored companion {}", id);
        Ok(id)
    }

    fn insert_companion(
        &mut self,
        companion: Companion,
        position: Position,
        health: Health,
    ) -> Result<EcsEntity, CompanionError> {
        let id = companion.id;
        let archetype = companion.archetype;
        if self.registry.contains_id(id) {
            return Err(crate::ecs::registry::RegistryError::IdTaken(id).into());
        }

        let entity = self.world.spawn(companion_bundle(companion, position, health));
        if let Err(e) = self.registry.register(entity, id) {
            let _ = self.world.despawn(entity);
            return Err(e.into());
        }
        let module = FeatureModule::new(
            entity,
            archetype,
            &self.config.features,
            self.config.simulation.jitter_window,
            &mut self.rng,
        );
        self.features.insert(id, module);
        gauge!("menagerie.companions").set(self.registry.len() as f64);
        Ok(entity)
    }

    /// Hand a companion to a new owner
    ///
    /// The only way ownership ever changes. Aggression resets to the tamed
    /// default and the previous owner, if any, is told the companion is gone.
    pub fn tame(&mut self, id: CompanionId, owner: PlayerId) -> Result<(), CompanionError> {
        let entity = self
            .registry
            .get_entity(id)
            .ok_or(CompanionError::UnknownCompanion(id))?;
        let previous = {
            let mut companion = systems::component_mut::<Companion>(&self.world, entity)?;
            let previous = companion.owner();
            companion.tame(owner);
            previous
        };
        self.mark_dirty(entity);

        self.sync.forget_companion(id);
        if let Some(previous) = previous.filter(|p| *p != owner) {
            self.sessions
                .send(previous, ServerMessage::CompanionRemoved { companion: id });
        }
        tracing::info!("Companion {} tamed by {}", id, owner);
        Ok(())
    }

    /// Remove a companion from the world for good
    pub fn remove_companion(&mut self, id: CompanionId) -> Result<Companion, CompanionError> {
        let entity = self
            .registry
            .unregister_id(id)
            .ok_or(CompanionError::UnknownCompanion(id))?;
        self.features.remove(&id);

        let companion = self
            .world
            .remove_one::<Companion>(entity)
            .map_err(|_| CompanionError::missing::<Companion>(entity))?;
        let _ = self.world.despawn(entity);

        let mut recipients = self.sync.forget_companion(id);
        recipients.extend(companion.owner());
        recipients.sort();
        recipients.dedup();
        for recipient in recipients {
            self.sessions
                .send(recipient, ServerMessage::CompanionRemoved { companion: id });
        }

        self.removed.push(id);
        gauge!("menagerie.companions").set(self.registry.len() as f64);
        tracing::info!("Removed companion {}", id);
        Ok(companion)
    }

    /// Record that something attacked a companion
    pub fn notify_attacked(&mut self, id: CompanionId, attacker: EcsEntity) -> Result<(), CompanionError> {
        let entity = self
            .registry
            .get_entity(id)
            .ok_or(CompanionError::UnknownCompanion(id))?;
        let provoked = Provoked {
            by: attacker,
            ticks_remaining: self.config.targeting.provoke_duration,
        };
        self.world
            .insert_one(entity, provoked)
            .map_err(|_| CompanionError::NoSuchEntity(entity))
    }

    /// Force a feature module to fire on the next tick
    pub fn prime_feature(&mut self, id: CompanionId) -> bool {
        match self.features.get_mut(&id) {
            Some(module) => {
                module.prime(&self.config.features);
                true
            }
            None => false,
        }
    }

    fn mark_dirty(&mut self, entity: EcsEntity) {
        let _ = self.world.insert_one(entity, Dirty);
    }

    // ============================================================================
    // Sessions and commands
    // ============================================================================

    /// Attach a player and send them their full roster
    pub fn connect(&mut self, player: PlayerId, outbound: OutboundSender) {
        self.sessions.connect(player, outbound);
        tracing::info!("Player {} connected", player);
        self.send_roster(player);
    }

    pub fn disconnect(&mut self, player: PlayerId) {
        self.sessions.disconnect(player);
        self.sync.forget_recipient(player);
        tracing::info!("Player {} disconnected", player);
    }

    fn send_roster(&mut self, player: PlayerId) {
        let roster = self.sync.full_roster(&self.world, player);
        self.sessions.send(player, roster);
    }

    /// Handle raw message bytes from a connected player
    pub fn handle_raw(&mut self, issuer: PlayerId, bytes: &[u8]) -> CommandOutcome {
        let outcome = systems::handle_raw_message(&mut self.world, &self.registry, issuer, bytes);
        self.follow_up(issuer, &outcome);
        outcome
    }

    pub fn handle_message(&mut self, issuer: PlayerId, message: ClientMessage) -> CommandOutcome {
        let outcome = systems::handle_message(&mut self.world, &self.registry, issuer, message);
        self.follow_up(issuer, &outcome);
        outcome
    }

    fn follow_up(&mut self, issuer: PlayerId, outcome: &CommandOutcome) {
        match outcome {
            CommandOutcome::RosterRequested => self.send_roster(issuer),
            CommandOutcome::ProfilePending {
                companion,
                player_name,
            } => self.request_profile(*companion, issuer, player_name.clone()),
            _ => {}
        }
    }

    /// Start a profile lookup off the tick path
    fn request_profile(&self, companion: CompanionId, issuer: PlayerId, player_name: String) {
        let Some(profiles) = self.profiles.clone() else {
            tracing::warn!(
                "No profile service configured, ignoring skin {} for {}",
                player_name,
                companion
            );
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available for profile lookup of {}", player_name);
            return;
        };

        let tx = self.profile_tx.clone();
        runtime.spawn(async move {
            let result = profiles.resolve(&player_name).await;
            let _ = tx.send(ProfileResolution {
                companion,
                issuer,
                player_name,
                result,
            });
        });
    }

    /// Queue a finished lookup; used by hosts that resolve profiles themselves
    pub fn submit_profile(&self, resolution: ProfileResolution) {
        let _ = self.profile_tx.send(resolution);
    }

    fn apply_profile_resolutions(&mut self) {
        while let Ok(resolution) = self.profile_rx.try_recv() {
            let profile = match resolution.result {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(
                        "Profile lookup for {} failed: {}",
                        resolution.player_name,
                        e
                    );
                    continue;
                }
            };
            let Some(entity) = self.registry.get_entity(resolution.companion) else {
                continue;
            };
            let applied = match self.world.get::<&mut Companion>(entity) {
                Ok(mut companion) if companion.is_owned_by(resolution.issuer) => {
                    companion.skin = Skin {
                        source: SkinSource::Player,
                        reference: resolution.player_name,
                        profile: Some(profile),
                    };
                    true
                }
                Ok(_) => {
                    tracing::debug!(
                        "Dropping profile for {}: {} no longer owns it",
                        resolution.companion,
                        resolution.issuer
                    );
                    false
                }
                Err(_) => false,
            };
            if applied {
                self.mark_dirty(entity);
            }
        }
    }

    // ============================================================================
    // Simulation
    // ============================================================================

    /// Advance the simulation by one tick
    ///
    /// Returns the side effects for the host to play back. Observers only
    /// keep their caches current and never simulate.
    pub fn tick(&mut self) -> Vec<SideEffect> {
        self.ticks += 1;
        self.apply_profile_resolutions();

        let mut effects = Vec::new();
        if self.config.simulation.role == Role::Authoritative {
            let mut ctx = TickContext {
                world: &mut self.world,
                config: &self.config,
                terrain: self.terrain.as_ref(),
                rng: &mut self.rng,
            };
            for (id, module) in self.features.iter_mut() {
                match step_companion(&mut ctx, module) {
                    Ok(produced) => effects.extend(produced),
                    Err(e) => tracing::warn!("Skipping companion {} this tick: {}", id, e),
                }
            }

            for status in self.world.query_mut::<&mut StatusEffects>() {
                status.update();
            }

            self.remove_dead();
        }

        self.dispatch_sync();
        effects
    }

    fn remove_dead(&mut self) {
        let dead: Vec<CompanionId> = self
            .world
            .query::<(&Companion, &Health)>()
            .iter()
            .filter(|(_, health)| !health.is_alive())
            .map(|(companion, _)| companion.id)
            .collect();
        for id in dead {
            if let Err(e) = self.remove_companion(id) {
                tracing::warn!("Failed to remove dead companion {}: {}", id, e);
            }
        }
    }

    /// Send every pending differential update; returns the message count
    pub fn dispatch_sync(&mut self) -> usize {
        let sessions = &self.sessions;
        let messages = self
            .sync
            .sync_pass(&self.world, |player| sessions.is_connected(player));
        let count = messages.len();
        for (recipient, message) in messages {
            self.sessions.send(recipient, message);
        }
        count
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    /// Capture and clear every dirty companion
    pub fn take_dirty_saves(&mut self) -> Vec<CompanionSave> {
        let dirty: Vec<EcsEntity> = self
            .world
            .query::<(EcsEntity, &Dirty)>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();

        let mut saves = Vec::with_capacity(dirty.len());
        for entity in dirty {
            match CompanionSave::capture(&self.world, entity) {
                Ok(save) => saves.push(save),
                Err(e) => tracing::warn!("Could not capture dirty entity {:?}: {}", entity, e),
            }
            let _ = self.world.remove_one::<Dirty>(entity);
        }
        saves
    }

    /// Capture every companion, dirty or not
    pub fn all_saves(&self) -> Vec<CompanionSave> {
        self.registry
            .entries()
            .filter_map(|(id, entity)| match CompanionSave::capture(&self.world, entity) {
                Ok(save) => Some(save),
                Err(e) => {
                    tracing::warn!("Could not capture companion {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    /// Ids removed since the last call, whose saves should be deleted
    pub fn take_removed(&mut self) -> Vec<CompanionId> {
        std::mem::take(&mut self.removed)
    }
}
