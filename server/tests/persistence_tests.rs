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

//! Save, reload and auto-save of companion records

use menagerie_common::{
    AggressionLevel, Archetype, ClientMessage, CompanionCommand, ItemStack, PlayerId,
};
use menagerie_server::config::Configuration;
use menagerie_server::ecs::WorldContext;
use menagerie_server::ecs::components::{Companion, Health, Position};
use menagerie_server::persistence::PersistenceManager;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

fn populated_context() -> (WorldContext, PlayerId) {
    let mut context = WorldContext::new(Configuration::default());
    let owner = PlayerId::new();

    let id = context
        .spawn_companion(Archetype::Collector, 2, Position::new(10.0, 64.0, -4.0))
        .unwrap();
    context.tame(id, owner).unwrap();
    context.handle_message(
        owner,
        ClientMessage::Command {
            companion: id,
            command: CompanionCommand::ToggleStay,
        },
    );
    context.handle_message(
        owner,
        ClientMessage::Command {
            companion: id,
            command: CompanionCommand::SetAggression(AggressionLevel::PassiveFlee),
        },
    );
    let entity = context.entity_of(id).unwrap();
    {
        let world = context.world();
        let mut companion = world.get::<&mut Companion>(entity).unwrap();
        companion.add_experience(37);
        companion.inventory.insert(&ItemStack::new("minecraft:bone", 12));
        let mut health = world.get::<&mut Health>(entity).unwrap();
        health.damage(5.0);
    }

    let guard = context
        .spawn_companion(Archetype::Guard, 0, Position::new(0.0, 64.0, 0.0))
        .unwrap();
    context.tame(guard, owner).unwrap();

    (context, owner)
}

#[tokio::test]
async fn saved_companions_reload_identically() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path(), 60);
    let (mut original, _owner) = populated_context();

    let saves = original.take_dirty_saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(manager.save_all(&saves).await, 2);
    assert!(original.take_dirty_saves().is_empty());

    let mut restored = WorldContext::new(Configuration::default());
    for save in manager.load_all().await.unwrap() {
        restored.restore_companion(save).unwrap();
    }

    assert_eq!(restored.companion_count(), 2);
    for save in &saves {
        assert_eq!(restored.snapshot(save.id), original.snapshot(save.id));
        let position = restored
            .world()
            .get::<&Position>(restored.entity_of(save.id).unwrap())
            .unwrap()
            .0;
        assert_eq!(position, save.position);
    }
}

#[tokio::test]
async fn corrupt_save_is_skipped() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path(), 60);
    let (mut context, _owner) = populated_context();
    manager.save_all(&context.take_dirty_saves()).await;

    tokio::fs::write(manager.companions_dir().join("broken.json"), b"{ nope")
        .await
        .unwrap();

    assert_eq!(manager.load_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_directory_loads_empty() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path().join("nowhere"), 60);
    assert!(manager.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn auto_save_writes_dirty_and_deletes_removed() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path(), 60);
    let (context, owner) = populated_context();
    let ids: Vec<_> = context.registry().ids().collect();
    let context = Arc::new(Mutex::new(context));

    assert_eq!(manager.auto_save(&context).await, 2);
    assert_eq!(manager.auto_save(&context).await, 0);
    for id in &ids {
        assert!(manager.path_for(*id).exists());
    }

    {
        let mut context = context.lock().await;
        context.remove_companion(ids[0]).unwrap();
        context.handle_message(
            owner,
            ClientMessage::Command {
                companion: ids[1],
                command: CompanionCommand::ToggleStay,
            },
        );
    }
    assert_eq!(manager.auto_save(&context).await, 1);

    assert!(!manager.path_for(ids[0]).exists());
    let reloaded = manager.load(ids[1]).await.unwrap();
    assert!(reloaded.ordered_to_stay);
}

#[tokio::test]
async fn wild_save_cannot_claim_stay_or_aggression() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path(), 60);
    let mut context = WorldContext::new(Configuration::default());
    let id = context
        .spawn_companion(Archetype::Guard, 0, Position::new(0.0, 64.0, 0.0))
        .unwrap();
    let mut save = context.take_dirty_saves().remove(0);
    save.ordered_to_stay = true;
    save.aggression = AggressionLevel::AggressivePlayers;
    manager.save(&save).await.unwrap();

    let mut restored = WorldContext::new(Configuration::default());
    restored
        .restore_companion(manager.load(id).await.unwrap())
        .unwrap();
    let snapshot = restored.snapshot(id).unwrap();
    assert!(!snapshot.ordered_to_stay);
    assert_eq!(
        snapshot.aggression,
        Archetype::Guard.aggression_profile().wild()
    );
}

#[tokio::test]
async fn save_with_impossible_health_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manager = PersistenceManager::new(dir.path(), 60);
    let (mut context, _owner) = populated_context();
    let mut saves = context.take_dirty_saves();
    let broken = saves[0].id;
    saves[0].health = Health {
        current: 5.0,
        maximum: -1.0,
    };
    manager.save_all(&saves).await;

    let mut restored = WorldContext::new(Configuration::default());
    let mut failures = Vec::new();
    for save in manager.load_all().await.unwrap() {
        let id = save.id;
        if restored.restore_companion(save).is_err() {
            failures.push(id);
        }
    }

    assert_eq!(failures, vec![broken]);
    assert_eq!(restored.companion_count(), 1);
    assert!(restored.snapshot(broken).is_none());
}
