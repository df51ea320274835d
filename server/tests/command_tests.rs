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

//! Ownership gating and skin resolution through the command channel

use async_trait::async_trait;
use menagerie_common::{
    AggressionLevel, Archetype, ClientMessage, CompanionCommand, CompanionId, PlayerId,
    ResolvedProfile, SkinSource,
};
use menagerie_server::config::Configuration;
use menagerie_server::ecs::WorldContext;
use menagerie_server::ecs::components::{Companion, Creature, Health, Position};
use menagerie_server::profile::{ProfileError, ProfileResolver, ProfileService};
use std::sync::Arc;
use uuid::Uuid;

fn owned_guard() -> (WorldContext, PlayerId, CompanionId) {
    let mut config = Configuration::default();
    config.simulation.seed = Some(7);
    let mut context = WorldContext::new(config);
    let owner = PlayerId::new();
    let id = context
        .spawn_companion(Archetype::Guard, 0, Position::new(0.0, 64.0, 0.0))
        .unwrap();
    context.tame(id, owner).unwrap();
    (context, owner, id)
}

fn every_command(companion: CompanionId) -> Vec<ClientMessage> {
    vec![
        ClientMessage::Command {
            companion,
            command: CompanionCommand::CycleAggression,
        },
        ClientMessage::Command {
            companion,
            command: CompanionCommand::SetAggression(AggressionLevel::Aggressive),
        },
        ClientMessage::Command {
            companion,
            command: CompanionCommand::ToggleStay,
        },
        ClientMessage::SkinChange {
            companion,
            reference: "https://example.com/skin.png".to_string(),
            source: "url".to_string(),
            profile: None,
        },
        ClientMessage::SkinChange {
            companion,
            reference: "Notch".to_string(),
            source: "player".to_string(),
            profile: None,
        },
    ]
}

#[test]
fn non_owner_commands_leave_record_byte_identical() {
    let (mut context, _owner, id) = owned_guard();
    let before = context.snapshot(id).unwrap().encode().unwrap();

    let stranger = PlayerId::new();
    for message in every_command(id) {
        let outcome = context.handle_message(stranger, message);
        assert!(outcome.is_rejected(), "accepted {:?}", outcome);
    }

    assert_eq!(context.snapshot(id).unwrap().encode().unwrap(), before);
}

#[test]
fn untamed_companion_rejects_everyone() {
    let mut context = WorldContext::new(Configuration::default());
    let id = context
        .spawn_companion(Archetype::Collector, 0, Position::new(0.0, 64.0, 0.0))
        .unwrap();
    let before = context.snapshot(id).unwrap().encode().unwrap();

    for message in every_command(id) {
        assert!(context.handle_message(PlayerId::new(), message).is_rejected());
    }
    assert_eq!(context.snapshot(id).unwrap().encode().unwrap(), before);
}

#[test]
fn owner_cycles_guard_through_levels() {
    let (mut context, owner, id) = owned_guard();
    let start = context.snapshot(id).unwrap().aggression;

    let cycle = ClientMessage::Command {
        companion: id,
        command: CompanionCommand::CycleAggression,
    };
    let mut seen = vec![start];
    loop {
        assert!(!context.handle_message(owner, cycle.clone()).is_rejected());
        let level = context.snapshot(id).unwrap().aggression;
        if level == start {
            break;
        }
        assert!(!seen.contains(&level));
        seen.push(level);
    }
    assert_eq!(seen.len(), Archetype::Guard.aggression_profile().levels().len());
}

#[test]
fn aggression_change_applies_on_next_tick() {
    let (mut context, owner, id) = owned_guard();
    let entity = context.entity_of(id).unwrap();
    let monster = context.world_mut().spawn((
        Creature::monster(),
        Position::new(3.0, 64.0, 0.0),
        Health::new(20.0),
    ));
    let target_of =
        |context: &WorldContext| context.world().get::<&Companion>(entity).unwrap().target;

    context.tick();
    assert_eq!(target_of(&context), Some(monster));

    let outcome = context.handle_message(
        owner,
        ClientMessage::Command {
            companion: id,
            command: CompanionCommand::SetAggression(AggressionLevel::Neutral),
        },
    );
    assert!(!outcome.is_rejected());
    context.tick();

    assert_eq!(target_of(&context), None);
    assert_eq!(context.snapshot(id).unwrap().aggression, AggressionLevel::Neutral);
}

#[test]
fn raw_garbage_is_rejected() {
    let (mut context, owner, id) = owned_guard();
    let before = context.snapshot(id).unwrap().encode().unwrap();

    assert!(context.handle_raw(owner, b"{not json").is_rejected());
    assert!(context.handle_raw(owner, &[]).is_rejected());
    assert_eq!(context.snapshot(id).unwrap().encode().unwrap(), before);
}

#[test]
fn owner_url_skin_applies_immediately() {
    let (mut context, owner, id) = owned_guard();
    let outcome = context.handle_message(
        owner,
        ClientMessage::SkinChange {
            companion: id,
            reference: "https://example.com/skin.png".to_string(),
            source: "url".to_string(),
            profile: None,
        },
    );
    assert!(!outcome.is_rejected());

    let skin = context.snapshot(id).unwrap().skin;
    assert_eq!(skin.source, SkinSource::Url);
    assert_eq!(skin.reference, "https://example.com/skin.png");
}

struct FixedResolver;

#[async_trait]
impl ProfileResolver for FixedResolver {
    async fn resolve(&self, player_name: &str) -> Result<ResolvedProfile, ProfileError> {
        if player_name.eq_ignore_ascii_case("notch") {
            Ok(ResolvedProfile {
                id: Uuid::nil(),
                name: "Notch".to_string(),
                texture: Some("https://textures.example.com/notch".to_string()),
            })
        } else {
            Err(ProfileError::NotFound(player_name.to_string()))
        }
    }
}

#[tokio::test]
async fn player_skin_resolves_off_tick() {
    let (context, owner, id) = owned_guard();
    let mut context =
        context.with_profile_service(Arc::new(ProfileService::new(Arc::new(FixedResolver))));

    let outcome = context.handle_message(
        owner,
        ClientMessage::SkinChange {
            companion: id,
            reference: "Notch".to_string(),
            source: "player".to_string(),
            profile: None,
        },
    );
    assert!(!outcome.is_rejected());
    assert_ne!(context.snapshot(id).unwrap().skin.source, SkinSource::Player);

    let mut resolved = None;
    for _ in 0..50 {
        tokio::task::yield_now().await;
        context.tick();
        let skin = context.snapshot(id).unwrap().skin;
        if skin.profile.is_some() {
            resolved = Some(skin);
            break;
        }
    }

    let skin = resolved.expect("profile never applied");
    assert_eq!(skin.source, SkinSource::Player);
    assert_eq!(skin.reference, "Notch");
    assert_eq!(skin.profile.unwrap().id, Uuid::nil());
}

#[tokio::test]
async fn profile_dropped_when_ownership_changed() {
    let (context, owner, id) = owned_guard();
    let mut context =
        context.with_profile_service(Arc::new(ProfileService::new(Arc::new(FixedResolver))));

    context.handle_message(
        owner,
        ClientMessage::SkinChange {
            companion: id,
            reference: "Notch".to_string(),
            source: "player".to_string(),
            profile: None,
        },
    );
    context.tame(id, PlayerId::new()).unwrap();

    for _ in 0..50 {
        tokio::task::yield_now().await;
        context.tick();
    }

    assert!(context.snapshot(id).unwrap().skin.profile.is_none());
}
