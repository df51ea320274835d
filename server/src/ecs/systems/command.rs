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

//! Ownership-gated command channel
//!
//! Every inbound message that touches a companion is checked against the
//! companion's current owner before anything else happens. Rejections are
//! logged at debug level and leave the world untouched.

use crate::ecs::components::{Companion, Dirty};
use crate::ecs::registry::EntityRegistry;
use crate::ecs::{EcsEntity, GameWorld};
use menagerie_common::{
    ClientMessage, CompanionCommand, CompanionId, PlayerId, ProtocolError, ResolvedProfile, Skin,
    SkinSource,
};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLAYER_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{1,16}$"));

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] ProtocolError),

    #[error("Unknown companion {0}")]
    UnknownCompanion(CompanionId),

    #[error("Player {issuer} does not own companion {companion}")]
    NotOwner {
        issuer: PlayerId,
        companion: CompanionId,
    },

    #[error("Invalid skin: {0}")]
    InvalidSkin(String),
}

/// What happened to one inbound message
#[derive(Debug)]
pub enum CommandOutcome {
    /// The record changed
    Applied { companion: CompanionId },
    /// Accepted, but the request did not change anything
    Unchanged { companion: CompanionId },
    /// A player skin needs its profile looked up before it can be applied
    ProfilePending {
        companion: CompanionId,
        player_name: String,
    },
    /// The issuer asked for a full roster
    RosterRequested,
    Rejected(CommandError),
}

impl CommandOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandOutcome::Rejected(_))
    }

    fn label(&self) -> &'static str {
        match self {
            CommandOutcome::Applied { .. } => "applied",
            CommandOutcome::Unchanged { .. } => "unchanged",
            CommandOutcome::ProfilePending { .. } => "pending",
            CommandOutcome::RosterRequested => "roster",
            CommandOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Validate a skin change request, returning the parsed source kind
pub fn validate_skin(reference: &str, source: &str) -> Result<SkinSource, CommandError> {
    if reference.trim().is_empty() {
        return Err(CommandError::InvalidSkin("empty reference".to_string()));
    }
    let source: SkinSource = source.parse().map_err(CommandError::InvalidSkin)?;
    match source {
        SkinSource::Default => {}
        SkinSource::Url => {
            if !(reference.starts_with("http://") || reference.starts_with("https://")) {
                return Err(CommandError::InvalidSkin(format!(
                    "not an http(s) url: {}",
                    reference
                )));
            }
        }
        SkinSource::Player => {
            let valid = PLAYER_NAME
                .as_ref()
                .is_ok_and(|pattern| pattern.is_match(reference));
            if !valid {
                return Err(CommandError::InvalidSkin(format!(
                    "not a player name: {}",
                    reference
                )));
            }
        }
    }
    Ok(source)
}

/// Resolve a companion id and check that `issuer` owns it
pub fn owned_entity(
    world: &GameWorld,
    registry: &EntityRegistry,
    issuer: PlayerId,
    companion: CompanionId,
) -> Result<EcsEntity, CommandError> {
    let entity = registry
        .get_entity(companion)
        .ok_or(CommandError::UnknownCompanion(companion))?;
    let owned = world
        .get::<&Companion>(entity)
        .is_ok_and(|record| record.is_owned_by(issuer));
    if !owned {
        return Err(CommandError::NotOwner { issuer, companion });
    }
    Ok(entity)
}

/// Decode and handle a raw message from `issuer`
pub fn handle_raw_message(
    world: &mut GameWorld,
    registry: &EntityRegistry,
    issuer: PlayerId,
    bytes: &[u8],
) -> CommandOutcome {
    match ClientMessage::decode(bytes) {
        Ok(message) => handle_message(world, registry, issuer, message),
        Err(e) => {
            tracing::warn!("Undecodable message from {}: {}", issuer, e);
            record(CommandOutcome::Rejected(e.into()))
        }
    }
}

#[tracing::instrument(level = "debug", skip(world, registry))]
pub fn handle_message(
    world: &mut GameWorld,
    registry: &EntityRegistry,
    issuer: PlayerId,
    message: ClientMessage,
) -> CommandOutcome {
    let outcome = match message {
        ClientMessage::OpenRoster => CommandOutcome::RosterRequested,
        ClientMessage::Command { companion, command } => {
            apply_command(world, registry, issuer, companion, command)
        }
        ClientMessage::SkinChange {
            companion,
            reference,
            source,
            profile,
        } => apply_skin_change(world, registry, issuer, companion, reference, &source, profile),
    };
    record(outcome)
}

fn record(outcome: CommandOutcome) -> CommandOutcome {
    match &outcome {
        CommandOutcome::Rejected(e) => {
            tracing::debug!("Rejected command: {}", e);
            counter!("menagerie.commands.rejected").increment(1);
        }
        accepted => {
            counter!("menagerie.commands.accepted", "outcome" => accepted.label()).increment(1);
        }
    }
    outcome
}

fn mark_dirty(world: &mut GameWorld, entity: EcsEntity) {
    if let Err(e) = world.insert_one(entity, Dirty) {
        tracing::warn!("Could not mark {:?} dirty: {}", entity, e);
    }
}

fn apply_command(
    world: &mut GameWorld,
    registry: &EntityRegistry,
    issuer: PlayerId,
    companion: CompanionId,
    command: CompanionCommand,
) -> CommandOutcome {
    let entity = match owned_entity(world, registry, issuer, companion) {
        Ok(entity) => entity,
        Err(e) => return CommandOutcome::Rejected(e),
    };

    let changed = match world.get::<&mut Companion>(entity) {
        Ok(mut record) => match command {
            CompanionCommand::CycleAggression => record.cycle_aggression(),
            CompanionCommand::SetAggression(level) => {
                record.aggression() != level && record.set_aggression(level)
            }
            CompanionCommand::ToggleStay => {
                record.toggle_stay();
                true
            }
        },
        Err(_) => return CommandOutcome::Rejected(CommandError::UnknownCompanion(companion)),
    };

    if changed {
        mark_dirty(world, entity);
        CommandOutcome::Applied { companion }
    } else {
        CommandOutcome::Unchanged { companion }
    }
}

fn apply_skin_change(
    world: &mut GameWorld,
    registry: &EntityRegistry,
    issuer: PlayerId,
    companion: CompanionId,
    reference: String,
    source: &str,
    profile: Option<ResolvedProfile>,
) -> CommandOutcome {
    let entity = match owned_entity(world, registry, issuer, companion) {
        Ok(entity) => entity,
        Err(e) => return CommandOutcome::Rejected(e),
    };
    let source = match validate_skin(&reference, source) {
        Ok(source) => source,
        Err(e) => return CommandOutcome::Rejected(e),
    };

    let skin = match (source, profile) {
        (SkinSource::Player, None) => {
            return CommandOutcome::ProfilePending {
                companion,
                player_name: reference,
            };
        }
        (SkinSource::Player, Some(profile)) => {
            if !profile.name.eq_ignore_ascii_case(&reference) {
                return CommandOutcome::Rejected(CommandError::InvalidSkin(format!(
                    "profile {} does not match player {}",
                    profile.name, reference
                )));
            }
            Skin {
                source,
                reference,
                profile: Some(profile),
            }
        }
        (_, _) => Skin::new(source, reference),
    };

    match world.get::<&mut Companion>(entity) {
        Ok(mut record) => record.skin = skin,
        Err(_) => return CommandOutcome::Rejected(CommandError::UnknownCompanion(companion)),
    }
    mark_dirty(world, entity);
    CommandOutcome::Applied { companion }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Health, Position};
    use menagerie_common::{AggressionLevel, Archetype};
    use tracing_test::traced_test;

    struct Fixture {
        world: GameWorld,
        registry: EntityRegistry,
        owner: PlayerId,
        id: CompanionId,
        entity: EcsEntity,
    }

    fn fixture(archetype: Archetype) -> Fixture {
        let mut world = GameWorld::new();
        let mut registry = EntityRegistry::new();
        let owner = PlayerId::new();
        let id = CompanionId::new();
        let mut companion = Companion::new(id, archetype, 0);
        companion.tame(owner);
        let entity = world.spawn((companion, Position::default(), Health::new(20.0)));
        registry.register(entity, id).unwrap();
        Fixture {
            world,
            registry,
            owner,
            id,
            entity,
        }
    }

    fn snapshot_bytes(f: &Fixture) -> Vec<u8> {
        let record = f.world.get::<&Companion>(f.entity).unwrap();
        let health = f.world.get::<&Health>(f.entity).unwrap();
        record.snapshot(Some(&health)).encode().unwrap()
    }

    #[test]
    fn test_owner_toggles_stay() {
        let mut f = fixture(Archetype::Follower);
        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            ClientMessage::Command {
                companion: f.id,
                command: CompanionCommand::ToggleStay,
            },
        );
        assert!(matches!(outcome, CommandOutcome::Applied { .. }));
        assert!(f.world.get::<&Companion>(f.entity).unwrap().ordered_to_stay);
        assert!(f.world.get::<&Dirty>(f.entity).is_ok());
    }

    #[traced_test]
    #[test]
    fn test_non_owner_is_rejected_without_change() {
        let mut f = fixture(Archetype::Guard);
        let before = snapshot_bytes(&f);
        let stranger = PlayerId::new();

        for command in [
            CompanionCommand::ToggleStay,
            CompanionCommand::CycleAggression,
            CompanionCommand::SetAggression(AggressionLevel::Passive),
        ] {
            let outcome = handle_message(
                &mut f.world,
                &f.registry,
                stranger,
                ClientMessage::Command {
                    companion: f.id,
                    command,
                },
            );
            assert!(matches!(
                outcome,
                CommandOutcome::Rejected(CommandError::NotOwner { .. })
            ));
        }

        assert_eq!(snapshot_bytes(&f), before);
        assert!(f.world.get::<&Dirty>(f.entity).is_err());
        assert!(logs_contain("does not own companion"));
    }

    #[test]
    fn test_set_unsupported_aggression_is_unchanged() {
        let mut f = fixture(Archetype::Collector);
        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            ClientMessage::Command {
                companion: f.id,
                command: CompanionCommand::SetAggression(AggressionLevel::Aggressive),
            },
        );
        assert!(matches!(outcome, CommandOutcome::Unchanged { .. }));
        assert_eq!(
            f.world.get::<&Companion>(f.entity).unwrap().aggression(),
            AggressionLevel::Passive
        );
    }

    #[test]
    fn test_unknown_companion() {
        let mut f = fixture(Archetype::Collector);
        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            ClientMessage::Command {
                companion: CompanionId::new(),
                command: CompanionCommand::ToggleStay,
            },
        );
        assert!(matches!(
            outcome,
            CommandOutcome::Rejected(CommandError::UnknownCompanion(_))
        ));
    }

    #[traced_test]
    #[test]
    fn test_garbage_bytes_are_rejected() {
        let mut f = fixture(Archetype::Collector);
        let outcome = handle_raw_message(&mut f.world, &f.registry, f.owner, b"{not json");
        assert!(matches!(
            outcome,
            CommandOutcome::Rejected(CommandError::Malformed(_))
        ));
        assert!(logs_contain("Undecodable message"));
    }

    #[test]
    fn test_skin_validation() {
        assert_eq!(validate_skin("fox", "default").unwrap(), SkinSource::Default);
        assert_eq!(
            validate_skin("https://example.com/skin.png", "url").unwrap(),
            SkinSource::Url
        );
        assert_eq!(validate_skin("Notch_42", "player").unwrap(), SkinSource::Player);

        assert!(validate_skin("", "default").is_err());
        assert!(validate_skin("ftp://example.com/skin.png", "url").is_err());
        assert!(validate_skin("way_too_long_player_name", "player").is_err());
        assert!(validate_skin("bad name", "player").is_err());
        assert!(validate_skin("fox", "texture").is_err());
    }

    #[test]
    fn test_skin_change_applies_or_waits_for_profile() {
        let mut f = fixture(Archetype::Healer);
        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            ClientMessage::SkinChange {
                companion: f.id,
                reference: "https://example.com/a.png".into(),
                source: "url".into(),
                profile: None,
            },
        );
        assert!(matches!(outcome, CommandOutcome::Applied { .. }));
        assert_eq!(
            f.world.get::<&Companion>(f.entity).unwrap().skin.source,
            SkinSource::Url
        );

        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            ClientMessage::SkinChange {
                companion: f.id,
                reference: "Steve".into(),
                source: "player".into(),
                profile: None,
            },
        );
        match outcome {
            CommandOutcome::ProfilePending { player_name, .. } => assert_eq!(player_name, "Steve"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            f.world.get::<&Companion>(f.entity).unwrap().skin.source,
            SkinSource::Url
        );
    }

    #[test]
    fn test_supplied_profile_must_match_player() {
        let mut f = fixture(Archetype::Supporter);
        let profile = |name: &str| ResolvedProfile {
            id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            texture: None,
        };
        let id = f.id;
        let skin_change = |reference: &str, name: &str| ClientMessage::SkinChange {
            companion: id,
            reference: reference.into(),
            source: "player".into(),
            profile: Some(profile(name)),
        };

        let before = snapshot_bytes(&f);
        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            skin_change("Steve", "Herobrine"),
        );
        assert!(matches!(
            outcome,
            CommandOutcome::Rejected(CommandError::InvalidSkin(_))
        ));
        assert_eq!(snapshot_bytes(&f), before);

        let outcome = handle_message(
            &mut f.world,
            &f.registry,
            f.owner,
            skin_change("steve", "Steve"),
        );
        assert!(matches!(outcome, CommandOutcome::Applied { .. }));
        let record = f.world.get::<&Companion>(f.entity).unwrap();
        assert_eq!(record.skin.source, SkinSource::Player);
        assert_eq!(record.skin.profile.as_ref().unwrap().name, "Steve");
    }
}
