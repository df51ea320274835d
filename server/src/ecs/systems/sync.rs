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

//! Differential server to client sync
//!
//! The server remembers, per recipient and companion, the exact bytes it last
//! sent. A sync pass re-encodes every companion and only sends those whose
//! bytes changed. Reconnects and roster requests start from a clean slate.

use crate::ecs::GameWorld;
use crate::ecs::components::{Companion, Health};
use menagerie_common::{CompanionId, CompanionSnapshot, PlayerId, ServerMessage};
use metrics::counter;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SyncSystem {
    sent: HashMap<(PlayerId, CompanionId), Vec<u8>>,
}

impl SyncSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached (recipient, companion) entries
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn has_sent(&self, recipient: PlayerId, companion: CompanionId) -> bool {
        self.sent.contains_key(&(recipient, companion))
    }

    /// Emit one message per companion whose encoding changed since the last
    /// message to its owner
    ///
    /// Owners for whom `is_connected` is false are skipped entirely.
    pub fn sync_pass<F>(&mut self, world: &GameWorld, is_connected: F) -> Vec<(PlayerId, ServerMessage)>
    where
        F: Fn(PlayerId) -> bool,
    {
        let mut messages = Vec::new();
        for (companion, health) in world.query::<(&Companion, Option<&Health>)>().iter() {
            let Some(owner) = companion.owner() else {
                continue;
            };
            if !is_connected(owner) {
                continue;
            }

            let snapshot = companion.snapshot(health);
            let bytes = match snapshot.encode() {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Failed to encode companion {}: {}", companion.id, e);
                    continue;
                }
            };

            let key = (owner, companion.id);
            if self.sent.get(&key) == Some(&bytes) {
                continue;
            }
            self.sent.insert(key, bytes);
            messages.push((owner, ServerMessage::Companion(snapshot)));
        }

        if !messages.is_empty() {
            tracing::trace!("Sync pass produced {} messages", messages.len());
            counter!("menagerie.sync.messages").increment(messages.len() as u64);
        }
        messages
    }

    /// Build a full roster for `recipient`, replacing everything cached for
    /// them
    pub fn full_roster(&mut self, world: &GameWorld, recipient: PlayerId) -> ServerMessage {
        self.forget_recipient(recipient);

        let mut companions: Vec<CompanionSnapshot> = world
            .query::<(&Companion, Option<&Health>)>()
            .iter()
            .filter(|(companion, _)| companion.is_owned_by(recipient))
            .map(|(companion, health)| companion.snapshot(health))
            .collect();
        companions.sort_by_key(|snapshot| snapshot.id);

        for snapshot in &companions {
            match snapshot.encode() {
                Ok(bytes) => {
                    self.sent.insert((recipient, snapshot.id), bytes);
                }
                Err(e) => tracing::warn!("Failed to encode companion {}: {}", snapshot.id, e),
            }
        }

        tracing::debug!(
            "Full roster of {} companions for {}",
            companions.len(),
            recipient
        );
        counter!("menagerie.sync.messages").increment(1);
        ServerMessage::FullRoster { companions }
    }

    pub fn forget_recipient(&mut self, recipient: PlayerId) {
        self.sent.retain(|(player, _), _| *player != recipient);
    }

    /// Drop every cache entry for a companion and return who had one
    pub fn forget_companion(&mut self, companion: CompanionId) -> Vec<PlayerId> {
        let mut recipients = Vec::new();
        self.sent.retain(|(player, id), _| {
            if *id == companion {
                recipients.push(*player);
                false
            } else {
                true
            }
        });
        recipients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Position;
    use menagerie_common::Archetype;

    fn spawn_owned(world: &mut GameWorld, owner: PlayerId) -> hecs::Entity {
        let mut companion = Companion::new(CompanionId::new(), Archetype::Follower, 0);
        companion.tame(owner);
        world.spawn((companion, Position::default(), Health::new(20.0)))
    }

    #[test]
    fn test_second_pass_without_change_is_silent() {
        let mut world = GameWorld::new();
        let owner = PlayerId::new();
        spawn_owned(&mut world, owner);
        let mut sync = SyncSystem::new();

        assert_eq!(sync.sync_pass(&world, |_| true).len(), 1);
        assert!(sync.sync_pass(&world, |_| true).is_empty());
    }

    #[test]
    fn test_change_is_sent_once() {
        let mut world = GameWorld::new();
        let owner = PlayerId::new();
        let entity = spawn_owned(&mut world, owner);
        let mut sync = SyncSystem::new();
        sync.sync_pass(&world, |_| true);

        world.get::<&mut Companion>(entity).unwrap().toggle_stay();

        let messages = sync.sync_pass(&world, |_| true);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            (recipient, ServerMessage::Companion(snapshot)) => {
                assert_eq!(*recipient, owner);
                assert!(snapshot.ordered_to_stay);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert!(sync.sync_pass(&world, |_| true).is_empty());
    }

    #[test]
    fn test_wild_and_disconnected_are_skipped() {
        let mut world = GameWorld::new();
        world.spawn((
            Companion::new(CompanionId::new(), Archetype::Guard, 0),
            Health::new(20.0),
        ));
        spawn_owned(&mut world, PlayerId::new());
        let mut sync = SyncSystem::new();

        assert!(sync.sync_pass(&world, |_| false).is_empty());
        assert!(sync.is_empty());
    }

    #[test]
    fn test_full_roster_resets_cache() {
        let mut world = GameWorld::new();
        let owner = PlayerId::new();
        spawn_owned(&mut world, owner);
        spawn_owned(&mut world, owner);
        spawn_owned(&mut world, PlayerId::new());
        let mut sync = SyncSystem::new();
        sync.sync_pass(&world, |_| true);

        match sync.full_roster(&world, owner) {
            ServerMessage::FullRoster { companions } => assert_eq!(companions.len(), 2),
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(sync.len(), 3);
        assert!(sync.sync_pass(&world, |_| true).is_empty());
    }

    #[test]
    fn test_forget_companion() {
        let mut world = GameWorld::new();
        let owner = PlayerId::new();
        let entity = spawn_owned(&mut world, owner);
        let id = world.get::<&Companion>(entity).unwrap().id;
        let mut sync = SyncSystem::new();
        sync.sync_pass(&world, |_| true);

        assert_eq!(sync.forget_companion(id), vec![owner]);
        assert!(!sync.has_sent(owner, id));
    }
}
