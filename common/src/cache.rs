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

//! Client-side companion cache
//!
//! A passive, read-only projection of the companions a client owns. It is
//! only ever updated from [`ServerMessage`]s and may lag behind the server
//! until the next sync message arrives. Rendering and HUD code read from it;
//! gameplay decisions must not.

use crate::ids::CompanionId;
use crate::protocol::ServerMessage;
use crate::snapshot::CompanionSnapshot;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ClientCompanionCache {
    companions: HashMap<CompanionId, CompanionSnapshot>,
    /// Number of full rosters received, mostly useful to UI code that waits
    /// for the first one after connecting
    rosters_received: u64,
}

impl ClientCompanionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one replication message
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::FullRoster { companions } => {
                self.companions = companions.into_iter().map(|c| (c.id, c)).collect();
                self.rosters_received += 1;
            }
            ServerMessage::Companion(snapshot) => {
                self.companions.insert(snapshot.id, snapshot);
            }
            ServerMessage::CompanionRemoved { companion } => {
                self.companions.remove(&companion);
            }
        }
    }

    pub fn get(&self, id: CompanionId) -> Option<&CompanionSnapshot> {
        self.companions.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompanionSnapshot> {
        self.companions.values()
    }

    pub fn len(&self) -> usize {
        self.companions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }

    pub fn rosters_received(&self) -> u64 {
        self.rosters_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use crate::snapshot::fixtures::snapshot;

    #[test]
    fn test_full_roster_replaces_contents() {
        let owner = PlayerId::new();
        let mut cache = ClientCompanionCache::new();
        let stale = snapshot(Some(owner));
        cache.apply(ServerMessage::Companion(stale.clone()));

        let fresh = snapshot(Some(owner));
        cache.apply(ServerMessage::FullRoster {
            companions: vec![fresh.clone()],
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.get(stale.id).is_none());
        assert_eq!(cache.get(fresh.id), Some(&fresh));
        assert_eq!(cache.rosters_received(), 1);
    }

    #[test]
    fn test_single_update_and_removal() {
        let mut cache = ClientCompanionCache::new();
        let mut companion = snapshot(Some(PlayerId::new()));
        cache.apply(ServerMessage::Companion(companion.clone()));

        companion.ordered_to_stay = true;
        cache.apply(ServerMessage::Companion(companion.clone()));
        assert!(cache.get(companion.id).unwrap().ordered_to_stay);

        cache.apply(ServerMessage::CompanionRemoved {
            companion: companion.id,
        });
        assert!(cache.is_empty());
    }
}
