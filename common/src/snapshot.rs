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

//! Replicated projection of a companion record

use crate::aggression::AggressionLevel;
use crate::archetype::Archetype;
use crate::ids::{CompanionId, PlayerId};
use crate::item::ItemStack;
use crate::protocol::ProtocolError;
use crate::skin::Skin;
use serde::{Deserialize, Serialize};

/// Everything a client is told about one companion
///
/// Position and orientation are replicated by the host engine's own entity
/// tracking and are deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionSnapshot {
    pub id: CompanionId,
    pub archetype: Archetype,
    pub variant: u8,
    pub skin: Skin,
    pub owner: Option<PlayerId>,
    pub ordered_to_stay: bool,
    pub aggression: AggressionLevel,
    pub experience: u64,
    pub level: u32,
    pub inventory: Vec<Option<ItemStack>>,
    pub health: f32,
    pub max_health: f32,
    pub charging: bool,
}

impl CompanionSnapshot {
    /// Canonical byte encoding used both on the wire and for change detection
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    pub fn is_tamed(&self) -> bool {
        self.owner.is_some()
    }
}
