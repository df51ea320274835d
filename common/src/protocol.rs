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

//! Client/server companion protocol
//!
//! Messages are encoded as JSON. The server never trusts an inbound message:
//! the issuer is implied by the connection and every command is checked
//! against the companion's owner before it is applied.

use crate::aggression::AggressionLevel;
use crate::ids::CompanionId;
use crate::skin::ResolvedProfile;
use crate::snapshot::CompanionSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Owner intents that mutate a companion record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanionCommand {
    /// Advance to the next aggression level supported by the archetype
    CycleAggression,
    /// Jump straight to a level; ignored unless the archetype supports it
    SetAggression(AggressionLevel),
    /// Flip the "ordered to stay" flag
    ToggleStay,
}

/// Client to server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    Command {
        companion: CompanionId,
        command: CompanionCommand,
    },
    SkinChange {
        companion: CompanionId,
        reference: String,
        /// Skin source kind as sent by the client, validated server side
        source: String,
        profile: Option<ResolvedProfile>,
    },
    /// Request the companion roster screen
    OpenRoster,
}

/// Server to client messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Every companion the recipient owns; replaces the client cache
    FullRoster { companions: Vec<CompanionSnapshot> },
    /// A single companion whose state changed
    Companion(CompanionSnapshot),
    CompanionRemoved { companion: CompanionId },
}

/// Errors raised while encoding or decoding protocol messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientMessage {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }

    /// Companion targeted by this message, if any
    pub fn companion(&self) -> Option<CompanionId> {
        match self {
            ClientMessage::Command { companion, .. }
            | ClientMessage::SkinChange { companion, .. } => Some(*companion),
            ClientMessage::OpenRoster => None,
        }
    }
}

impl ServerMessage {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }
}
