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

//! Menagerie Common Types and Protocol
//!
//! This crate defines the types shared by the companion world server and its
//! clients:
//! - Identifiers, archetypes and the aggression state machine
//! - Experience/level progression
//! - Companion snapshots and the client/server protocol
//! - The client-side read-only companion cache

pub mod aggression;
pub mod archetype;
pub mod cache;
pub mod ids;
pub mod item;
pub mod progression;
pub mod protocol;
pub mod skin;
pub mod snapshot;

pub use aggression::{AggressionLevel, AggressionProfile};
pub use archetype::Archetype;
pub use cache::ClientCompanionCache;
pub use ids::{CompanionId, PlayerId};
pub use item::{ItemStack, MAX_STACK};
pub use protocol::{ClientMessage, CompanionCommand, ProtocolError, ServerMessage};
pub use skin::{ResolvedProfile, Skin, SkinSource};
pub use snapshot::CompanionSnapshot;
