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

//! Companion archetypes and their fixed per-role properties

use crate::aggression::{AggressionLevel, AggressionProfile};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role a companion was created with
///
/// The archetype is fixed for the lifetime of a companion and selects its
/// feature module, inventory capacity and aggression profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Collector,
    Healer,
    Supporter,
    Guard,
    Follower,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Collector,
        Archetype::Healer,
        Archetype::Supporter,
        Archetype::Guard,
        Archetype::Follower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Collector => "Collector",
            Archetype::Healer => "Healer",
            Archetype::Supporter => "Supporter",
            Archetype::Guard => "Guard",
            Archetype::Follower => "Follower",
        }
    }

    /// Number of inventory slots a companion of this archetype carries
    pub fn inventory_capacity(&self) -> usize {
        match self {
            Archetype::Collector => 16,
            Archetype::Healer
            | Archetype::Supporter
            | Archetype::Guard
            | Archetype::Follower => 0,
        }
    }

    /// Aggression states this archetype supports, in cycling order
    pub fn aggression_profile(&self) -> &'static AggressionProfile {
        use AggressionLevel::*;

        static COLLECTOR: AggressionProfile =
            AggressionProfile::new(&[Passive, PassiveFlee], Passive, Passive);
        static HEALER: AggressionProfile =
            AggressionProfile::new(&[Passive, PassiveFlee, Neutral], PassiveFlee, Passive);
        static SUPPORTER: AggressionProfile =
            AggressionProfile::new(&[Passive, PassiveFlee, Neutral], Passive, Passive);
        static GUARD: AggressionProfile = AggressionProfile::new(
            &[
                Neutral,
                Aggressive,
                AggressiveMonsters,
                AggressiveAnimals,
                AggressivePlayers,
                Passive,
            ],
            AggressiveMonsters,
            Neutral,
        );
        static FOLLOWER: AggressionProfile =
            AggressionProfile::new(&[Neutral, Aggressive, Passive, PassiveFlee], Neutral, Neutral);

        match self {
            Archetype::Collector => &COLLECTOR,
            Archetype::Healer => &HEALER,
            Archetype::Supporter => &SUPPORTER,
            Archetype::Guard => &GUARD,
            Archetype::Follower => &FOLLOWER,
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collector" => Ok(Archetype::Collector),
            "healer" => Ok(Archetype::Healer),
            "supporter" => Ok(Archetype::Supporter),
            "guard" => Ok(Archetype::Guard),
            "follower" => Ok(Archetype::Follower),
            other => Err(format!("Unknown archetype: {}", other)),
        }
    }
}
