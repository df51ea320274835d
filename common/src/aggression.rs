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

//! Aggression state machine
//!
//! Every companion carries one [`AggressionLevel`]. Which levels are reachable
//! is constrained by the archetype's [`AggressionProfile`]; the client offers
//! a single "cycle" action and the server re-validates every transition.

use serde::{Deserialize, Serialize};

/// Targeting disposition of a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggressionLevel {
    /// Never attacks and moves away from nearby monsters
    PassiveFlee,
    /// Never attacks
    Passive,
    /// Attacks only whatever provoked it
    Neutral,
    /// Attacks monsters and provokers
    Aggressive,
    AggressiveMonsters,
    AggressiveAnimals,
    AggressivePlayers,
}

impl AggressionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggressionLevel::PassiveFlee => "passive-flee",
            AggressionLevel::Passive => "passive",
            AggressionLevel::Neutral => "neutral",
            AggressionLevel::Aggressive => "aggressive",
            AggressionLevel::AggressiveMonsters => "aggressive-toward-monsters",
            AggressionLevel::AggressiveAnimals => "aggressive-toward-animals",
            AggressionLevel::AggressivePlayers => "aggressive-toward-players",
        }
    }

    /// Whether this level ever selects a target on its own
    pub fn is_passive(&self) -> bool {
        matches!(self, AggressionLevel::PassiveFlee | AggressionLevel::Passive)
    }

    /// Whether a companion at this level retaliates against a provoker
    pub fn retaliates(&self) -> bool {
        matches!(self, AggressionLevel::Neutral | AggressionLevel::Aggressive)
    }

    pub fn targets_monsters(&self) -> bool {
        matches!(
            self,
            AggressionLevel::Aggressive | AggressionLevel::AggressiveMonsters
        )
    }

    pub fn targets_animals(&self) -> bool {
        matches!(self, AggressionLevel::AggressiveAnimals)
    }

    pub fn targets_players(&self) -> bool {
        matches!(self, AggressionLevel::AggressivePlayers)
    }
}

impl std::fmt::Display for AggressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-archetype constraint on aggression levels
///
/// `levels` is the cycling order: its first entry is the first state, its last
/// entry the last state. `default` is applied whenever the companion changes
/// owner; `wild` is held while the companion is untamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggressionProfile {
    levels: &'static [AggressionLevel],
    default: AggressionLevel,
    wild: AggressionLevel,
}

impl AggressionProfile {
    pub const fn new(
        levels: &'static [AggressionLevel],
        default: AggressionLevel,
        wild: AggressionLevel,
    ) -> Self {
        Self {
            levels,
            default,
            wild,
        }
    }

    pub fn levels(&self) -> &'static [AggressionLevel] {
        self.levels
    }

    pub fn default_level(&self) -> AggressionLevel {
        self.default
    }

    pub fn wild(&self) -> AggressionLevel {
        self.wild
    }

    pub fn first(&self) -> AggressionLevel {
        self.levels[0]
    }

    pub fn last(&self) -> AggressionLevel {
        self.levels[self.levels.len() - 1]
    }

    pub fn supports(&self, level: AggressionLevel) -> bool {
        self.levels.contains(&level)
    }

    /// Position of a level in the cycling order
    pub fn index_of(&self, level: AggressionLevel) -> Option<usize> {
        self.levels.iter().position(|l| *l == level)
    }

    /// The state reached by one cycle action from `current`
    ///
    /// Wraps from last to first. A current level outside the supported set
    /// restarts the cycle at the first state.
    pub fn next(&self, current: AggressionLevel) -> AggressionLevel {
        match self.index_of(current) {
            Some(idx) => self.levels[(idx + 1) % self.levels.len()],
            None => self.first(),
        }
    }

    /// Validate a requested level; returns the level only if supported
    pub fn validate(&self, requested: AggressionLevel) -> Option<AggressionLevel> {
        self.supports(requested).then_some(requested)
    }
}
