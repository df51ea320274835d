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

//! Archetype feature modules
//!
//! Each companion owns exactly one [`FeatureModule`], chosen by archetype when
//! the companion enters the world. The module keeps a private tick counter
//! and runs its ability whenever the counter reaches the configured interval.
//! Modules only ever run on the authoritative side.

mod collector;
mod follower;
mod guard;
mod healer;
mod supporter;

use super::TickContext;
use crate::config::FeatureConfig;
use crate::ecs::components::CompanionError;
use crate::ecs::{EcsEntity, SideEffect};
use menagerie_common::Archetype;
use rand::Rng;
use rand::rngs::StdRng;

pub use supporter::{SUPPORT_TIER_2_LEVEL, SUPPORT_TIER_3_LEVEL, unlocked_effects};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Collector,
    Healer,
    Supporter,
    Guard,
    Follower,
}

impl FeatureKind {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Collector => FeatureKind::Collector,
            Archetype::Healer => FeatureKind::Healer,
            Archetype::Supporter => FeatureKind::Supporter,
            Archetype::Guard => FeatureKind::Guard,
            Archetype::Follower => FeatureKind::Follower,
        }
    }

    pub fn interval(&self, config: &FeatureConfig) -> u32 {
        match self {
            FeatureKind::Collector => config.collector.interval,
            FeatureKind::Healer => config.healer.interval,
            FeatureKind::Supporter => config.supporter.interval,
            FeatureKind::Guard => config.guard.interval,
            FeatureKind::Follower => config.follower.interval,
        }
    }

    /// A module with a non-positive radius or duration does nothing at all
    pub fn enabled(&self, config: &FeatureConfig) -> bool {
        if self.interval(config) == 0 {
            return false;
        }
        match self {
            FeatureKind::Collector => config.collector.radius > 0.0,
            FeatureKind::Healer => config.healer.radius > 0.0 && config.healer.amount > 0.0,
            FeatureKind::Supporter => {
                config.supporter.radius > 0.0 && config.supporter.duration > 0
            }
            FeatureKind::Guard => config.guard.anger_duration > 0,
            FeatureKind::Follower => true,
        }
    }
}

/// Fixed-interval tick counter
///
/// Missed activations are never made up: the counter simply restarts after
/// each activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureTimer {
    counter: u32,
}

impl FeatureTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a random offset inside the jitter window so that companions
    /// spawned together do not all fire on the same tick
    pub fn jittered(interval: u32, jitter_window: u32, rng: &mut StdRng) -> Self {
        let window = jitter_window.min(interval);
        let counter = if window > 0 {
            rng.random_range(0..window)
        } else {
            0
        };
        Self { counter }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Count one tick; true when the interval has elapsed
    pub fn advance(&mut self, interval: u32) -> bool {
        self.counter += 1;
        if self.counter >= interval {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Make the next `advance` fire
    pub fn prime(&mut self, interval: u32) {
        self.counter = interval.saturating_sub(1);
    }
}

#[derive(Debug, Clone)]
pub struct FeatureModule {
    companion: EcsEntity,
    kind: FeatureKind,
    timer: FeatureTimer,
}

impl FeatureModule {
    pub fn new(
        companion: EcsEntity,
        archetype: Archetype,
        config: &FeatureConfig,
        jitter_window: u32,
        rng: &mut StdRng,
    ) -> Self {
        let kind = FeatureKind::for_archetype(archetype);
        Self {
            companion,
            kind,
            timer: FeatureTimer::jittered(kind.interval(config), jitter_window, rng),
        }
    }

    pub fn companion(&self) -> EcsEntity {
        self.companion
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn timer(&self) -> &FeatureTimer {
        &self.timer
    }

    /// Make the ability fire on the next tick
    pub fn prime(&mut self, config: &FeatureConfig) {
        self.timer.prime(self.kind.interval(config));
    }

    /// Run one simulation step for this companion's ability
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<SideEffect>, CompanionError> {
        let features = &ctx.config.features;
        if !self.kind.enabled(features) {
            return Ok(Vec::new());
        }

        let mut effects = Vec::new();
        if self.kind == FeatureKind::Guard {
            effects.extend(guard::charge(ctx, self.companion)?);
        }

        if !self.timer.advance(self.kind.interval(&ctx.config.features)) {
            return Ok(effects);
        }

        tracing::trace!("{:?} feature firing for {:?}", self.kind, self.companion);
        match self.kind {
            FeatureKind::Collector => effects.extend(collector::collect(ctx, self.companion)?),
            FeatureKind::Healer => effects.extend(healer::heal(ctx, self.companion)?),
            FeatureKind::Supporter => effects.extend(supporter::support(ctx, self.companion)?),
            FeatureKind::Guard => guard::refresh_anger(ctx, self.companion)?,
            FeatureKind::Follower => follower::bookkeeping(ctx, self.companion)?,
        }
        Ok(effects)
    }
}
