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

//! Observable results of a tick
//!
//! Systems never play sounds or spawn particles themselves. They return
//! descriptions that the host forwards to its own sound and particle
//! subsystems.

use hecs::Entity;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Ambient noise a sitting companion makes now and then
    IdleCue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Heal,
    Buff,
    Collect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Sound {
        at: Vector3<f32>,
        sound: SoundCue,
    },
    Particles {
        at: Vector3<f32>,
        kind: ParticleKind,
    },
    /// A ranged guard fired at its target
    Projectile {
        from: Entity,
        target: Entity,
    },
    Jump {
        entity: Entity,
    },
}
