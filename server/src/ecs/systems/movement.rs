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

//! Movement controllers
//!
//! A controller turns "go to this position" into per-tick velocity and
//! orientation updates. The host owns real physics; here the only world
//! knowledge comes from [`Terrain`](crate::ecs::Terrain).

use super::{TickContext, companion_of, component, component_mut};
use crate::ecs::components::{Bounds, CompanionError, Orientation, Position, Velocity};
use crate::ecs::effects::SoundCue;
use crate::ecs::{EcsEntity, SideEffect};
use menagerie_common::Archetype;
use nalgebra::Vector3;

/// Squared distance under which a controller counts as arrived
pub const ARRIVAL_EPSILON_SQUARED: f32 = 2.5e-7;

/// Per-tick velocity factor for circling flight near its target
pub const CIRCLING_DAMPING: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locomotion {
    /// Walks on the ground under gravity and hops onto low obstacles
    Ground,
    /// Floats, steering height directly toward the target
    Hover,
    /// Point-to-point flight in three dimensions
    Flying,
    /// Circles in flight and slows down once close to its target
    Circling,
}

impl Locomotion {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Collector | Archetype::Guard => Locomotion::Ground,
            Archetype::Healer => Locomotion::Hover,
            Archetype::Supporter => Locomotion::Flying,
            Archetype::Follower => Locomotion::Circling,
        }
    }

    pub fn uses_gravity(&self) -> bool {
        matches!(self, Locomotion::Ground)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementState {
    #[default]
    Idle,
    Moving,
    /// Arrived, or told to hold position
    Waiting,
}

#[derive(Debug, Clone)]
pub struct MovementController {
    pub locomotion: Locomotion,
    wanted: Option<Vector3<f32>>,
    speed: f32,
    state: MovementState,
    idle_cue_timer: u32,
}

impl MovementController {
    pub fn new(locomotion: Locomotion) -> Self {
        Self {
            locomotion,
            wanted: None,
            speed: 0.0,
            state: MovementState::Idle,
            idle_cue_timer: 0,
        }
    }

    pub fn for_archetype(archetype: Archetype) -> Self {
        Self::new(Locomotion::for_archetype(archetype))
    }

    /// Queue a destination, replacing any earlier one
    pub fn set_wanted_position(&mut self, position: Vector3<f32>, speed: f32) {
        self.wanted = Some(position);
        self.speed = speed;
        self.state = MovementState::Moving;
    }

    /// Drop the destination and hold position
    pub fn wait(&mut self) {
        self.wanted = None;
        self.state = MovementState::Waiting;
    }

    pub fn wanted(&self) -> Option<Vector3<f32>> {
        self.wanted
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    fn arrive(&mut self) {
        self.wanted = None;
        self.state = MovementState::Waiting;
    }
}

/// Vector from `from` to `to` restricted to the dimensions a locomotion
/// steers directly
fn steering_delta(locomotion: Locomotion, from: &Vector3<f32>, to: &Vector3<f32>) -> Vector3<f32> {
    let delta = to - from;
    match locomotion {
        Locomotion::Ground => Vector3::new(delta.x, 0.0, delta.z),
        Locomotion::Hover | Locomotion::Flying | Locomotion::Circling => delta,
    }
}

/// Step toward `delta`, snapping onto it instead of overshooting
fn approach(delta: &Vector3<f32>, speed: f32) -> Vector3<f32> {
    let distance = delta.norm();
    if distance <= speed || distance < f32::EPSILON {
        *delta
    } else {
        delta * (speed / distance)
    }
}

/// Advance one companion's controller and integrate its position
pub fn step_movement(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<Vec<SideEffect>, CompanionError> {
    let movement_config = &ctx.config.movement;
    let (staying, attack_target) = {
        let companion = companion_of(ctx.world, entity)?;
        (companion.ordered_to_stay, companion.target)
    };
    let attack_position = attack_target
        .and_then(|target| ctx.world.get::<&Position>(target).ok().map(|p| p.0));
    let size = component::<Bounds>(ctx.world, entity)
        .map(|b| b.size())
        .unwrap_or_else(|_| Bounds::default().size());

    let mut controller = component_mut::<MovementController>(ctx.world, entity)?;
    let mut position = component_mut::<Position>(ctx.world, entity)?;
    let mut velocity = component_mut::<Velocity>(ctx.world, entity)?;
    let mut effects = Vec::new();

    let locomotion = controller.locomotion;
    let mut vel = velocity.0;

    match (controller.state, controller.wanted) {
        (MovementState::Moving, Some(wanted)) => {
            let delta = steering_delta(locomotion, &position.0, &wanted);
            match locomotion {
                Locomotion::Ground => {
                    let step = approach(&delta, controller.speed);
                    vel.x = step.x;
                    vel.z = step.z;
                    if let Some(height) = ctx.terrain.obstacle_ahead(&position.0, &delta) {
                        let on_ground = position.0.y
                            <= ctx.terrain.ground_height(position.0.x, position.0.z) + f32::EPSILON;
                        if on_ground && height > 0.0 && height <= movement_config.step_height {
                            vel.y = movement_config.jump_velocity;
                            effects.push(SideEffect::Jump { entity });
                        }
                    }
                }
                Locomotion::Hover => {
                    let step = approach(&Vector3::new(delta.x, 0.0, delta.z), controller.speed);
                    vel = Vector3::new(
                        step.x,
                        delta.y.clamp(-controller.speed, controller.speed),
                        step.z,
                    );
                }
                Locomotion::Flying => vel = approach(&delta, controller.speed),
                Locomotion::Circling => {
                    if delta.norm() <= size {
                        vel *= CIRCLING_DAMPING;
                        controller.arrive();
                    } else {
                        vel = approach(&delta, controller.speed);
                    }
                }
            }
        }
        (MovementState::Moving, None) => controller.wait(),
        (MovementState::Idle | MovementState::Waiting, _) => match locomotion {
            Locomotion::Ground => {
                vel.x = 0.0;
                vel.z = 0.0;
            }
            Locomotion::Hover | Locomotion::Flying => vel = Vector3::zeros(),
            Locomotion::Circling => vel *= CIRCLING_DAMPING,
        },
    }

    if locomotion.uses_gravity() {
        vel.y -= movement_config.gravity;
    }

    position.0 += vel;
    if locomotion.uses_gravity() {
        let ground = ctx.terrain.ground_height(position.0.x, position.0.z);
        if position.0.y <= ground {
            position.0.y = ground;
            vel.y = 0.0;
        }
    }
    velocity.0 = vel;

    if controller.state == MovementState::Moving {
        if let Some(wanted) = controller.wanted {
            let remaining = steering_delta(locomotion, &position.0, &wanted);
            if remaining.norm_squared() < ARRIVAL_EPSILON_SQUARED {
                controller.arrive();
            }
        }
    }

    let facing = match (locomotion, attack_position) {
        (Locomotion::Circling, Some(target)) => Some(target - position.0),
        _ => Some(Vector3::new(vel.x, 0.0, vel.z)),
    };
    if let Some(orientation) = facing.and_then(|f| Orientation::facing(&f)) {
        if let Ok(mut current) = ctx.world.get::<&mut Orientation>(entity) {
            *current = orientation;
        }
    }

    if controller.state == MovementState::Waiting && staying {
        controller.idle_cue_timer += 1;
        if controller.idle_cue_timer >= movement_config.idle_cue_interval.max(1) {
            controller.idle_cue_timer = 0;
            effects.push(SideEffect::Sound {
                at: position.0,
                sound: SoundCue::IdleCue,
            });
        }
    }

    Ok(effects)
}
