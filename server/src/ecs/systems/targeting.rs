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

//! Target selection and steering
//!
//! Runs before the feature module each tick. The aggression level decides
//! what a companion may attack; the result is written to the record's
//! `target` field and turned into a movement request.

use super::{MovementController, MovementState, TickContext, companion_of, component_mut, position_of};
use crate::ecs::components::{
    Companion, CompanionError, Creature, CreatureKind, Health, Player, Position, Provoked,
    TamedAnimal,
};
use crate::ecs::EcsEntity;
use hecs::Entity;
use menagerie_common::{AggressionLevel, Archetype, PlayerId};
use nalgebra::Vector3;

/// Whether `candidate` belongs to the same side as a companion
///
/// Companions never attack themselves, their owner, or anything their owner
/// has tamed.
pub fn is_friendly(
    world: &hecs::World,
    companion: EcsEntity,
    owner: Option<PlayerId>,
    candidate: Entity,
) -> bool {
    if candidate == companion {
        return true;
    }
    let Some(owner) = owner else {
        return false;
    };
    if world.get::<&Player>(candidate).is_ok_and(|p| p.id == owner) {
        return true;
    }
    if world.get::<&TamedAnimal>(candidate).is_ok_and(|t| t.owner == owner) {
        return true;
    }
    world
        .get::<&Companion>(candidate)
        .is_ok_and(|c| c.is_owned_by(owner))
}

fn is_alive(world: &hecs::World, entity: Entity) -> bool {
    world.contains(entity)
        && world
            .get::<&Health>(entity)
            .map(|h| h.is_alive())
            .unwrap_or(true)
}

/// Whether the aggression level alone makes `candidate` a valid target
fn is_hostile_to(world: &hecs::World, aggression: AggressionLevel, candidate: Entity) -> bool {
    if let Ok(creature) = world.get::<&Creature>(candidate) {
        return match creature.kind {
            CreatureKind::Monster => aggression.targets_monsters(),
            CreatureKind::Animal => aggression.targets_animals(),
        };
    }
    if world.get::<&Player>(candidate).is_ok() {
        return aggression.targets_players();
    }
    false
}

/// Pick or keep a target for one companion
pub fn update_target(ctx: &mut TickContext<'_>, entity: EcsEntity) -> Result<(), CompanionError> {
    let radius = ctx.config.targeting.radius;
    let origin = position_of(ctx.world, entity)?;

    let provoker = match ctx.world.get::<&mut Provoked>(entity) {
        Ok(mut provoked) => {
            provoked.ticks_remaining = provoked.ticks_remaining.saturating_sub(1);
            Some((provoked.by, provoked.ticks_remaining == 0))
        }
        Err(_) => None,
    };
    if let Some((_, true)) = provoker {
        let _ = ctx.world.remove_one::<Provoked>(entity);
    }
    let provoker = provoker.map(|(by, _)| by);

    let (owner, aggression, current, anger, archetype) = {
        let companion = companion_of(ctx.world, entity)?;
        (
            companion.owner(),
            companion.aggression(),
            companion.target,
            companion.anger_ticks,
            companion.archetype,
        )
    };

    let usable = |candidate: Entity| {
        is_alive(ctx.world, candidate) && !is_friendly(ctx.world, entity, owner, candidate)
    };
    let in_range = |candidate: Entity| {
        ctx.world
            .get::<&Position>(candidate)
            .is_ok_and(|p| origin.within(&p, radius))
    };

    // Anger only ever holds a target the current level still allows
    let allowed = |candidate: Entity| {
        is_hostile_to(ctx.world, aggression, candidate)
            || (provoker == Some(candidate) && aggression.retaliates())
    };

    let target = if aggression.is_passive() {
        None
    } else if let Some(current) = current.filter(|t| anger > 0 && usable(*t) && allowed(*t)) {
        Some(current)
    } else if let Some(provoker) =
        provoker.filter(|p| aggression.retaliates() && usable(*p) && in_range(*p))
    {
        Some(provoker)
    } else if let Some(current) = current
        .filter(|t| usable(*t) && in_range(*t) && is_hostile_to(ctx.world, aggression, *t))
    {
        Some(current)
    } else {
        ctx.world
            .query::<(Entity, &Position)>()
            .iter()
            .filter(|(candidate, position)| {
                origin.within(position, radius)
                    && is_hostile_to(ctx.world, aggression, *candidate)
                    && usable(*candidate)
            })
            .min_by(|a, b| {
                origin
                    .distance_squared(a.1)
                    .total_cmp(&origin.distance_squared(b.1))
            })
            .map(|(candidate, _)| candidate)
    };

    let anger_duration = ctx.config.features.guard.anger_duration;
    let mut companion = component_mut::<Companion>(ctx.world, entity)?;
    if target != current {
        tracing::debug!(
            "Companion {} ({}) target {:?} -> {:?}",
            companion.id,
            aggression,
            current,
            target
        );
    }
    companion.anger_ticks = match target {
        Some(t) if archetype == Archetype::Guard && Some(t) != current => anger_duration,
        Some(_) => companion.anger_ticks.saturating_sub(1),
        None => 0,
    };
    companion.target = target;
    Ok(())
}

fn locomotion_speed(ctx: &TickContext<'_>, controller: &MovementController) -> f32 {
    if controller.locomotion.uses_gravity() {
        ctx.config.movement.walk_speed
    } else {
        ctx.config.movement.fly_speed
    }
}

/// Turn the companion's current situation into a movement request
///
/// Priorities: stay when ordered, chase the target, flee monsters when
/// `passive-flee`, otherwise follow the owner.
pub fn steer(ctx: &mut TickContext<'_>, entity: EcsEntity) -> Result<(), CompanionError> {
    let origin = position_of(ctx.world, entity)?;
    let (staying, target, aggression, owner, archetype) = {
        let companion = companion_of(ctx.world, entity)?;
        (
            companion.ordered_to_stay,
            companion.target,
            companion.aggression(),
            companion.owner(),
            companion.archetype,
        )
    };

    let target_position = target.and_then(|t| ctx.world.get::<&Position>(t).ok().map(|p| *p));
    let threat = if aggression == AggressionLevel::PassiveFlee {
        let flee_distance = ctx.config.targeting.flee_distance;
        ctx.world
            .query::<(&Creature, &Position)>()
            .iter()
            .filter(|(creature, position)| {
                creature.kind == CreatureKind::Monster && origin.within(position, flee_distance)
            })
            .map(|(_, position)| *position)
            .min_by(|a, b| {
                origin
                    .distance_squared(a)
                    .total_cmp(&origin.distance_squared(b))
            })
    } else {
        None
    };
    let owner_position = owner.and_then(|owner| {
        ctx.world
            .query::<(&Player, &Position)>()
            .iter()
            .find(|(player, _)| player.id == owner)
            .map(|(_, position)| *position)
    });

    let movement = &ctx.config.movement;
    let mut controller = component_mut::<MovementController>(ctx.world, entity)?;
    let speed = locomotion_speed(ctx, &controller);

    if staying {
        if controller.state() != MovementState::Waiting {
            controller.wait();
        }
    } else if let Some(target) = target_position {
        let guard = &ctx.config.features.guard;
        let holds_range = archetype == Archetype::Guard
            && guard.ranged
            && origin.within(&target, guard.attack_range * 0.5);
        if holds_range {
            controller.wait();
        } else {
            controller.set_wanted_position(target.0, speed);
        }
    } else if let Some(threat) = threat {
        let mut away = origin.0 - threat.0;
        away.y = 0.0;
        let away = if away.norm_squared() > f32::EPSILON {
            away.normalize()
        } else {
            Vector3::x()
        };
        let flee_to = origin.0 + away * ctx.config.targeting.flee_distance;
        controller.set_wanted_position(flee_to, speed);
    } else if let Some(owner_position) = owner_position {
        let distance_squared = origin.distance_squared(&owner_position);
        if distance_squared > movement.follow_start_distance.powi(2) {
            controller.set_wanted_position(owner_position.0, speed);
        } else if controller.state() == MovementState::Moving
            && distance_squared < movement.follow_stop_distance.powi(2)
        {
            controller.wait();
        }
    }
    Ok(())
}
