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

use crate::ecs::components::{
    Companion, CompanionError, Player, Position, StatusEffect, StatusEffectType, StatusEffects,
    TamedAnimal,
};
use crate::ecs::effects::ParticleKind;
use crate::ecs::systems::{TickContext, companion_of, position_of};
use crate::ecs::{EcsEntity, SideEffect};
use hecs::Entity;
use menagerie_common::Archetype;
use rand::seq::IndexedRandom;

pub const SUPPORT_TIER_2_LEVEL: u32 = 5;
pub const SUPPORT_TIER_3_LEVEL: u32 = 20;

const TIER_1: [StatusEffectType; 2] = [StatusEffectType::Speed, StatusEffectType::Haste];
const TIER_2: [StatusEffectType; 2] = [StatusEffectType::Strength, StatusEffectType::Resistance];
const TIER_3: [StatusEffectType; 2] = [
    StatusEffectType::Regeneration,
    StatusEffectType::FireResistance,
];

/// Buffs a supporter of the given level can hand out
pub fn unlocked_effects(level: u32) -> Vec<StatusEffectType> {
    let mut pool = TIER_1.to_vec();
    if level >= SUPPORT_TIER_2_LEVEL {
        pool.extend(TIER_2);
    }
    if level >= SUPPORT_TIER_3_LEVEL {
        pool.extend(TIER_3);
    }
    pool
}

/// Pick one unlocked buff and give it to the first candidate lacking it
///
/// Candidates in order, all within the radius: owner, self, other players,
/// owned healers, then other owned pets.
pub(super) fn support(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<Vec<SideEffect>, CompanionError> {
    let config = &ctx.config.features.supporter;
    let origin = position_of(ctx.world, entity)?;
    let (owner, level) = {
        let companion = companion_of(ctx.world, entity)?;
        (companion.owner(), companion.level())
    };

    let pool = unlocked_effects(level);
    let Some(effect) = pool.choose(&mut *ctx.rng).copied() else {
        return Ok(Vec::new());
    };

    let in_radius = |position: &Position| origin.within(position, config.radius);

    let mut owner_entity = None;
    let mut players = Vec::new();
    for (player_entity, player, position) in ctx.world.query::<(Entity, &Player, &Position)>().iter()
    {
        if !in_radius(position) {
            continue;
        }
        if Some(player.id) == owner {
            owner_entity = Some(player_entity);
        } else {
            players.push(player_entity);
        }
    }

    let mut candidates: Vec<Entity> = Vec::new();
    candidates.extend(owner_entity);
    candidates.push(entity);
    candidates.extend(players);

    if let Some(owner) = owner {
        let mut healers = Vec::new();
        let mut pets = Vec::new();
        for (pet, companion, position) in ctx
            .world
            .query::<(Entity, &Companion, &Position)>()
            .iter()
        {
            if pet == entity || !companion.is_owned_by(owner) || !in_radius(position) {
                continue;
            }
            if companion.archetype == Archetype::Healer {
                healers.push(pet);
            } else {
                pets.push(pet);
            }
        }
        pets.extend(
            ctx.world
                .query::<(Entity, &TamedAnimal, &Position)>()
                .iter()
                .filter(|(_, tamed, position)| tamed.owner == owner && in_radius(position))
                .map(|(pet, ..)| pet),
        );
        candidates.extend(healers);
        candidates.extend(pets);
    }

    let Some(recipient) = candidates.into_iter().find(|candidate| {
        ctx.world
            .get::<&StatusEffects>(*candidate)
            .map(|effects| !effects.has_effect(effect))
            .unwrap_or(false)
    }) else {
        return Ok(Vec::new());
    };

    if let Ok(mut effects) = ctx.world.get::<&mut StatusEffects>(recipient) {
        effects.add_effect(StatusEffect::new(effect, config.duration, 0));
    }
    if let Ok(mut companion) = ctx.world.get::<&mut Companion>(entity) {
        companion.add_experience(1);
    }
    tracing::debug!(
        "Companion {:?} granted {} to {:?}",
        entity,
        effect.as_str(),
        recipient
    );

    Ok(vec![SideEffect::Particles {
        at: position_of(ctx.world, recipient)?.0,
        kind: ParticleKind::Buff,
    }])
}
