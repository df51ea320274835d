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

use crate::ecs::components::{Companion, CompanionError, Health, Player, Position, TamedAnimal};
use crate::ecs::effects::ParticleKind;
use crate::ecs::systems::{TickContext, companion_of, position_of};
use crate::ecs::{EcsEntity, SideEffect};
use hecs::Entity;

/// Heal damaged players, then damaged pets of the same owner
///
/// Healing grants no experience.
pub(super) fn heal(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<Vec<SideEffect>, CompanionError> {
    let config = &ctx.config.features.healer;
    let origin = position_of(ctx.world, entity)?;
    let owner = companion_of(ctx.world, entity)?.owner();

    let mut patients: Vec<Entity> = ctx
        .world
        .query::<(Entity, &Player, &Position, &Health)>()
        .iter()
        .filter(|(_, _, position, health)| health.is_damaged() && origin.within(position, config.radius))
        .map(|(player, ..)| player)
        .collect();

    if let Some(owner) = owner {
        patients.extend(
            ctx.world
                .query::<(Entity, &TamedAnimal, &Position, &Health)>()
                .iter()
                .filter(|(_, tamed, position, health)| {
                    tamed.owner == owner
                        && health.is_damaged()
                        && origin.within(position, config.radius)
                })
                .map(|(animal, ..)| animal),
        );
        patients.extend(
            ctx.world
                .query::<(Entity, &Companion, &Position, &Health)>()
                .iter()
                .filter(|(_, companion, position, health)| {
                    companion.is_owned_by(owner)
                        && health.is_damaged()
                        && origin.within(position, config.radius)
                })
                .map(|(companion, ..)| companion),
        );
    }

    let mut effects = Vec::new();
    for patient in patients {
        let Ok(mut health) = ctx.world.get::<&mut Health>(patient) else {
            continue;
        };
        if health.heal(config.amount) > 0.0 {
            effects.push(SideEffect::Particles {
                at: position_of(ctx.world, patient)?.0,
                kind: ParticleKind::Heal,
            });
        }
    }

    if !effects.is_empty() {
        tracing::debug!("Companion {:?} healed {} entities", entity, effects.len());
    }
    Ok(effects)
}
