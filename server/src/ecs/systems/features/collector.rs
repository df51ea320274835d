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

use crate::ecs::components::{Companion, CompanionError, ItemPickup, Position};
use crate::ecs::effects::ParticleKind;
use crate::ecs::systems::{TickContext, component_mut, position_of};
use crate::ecs::{EcsEntity, SideEffect};
use hecs::Entity;

/// Pull nearby item pickups into the companion's inventory, nearest first
///
/// Fully inserted pickups are despawned, partially inserted ones shrink, and
/// pickups with no room are left alone. Any successful insert is worth one
/// experience point for the whole window.
pub(super) fn collect(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<Vec<SideEffect>, CompanionError> {
    let radius = ctx.config.features.collector.radius;
    let origin = position_of(ctx.world, entity)?;

    let mut nearby: Vec<(Entity, f32)> = ctx
        .world
        .query::<(Entity, &ItemPickup, &Position)>()
        .iter()
        .filter(|(_, pickup, position)| !pickup.0.is_empty() && origin.within(position, radius))
        .map(|(pickup, _, position)| (pickup, origin.distance_squared(position)))
        .collect();
    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut taken = Vec::new();
    {
        let mut companion = component_mut::<Companion>(ctx.world, entity)?;
        for (pickup, _) in &nearby {
            let Ok(item) = ctx.world.get::<&ItemPickup>(*pickup) else {
                continue;
            };
            let inserted = companion.inventory.insert(&item.0);
            if inserted > 0 {
                taken.push((*pickup, inserted));
            }
        }
        if !taken.is_empty() {
            companion.add_experience(1);
        }
    }

    let mut effects = Vec::new();
    for (pickup, inserted) in taken {
        let (remaining, at) = {
            let mut item = component_mut::<ItemPickup>(ctx.world, pickup)?;
            item.0.count -= inserted;
            (item.0.count, position_of(ctx.world, pickup)?)
        };
        if remaining == 0 {
            ctx.world
                .despawn(pickup)
                .map_err(|_| CompanionError::NoSuchEntity(pickup))?;
        }
        effects.push(SideEffect::Particles {
            at: at.0,
            kind: ParticleKind::Collect,
        });
    }

    if !effects.is_empty() {
        tracing::debug!("Companion {:?} collected {} pickups", entity, effects.len());
    }
    Ok(effects)
}
