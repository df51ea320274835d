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

use crate::ecs::components::{Companion, CompanionError, Position};
use crate::ecs::systems::{TickContext, component_mut, position_of};
use crate::ecs::{EcsEntity, SideEffect};

/// Keep a held target angry for another full anger window
///
/// Only a target still inside the targeting radius refreshes anger. One that
/// got away is chased until the remaining anger runs out.
pub(super) fn refresh_anger(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<(), CompanionError> {
    let anger_duration = ctx.config.features.guard.anger_duration;
    let radius = ctx.config.targeting.radius;
    let origin = position_of(ctx.world, entity)?;
    let mut companion = component_mut::<Companion>(ctx.world, entity)?;
    let Some(target) = companion.target else {
        return Ok(());
    };
    let nearby = ctx
        .world
        .get::<&Position>(target)
        .is_ok_and(|position| origin.within(&position, radius));
    if nearby {
        companion.anger_ticks = anger_duration;
        tracing::trace!("Guard {:?} stays angry at {:?}", entity, target);
    }
    Ok(())
}

/// Per-tick ranged attack charge
///
/// Charge builds while the target is in range and visible, fires a projectile
/// at the threshold, and bleeds off one step per tick otherwise.
pub(super) fn charge(
    ctx: &mut TickContext<'_>,
    entity: EcsEntity,
) -> Result<Vec<SideEffect>, CompanionError> {
    let config = &ctx.config.features.guard;
    if !config.ranged {
        return Ok(Vec::new());
    }

    let origin = position_of(ctx.world, entity)?;
    let mut companion = component_mut::<Companion>(ctx.world, entity)?;

    let aimed = companion.target.filter(|target| {
        ctx.world
            .get::<&Position>(*target)
            .map(|position| {
                origin.within(&position, config.attack_range)
                    && ctx.terrain.line_of_sight(&origin.0, &position.0)
            })
            .unwrap_or(false)
    });

    match aimed {
        Some(target) => {
            companion.charge += 1;
            if companion.charge >= config.charge_threshold {
                companion.charge = 0;
                tracing::debug!("Guard {:?} fires at {:?}", entity, target);
                return Ok(vec![SideEffect::Projectile {
                    from: entity,
                    target,
                }]);
            }
        }
        None => companion.charge = companion.charge.saturating_sub(1),
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::test_utils::TestWorld;
    use menagerie_common::Archetype;

    #[test]
    fn test_charge_fires_at_threshold() {
        let mut test = TestWorld::new();
        test.config.features.guard.charge_threshold = 3;
        let guard = test.companion(Archetype::Guard, Position::new(0.0, 64.0, 0.0));
        let monster = test.monster(Position::new(5.0, 64.0, 0.0));
        test.world.get::<&mut Companion>(guard).unwrap().target = Some(monster);

        let mut fired = Vec::new();
        for _ in 0..3 {
            fired.extend(charge(&mut test.tick_context(), guard).unwrap());
        }

        assert_eq!(
            fired,
            vec![SideEffect::Projectile {
                from: guard,
                target: monster
            }]
        );
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().charge, 0);
    }

    #[test]
    fn test_charge_decays_without_target() {
        let mut test = TestWorld::new();
        let guard = test.companion(Archetype::Guard, Position::new(0.0, 64.0, 0.0));
        let monster = test.monster(Position::new(30.0, 64.0, 0.0));
        {
            let mut companion = test.world.get::<&mut Companion>(guard).unwrap();
            companion.target = Some(monster);
            companion.charge = 2;
        }

        charge(&mut test.tick_context(), guard).unwrap();
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().charge, 1);
        charge(&mut test.tick_context(), guard).unwrap();
        charge(&mut test.tick_context(), guard).unwrap();
        assert!(!test.world.get::<&Companion>(guard).unwrap().charging());
    }

    #[test]
    fn test_melee_guard_never_charges() {
        let mut test = TestWorld::new();
        test.config.features.guard.ranged = false;
        let guard = test.companion(Archetype::Guard, Position::new(0.0, 64.0, 0.0));
        let monster = test.monster(Position::new(2.0, 64.0, 0.0));
        test.world.get::<&mut Companion>(guard).unwrap().target = Some(monster);

        assert!(charge(&mut test.tick_context(), guard).unwrap().is_empty());
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().charge, 0);
    }

    #[test]
    fn test_refresh_anger() {
        let mut test = TestWorld::new();
        let guard = test.companion(Archetype::Guard, Position::new(0.0, 64.0, 0.0));
        refresh_anger(&mut test.tick_context(), guard).unwrap();
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().anger_ticks, 0);

        let monster = test.monster(Position::new(2.0, 64.0, 0.0));
        test.world.get::<&mut Companion>(guard).unwrap().target = Some(monster);
        refresh_anger(&mut test.tick_context(), guard).unwrap();
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().anger_ticks, 400);
    }

    #[test]
    fn test_distant_target_does_not_refresh_anger() {
        let mut test = TestWorld::new();
        let guard = test.companion(Archetype::Guard, Position::new(0.0, 64.0, 0.0));
        let monster = test.monster(Position::new(500.0, 64.0, 0.0));
        {
            let mut companion = test.world.get::<&mut Companion>(guard).unwrap();
            companion.target = Some(monster);
            companion.anger_ticks = 10;
        }

        refresh_anger(&mut test.tick_context(), guard).unwrap();
        assert_eq!(test.world.get::<&Companion>(guard).unwrap().anger_ticks, 10);
    }
}
