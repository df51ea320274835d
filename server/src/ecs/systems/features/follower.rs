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

use crate::ecs::EcsEntity;
use crate::ecs::components::CompanionError;
use crate::ecs::systems::{TickContext, companion_of};

/// Followers have no periodic ability; following the owner is handled by
/// targeting and movement
pub(super) fn bookkeeping(ctx: &mut TickContext<'_>, entity: EcsEntity) -> Result<(), CompanionError> {
    let companion = companion_of(ctx.world, entity)?;
    tracing::trace!(
        "Follower {} check-in (owner: {:?}, staying: {})",
        companion.id,
        companion.owner(),
        companion.ordered_to_stay
    );
    Ok(())
}
