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

use nalgebra::Vector3;

/// Read-only view of the host world's blocks
///
/// Physics and pathfinding belong to the host engine; movement only asks
/// these three questions.
pub trait Terrain: Send + Sync {
    /// Height of the walkable surface at a column
    fn ground_height(&self, x: f32, z: f32) -> f32;

    /// Height of an obstacle directly ahead of `position` when moving along
    /// `direction`, relative to `position`
    fn obstacle_ahead(&self, position: &Vector3<f32>, direction: &Vector3<f32>) -> Option<f32>;

    fn line_of_sight(&self, from: &Vector3<f32>, to: &Vector3<f32>) -> bool;
}

/// Infinite flat ground with no obstacles
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl Terrain for FlatTerrain {
    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn obstacle_ahead(&self, _position: &Vector3<f32>, _direction: &Vector3<f32>) -> Option<f32> {
        None
    }

    fn line_of_sight(&self, _from: &Vector3<f32>, _to: &Vector3<f32>) -> bool {
        true
    }
}
