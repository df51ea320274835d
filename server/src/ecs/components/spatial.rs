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
use serde::{Deserialize, Serialize};

/// World position of an entity's feet, in blocks
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub Vector3<f32>);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn distance_squared(&self, other: &Position) -> f32 {
        (self.0 - other.0).norm_squared()
    }

    pub fn within(&self, other: &Position, radius: f32) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

/// Blocks per tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vector3<f32>);

/// Yaw and pitch in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    /// Orientation facing along `direction`
    pub fn facing(direction: &Vector3<f32>) -> Option<Self> {
        let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
        if horizontal < f32::EPSILON && direction.y.abs() < f32::EPSILON {
            return None;
        }
        Some(Self {
            yaw: (-direction.x).atan2(direction.z).to_degrees(),
            pitch: (-direction.y).atan2(horizontal).to_degrees(),
        })
    }
}

/// Axis-aligned bounding box size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest extent of the box
    pub fn size(&self) -> f32 {
        self.width.max(self.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.6, 0.8)
    }
}
