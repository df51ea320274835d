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

//! Item stacks carried in companion inventories

use serde::{Deserialize, Serialize};

/// Largest number of items a single slot can hold
pub const MAX_STACK: u32 = 64;

/// A stack of identical items
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Registry key of the item, owned by the host game
    pub item: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether `other` can be merged into this stack
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.item == other.item
    }

    /// Free room left in this stack
    pub fn room(&self) -> u32 {
        MAX_STACK.saturating_sub(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_room() {
        let stack = ItemStack::new("minecraft:apple", 60);
        assert_eq!(stack.room(), 4);
        assert!(stack.stacks_with(&ItemStack::new("minecraft:apple", 1)));
        assert!(!stack.stacks_with(&ItemStack::new("minecraft:stick", 1)));
    }
}
