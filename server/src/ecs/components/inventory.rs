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

use menagerie_common::{ItemStack, MAX_STACK};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Inventory has {found} slots, expected {expected}")]
    CapacityMismatch { expected: usize, found: usize },

    #[error("Slot {slot} holds {count} items, more than a stack allows")]
    OversizedStack { slot: usize, count: u32 },
}

/// Fixed-capacity slotted container
///
/// The slot count is chosen when the inventory is created and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Rebuild an inventory from saved slots
    pub fn from_slots(slots: Vec<Option<ItemStack>>) -> Result<Self, InventoryError> {
        for (slot, stack) in slots.iter().enumerate() {
            if let Some(stack) = stack {
                if stack.count > MAX_STACK {
                    return Err(InventoryError::OversizedStack {
                        slot,
                        count: stack.count,
                    });
                }
            }
        }
        let slots = slots
            .into_iter()
            .map(|slot| slot.filter(|stack| !stack.is_empty()))
            .collect();
        Ok(Self { slots })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn is_full(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| matches!(slot, Some(stack) if stack.room() == 0))
    }

    /// Number of items from `stack` that would fit
    pub fn room_for(&self, stack: &ItemStack) -> u32 {
        let room: u32 = self
            .slots
            .iter()
            .map(|slot| match slot {
                Some(existing) if existing.stacks_with(stack) => existing.room(),
                Some(_) => 0,
                None => MAX_STACK,
            })
            .sum();
        room.min(stack.count)
    }

    pub fn can_accept(&self, stack: &ItemStack) -> bool {
        self.room_for(stack) > 0
    }

    /// Insert as much of `stack` as fits and return how many items moved
    ///
    /// Existing stacks of the same item are topped up before empty slots are
    /// used.
    pub fn insert(&mut self, stack: &ItemStack) -> u32 {
        let mut remaining = stack.count;

        for existing in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if existing.stacks_with(stack) {
                let moved = existing.room().min(remaining);
                existing.count += moved;
                remaining -= moved;
            }
        }

        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let moved = remaining.min(MAX_STACK);
                *slot = Some(ItemStack::new(stack.item.clone(), moved));
                remaining -= moved;
            }
        }

        stack.count - remaining
    }

    /// Total count of one item across all slots
    pub fn count_of(&self, item: &str) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.item == item)
            .map(|stack| stack.count)
            .sum()
    }
}
