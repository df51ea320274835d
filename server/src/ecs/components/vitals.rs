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

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    /// Full health
    pub fn new(maximum: f32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Clamp `current` into `0..=maximum`; a negative or NaN maximum becomes 0
    pub fn with_current(current: f32, maximum: f32) -> Self {
        let maximum = maximum.max(0.0);
        Self {
            current: current.max(0.0).min(maximum),
            maximum,
        }
    }

    /// Whether these values could describe a living creature's health pool
    pub fn is_valid(&self) -> bool {
        self.maximum.is_finite() && self.maximum > 0.0 && self.current.is_finite()
    }

    pub fn is_damaged(&self) -> bool {
        self.current < self.maximum
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Heal by `amount`, clamped to the maximum; returns what was restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.maximum);
        self.current - before
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectType {
    Speed,
    Haste,
    Strength,
    Resistance,
    Regeneration,
    FireResistance,
}

impl StatusEffectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusEffectType::Speed => "Speed",
            StatusEffectType::Haste => "Haste",
            StatusEffectType::Strength => "Strength",
            StatusEffectType::Resistance => "Resistance",
            StatusEffectType::Regeneration => "Regeneration",
            StatusEffectType::FireResistance => "FireResistance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    pub effect_type: StatusEffectType,
    /// Remaining duration in ticks
    pub duration: u32,
    pub amplifier: u8,
}

impl StatusEffect {
    pub fn new(effect_type: StatusEffectType, duration: u32, amplifier: u8) -> Self {
        Self {
            effect_type,
            duration,
            amplifier,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_effect(&mut self, effect: StatusEffect) {
        // Replace existing effect of same type
        self.effects.retain(|e| e.effect_type != effect.effect_type);
        self.effects.push(effect);
    }

    pub fn has_effect(&self, effect_type: StatusEffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }

    /// Advance one tick and drop expired effects
    pub fn update(&mut self) {
        for effect in &mut self.effects {
            effect.duration = effect.duration.saturating_sub(1);
        }
        self.effects.retain(|e| e.duration > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heal_clamps_to_maximum() {
        let mut health = Health::with_current(18.0, 20.0);
        assert_eq!(health.heal(4.0), 2.0);
        assert_eq!(health.current, 20.0);
        assert!(!health.is_damaged());
    }

    #[test]
    fn test_with_current_tolerates_bad_maximum() {
        let health = Health::with_current(5.0, -1.0);
        assert_eq!(health.maximum, 0.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_valid());

        let health = Health::with_current(f32::NAN, f32::NAN);
        assert_eq!(health.current, 0.0);
        assert!(!Health::with_current(1.0, f32::INFINITY).is_valid());
        assert!(Health::with_current(6.0, 20.0).is_valid());
    }

    #[test]
    fn test_status_effect_expiry() {
        let mut effects = StatusEffects::new();
        effects.add_effect(StatusEffect::new(StatusEffectType::Speed, 2, 0));
        effects.add_effect(StatusEffect::new(StatusEffectType::Speed, 1, 1));
        assert_eq!(effects.effects.len(), 1);

        effects.update();
        assert!(!effects.has_effect(StatusEffectType::Speed));
    }
}
