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

//! Experience and level progression

/// Highest level a companion can reach
pub const MAX_LEVEL: u32 = 50;

/// Total experience needed to reach `level`
///
/// Level 1 is free; each following level `n + 1` costs `5 * n` more.
pub fn experience_for_level(level: u32) -> u64 {
    let level = level.clamp(1, MAX_LEVEL) as u64;
    5 * level * (level - 1) / 2
}

/// Level reached with `experience` points
pub fn level_for_experience(experience: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && experience >= experience_for_level(level + 1) {
        level += 1;
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(4), 1);
        assert_eq!(level_for_experience(5), 2);
        assert_eq!(level_for_experience(49), 4);
        assert_eq!(level_for_experience(50), 5);
        assert_eq!(level_for_experience(949), 19);
        assert_eq!(level_for_experience(950), 20);
    }

    #[test]
    fn test_level_is_capped() {
        assert_eq!(level_for_experience(u64::MAX), MAX_LEVEL);
    }

    #[test]
    fn test_level_is_monotonic() {
        let mut previous = 0;
        for xp in 0..2_000 {
            let level = level_for_experience(xp);
            assert!(level >= previous);
            previous = level;
        }
    }
}
