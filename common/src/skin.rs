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

//! Companion skins and the profiles they may reference

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Where a skin texture comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinSource {
    /// One of the built-in textures, referenced by name
    Default,
    /// A texture downloaded from an http(s) URL
    Url,
    /// The skin of a player account, referenced by player name
    Player,
}

impl SkinSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinSource::Default => "default",
            SkinSource::Url => "url",
            SkinSource::Player => "player",
        }
    }
}

impl FromStr for SkinSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(SkinSource::Default),
            "url" => Ok(SkinSource::Url),
            "player" => Ok(SkinSource::Player),
            other => Err(format!("Unknown skin source: {:?}", other)),
        }
    }
}

/// A player profile resolved from a player name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub id: Uuid,
    pub name: String,
    /// Texture location published by the profile service, if any
    pub texture: Option<String>,
}

/// The cosmetic skin a companion is rendered with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
    pub source: SkinSource,
    pub reference: String,
    /// Only meaningful for [`SkinSource::Player`]; filled in once resolved
    pub profile: Option<ResolvedProfile>,
}

impl Skin {
    pub fn new(source: SkinSource, reference: impl Into<String>) -> Self {
        Self {
            source,
            reference: reference.into(),
            profile: None,
        }
    }

    /// Whether this skin still waits for its profile to be resolved
    pub fn needs_resolution(&self) -> bool {
        self.source == SkinSource::Player && self.profile.is_none()
    }
}

impl Default for Skin {
    fn default() -> Self {
        Self::new(SkinSource::Default, "default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!("url".parse::<SkinSource>(), Ok(SkinSource::Url));
        assert_eq!("player".parse::<SkinSource>(), Ok(SkinSource::Player));
        assert!("URL".parse::<SkinSource>().is_err());
        assert!("".parse::<SkinSource>().is_err());
    }

    #[test]
    fn test_needs_resolution() {
        assert!(!Skin::default().needs_resolution());
        assert!(Skin::new(SkinSource::Player, "Notch").needs_resolution());
        assert!(!Skin::new(SkinSource::Url, "https://example.com/a.png").needs_resolution());
    }
}
