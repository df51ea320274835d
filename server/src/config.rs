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

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Open(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Tunables for the whole companion simulation
///
/// The configuration is a snapshot: it is loaded once at startup and handed
/// to the world context, which only swaps it at well-defined points
/// (see `WorldContext::reload_config`).
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub simulation: SimulationConfig,
    pub features: FeatureConfig,
    pub movement: MovementConfig,
    pub targeting: TargetingConfig,
    pub persistence: PersistenceConfig,
}

impl Configuration {
    pub fn load(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
        let conf = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        Ok(conf)
    }

    pub fn from_yaml(yaml: &str) -> Result<Configuration, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Whether this process owns the authoritative copy of the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Authoritative,
    /// Replays state only; feature modules never run
    Observer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation steps per second
    pub tick_rate: u32,
    /// Feature modules spread their first activation over this many ticks
    pub jitter_window: u32,
    /// Fixed RNG seed, mostly for reproducible test worlds
    pub seed: Option<u64>,
    pub role: Role,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            jitter_window: 20,
            seed: None,
            role: Role::Authoritative,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub collector: CollectorConfig,
    pub healer: HealerConfig,
    pub supporter: SupporterConfig,
    pub guard: GuardConfig,
    pub follower: FollowerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub interval: u32,
    pub radius: f32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: 60,
            radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealerConfig {
    pub interval: u32,
    pub radius: f32,
    /// Flat amount of health restored per heal
    pub amount: f32,
}

impl Default for HealerConfig {
    fn default() -> Self {
        Self {
            interval: 50,
            radius: 4.0,
            amount: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupporterConfig {
    pub interval: u32,
    pub radius: f32,
    /// Buff duration in ticks
    pub duration: u32,
}

impl Default for SupporterConfig {
    fn default() -> Self {
        Self {
            interval: 180,
            radius: 6.0,
            duration: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub interval: u32,
    /// Ticks a guard stays angry at its target after each refresh
    pub anger_duration: u32,
    pub ranged: bool,
    pub attack_range: f32,
    /// Charge ticks needed before a ranged attack fires
    pub charge_threshold: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            interval: 60,
            anger_duration: 400,
            ranged: true,
            attack_range: 12.0,
            charge_threshold: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    pub interval: u32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self { interval: 1200 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Blocks per tick
    pub walk_speed: f32,
    pub fly_speed: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Tallest obstacle a walking companion will jump onto
    pub step_height: f32,
    /// Ticks between idle cues while sitting
    pub idle_cue_interval: u32,
    pub follow_start_distance: f32,
    pub follow_stop_distance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 0.25,
            fly_speed: 0.35,
            gravity: 0.08,
            jump_velocity: 0.42,
            step_height: 1.0,
            idle_cue_interval: 80,
            follow_start_distance: 6.0,
            follow_stop_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub radius: f32,
    /// Ticks a provocation is remembered
    pub provoke_duration: u32,
    /// Distance a fleeing companion tries to put between itself and a monster
    pub flee_distance: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            radius: 16.0,
            provoke_duration: 200,
            flee_distance: 8.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub save_dir: EnvField<SaveDirectory>,
    /// Auto-save interval in seconds
    pub auto_save_interval: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: Default::default(),
            auto_save_interval: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveDirectory(PathBuf);

impl SaveDirectory {
    pub fn to_path(&self) -> &Path {
        &self.0
    }
}

impl FromStr for SaveDirectory {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        tracing::debug!("Parsing save directory from string: {}", s);
        Ok(Self(PathBuf::from(s)))
    }
}

impl Default for SaveDirectory {
    fn default() -> Self {
        Self(PathBuf::from("data"))
    }
}

impl std::fmt::Display for SaveDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
