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
use menagerie_server::config::{Arguments, Configuration};
use menagerie_server::ecs::WorldContext;
use menagerie_server::persistence::PersistenceManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);
    tracing::info!("Starting Menagerie Server...");

    let persistence = Arc::new(PersistenceManager::new(
        config.persistence.save_dir.to_path(),
        config.persistence.auto_save_interval,
    ));
    tracing::info!(
        "Persistence manager initialized at {}",
        config.persistence.save_dir.to_path().display()
    );

    let tick_rate = config.simulation.tick_rate.max(1);
    let mut context = WorldContext::new(config);

    tracing::info!("Loading companions...");
    let mut restored = 0;
    for save in persistence.load_all().await? {
        let id = save.id;
        match context.restore_companion(save) {
            Ok(_) => restored += 1,
            Err(e) => tracing::error!("Failed to restore companion {}: {}", id, e),
        }
    }
    tracing::info!("Restored {} companions", restored);

    let context = Arc::new(Mutex::new(context));
    let auto_save = persistence.clone().start_auto_save_task(context.clone());

    let mut ticker = tokio::time::interval(Duration::from_secs(1) / tick_rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!("Simulation running at {} ticks per second", tick_rate);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let effects = context.lock().await.tick();
                if !effects.is_empty() {
                    tracing::trace!("Tick produced {} side effects", effects.len());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    auto_save.abort();
    persistence.auto_save(&context).await;
    let saves = context.lock().await.all_saves();
    let saved = persistence.save_all(&saves).await;
    tracing::info!("Saved {} companions, shutting down", saved);

    Ok(())
}
