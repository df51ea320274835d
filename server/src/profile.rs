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

//! Player profile resolution for player-sourced skins
//!
//! Lookups go to an external profile service and may be slow or fail. They
//! never run on the tick path: the world context spawns a task per request
//! and applies the result on a later tick.

use async_trait::async_trait;
use menagerie_common::ResolvedProfile;
use metrics::counter;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("No profile for player {0}")]
    NotFound(String),

    #[error("Profile service unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve(&self, player_name: &str) -> Result<ResolvedProfile, ProfileError>;
}

/// Caching front for a [`ProfileResolver`]
///
/// Names are case-insensitive. Only successful lookups are cached.
pub struct ProfileService {
    resolver: Arc<dyn ProfileResolver>,
    cache: Cache<String, ResolvedProfile>,
}

impl ProfileService {
    pub fn new(resolver: Arc<dyn ProfileResolver>) -> Self {
        Self::with_cache(resolver, 1_000, Duration::from_secs(600))
    }

    pub fn with_cache(resolver: Arc<dyn ProfileResolver>, capacity: u64, ttl: Duration) -> Self {
        Self {
            resolver,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn resolve(&self, player_name: &str) -> Result<ResolvedProfile, ProfileError> {
        let key = player_name.to_lowercase();
        if let Some(profile) = self.cache.get(&key).await {
            counter!("menagerie.profiles.cache", "result" => "hit").increment(1);
            return Ok(profile);
        }
        counter!("menagerie.profiles.cache", "result" => "miss").increment(1);

        let profile = self.resolver.resolve(player_name).await?;
        self.cache.insert(key, profile.clone()).await;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(name: &str) -> ResolvedProfile {
        ResolvedProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            texture: Some(format!("https://textures.example.com/{}", name)),
        }
    }

    #[tokio::test]
    async fn test_successful_lookups_are_cached() {
        let mut resolver = MockProfileResolver::new();
        let steve = profile("Steve");
        let expected = steve.clone();
        resolver
            .expect_resolve()
            .times(1)
            .returning(move |_| Ok(steve.clone()));

        let service = ProfileService::new(Arc::new(resolver));
        assert_eq!(service.resolve("Steve").await.unwrap(), expected);
        assert_eq!(service.resolve("steve").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mut resolver = MockProfileResolver::new();
        resolver
            .expect_resolve()
            .times(2)
            .returning(|name| Err(ProfileError::NotFound(name.to_string())));

        let service = ProfileService::new(Arc::new(resolver));
        assert!(service.resolve("Ghost").await.is_err());
        assert_eq!(
            service.resolve("Ghost").await,
            Err(ProfileError::NotFound("Ghost".to_string()))
        );
    }
}
