use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::Product;
use crate::profile::UserProfile;
use crate::requester::InsuranceAdvisor;
use crate::storage::KeyValueStore;

pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Stored value: write time in epoch milliseconds plus the product list
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    timestamp: i64,
    data: Vec<Product>,
}

/// Products returned for a profile and whether they came from the cache
#[derive(Debug, Clone, Serialize)]
pub struct CachedRecommendations {
    pub products: Vec<Product>,
    pub cached: bool,
}

/// Recommendation cache keyed by (age, gender, category) with a wall-clock TTL
#[derive(Clone)]
pub struct RecommendationCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl RecommendationCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn key(profile: &UserProfile) -> String {
        format!(
            "recommendations_{}_{}_{}",
            profile.age, profile.gender, profile.insurance_type
        )
    }

    /// Fresh cached products for the profile, if any
    pub async fn lookup(&self, profile: &UserProfile, now: DateTime<Utc>) -> Option<Vec<Product>> {
        let key = Self::key(profile);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let envelope: CacheEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = %key, error = %e, "Malformed cache entry, removing");
                if let Err(e) = self.store.remove(&key).await {
                    warn!(key = %key, error = %e, "Failed to remove malformed cache entry");
                }
                return None;
            }
        };

        let age_ms = now.timestamp_millis() - envelope.timestamp;
        if age_ms > self.ttl.num_milliseconds() {
            debug!(key = %key, age_ms = age_ms, "Cache entry expired");
            return None;
        }

        Some(envelope.data)
    }

    /// Replaces the cached products for the profile
    pub async fn store(&self, profile: &UserProfile, products: &[Product], now: DateTime<Utc>) {
        let key = Self::key(profile);
        let envelope = CacheEnvelope {
            timestamp: now.timestamp_millis(),
            data: products.to_vec(),
        };
        let result = match serde_json::to_string(&envelope) {
            Ok(raw) => self.store.set(&key, raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to write cache entry");
        }
    }

    /// Serves the cached list when fresh, otherwise asks the advisor and caches its answer
    pub async fn get_or_fetch(
        &self,
        advisor: &InsuranceAdvisor,
        profile: &UserProfile,
    ) -> CachedRecommendations {
        self.get_or_fetch_at(advisor, profile, Utc::now()).await
    }

    pub async fn get_or_fetch_at(
        &self,
        advisor: &InsuranceAdvisor,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> CachedRecommendations {
        if let Some(products) = self.lookup(profile, now).await {
            info!(key = %Self::key(profile), "Serving recommendations from cache");
            return CachedRecommendations {
                products,
                cached: true,
            };
        }

        let products = advisor.recommend_products(profile).await;
        self.store(profile, &products, now).await;
        CachedRecommendations {
            products,
            cached: false,
        }
    }
}
