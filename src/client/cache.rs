// Query cache for upstream responses
//
// Entries are stored as JSON values under a request key together with the
// tags they provide. Reads past the TTL count as misses; mutations evict
// every entry carrying one of the tags they invalidate.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default time-to-live for cached responses (60 seconds)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// What a cached response depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheTag {
    HotelList,
    Hotel(String),
    Locations,
    Reviews(String),
    BookingList,
    Booking(String),
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTag::HotelList => write!(f, "Hotels:LIST"),
            CacheTag::Hotel(id) => write!(f, "Hotels:{}", id),
            CacheTag::Locations => write!(f, "Locations:LIST"),
            CacheTag::Reviews(hotel_id) => write!(f, "Reviews:{}", hotel_id),
            CacheTag::BookingList => write!(f, "Bookings:LIST"),
            CacheTag::Booking(id) => write!(f, "Bookings:{}", id),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    tags: Vec<CacheTag>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Tag-invalidated response cache shared by all handlers
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Fresh cached value for `key`, if any
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_stale(self.ttl) {
            debug!("Cache entry {} is stale", key);
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                debug!("Cache hit for {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Cache entry {} has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Stores `value` under `key`, tagged with what it provides
    pub async fn insert<T: Serialize>(&self, key: &str, tags: Vec<CacheTag>, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping cache insert for {}: {}", key, e);
                return;
            }
        };

        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                tags,
                stored_at: Instant::now(),
            },
        );
    }

    /// Evicts every entry carrying one of `tags`
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(t)));

        let tag_names: Vec<String> = tags.iter().map(ToString::to_string).collect();
        debug!(
            "Invalidated {} cache entries for [{}]",
            before - entries.len(),
            tag_names.join(", ")
        );
    }

    /// Drops entries past their TTL
    pub async fn purge_stale(&self) {
        let ttl = self.ttl;
        self.entries.write().await.retain(|_, entry| !entry.is_stale(ttl));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Tags invalidated by a new review of hotel `hotel_id`
pub fn review_mutation_tags(hotel_id: &str) -> Vec<CacheTag> {
    vec![CacheTag::Hotel(hotel_id.to_string()), CacheTag::Reviews(hotel_id.to_string())]
}

/// Tags invalidated by any change to booking `id`
pub fn booking_mutation_tags(id: &str) -> Vec<CacheTag> {
    vec![CacheTag::Booking(id.to_string()), CacheTag::BookingList]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = QueryCache::default();
        cache.insert("locations", vec![CacheTag::Locations], &vec!["France", "Italy"]).await;

        let value: Option<Vec<String>> = cache.get("locations").await;
        assert_eq!(value, Some(vec!["France".to_string(), "Italy".to_string()]));
        assert_eq!(cache.get::<Vec<String>>("missing").await, None);
    }

    #[tokio::test]
    async fn test_stale_entries_miss() {
        let cache = QueryCache::new(Duration::from_millis(0));
        cache.insert("hotels:h1", vec![CacheTag::Hotel("h1".into())], &1).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(cache.get::<i32>("hotels:h1").await, None);
        cache.purge_stale().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_booking_mutation_invalidates_item_and_list() {
        let cache = QueryCache::default();
        cache.insert("bookings:me:u1", vec![CacheTag::BookingList], &Vec::<i32>::new()).await;
        cache.insert("bookings:b1", vec![CacheTag::Booking("b1".into())], &1).await;
        cache.insert("bookings:b2", vec![CacheTag::Booking("b2".into())], &2).await;
        cache.insert("locations", vec![CacheTag::Locations], &3).await;

        cache.invalidate(&booking_mutation_tags("b1")).await;

        assert_eq!(cache.get::<Vec<i32>>("bookings:me:u1").await, None);
        assert_eq!(cache.get::<i32>("bookings:b1").await, None);
        assert_eq!(cache.get::<i32>("bookings:b2").await, Some(2));
        assert_eq!(cache.get::<i32>("locations").await, Some(3));
    }

    #[tokio::test]
    async fn test_review_invalidates_hotel_and_its_reviews() {
        let cache = QueryCache::default();
        cache.insert("hotels:h1", vec![CacheTag::Hotel("h1".into())], &1).await;
        cache.insert("reviews:h1", vec![CacheTag::Reviews("h1".into())], &2).await;
        cache.insert("reviews:h2", vec![CacheTag::Reviews("h2".into())], &3).await;

        cache.invalidate(&review_mutation_tags("h1")).await;

        assert_eq!(cache.get::<i32>("hotels:h1").await, None);
        assert_eq!(cache.get::<i32>("reviews:h1").await, None);
        assert_eq!(cache.get::<i32>("reviews:h2").await, Some(3));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(CacheTag::HotelList.to_string(), "Hotels:LIST");
        assert_eq!(CacheTag::Booking("b9".into()).to_string(), "Bookings:b9");
        assert_eq!(CacheTag::Reviews("h1".into()).to_string(), "Reviews:h1");
    }
}
