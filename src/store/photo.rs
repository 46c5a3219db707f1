use crate::error::Result;
use crate::types::attraction::Attraction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Gallery category a photo is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Nature,
    City,
    Food,
    Culture,
}

/// Keyword rules checked in order; the first hit wins, anything else is `City`
const CATEGORY_RULES: &[(PhotoCategory, &[&str])] = &[
    (
        PhotoCategory::Food,
        &[
            "restaurant", "food", "cafe", "coffee", "bar", "bistro", "diner", "kitchen",
            "dining", "bakery", "dessert", "buffet", "bbq", "pizza", "sushi", "ramen",
        ],
    ),
    (
        PhotoCategory::Culture,
        &[
            "temple", "shrine", "museum", "gallery", "theatre", "theater", "palace", "church",
            "cathedral", "mosque", "exhibition", "heritage", "historic", "monastery", "abbey",
            "castle", "fort", "tomb", "statue", "monument", "opera", "concert", "library",
            "university",
        ],
    ),
    (
        PhotoCategory::City,
        &[
            "theme park", "amusement", "universal", "disney", "aquarium", "zoo", "safari",
            "cinema", "casino", "spa", "hot spring", "resort", "wonderland", "kingdom",
        ],
    ),
    (
        PhotoCategory::Nature,
        &[
            "park", "garden", "beach", "mountain", "forest", "waterfall", "lake", "river",
            "valley", "cliff", "island", "coast", "bay", "nature reserve", "wetland",
            "desert", "cave", "peak", "summit", "trail", "hiking", "botanical", "bamboo",
            "cherry blossom", "flower", "scenic",
        ],
    ),
];

impl PhotoCategory {
    pub const ALL: [PhotoCategory; 4] = [
        PhotoCategory::Nature,
        PhotoCategory::City,
        PhotoCategory::Food,
        PhotoCategory::Culture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoCategory::Nature => "nature",
            PhotoCategory::City => "city",
            PhotoCategory::Food => "food",
            PhotoCategory::Culture => "culture",
        }
    }

    /// Guess a category from an attraction name
    ///
    /// An empty name is `Nature`; names matching no rule are `City`.
    pub fn from_attraction_name(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return PhotoCategory::Nature;
        }
        CATEGORY_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
            .map(|(category, _)| *category)
            .unwrap_or(PhotoCategory::City)
    }
}

impl fmt::Display for PhotoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A photo attached to one attraction of one itinerary day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    pub user_id: String,
    pub itinerary_id: String,
    pub day_num: u32,
    pub attraction: Attraction,
    pub category: PhotoCategory,
    pub image_url: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl PhotoRecord {
    /// New record categorized from the attraction name
    pub fn new(
        user_id: impl Into<String>,
        itinerary_id: impl Into<String>,
        day_num: u32,
        attraction: Attraction,
        image_url: impl Into<String>,
    ) -> Self {
        let category = PhotoCategory::from_attraction_name(&attraction.name);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            itinerary_id: itinerary_id.into(),
            day_num,
            attraction,
            category,
            image_url: image_url.into(),
            notes: None,
            uploaded_at: Utc::now(),
        }
    }

    /// Override the derived category with the user's choice
    pub fn with_category(mut self, category: PhotoCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One user's photos, optionally filtered by category, one page at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoQuery {
    pub user_id: String,
    pub category: Option<PhotoCategory>,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl PhotoQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category: None,
            page: 1,
            page_size: 12,
        }
    }

    pub fn with_category(mut self, category: PhotoCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoPage {
    pub photos: Vec<PhotoRecord>,
    /// Matches across all pages
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoStats {
    pub total: usize,
    pub by_category: BTreeMap<PhotoCategory, usize>,
}

/// Persistence for attraction photos
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Save a photo; a record with the same id is replaced
    async fn save(&self, photo: PhotoRecord) -> Result<()>;

    /// Newest first
    async fn list(&self, query: &PhotoQuery) -> Result<PhotoPage>;

    /// Returns whether a photo was removed
    async fn delete(&self, user_id: &str, photo_id: &str) -> Result<bool>;

    async fn stats(&self, user_id: &str) -> Result<PhotoStats>;
}

/// Process-local photo store for development and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoStore {
    photos: Arc<RwLock<Vec<PhotoRecord>>>,
}

impl InMemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn save(&self, photo: PhotoRecord) -> Result<()> {
        let mut photos = self.photos.write().await;
        photos.retain(|existing| existing.id != photo.id);
        photos.push(photo);
        Ok(())
    }

    async fn list(&self, query: &PhotoQuery) -> Result<PhotoPage> {
        let photos = self.photos.read().await;
        let mut matching: Vec<&PhotoRecord> = photos
            .iter()
            .filter(|photo| photo.user_id == query.user_id)
            .filter(|photo| query.category.map_or(true, |category| photo.category == category))
            .collect();
        matching.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let total = matching.len();
        let start = (query.page.max(1) - 1) * query.page_size;
        let page: Vec<PhotoRecord> = matching
            .into_iter()
            .skip(start)
            .take(query.page_size)
            .cloned()
            .collect();

        Ok(PhotoPage {
            photos: page,
            total,
            has_more: start + query.page_size < total,
        })
    }

    async fn delete(&self, user_id: &str, photo_id: &str) -> Result<bool> {
        let mut photos = self.photos.write().await;
        let before = photos.len();
        photos.retain(|photo| !(photo.id == photo_id && photo.user_id == user_id));
        Ok(photos.len() != before)
    }

    async fn stats(&self, user_id: &str) -> Result<PhotoStats> {
        let photos = self.photos.read().await;
        let mut stats = PhotoStats::default();
        for photo in photos.iter().filter(|photo| photo.user_id == user_id) {
            stats.total += 1;
            *stats.by_category.entry(photo.category).or_insert(0) += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn photo(user: &str, name: &str, minutes_ago: i64) -> PhotoRecord {
        let mut record = PhotoRecord::new(
            user,
            "trip-1",
            1,
            Attraction::new("day1_attr1", name, "Sight visited on day 1"),
            "https://example.com/p.jpg",
        );
        record.uploaded_at = Utc::now() - Duration::minutes(minutes_ago);
        record
    }

    #[test]
    fn categorizes_attraction_names() {
        assert_eq!(PhotoCategory::from_attraction_name("Ichiran Ramen"), PhotoCategory::Food);
        assert_eq!(PhotoCategory::from_attraction_name("Senso-ji Temple"), PhotoCategory::Culture);
        assert_eq!(PhotoCategory::from_attraction_name("Ueno Park"), PhotoCategory::Nature);
        assert_eq!(PhotoCategory::from_attraction_name("Shibuya Crossing"), PhotoCategory::City);
        assert_eq!(PhotoCategory::from_attraction_name(""), PhotoCategory::Nature);
    }

    #[tokio::test]
    async fn lists_newest_first_per_user() {
        let store = InMemoryPhotoStore::new();
        store.save(photo("alice", "Ueno Park", 30)).await.unwrap();
        store.save(photo("alice", "Tokyo Tower", 5)).await.unwrap();
        store.save(photo("bob", "Ueno Park", 1)).await.unwrap();

        let page = store.list(&PhotoQuery::for_user("alice")).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(!page.has_more);
        assert_eq!(page.photos[0].attraction.name, "Tokyo Tower");

        let nature = store
            .list(&PhotoQuery::for_user("alice").with_category(PhotoCategory::Nature))
            .await
            .unwrap();
        assert_eq!(nature.total, 1);
    }

    #[tokio::test]
    async fn paginates_and_deletes() {
        let store = InMemoryPhotoStore::new();
        for minutes in 0..5 {
            store.save(photo("alice", "Ueno Park", minutes)).await.unwrap();
        }

        let page = store
            .list(&PhotoQuery::for_user("alice").with_page(2, 2))
            .await
            .unwrap();
        assert_eq!(page.photos.len(), 2);
        assert!(page.has_more);

        let id = page.photos[0].id.clone();
        assert!(!store.delete("bob", &id).await.unwrap());
        assert!(store.delete("alice", &id).await.unwrap());
        assert_eq!(store.stats("alice").await.unwrap().total, 4);
    }
}
