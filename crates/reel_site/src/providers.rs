//! External data collaborators
//!
//! The page needs three things from the outside world: a list of work
//! items for the gallery, a list of testimonials, and a way to submit a new
//! one. Transport and storage live behind these traits; the JSON fixture
//! providers back the simulator and the tests.

use std::cell::{Cell, RefCell};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

/// Provider-side cap on listed work items
pub const DEFAULT_WORK_ITEM_LIMIT: usize = 10;

/// A published project shown as one gallery panel
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub year: u16,
    pub url: String,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub star_count: u32,
    #[serde(default)]
    pub fork_count: u32,
    /// Last update, used for ordering
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// A stored client testimonial
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Testimonial {
    pub id: u64,
    pub name: String,
    /// 1 to 5 stars
    pub rating: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A testimonial as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestimonialDraft {
    pub name: String,
    pub email: String,
    /// 0 until a star is picked
    pub rating: u8,
    pub message: String,
}

pub trait WorkItemsProvider {
    /// Most recently updated items first
    fn list_work_items(&self) -> Result<Vec<WorkItem>, ProviderError>;
}

pub trait TestimonialsProvider {
    /// Newest first
    fn list_testimonials(&self) -> Result<Vec<Testimonial>, ProviderError>;

    fn submit_testimonial(&self, draft: &TestimonialDraft) -> Result<(), ProviderError>;
}

// =============================================================================
// JSON fixtures
// =============================================================================

/// Work items read from a JSON array
#[derive(Debug, Clone)]
pub struct JsonWorkItems {
    items: Vec<WorkItem>,
    limit: usize,
    offline: bool,
}

impl JsonWorkItems {
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            limit: DEFAULT_WORK_ITEM_LIMIT,
            offline: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Fail every request, as an unreachable service would
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }
}

impl WorkItemsProvider for JsonWorkItems {
    fn list_work_items(&self) -> Result<Vec<WorkItem>, ProviderError> {
        if self.offline {
            return Err(ProviderError::Unavailable("work items fixture is offline".into()));
        }
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items.truncate(self.limit);
        Ok(items)
    }
}

/// Testimonials kept in memory, seeded from a JSON array
pub struct JsonTestimonials {
    entries: RefCell<Vec<Testimonial>>,
    next_id: Cell<u64>,
    offline: bool,
    clock: Box<dyn Fn() -> DateTime<Utc>>,
}

impl JsonTestimonials {
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn new(entries: Vec<Testimonial>) -> Self {
        let next_id = entries.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            entries: RefCell::new(entries),
            next_id: Cell::new(next_id),
            offline: false,
            clock: Box::new(Utc::now),
        }
    }

    /// Use a fixed source of creation times for submissions
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> Result<(), ProviderError> {
        if self.offline {
            Err(ProviderError::Unavailable("testimonials fixture is offline".into()))
        } else {
            Ok(())
        }
    }
}

impl TestimonialsProvider for JsonTestimonials {
    fn list_testimonials(&self) -> Result<Vec<Testimonial>, ProviderError> {
        self.ensure_online()?;
        let mut entries = self.entries.borrow().clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    fn submit_testimonial(&self, draft: &TestimonialDraft) -> Result<(), ProviderError> {
        self.ensure_online()?;
        if !(1..=5).contains(&draft.rating) {
            return Err(ProviderError::Rejected(format!(
                "rating {} out of range",
                draft.rating
            )));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(Testimonial {
            id,
            name: draft.name.trim().to_string(),
            rating: draft.rating,
            message: draft.message.trim().to_string(),
            created_at: (self.clock)(),
        });
        debug!("JsonTestimonials: stored testimonial {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKS: &str = r#"[
        {"id": 1, "title": "portfolio-novo", "year": 2024, "url": "https://example.com/a",
         "star_count": 3, "updated_at": "2024-05-01T10:00:00Z"},
        {"id": 2, "title": "landing-page", "description": "Landing", "year": 2023,
         "url": "https://example.com/b", "homepage_url": "https://b.example.com",
         "updated_at": "2024-06-01T10:00:00Z"},
        {"id": 3, "title": "old", "year": 2021, "url": "https://example.com/c",
         "updated_at": "2022-01-01T00:00:00Z"}
    ]"#;

    #[test]
    fn test_work_items_most_recent_first_and_limited() {
        let provider = JsonWorkItems::from_json_str(WORKS).unwrap().with_limit(2);
        let items = provider.list_work_items().unwrap();
        let ids: Vec<u64> = items.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(items[1].description, None);
        assert_eq!(items[0].homepage_url.as_deref(), Some("https://b.example.com"));
    }

    #[test]
    fn test_malformed_fixture() {
        let err = JsonWorkItems::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_submit_then_list_newest_first() {
        let provider = JsonTestimonials::from_json_str(
            r#"[{"id": 7, "name": "Ana", "rating": 5, "message": "Great",
                 "created_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap()
        .with_clock(|| "2024-02-01T00:00:00Z".parse().unwrap());

        let draft = TestimonialDraft {
            name: " Bruno ".into(),
            email: "bruno@example.com".into(),
            rating: 4,
            message: "Solid work".into(),
        };
        provider.submit_testimonial(&draft).unwrap();

        let list = provider.list_testimonials().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Bruno");
        assert_eq!(list[0].id, 8);
        assert_eq!(list[1].id, 7);
    }

    #[test]
    fn test_offline_and_rejected() {
        let provider = JsonTestimonials::new(Vec::new()).offline();
        assert!(matches!(
            provider.list_testimonials(),
            Err(ProviderError::Unavailable(_))
        ));

        let provider = JsonTestimonials::new(Vec::new());
        let draft = TestimonialDraft {
            rating: 9,
            ..TestimonialDraft::default()
        };
        assert!(matches!(
            provider.submit_testimonial(&draft),
            Err(ProviderError::Rejected(_))
        ));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_work_items_ordered_across_offsets() {
        let provider = JsonWorkItems::from_json_str(
            r#"[
                {"id": 1, "title": "east", "year": 2024, "url": "https://example.com/e",
                 "updated_at": "2024-06-01T10:00:00+05:00"},
                {"id": 2, "title": "utc", "year": 2024, "url": "https://example.com/u",
                 "updated_at": "2024-06-01T06:00:00Z"}
            ]"#,
        )
        .unwrap();
        let ids: Vec<u64> = provider
            .list_work_items()
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_missing_updated_at_sorts_last() {
        let provider = JsonWorkItems::from_json_str(
            r#"[
                {"id": 1, "title": "undated", "year": 2020, "url": "https://example.com/a"},
                {"id": 2, "title": "dated", "year": 2024, "url": "https://example.com/b",
                 "updated_at": "2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();
        let items = provider.list_work_items().unwrap();
        assert_eq!(items[0].id, 2);
        assert_eq!(items[1].updated_at, DateTime::<Utc>::default());
    }
}
