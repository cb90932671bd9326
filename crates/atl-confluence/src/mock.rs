//! Mock Confluence API for testing.
//!
//! Provides [`MockConfluenceApi`] for exercising page operations without a
//! Confluence instance.

use std::collections::HashMap;
use std::sync::RwLock;

use atl_client::ApiError;
use serde_json::Value;

use crate::api::{ConfluenceApi, NewPage, PageUpdate};
use crate::types::{
    Listing, RawBody, RawPage, RawSpace, RawStorage, RawVersion,
};

/// Page creation recorded by [`MockConfluenceApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPage {
    pub space_key: String,
    pub title: String,
    pub body: String,
    pub parent_id: Option<String>,
}

/// Page update recorded by [`MockConfluenceApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedPage {
    pub page_id: String,
    pub title: String,
    pub body: String,
    pub version: u32,
    pub minor_edit: bool,
    pub message: String,
    pub parent_id: Option<String>,
}

/// Mock Confluence API.
///
/// Serves pages, spaces and children from memory. Pages are given as the
/// JSON the REST API would return. Creates and updates are recorded and
/// applied to the stored pages, so a follow-up fetch sees them.
///
/// # Example
///
/// ```ignore
/// use atl_confluence::MockConfluenceApi;
/// use serde_json::json;
///
/// let api = MockConfluenceApi::new("https://wiki.example.com")
///     .with_space("DOC", "Documentation")
///     .with_page(json!({"id": "1", "title": "Home", "space": {"key": "DOC"}}));
/// ```
#[derive(Debug)]
pub struct MockConfluenceApi {
    base_url: String,
    pages: RwLock<Vec<RawPage>>,
    spaces: RwLock<Vec<RawSpace>>,
    children: RwLock<HashMap<String, Listing<RawPage>>>,
    failures: RwLock<HashMap<String, u16>>,
    fail_all: RwLock<Option<u16>>,
    omit_created_id: RwLock<bool>,
    created: RwLock<Vec<CreatedPage>>,
    updated: RwLock<Vec<UpdatedPage>>,
    calls: RwLock<Vec<String>>,
}

impl MockConfluenceApi {
    /// Create an empty mock for `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            pages: RwLock::new(Vec::new()),
            spaces: RwLock::new(Vec::new()),
            children: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            fail_all: RwLock::new(None),
            omit_created_id: RwLock::new(false),
            created: RwLock::new(Vec::new()),
            updated: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Add a page from its REST API JSON.
    ///
    /// # Panics
    ///
    /// Panics if the JSON is not a page or the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: Value) -> Self {
        let page: RawPage = serde_json::from_value(page).unwrap();
        self.pages.write().unwrap().push(page);
        self
    }

    /// Add a space to the space listing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_space(self, key: &str, name: &str) -> Self {
        self.spaces.write().unwrap().push(RawSpace {
            key: key.to_owned(),
            name: name.to_owned(),
        });
        self
    }

    /// Set the child listing of a page, either a `results` envelope or a bare array.
    ///
    /// # Panics
    ///
    /// Panics if the JSON is not a page listing or the internal lock is poisoned.
    #[must_use]
    pub fn with_children(self, page_id: &str, listing: Value) -> Self {
        let listing: Listing<RawPage> = serde_json::from_value(listing).unwrap();
        self.children
            .write()
            .unwrap()
            .insert(page_id.to_owned(), listing);
        self
    }

    /// Make one operation answer with an HTTP error status.
    ///
    /// `operation` is the [`ConfluenceApi`] method name.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, operation: &str, status: u16) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(operation.to_owned(), status);
        self
    }

    /// Make every operation answer with an HTTP error status.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, status: u16) -> Self {
        *self.fail_all.write().unwrap() = Some(status);
        self
    }

    /// Answer page creation with a body that has no ID.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn without_created_id(self) -> Self {
        *self.omit_created_id.write().unwrap() = true;
        self
    }

    /// Pages created so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn created(&self) -> Vec<CreatedPage> {
        self.created.read().unwrap().clone()
    }

    /// Page updates sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn updated(&self) -> Vec<UpdatedPage> {
        self.updated.read().unwrap().clone()
    }

    /// Calls made so far, as `operation(arguments)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, operation: &str, args: &str) -> Result<(), ApiError> {
        self.calls
            .write()
            .unwrap()
            .push(format!("{operation}({args})"));

        let status = self
            .failures
            .read()
            .unwrap()
            .get(operation)
            .copied()
            .or(*self.fail_all.read().unwrap());
        match status {
            Some(status) => Err(ApiError::HttpResponse {
                status,
                body: format!("{{\"message\": \"mock failure in {operation}\"}}"),
            }),
            None => Ok(()),
        }
    }

    fn find_page(&self, page_id: &str) -> Result<RawPage, ApiError> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|page| page.id == page_id)
            .cloned()
            .ok_or_else(|| not_found(page_id))
    }
}

fn not_found(page_id: &str) -> ApiError {
    ApiError::HttpResponse {
        status: 404,
        body: format!("No content found with id: {page_id}"),
    }
}

fn storage_body(value: &str) -> Option<RawBody> {
    Some(RawBody {
        storage: Some(RawStorage {
            value: value.to_owned(),
            representation: "storage".to_owned(),
        }),
    })
}

fn page_slice(pages: Vec<RawPage>, start: u32, limit: u32) -> Vec<RawPage> {
    pages
        .into_iter()
        .skip(start as usize)
        .take(limit as usize)
        .collect()
}

impl ConfluenceApi for MockConfluenceApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_page_by_id(&self, page_id: &str, expand: &str) -> Result<RawPage, ApiError> {
        self.record("get_page_by_id", &format!("{page_id}, {expand}"))?;
        self.find_page(page_id)
    }

    fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        expand: &str,
    ) -> Result<Option<RawPage>, ApiError> {
        self.record("get_page_by_title", &format!("{space_key}, {title}, {expand}"))?;
        Ok(self
            .pages
            .read()
            .unwrap()
            .iter()
            .find(|page| page.title == title && page.space_key() == Some(space_key))
            .cloned())
    }

    fn get_page_ancestors(&self, page_id: &str) -> Result<Vec<RawPage>, ApiError> {
        self.record("get_page_ancestors", page_id)?;
        Ok(self.find_page(page_id)?.ancestors)
    }

    fn get_all_spaces(&self, start: u32, limit: u32) -> Result<Listing<RawSpace>, ApiError> {
        self.record("get_all_spaces", &format!("{start}, {limit}"))?;
        let spaces = self.spaces.read().unwrap();
        Ok(Listing::Envelope {
            results: spaces
                .iter()
                .skip(start as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    fn get_all_pages_from_space(
        &self,
        space_key: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Vec<RawPage>, ApiError> {
        self.record(
            "get_all_pages_from_space",
            &format!("{space_key}, {start}, {limit}, {expand}"),
        )?;
        // Pages without expanded space info are served for any key
        let pages: Vec<RawPage> = self
            .pages
            .read()
            .unwrap()
            .iter()
            .filter(|page| page.space_key().is_none_or(|key| key == space_key))
            .cloned()
            .collect();
        Ok(page_slice(pages, start, limit))
    }

    fn get_page_children(
        &self,
        page_id: &str,
        start: u32,
        limit: u32,
        expand: &str,
    ) -> Result<Listing<RawPage>, ApiError> {
        self.record(
            "get_page_children",
            &format!("{page_id}, {start}, {limit}, {expand}"),
        )?;
        Ok(self
            .children
            .read()
            .unwrap()
            .get(page_id)
            .cloned()
            .unwrap_or_default())
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<RawPage, ApiError> {
        self.record("create_page", &format!("{}, {}", page.space_key, page.title))?;
        self.created.write().unwrap().push(CreatedPage {
            space_key: page.space_key.to_owned(),
            title: page.title.to_owned(),
            body: page.body.to_owned(),
            parent_id: page.parent_id.map(str::to_owned),
        });

        if *self.omit_created_id.read().unwrap() {
            return Ok(RawPage::default());
        }

        let mut pages = self.pages.write().unwrap();
        let ancestors = match page.parent_id {
            Some(parent_id) => {
                let parent = pages
                    .iter()
                    .find(|p| p.id == parent_id)
                    .ok_or_else(|| not_found(parent_id))?;
                let mut ancestors = parent.ancestors.clone();
                ancestors.push(RawPage {
                    id: parent.id.clone(),
                    title: parent.title.clone(),
                    ..RawPage::default()
                });
                ancestors
            }
            None => Vec::new(),
        };
        let created = RawPage {
            id: (10_000 + pages.len()).to_string(),
            content_type: "page".to_owned(),
            title: page.title.to_owned(),
            space: Some(RawSpace {
                key: page.space_key.to_owned(),
                name: page.space_key.to_owned(),
            }),
            version: Some(RawVersion {
                number: 1,
                ..RawVersion::default()
            }),
            body: storage_body(page.body),
            ancestors,
            ..RawPage::default()
        };
        pages.push(created.clone());
        Ok(created)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<RawPage, ApiError> {
        self.record("update_page", &format!("{}, {}", update.page_id, update.version))?;
        self.updated.write().unwrap().push(UpdatedPage {
            page_id: update.page_id.to_owned(),
            title: update.title.to_owned(),
            body: update.body.to_owned(),
            version: update.version,
            minor_edit: update.minor_edit,
            message: update.message.to_owned(),
            parent_id: update.parent_id.map(str::to_owned),
        });

        let mut pages = self.pages.write().unwrap();
        let page = pages
            .iter_mut()
            .find(|page| page.id == update.page_id)
            .ok_or_else(|| not_found(update.page_id))?;
        page.title = update.title.to_owned();
        page.body = storage_body(update.body);
        page.version = Some(RawVersion {
            number: update.version,
            message: Some(update.message.to_owned()),
            minor_edit: update.minor_edit,
            ..RawVersion::default()
        });
        Ok(page.clone())
    }
}
