//! Delivery REST API client
//!
//! Published content is read from the secure access endpoint, everything else
//! from the preview endpoint. Both authenticate with the same bearer key.
//! List endpoints are paginated; the client follows `pagination.next_page`
//! until the API stops returning one.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::DeliveryConfig;
use crate::error::{ErrorInfo, RepositoryError};
use crate::model::ContentItem;

use super::query::ItemQuery;
use super::{ContentRepository, ContentTypeSchema, FetchedItems, LanguageDescriptor, ensure_type_order};

const WAIT_FOR_CONTENT_HEADER: &str = "X-KC-Wait-For-Loading-New-Content";

/// Which API host a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    /// Published content with secure access
    Secure,
    /// Unpublished content
    Preview,
}

/// Pagination block shared by all list responses
#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    next_page: String,
}

/// A list response that can be split into entries and pagination
trait Page: DeserializeOwned {
    type Entry;

    fn into_parts(self) -> (Vec<Self::Entry>, Pagination);
}

#[derive(Deserialize)]
struct ItemsPage {
    items: Vec<ContentItem>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Deserialize)]
struct TypesPage {
    types: Vec<ContentTypeSchema>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Deserialize)]
struct LanguagesPage {
    languages: Vec<LanguageDescriptor>,
    #[serde(default)]
    pagination: Pagination,
}

impl Page for ItemsPage {
    type Entry = ContentItem;

    fn into_parts(self) -> (Vec<ContentItem>, Pagination) {
        (self.items, self.pagination)
    }
}

impl Page for TypesPage {
    type Entry = ContentTypeSchema;

    fn into_parts(self) -> (Vec<ContentTypeSchema>, Pagination) {
        (self.types, self.pagination)
    }
}

impl Page for LanguagesPage {
    type Entry = LanguageDescriptor;

    fn into_parts(self) -> (Vec<LanguageDescriptor>, Pagination) {
        (self.languages, self.pagination)
    }
}

/// Delivery API implementation of [`ContentRepository`]
pub struct DeliveryClient {
    http: reqwest::Client,
    environment_id: String,
    api_key: String,
    config: DeliveryConfig,
}

impl DeliveryClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `environment_id` - Validated environment identifier
    /// * `api_key` - Delivery API key with secure access and preview
    /// * `config` - Endpoint, timeout and paging settings
    ///
    /// # Returns
    /// * `Result<Self, RepositoryError>` - Client or HTTP setup error
    pub fn new(
        environment_id: impl Into<String>,
        api_key: impl Into<String>,
        config: DeliveryConfig,
    ) -> Result<Self, RepositoryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .user_agent(concat!("content-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            environment_id: environment_id.into(),
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self, endpoint: Endpoint, path: &str) -> String {
        let base = match endpoint {
            Endpoint::Secure => &self.config.base_url,
            Endpoint::Preview => &self.config.preview_base_url,
        };
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            self.environment_id,
            path
        )
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.get(url).bearer_auth(&self.api_key);
        if self.config.wait_for_new_content {
            req = req.header(WAIT_FOR_CONTENT_HEADER, "true");
        }
        req.header("Accept", "application/json")
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, RepositoryError> {
        debug!("GET {} ({} params)", url, params.len());

        let resp = self.request(url).query(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let info = ErrorInfo::from_body(&body);
            return Err(match status.as_u16() {
                401 => RepositoryError::Unauthorized(info),
                403 => RepositoryError::Forbidden(info),
                404 => RepositoryError::NotFound(info),
                code => RepositoryError::Status { status: code, info },
            });
        }

        serde_json::from_str(&body).map_err(|e| RepositoryError::Decode(e.to_string()))
    }

    /// Fetch every page of a list endpoint
    async fn fetch_all<P: Page>(
        &self,
        endpoint: Endpoint,
        path: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<(Vec<P::Entry>, u64), RepositoryError> {
        params.push(("limit".to_string(), self.config.page_size.to_string()));
        params.push(("skip".to_string(), "0".to_string()));
        params.push(("includeTotalCount".to_string(), "true".to_string()));

        let first: P = self.get(&self.url(endpoint, path), &params).await?;
        let (mut entries, mut pagination) = first.into_parts();
        let total_count = pagination.total_count;
        let mut pages = 1u32;

        while !pagination.next_page.is_empty() && pagination.count > 0 {
            let next_url = std::mem::take(&mut pagination.next_page);
            let page: P = self.get(&next_url, &[]).await?;
            let (batch, next) = page.into_parts();
            debug!("Fetched page #{} with {} entries", pages + 1, batch.len());
            entries.extend(batch);
            pagination = next;
            pages += 1;
        }

        let total = total_count.unwrap_or(entries.len() as u64);
        debug!("Fetched {} entries from {} in {} page(s)", entries.len(), path, pages);
        Ok((entries, total))
    }

    /// Probe query: one item, no linked content
    async fn probe_items(
        &self,
        endpoint: Endpoint,
        mut params: Vec<(String, String)>,
    ) -> Result<(), RepositoryError> {
        params.push(("limit".to_string(), "1".to_string()));
        params.push(("depth".to_string(), "0".to_string()));
        let _: ItemsPage = self.get(&self.url(endpoint, "items"), &params).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for DeliveryClient {
    fn environment_id(&self) -> &str {
        &self.environment_id
    }

    async fn fetch_items(&self, query: &ItemQuery) -> Result<FetchedItems, RepositoryError> {
        let endpoint = if query.uses_preview() {
            Endpoint::Preview
        } else {
            Endpoint::Secure
        };

        let (mut items, total_count) = self
            .fetch_all::<ItemsPage>(endpoint, "items", query.to_params())
            .await?;
        ensure_type_order(&mut items);

        info!(
            "Fetched {} items of {} type(s) in {}",
            items.len(),
            query.types.len(),
            query.language
        );
        Ok(FetchedItems { items, total_count })
    }

    async fn fetch_types(&self) -> Result<Vec<ContentTypeSchema>, RepositoryError> {
        let (types, _) = self
            .fetch_all::<TypesPage>(Endpoint::Preview, "types", Vec::new())
            .await?;
        Ok(types)
    }

    async fn fetch_languages(&self) -> Result<Vec<LanguageDescriptor>, RepositoryError> {
        let (languages, _) = self
            .fetch_all::<LanguagesPage>(Endpoint::Preview, "languages", Vec::new())
            .await?;
        Ok(languages)
    }

    async fn secure_access_test(&self) -> Result<(), RepositoryError> {
        self.probe_items(
            Endpoint::Secure,
            vec![("system.workflow_step".to_string(), "published".to_string())],
        )
        .await
    }

    async fn preview_test(&self) -> Result<(), RepositoryError> {
        self.probe_items(Endpoint::Preview, Vec::new()).await
    }
}
