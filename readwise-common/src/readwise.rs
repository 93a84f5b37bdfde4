use crate::error::{Error, Result};
use crate::model::{Category, HighlightRecord, Item};
use crate::pagination::{ExportPage, ListPage, Page, PageRequest};
use async_stream::try_stream;
use chrono::{DateTime, Duration, Utc};
use futures::{Stream, TryStreamExt};
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

pub const DEFAULT_API_ENDPOINT: &str = "https://readwise.io/api/v2/";

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Resource {
    Books,
    Export,
}

impl Resource {
    fn path(&self) -> &'static str {
        match self {
            Resource::Books => "books",
            Resource::Export => "export",
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Filters for the export endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportQuery {
    pub updated_after: Option<DateTime<Utc>>,
    pub ids: Vec<String>,
}

impl ExportQuery {
    /// Only records updated within the last `days` days of `now`. Zero or fewer days means no
    /// filter.
    pub fn updated_within_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            updated_after: Duration::try_days(days)
                .filter(|_| days > 0)
                .and_then(|window| now.checked_sub_signed(window)),
            ids: vec![],
        }
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.ids.extend(ids);
        self
    }
}

/// Client for the Readwise v2 REST API.
pub struct Readwise {
    http: reqwest::Client,
    token: String,
    api_endpoint: Url,
}

impl Readwise {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoint(reqwest::Client::new(), token, DEFAULT_API_ENDPOINT)
    }

    pub fn with_endpoint(http: reqwest::Client, token: &str, api_endpoint: &str) -> Result<Self> {
        let api_endpoint = Url::parse(api_endpoint).map_err(|e| Error::InvalidUrl {
            url: api_endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if api_endpoint.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: api_endpoint.to_string(),
                reason: "cannot be used as a base url".to_string(),
            });
        }

        Ok(Self {
            http,
            token: token.to_string(),
            api_endpoint,
        })
    }

    /// Url of a resource, with the trailing slash the API expects.
    pub fn resource_url(&self, resource: Resource) -> Result<Url> {
        let mut url = self.api_endpoint.clone();

        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: self.api_endpoint.to_string(),
                reason: "cannot be used as a base url".to_string(),
            })?
            .pop_if_empty()
            .push(resource.path())
            .push("");

        Ok(url)
    }

    pub async fn list_items(&self, category: &Category) -> Result<Vec<Item>> {
        info!("Fetching {} in category {} from Readwise", Resource::Books, category);

        let request = PageRequest::new(self.resource_url(Resource::Books)?)
            .param("category", category.as_str());

        self.fetch_all::<ListPage>(request).await
    }

    pub async fn export_highlights(&self, query: &ExportQuery) -> Result<Vec<HighlightRecord>> {
        info!(
            "Exporting highlights from Readwise, since {}",
            query
                .updated_after
                .map(|v| v.to_rfc3339())
                .unwrap_or("[all]".to_string())
        );

        let mut request = PageRequest::new(self.resource_url(Resource::Export)?);

        if let Some(updated_after) = query.updated_after {
            request = request.param("updatedAfter", updated_after.to_rfc3339());
        }

        if !query.ids.is_empty() {
            request = request.param("ids", query.ids.join(","));
        }

        self.fetch_all::<ExportPage>(request).await
    }

    /// Follows pagination from `request` to the end and returns every item in page order. The
    /// first failure aborts the whole run.
    pub async fn fetch_all<P>(&self, request: PageRequest) -> Result<Vec<P::Item>>
    where
        P: Page + 'static,
    {
        let entities: Vec<P::Item> = self.stream_pages::<P>(request).try_concat().await?;

        debug!("Fetched {} entities total", entities.len());

        Ok(entities)
    }

    /// Yields the items of each page as it arrives, stopping after the last page or the first
    /// error.
    pub fn stream_pages<P>(
        &self,
        mut request: PageRequest,
    ) -> impl Stream<Item = Result<Vec<P::Item>>> + '_
    where
        P: Page + 'static,
    {
        try_stream! {
            loop {
                let page: P = self.get_page(&request).await?;
                let (items, next) = page.into_parts();

                debug!(
                    "Received api response: results={}, next={:?}",
                    items.len(),
                    next
                );

                yield items;

                match next {
                    Some(next) => request.advance(next)?,
                    None => break,
                }
            }
        }
    }

    pub async fn get_page<P: Page>(&self, request: &PageRequest) -> Result<P> {
        let url = request.url();
        debug!("Readwise api url: {}", url);

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Response { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resource_urls_end_with_slash() {
        let readwise = Readwise::new("token").unwrap();
        assert_eq!(
            readwise.resource_url(Resource::Books).unwrap().as_str(),
            "https://readwise.io/api/v2/books/"
        );

        let readwise =
            Readwise::with_endpoint(reqwest::Client::new(), "token", "http://localhost:8080/api/v2")
                .unwrap();
        assert_eq!(
            readwise.resource_url(Resource::Export).unwrap().as_str(),
            "http://localhost:8080/api/v2/export/"
        );
    }

    #[test]
    fn rejects_unusable_endpoints() {
        let err = Readwise::with_endpoint(reqwest::Client::new(), "t", "mailto:me@example.com")
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidUrl { .. }));

        assert!(Readwise::with_endpoint(reqwest::Client::new(), "t", "::nope").is_err());
    }

    #[test]
    fn updated_within_days_counts_back_from_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        let query = ExportQuery::updated_within_days(7, now);
        assert_eq!(
            query.updated_after,
            Some(Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap())
        );

        assert_eq!(ExportQuery::updated_within_days(0, now).updated_after, None);
        assert_eq!(ExportQuery::updated_within_days(-3, now).updated_after, None);
    }
}
