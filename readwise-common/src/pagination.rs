use crate::error::{Error, Result};
use crate::model::{HighlightRecord, Item};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const PAGE_CURSOR_PARAM: &str = "pageCursor";

/// Where the following page lives, as reported by the page just received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Absolute url of the next page, query included.
    Url(String),
    /// Cursor to send back to the same endpoint.
    Cursor(i64),
}

impl NextPage {
    pub fn from_url(next: Option<String>) -> Option<Self> {
        next.filter(|next| !next.is_empty()).map(NextPage::Url)
    }

    pub fn from_cursor(cursor: Option<i64>) -> Option<Self> {
        cursor.filter(|cursor| *cursor > 0).map(NextPage::Cursor)
    }
}

/// A single decoded response from a paginated endpoint.
pub trait Page: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<NextPage>);
}

/// Offset style page, linking to the next page by url.
#[derive(Debug, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Item>,
}

impl Page for ListPage {
    type Item = Item;

    fn into_parts(self) -> (Vec<Item>, Option<NextPage>) {
        (self.results, NextPage::from_url(self.next))
    }
}

/// Cursor style page from the export endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPage {
    #[serde(default)]
    pub count: i64,
    pub next_page_cursor: Option<i64>,
    pub results: Vec<HighlightRecord>,
}

impl Page for ExportPage {
    type Item = HighlightRecord;

    fn into_parts(self) -> (Vec<HighlightRecord>, Option<NextPage>) {
        (self.results, NextPage::from_cursor(self.next_page_cursor))
    }
}

/// The url and query parameters of the next request in a pagination run.
#[derive(Debug, Clone)]
pub struct PageRequest {
    url: Url,
    params: BTreeMap<String, String>,
}

impl PageRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn url(&self) -> Url {
        let mut url = self.url.clone();

        if !self.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in &self.params {
                query.append_pair(name, value);
            }
        }

        url
    }

    /// Points this request at the page after the current one.
    ///
    /// A next url already carries its whole query, so the original parameters are dropped. A
    /// cursor is added to the parameters, replacing any previous cursor.
    pub fn advance(&mut self, next: NextPage) -> Result<()> {
        match next {
            NextPage::Url(next) => {
                self.url = Url::parse(&next).map_err(|e| Error::InvalidUrl {
                    url: next.clone(),
                    reason: e.to_string(),
                })?;
                self.params.clear();
            }
            NextPage::Cursor(cursor) => {
                self.params
                    .insert(PAGE_CURSOR_PARAM.to_string(), cursor.to_string());
            }
        }

        Ok(())
    }
}
