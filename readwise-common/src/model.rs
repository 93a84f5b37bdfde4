use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Readwise item category, kept as the raw wire string when it isn't one we know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Books,
    Articles,
    Tweets,
    Podcasts,
    Supplementals,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Books => "books",
            Category::Articles => "articles",
            Category::Tweets => "tweets",
            Category::Podcasts => "podcasts",
            Category::Supplementals => "supplementals",
            Category::Other(other) => other,
        }
    }

    /// Display label used in exported notes. Anything outside the four main categories has no
    /// label and comes out as an empty string.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Books => "Book",
            Category::Articles => "Article",
            Category::Tweets => "Tweet",
            Category::Podcasts => "Podcast",
            Category::Supplementals | Category::Other(_) => "",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "books" => Category::Books,
            "articles" => Category::Articles,
            "tweets" => Category::Tweets,
            "podcasts" => Category::Podcasts,
            "supplementals" => Category::Supplementals,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(s.to_string()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(default)]
    pub user_book: Option<i64>,
    pub name: String,
}

/// An entry from the books listing endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Category,
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_highlights: i64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_highlight_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated: Option<DateTime<Utc>>,
    pub cover_image_url: Option<String>,
    pub highlights_url: Option<String>,
    pub source_url: Option<String>,
    pub asin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

/// An item as returned by the export endpoint, carrying its highlights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HighlightRecord {
    pub user_book_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub author: Option<String>,
    pub readable_title: Option<String>,
    pub source: Option<String>,
    pub cover_image_url: Option<String>,
    pub unique_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub book_tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Category,
    pub readwise_url: Option<String>,
    pub source_url: Option<String>,
    pub asin: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<Highlight>,
}

impl HighlightRecord {
    /// Orders highlights by location. Ties may swap.
    pub fn sort_highlights(&mut self) {
        self.highlights.sort_unstable_by_key(|h| h.location);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Highlight {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_location: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub highlighted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub external_id: Option<ExternalId>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub book_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_discard: bool,
    pub readwise_url: Option<String>,
}

/// Identifier assigned by the highlight's original source. Depending on the source this is
/// either numeric or an opaque string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Integer(i64),
    String(String),
}

/// Timestamps the API sends empty or without an offset are treated as absent rather than failing
/// the whole page.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_labels() {
        let cases = [
            ("books", "Book"),
            ("articles", "Article"),
            ("tweets", "Tweet"),
            ("podcasts", "Podcast"),
            ("supplementals", ""),
            ("videos", ""),
            ("", ""),
        ];

        for (raw, label) in cases {
            let category: Category = raw.parse().unwrap();
            assert_eq!(category.label(), label, "label for {raw:?}");
        }
    }

    #[test]
    fn unknown_category_keeps_its_wire_value() {
        let category: Category = serde_json::from_value(json!("videos")).unwrap();
        assert_eq!(category, Category::Other("videos".to_string()));
        assert_eq!(serde_json::to_value(&category).unwrap(), json!("videos"));
    }

    #[test]
    fn item_decodes_listing_entry() {
        let item: Item = serde_json::from_value(json!({
            "id": 1776,
            "title": "Difficult Conversations",
            "author": "Douglas Stone",
            "category": "books",
            "source": "kindle",
            "num_highlights": 12,
            "last_highlight_at": "2020-10-01T17:47:31.234826Z",
            "updated": "2020-10-01T17:47:31.234826Z",
            "cover_image_url": null,
            "highlights_url": "https://readwise.io/bookreview/1776",
            "source_url": null,
            "asin": "B000WJVK26",
            "tags": [{"id": 1, "user_book": 1776, "name": "favorite"}]
        }))
        .unwrap();

        assert_eq!(item.id, 1776);
        assert_eq!(item.category, Category::Books);
        assert_eq!(item.tags[0].user_book, Some(1776));
        assert!(item.source_url.is_none());
        assert!(item.updated.is_some());
    }

    #[test]
    fn unparseable_timestamps_are_absent() {
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "category": "books",
            "tags": [],
            "last_highlight_at": "",
            "updated": "2020-10-01T17:47:31"
        }))
        .unwrap();

        assert!(item.last_highlight_at.is_none());
        assert!(item.updated.is_none());

        let highlight: Highlight = serde_json::from_value(json!({
            "id": 2,
            "highlighted_at": "",
            "created_at": "yesterday",
            "updated_at": "2022-09-14T18:50:30.564Z"
        }))
        .unwrap();

        assert!(highlight.highlighted_at.is_none());
        assert!(highlight.created_at.is_none());
        assert!(highlight.updated_at.is_some());
    }

    #[test]
    fn highlight_nulls_fall_back_to_defaults() {
        let highlight: Highlight = serde_json::from_value(json!({
            "id": 9,
            "text": "quote",
            "location": null,
            "end_location": null,
            "location_type": "order",
            "note": null,
            "color": "",
            "highlighted_at": null,
            "created_at": "2022-09-13T16:41:53.186Z",
            "updated_at": "2022-09-14T18:50:30.564Z",
            "external_id": "6320b2bd7fbcdd7b0c000b3e",
            "url": null,
            "book_id": 123,
            "tags": [],
            "is_favorite": false,
            "is_discard": false,
            "readwise_url": "https://readwise.io/open/9"
        }))
        .unwrap();

        assert_eq!(highlight.location, 0);
        assert_eq!(highlight.note, "");
        assert_eq!(
            highlight.external_id,
            Some(ExternalId::String("6320b2bd7fbcdd7b0c000b3e".to_string()))
        );
    }

    #[test]
    fn sort_highlights_orders_by_location() {
        let mut record: HighlightRecord = serde_json::from_value(json!({
            "user_book_id": 1,
            "title": "t",
            "category": "articles",
            "highlights": [
                {"id": 1, "text": "c", "location": 30},
                {"id": 2, "text": "a", "location": 10},
                {"id": 3, "text": "b", "location": 20}
            ]
        }))
        .unwrap();

        record.sort_highlights();

        let ids: Vec<i64> = record.highlights.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
