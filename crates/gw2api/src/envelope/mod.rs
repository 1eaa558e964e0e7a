//! What the transport hands us: the json content plus the metadata the server only sends as
//! headers. [converter] turns it into the containers callers get back.
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::prelude::*;

pub mod converter;

pub use converter::{
    CollectionConverter, DictionaryRange, DictionaryRangeConverter, PageCollection,
    PageConverter, SingleConverter,
};

/// items per page of this response
pub const PAGE_SIZE_HEADER: &str = "X-Page-Size";
/// number of pages
pub const PAGE_TOTAL_HEADER: &str = "X-Page-Total";
/// items in this response
pub const RESULT_COUNT_HEADER: &str = "X-Result-Count";
/// items in the whole collection on the server
pub const RESULT_TOTAL_HEADER: &str = "X-Result-Total";

/// language of the localized strings in a response. eg: `en`, `de`, `fr`, `es`, `zh`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(SmolStr);

impl Locale {
    pub fn new(locale: &str) -> Self {
        Self(SmolStr::new(locale.trim()))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Locale {
    fn from(locale: &str) -> Self {
        Self::new(locale)
    }
}

impl From<SmolStr> for Locale {
    fn from(locale: SmolStr) -> Self {
        Self(locale)
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives the response metadata after conversion.
///
/// Both methods do nothing by default, entities only override what they actually carry.
pub trait Stampable {
    fn set_locale(&mut self, _locale: &Locale) {}
    fn set_last_modified(&mut self, _timestamp: OffsetDateTime) {}
}

/// Non standard response headers. Names are matched ignoring ascii case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionData(BTreeMap<String, String>);

impl ExtensionData {
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Numeric header value. Missing or malformed values are 0.
    pub fn count(&self, name: &str) -> usize {
        let Some(value) = self.get(name) else {
            return 0;
        };
        match value.trim().parse() {
            Ok(count) => count,
            Err(e) => {
                debug!(header = name, value, %e, "ignoring malformed count header");
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One http exchange, already decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response<T = Value> {
    /// None for an empty body
    pub content: Option<T>,
    pub extension_data: ExtensionData,
    /// from `Content-Language`
    pub culture: Option<Locale>,
    /// from `Date`
    pub date: Option<OffsetDateTime>,
    /// from `Last-Modified`
    pub last_modified: Option<OffsetDateTime>,
}

impl<T> Response<T> {
    pub fn new(content: Option<T>) -> Self {
        Self {
            content,
            extension_data: ExtensionData::default(),
            culture: None,
            date: None,
            last_modified: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.extension_data.insert(name, value);
        self
    }

    pub fn with_culture(mut self, culture: impl Into<Locale>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: OffsetDateTime) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// the time the data was last changed on the server, falling back to the response date
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.last_modified.or(self.date)
    }

    /// reshapes the content and keeps the metadata
    pub fn map_content<U>(self, f: impl FnOnce(T) -> Option<U>) -> Response<U> {
        Response {
            content: self.content.and_then(f),
            extension_data: self.extension_data,
            culture: self.culture,
            date: self.date,
            last_modified: self.last_modified,
        }
    }
}
