use std::hash::Hash;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{dispatcher, Dispatch};

use super::{
    Response, PAGE_SIZE_HEADER, PAGE_TOTAL_HEADER, RESULT_COUNT_HEADER, RESULT_TOTAL_HEADER,
};
use crate::convert::error::json_kind;
use crate::prelude::*;

/// One page of a server side collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCollection<T> {
    pub items: Vec<T>,
    /// zero based index of this page, as requested
    pub page: usize,
    pub page_size: usize,
    /// number of pages
    pub page_count: usize,
    /// items in this page
    pub subtotal_count: usize,
    /// items in the whole collection
    pub total_count: usize,
}

impl<T> PageCollection<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for PageCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A keyed part of a server side collection
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryRange<K: Hash + Eq, T> {
    /// in the order the server sent them
    pub items: IndexMap<K, T>,
    pub subtotal_count: usize,
    pub total_count: usize,
}

impl<K: Hash + Eq, T> Default for DictionaryRange<K, T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            subtotal_count: 0,
            total_count: 0,
        }
    }
}

impl<K: Hash + Eq, T> DictionaryRange<K, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn get(&self, key: &K) -> Option<&T> {
        self.items.get(key)
    }
    /// Merges another range of the same collection into this one.
    /// Subtotals add up, the total is whatever the larger one says. Existing keys are kept.
    pub fn merge(&mut self, other: Self) {
        for (key, item) in other.items {
            self.items.entry(key).or_insert(item);
        }
        self.subtotal_count += other.subtotal_count;
        self.total_count = self.total_count.max(other.total_count);
    }
}

/// converts every element of an array content. absent or `null` content is an empty vec
fn convert_items<T, C>(converter: &C, content: Option<Value>) -> Result<Vec<T>, ConvertError>
where
    C: Converter<T>,
    T: Send,
{
    match content {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => {
            // rayon workers don't inherit the caller's subscriber or span
            let dispatch = dispatcher::get_default(Dispatch::clone);
            let span = debug_span!("convert_items", count = values.len());
            values
                .into_par_iter()
                .map(|value| {
                    dispatcher::with_default(&dispatch, || {
                        span.in_scope(|| converter.convert(value))
                    })
                })
                .collect()
        }
        Some(other) => Err(ConvertError::NotAnArray {
            found: json_kind(&other),
        }),
    }
}

/// Response with a single entity
pub struct SingleConverter<C> {
    item: C,
}

impl<C> SingleConverter<C> {
    pub fn new(item: C) -> Self {
        Self { item }
    }

    /// absent content is `T::default()`
    pub fn convert<T>(&self, response: Response) -> Result<T, ConvertError>
    where
        C: Converter<T>,
        T: Default + Stampable,
    {
        let Response {
            content, culture, ..
        } = response;
        let Some(content) = content.filter(|c| !c.is_null()) else {
            return Ok(T::default());
        };
        let mut item = self.item.convert(content)?;
        if let Some(locale) = &culture {
            item.set_locale(locale);
        }
        Ok(item)
    }
}

/// Response with a plain array of entities
pub struct CollectionConverter<C> {
    item: C,
}

impl<C> CollectionConverter<C> {
    pub fn new(item: C) -> Self {
        Self { item }
    }

    pub fn convert<T>(&self, response: Response) -> Result<Vec<T>, ConvertError>
    where
        C: Converter<T>,
        T: Send + Stampable,
    {
        let Response {
            content, culture, ..
        } = response;
        let mut items = convert_items(&self.item, content)?;
        if let Some(locale) = &culture {
            items.iter_mut().for_each(|item| item.set_locale(locale));
        }
        Ok(items)
    }
}

/// Response for `?page=..&page_size=..` requests
pub struct PageConverter<C> {
    item: C,
}

impl<C> PageConverter<C> {
    pub fn new(item: C) -> Self {
        Self { item }
    }

    pub fn convert<T>(&self, response: Response, page: usize) -> Result<PageCollection<T>, ConvertError>
    where
        C: Converter<T>,
        T: Send + Stampable,
    {
        let timestamp = response.timestamp();
        let headers = &response.extension_data;
        let mut collection = PageCollection {
            items: Vec::new(),
            page,
            page_size: headers.count(PAGE_SIZE_HEADER),
            page_count: headers.count(PAGE_TOTAL_HEADER),
            subtotal_count: headers.count(RESULT_COUNT_HEADER),
            total_count: headers.count(RESULT_TOTAL_HEADER),
        };
        let Response {
            content, culture, ..
        } = response;
        collection.items = convert_items(&self.item, content)?;
        for item in collection.items.iter_mut() {
            if let Some(locale) = &culture {
                item.set_locale(locale);
            }
            if let Some(timestamp) = timestamp {
                item.set_last_modified(timestamp);
            }
        }
        Ok(collection)
    }
}

/// Response for `?ids=..` requests, keyed by `key_selector`
pub struct DictionaryRangeConverter<C, F> {
    item: C,
    key_selector: F,
}

impl<C, F> DictionaryRangeConverter<C, F> {
    pub fn new(item: C, key_selector: F) -> Self {
        Self { item, key_selector }
    }

    /// The server promises unique ids. Should it ever send a duplicate, the first one is kept.
    pub fn convert<K, T>(&self, response: Response) -> Result<DictionaryRange<K, T>, ConvertError>
    where
        C: Converter<T>,
        F: Fn(&T) -> K,
        K: Hash + Eq,
        T: Send + Stampable,
    {
        let subtotal_count = response.extension_data.count(RESULT_COUNT_HEADER);
        let total_count = response.extension_data.count(RESULT_TOTAL_HEADER);
        let Response {
            content, culture, ..
        } = response;
        let converted = convert_items(&self.item, content)?;
        let mut items = IndexMap::with_capacity(converted.len());
        for mut item in converted {
            if let Some(locale) = &culture {
                item.set_locale(locale);
            }
            let key = (self.key_selector)(&item);
            if items.contains_key(&key) {
                debug!("duplicate key in dictionary range, keeping the first");
                continue;
            }
            items.insert(key, item);
        }
        Ok(DictionaryRange {
            items,
            subtotal_count,
            total_count,
        })
    }
}
