//! One module per endpoint. Each declares its entity, how to convert it and where it lives.
//! [Repository] does the requests that every bulk endpoint supports.
//!
//! for already great implementations look at
//! 1. https://github.com/GW2ToolBelt/GW2APIClient
//! 2. https://github.com/greaka/gw2lib
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;

use gw2_core::config::MAX_PAGE_SIZE;
use itertools::Itertools;
use serde::de::DeserializeOwned;

use crate::client::{ApiError, Gw2Client, Request, Transport};
use crate::convert::{RegistryError, TypeRegistry};
use crate::envelope::{
    DictionaryRange, DictionaryRangeConverter, PageCollection, PageConverter, Response,
    SingleConverter,
};
use crate::prelude::*;

pub mod build;
pub mod colors;
pub mod events;
pub mod files;
pub mod items;
pub mod minis;
pub mod quaggans;
pub mod recipes;
pub mod skins;
pub mod v1;
pub mod worlds;

fn init_family<F: Family>() -> Result<(), RegistryError> {
    let registry = TypeRegistry::<F>::for_family()?;
    debug!(family = F::NAME, variants = registry.len(), "registry built");
    F::registry();
    Ok(())
}

/// Builds the registry of every built-in family.
/// Call this once at startup so a duplicate discriminator shows up there instead of on the
/// first request that happens to convert that family.
pub fn init_registries() -> Result<(), RegistryError> {
    use items::*;
    init_family::<ItemKind>()?;
    init_family::<WeaponKind>()?;
    init_family::<ArmorKind>()?;
    init_family::<ConsumableKind>()?;
    init_family::<ContainerKind>()?;
    init_family::<GatheringToolKind>()?;
    init_family::<GizmoKind>()?;
    init_family::<ToolKind>()?;
    init_family::<TrinketKind>()?;
    init_family::<UpgradeComponentKind>()?;
    init_family::<recipes::RecipeKind>()?;
    init_family::<skins::SkinKind>()?;
    init_family::<events::LocationKind>()?;
    Ok(())
}

/// A v2 bulk endpoint. eg: `/v2/items`
pub trait EndPoint {
    type Id: Display + Clone + Eq + Hash + Send + DeserializeOwned;
    type Entity: Default + Send + Stampable;
    type Converter: Converter<Self::Entity> + 'static;
    /// relative to the base url
    const URL: &'static str;
    /// whether the endpoint understands `lang`
    const LOCALIZED: bool;
    fn converter() -> &'static Self::Converter;
    /// key of the entity inside a [DictionaryRange]
    fn id(entity: &Self::Entity) -> Self::Id;
}

/// Requests against one [EndPoint]
pub struct Repository<'c, E, T> {
    client: &'c Gw2Client<T>,
    locale: Option<Locale>,
    end_point: PhantomData<E>,
}

impl<'c, E: EndPoint, T: Transport> Repository<'c, E, T> {
    pub fn new(client: &'c Gw2Client<T>) -> Self {
        Self {
            locale: client.locale(),
            client,
            end_point: PhantomData,
        }
    }

    /// overrides the locale of the client for this repository
    pub fn with_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    fn request(&self) -> Request {
        let request = Request::new(E::URL);
        match (&self.locale, E::LOCALIZED) {
            (Some(locale), true) => request.query("lang", locale),
            _ => request,
        }
    }

    fn range(&self, request: Request) -> Result<DictionaryRange<E::Id, E::Entity>, ApiError> {
        let response = self.client.send(&request)?;
        Ok(DictionaryRangeConverter::new(E::converter(), E::id).convert(response)?)
    }

    /// every id the endpoint knows about
    pub fn discover(&self) -> Result<Vec<E::Id>, ApiError> {
        let response = self.client.send(&Request::new(E::URL))?;
        Ok(ids_of(response)?)
    }

    pub fn find(&self, id: &E::Id) -> Result<E::Entity, ApiError> {
        let response = self.client.send(&self.request().query("id", id))?;
        Ok(SingleConverter::new(E::converter()).convert(response)?)
    }

    /// `ids=all`. only some endpoints allow this, the others answer with an error status
    pub fn find_all(&self) -> Result<DictionaryRange<E::Id, E::Entity>, ApiError> {
        self.range(self.request().query("ids", "all"))
    }

    /// Requests in batches of [MAX_PAGE_SIZE] ids and merges the results.
    pub fn find_all_by_ids(
        &self,
        ids: &[E::Id],
    ) -> Result<DictionaryRange<E::Id, E::Entity>, ApiError> {
        let mut merged = DictionaryRange::default();
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let range = self.range(self.request().query("ids", chunk.iter().join(",")))?;
            merged.merge(range);
        }
        Ok(merged)
    }

    /// zero based page with the configured page size
    pub fn find_page(&self, page: usize) -> Result<PageCollection<E::Entity>, ApiError> {
        self.find_page_sized(page, self.client.config().page_size)
    }

    /// `page_size` is clamped to what the server accepts
    pub fn find_page_sized(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<PageCollection<E::Entity>, ApiError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let request = self
            .request()
            .query("page", page)
            .query("page_size", page_size);
        let response = self.client.send(&request)?;
        Ok(PageConverter::new(E::converter()).convert(response, page)?)
    }
}

/// an array of ids, or nothing
pub(crate) fn ids_of<Id: DeserializeOwned>(response: Response) -> Result<Vec<Id>, ConvertError> {
    match response.content {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(content) => serde_json::from_value(content).map_err(|source| {
            ConvertError::Deserialize {
                entity: "ids",
                source,
            }
        }),
    }
}

/// Declares a v2 endpoint whose entity is decoded structurally
macro_rules! plain_end_point {
    (
        $end_point:ident, $entity:ty, $id:ty, $url:expr, localized: $localized:literal
    ) => {
        pub struct $end_point;

        impl $crate::end_point::EndPoint for $end_point {
            type Id = $id;
            type Entity = $entity;
            type Converter = $crate::convert::JsonConverter<$entity>;
            const URL: &'static str = $url;
            const LOCALIZED: bool = $localized;
            fn converter() -> &'static Self::Converter {
                static CONVERTER: $crate::convert::JsonConverter<$entity> =
                    $crate::convert::JsonConverter::new();
                &CONVERTER
            }
            fn id(entity: &$entity) -> $id {
                entity.id.clone()
            }
        }
    };
}
pub(crate) use plain_end_point;
