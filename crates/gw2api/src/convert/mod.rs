//! Json -> entity conversion.
//!
//! Plain entities go through [JsonConverter]. Polymorphic ones go through a
//! [PolymorphicConverter], which is assembled from the pieces in the submodules:
//! [registry] (which discriminators exist), [discriminator] (where they are and what they
//! resolve to), [flatten] (reshaping the raw object) and [populate] (binding the result).
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod discriminator;
pub(crate) mod error;
pub mod flatten;
pub mod polymorphic;
pub mod populate;
pub mod registry;

pub use discriminator::{
    resolve_discriminator, try_parse_discriminator, DiscriminatorSource, Location,
};
pub use error::{ConvertError, RegistryError};
pub use flatten::{flatten, Fragments, Rename, INFIX_UPGRADE};
pub use polymorphic::{
    NestedFamilyReader, Populate, PolymorphicConverter, VariantReader, WrapperReader,
};
pub use populate::InfixUpgradeTarget;
pub use registry::{Family, TypeRegistry};

/// Turns one json value into a `T`.
/// Implementations hold no per-call state, so one instance can be shared across threads.
pub trait Converter<T>: Send + Sync {
    fn convert(&self, value: Value) -> Result<T, ConvertError>;
}

impl<T, C: Converter<T> + ?Sized> Converter<T> for &C {
    fn convert(&self, value: Value) -> Result<T, ConvertError> {
        (**self).convert(value)
    }
}

/// structural by-name binding through serde
pub struct JsonConverter<T>(PhantomData<fn() -> T>);
impl<T> JsonConverter<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Converter<T> for JsonConverter<T> {
    fn convert(&self, value: Value) -> Result<T, ConvertError> {
        serde_json::from_value(value).map_err(|source| ConvertError::Deserialize {
            entity: std::any::type_name::<T>(),
            source,
        })
    }
}
