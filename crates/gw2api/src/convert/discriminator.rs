use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::Family;

/// the property holding the discriminator inside a wrapper object
pub const NESTED_DISCRIMINATOR: &str = "type";

/// Where a family keeps its discriminator.
///
/// Either directly on the object (`weapon_type`), or as the `type` of a wrapper object named after
/// the family (`weapon: {type: "Sword"}` in v1, `details: {type: "Sword"}` in v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscriminatorSource {
    pub direct: &'static str,
    /// tried in order. the first key holding an object is the wrapper
    pub wrappers: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Direct(&'static str),
    Nested(&'static str),
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extracted<'a> {
    pub value: Option<&'a Value>,
    pub location: Location,
    /// a wrapper object exists even when the discriminator was found directly
    pub wrapper: Option<&'static str>,
}

impl DiscriminatorSource {
    pub const fn direct(direct: &'static str) -> Self {
        Self {
            direct,
            wrappers: &[],
        }
    }

    pub const fn wrapped(direct: &'static str, wrappers: &'static [&'static str]) -> Self {
        Self { direct, wrappers }
    }

    pub fn wrapper_of(&self, object: &Map<String, Value>) -> Option<&'static str> {
        self.wrappers
            .iter()
            .copied()
            .find(|key| object.get(*key).map_or(false, Value::is_object))
    }

    pub fn extract<'a>(&self, object: &'a Map<String, Value>) -> Extracted<'a> {
        let wrapper = self.wrapper_of(object);
        if let Some(value) = object.get(self.direct).filter(|v| !v.is_null()) {
            return Extracted {
                value: Some(value),
                location: Location::Direct(self.direct),
                wrapper,
            };
        }
        if let Some(key) = wrapper {
            if let Some(value) = object
                .get(key)
                .and_then(|w| w.get(NESTED_DISCRIMINATOR))
                .filter(|v| !v.is_null())
            {
                return Extracted {
                    value: Some(value),
                    location: Location::Nested(key),
                    wrapper,
                };
            }
        }
        Extracted {
            value: None,
            location: Location::Absent,
            wrapper,
        }
    }
}

/// Exact match first, then a case insensitive one.
/// Anything that isn't a string (or doesn't match) is None.
pub fn try_parse_discriminator<F: Family>(value: &Value) -> Option<F> {
    let raw = value.as_str()?;
    let registry = F::registry();
    registry.resolve(raw).or_else(|| {
        let variant = registry.resolve_ignore_ascii_case(raw.trim());
        if let Some(variant) = variant {
            trace!(
                family = F::NAME,
                discriminator = raw,
                resolved = variant.discriminator(),
                "discriminator matched ignoring case"
            );
        }
        variant
    })
}

/// Like [try_parse_discriminator], but falls back to [Family::UNKNOWN]. Never fails.
pub fn resolve_discriminator<F: Family>(value: Option<&Value>) -> F {
    match value {
        Some(value) => try_parse_discriminator(value).unwrap_or_else(|| {
            debug!(
                family = F::NAME,
                discriminator = %value,
                "unknown discriminator"
            );
            F::UNKNOWN
        }),
        None => {
            debug!(family = F::NAME, "missing discriminator");
            F::UNKNOWN
        }
    }
}
