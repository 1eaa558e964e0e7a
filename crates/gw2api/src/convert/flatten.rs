//! Reshaping of raw objects before they get populated.
//!
//! Every function here takes the raw object by reference and builds new maps, so the caller's copy
//! is never touched.
use serde_json::{Map, Value};

use super::discriminator::{Location, NESTED_DISCRIMINATOR};

/// stat bonuses shared by weapons, armor, trinkets, backpacks and upgrade components
pub const INFIX_UPGRADE: &str = "infix_upgrade";

/// A property of the wrapper object that must be renamed before merging, because the outer
/// object has an unrelated property with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub from: &'static str,
    pub to: &'static str,
}

/// The pieces a raw object is split into.
/// `base` is populated first, `infix_upgrade` is layered on top of the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragments {
    pub base: Map<String, Value>,
    pub infix_upgrade: Option<Map<String, Value>>,
}

/// copy of `object` without the discriminator found at `location`
pub fn strip_discriminator(object: &Map<String, Value>, location: Location) -> Map<String, Value> {
    let mut stripped = object.clone();
    match location {
        Location::Direct(key) => {
            stripped.remove(key);
        }
        Location::Nested(wrapper) => {
            if let Some(Value::Object(wrapper)) = stripped.get_mut(wrapper) {
                wrapper.remove(NESTED_DISCRIMINATOR);
            }
        }
        Location::Absent => {}
    }
    stripped
}

/// Splits `object` into [Fragments].
///
/// - the discriminator at `location` is dropped.
/// - when `wrapper` names a nested object, its fields (minus its own `type`) are merged into the
///   outer fields. Outer fields win on collision, `renames` are applied to the wrapper first.
/// - an `infix_upgrade` object is detached from the wrapper (or the outer object when the wrapper
///   has none) into its own fragment.
pub fn flatten(
    object: &Map<String, Value>,
    location: Location,
    wrapper: Option<&str>,
    renames: &[Rename],
) -> Fragments {
    let mut base = strip_discriminator(object, location);
    let nested = wrapper.and_then(|key| match base.remove(key) {
        Some(Value::Object(nested)) => Some(nested),
        Some(other) => {
            // not a wrapper after all, put it back untouched
            base.insert(key.to_string(), other);
            None
        }
        None => None,
    });
    let mut infix_upgrade = take_object(&mut base, INFIX_UPGRADE);

    if let Some(mut nested) = nested {
        nested.remove(NESTED_DISCRIMINATOR);
        if let Some(infix) = take_object(&mut nested, INFIX_UPGRADE) {
            infix_upgrade = Some(infix);
        }
        for rename in renames {
            if let Some(value) = nested.remove(rename.from) {
                nested.insert(rename.to.to_string(), value);
            }
        }
        for (key, value) in nested {
            base.entry(key).or_insert(value);
        }
    }
    Fragments {
        base,
        infix_upgrade,
    }
}

fn take_object(object: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match object.remove(key)? {
        Value::Object(inner) => Some(inner),
        // `null` or garbage. there is nothing to layer
        _ => None,
    }
}
