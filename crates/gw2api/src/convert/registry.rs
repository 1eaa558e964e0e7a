use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::RegistryError;

/// A closed set of shapes a polymorphic payload can take, plus one `Unknown` shape for
/// discriminators this crate doesn't know about yet.
///
/// Implemented through [discriminator_family] rather than by hand.
pub trait Family: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// used in diagnostics. eg: `weapon`
    const NAME: &'static str;
    const UNKNOWN: Self;
    /// every variant except [Self::UNKNOWN]
    fn known() -> &'static [Self];
    fn discriminator(self) -> &'static str;
    /// built on first use and never modified afterwards
    fn registry() -> &'static TypeRegistry<Self>;
}

/// discriminator string -> variant lookup for one family
#[derive(Debug, Clone)]
pub struct TypeRegistry<V> {
    family: &'static str,
    exact: HashMap<&'static str, V>,
    folded: HashMap<String, V>,
}

impl<V: Copy> TypeRegistry<V> {
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            exact: HashMap::new(),
            folded: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        discriminator: &'static str,
        variant: V,
    ) -> Result<(), RegistryError> {
        if self.exact.contains_key(discriminator) {
            return Err(RegistryError::DuplicateDiscriminator {
                family: self.family,
                discriminator: discriminator.to_string(),
            });
        }
        self.exact.insert(discriminator, variant);
        // first registration wins when two discriminators only differ by case
        self.folded
            .entry(discriminator.to_ascii_lowercase())
            .or_insert(variant);
        Ok(())
    }

    pub fn from_entries(
        family: &'static str,
        entries: impl IntoIterator<Item = (&'static str, V)>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(family);
        for (discriminator, variant) in entries {
            registry.register(discriminator, variant)?;
        }
        Ok(registry)
    }

    /// exact, case sensitive match
    pub fn resolve(&self, discriminator: &str) -> Option<V> {
        self.exact.get(discriminator).copied()
    }

    /// compatibility path for discriminators the server spells differently than documented
    pub fn resolve_ignore_ascii_case(&self, discriminator: &str) -> Option<V> {
        self.folded
            .get(&discriminator.to_ascii_lowercase())
            .copied()
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl<F: Family> TypeRegistry<F> {
    pub fn for_family() -> Result<Self, RegistryError> {
        Self::from_entries(
            F::NAME,
            F::known().iter().map(|variant| (variant.discriminator(), *variant)),
        )
    }

    /// Used by the lazily built statics of [discriminator_family].
    /// A duplicate there is a bug in this crate, so we crash on first use.
    pub fn for_family_or_panic() -> Self {
        match Self::for_family() {
            Ok(registry) => registry,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Declares a [Family] enum.
///
/// The discriminator of a variant is its name, unless a literal is given.
/// ```ignore
/// discriminator_family! {
///     pub enum WeaponKind in "weapon" {
///         Sword,
///         LongBow = "LongBow",
///     }
/// }
/// ```
/// An `Unknown` variant is always added and is the [Default].
macro_rules! discriminator_family {
    (@disc $variant:ident) => {
        stringify!($variant)
    };
    (@disc $variant:ident $disc:literal) => {
        $disc
    };
    (
        $( #[$attr:meta] )*
        $vis:vis enum $name:ident in $family:literal {
            $( $( #[$variant_attr:meta] )* $variant:ident $( = $disc:literal )? ),+ $(,)?
        }
    ) => {
        $( #[$attr] )*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $( $( #[$variant_attr] )* $variant, )+
            /// discriminator not known to this version of the crate
            #[default]
            Unknown,
        }
        impl $crate::convert::Family for $name {
            const NAME: &'static str = $family;
            const UNKNOWN: Self = Self::Unknown;
            fn known() -> &'static [Self] {
                &[$( Self::$variant ),+]
            }
            fn discriminator(self) -> &'static str {
                match self {
                    $( Self::$variant => $crate::convert::registry::discriminator_family!(@disc $variant $( $disc )?), )+
                    Self::Unknown => "Unknown",
                }
            }
            fn registry() -> &'static $crate::convert::TypeRegistry<Self> {
                static REGISTRY: std::sync::OnceLock<$crate::convert::TypeRegistry<$name>> =
                    std::sync::OnceLock::new();
                REGISTRY.get_or_init($crate::convert::TypeRegistry::for_family_or_panic)
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::convert::Family::discriminator(*self))
            }
        }
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::convert::Family::discriminator(*self))
            }
        }
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                Ok($crate::convert::resolve_discriminator::<Self>(Some(&value)))
            }
        }
    };
}
pub(crate) use discriminator_family;

#[cfg(test)]
mod test {
    use rstest::*;
    use similar_asserts::assert_eq;

    use super::{Family, TypeRegistry};
    use crate::convert::RegistryError;

    discriminator_family! {
        enum Shape in "shape" {
            Circle,
            Square,
            Triangle = "Tri",
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Broken {
        A,
        B,
    }

    #[rstest]
    fn registry_resolves_declared_discriminators() {
        let registry = Shape::registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.resolve("Circle"), Some(Shape::Circle));
        assert_eq!(registry.resolve("Tri"), Some(Shape::Triangle));
        assert_eq!(registry.resolve("Triangle"), None);
        assert_eq!(registry.resolve("circle"), None);
        assert_eq!(registry.resolve_ignore_ascii_case("circle"), Some(Shape::Circle));
        assert_eq!(registry.resolve("Unknown"), None);
    }

    #[rstest]
    fn duplicate_discriminator_fails_construction() {
        let result = TypeRegistry::from_entries("broken", [("Same", Broken::A), ("Same", Broken::B)]);
        assert_eq!(
            result.map(|r| r.len()),
            Err(RegistryError::DuplicateDiscriminator {
                family: "broken",
                discriminator: "Same".to_string()
            })
        );
    }

    #[rstest]
    fn register_does_not_overwrite() {
        let mut registry = TypeRegistry::new("broken");
        registry.register("Same", Broken::A).expect("first registration");
        assert!(registry.register("Same", Broken::B).is_err());
        assert_eq!(registry.resolve("Same"), Some(Broken::A));
    }

    #[rstest]
    #[case(Shape::Circle, "Circle")]
    #[case(Shape::Triangle, "Tri")]
    #[case(Shape::Unknown, "Unknown")]
    fn display_uses_discriminator(#[case] shape: Shape, #[case] expected: &str) {
        assert_eq!(shape.to_string(), expected);
        assert_eq!(
            serde_json::to_value(shape).expect("failed to serialize"),
            serde_json::Value::from(expected)
        );
    }
}
