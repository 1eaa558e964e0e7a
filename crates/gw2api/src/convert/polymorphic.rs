use serde_json::{Map, Value};
use tracing::trace;

use super::discriminator::{resolve_discriminator, DiscriminatorSource, Location};
use super::error::json_kind;
use super::flatten::{flatten, strip_discriminator, Fragments, Rename};
use super::{ConvertError, Converter, Family};

/// A converter that reads whole objects of some variants on its own, bypassing the generic
/// flatten + populate path.
pub trait VariantReader<F: Family, T>: Send + Sync {
    fn can_read(&self, variant: F) -> bool;
    /// `object` no longer contains the discriminator
    fn read(&self, variant: F, object: Map<String, Value>) -> Result<T, ConvertError>;
}

/// builds the entity from the flattened fragments once the variant is known
pub type Populate<F, T> = fn(F, &Fragments) -> Result<T, ConvertError>;

/// Converts objects of one polymorphic [Family] into `T`.
///
/// 1. locate the discriminator as described by the [DiscriminatorSource]
/// 2. resolve it, unknown or malformed discriminators resolve to [Family::UNKNOWN]
/// 3. hand the object to the first registered [VariantReader] that can read the variant, or
/// 4. flatten it into [Fragments] and call the populate fn
pub struct PolymorphicConverter<F: Family, T> {
    source: DiscriminatorSource,
    renames: &'static [Rename],
    readers: Vec<Box<dyn VariantReader<F, T>>>,
    populate: Populate<F, T>,
}

impl<F: Family, T> PolymorphicConverter<F, T> {
    pub fn new(source: DiscriminatorSource, populate: Populate<F, T>) -> Self {
        Self {
            source,
            renames: &[],
            readers: vec![],
            populate,
        }
    }

    pub fn with_renames(mut self, renames: &'static [Rename]) -> Self {
        self.renames = renames;
        self
    }

    /// readers are asked in registration order
    pub fn with_reader(mut self, reader: impl VariantReader<F, T> + 'static) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    pub fn source(&self) -> &DiscriminatorSource {
        &self.source
    }

    pub fn convert_object(&self, object: Map<String, Value>) -> Result<T, ConvertError> {
        let extracted = self.source.extract(&object);
        let variant: F = resolve_discriminator(extracted.value);
        let (location, wrapper) = (extracted.location, extracted.wrapper);

        if let Some(reader) = self.readers.iter().find(|r| r.can_read(variant)) {
            trace!(
                family = F::NAME,
                variant = variant.discriminator(),
                "delegating to reader"
            );
            return reader.read(variant, strip_discriminator(&object, location));
        }
        let fragments = flatten(&object, location, wrapper, self.renames);
        (self.populate)(variant, &fragments)
    }
}

impl<F: Family, T> Converter<T> for PolymorphicConverter<F, T> {
    fn convert(&self, value: Value) -> Result<T, ConvertError> {
        match value {
            Value::Object(object) => self.convert_object(object),
            other => Err(ConvertError::NotAnObject {
                family: F::NAME,
                found: json_kind(&other),
            }),
        }
    }
}

/// Reads the variants of one outer family through the converter of a nested family.
///
/// eg: items of kind `Weapon` are read by the weapon converter, which resolves `Sword`, `Axe`..
pub struct NestedFamilyReader<Outer: Family, C> {
    variant: Outer,
    converter: C,
}

impl<Outer: Family, C> NestedFamilyReader<Outer, C> {
    pub fn new(variant: Outer, converter: C) -> Self {
        Self { variant, converter }
    }
}

impl<Outer, Inner, T> VariantReader<Outer, T> for NestedFamilyReader<Outer, &'static PolymorphicConverter<Inner, T>>
where
    Outer: Family,
    Inner: Family,
    T: 'static,
{
    fn can_read(&self, variant: Outer) -> bool {
        variant == self.variant
    }
    fn read(&self, _variant: Outer, object: Map<String, Value>) -> Result<T, ConvertError> {
        self.converter.convert_object(object)
    }
}

/// Reads variants whose details sit in a wrapper object but have no discriminator of their own.
/// The wrapper is flattened just like a polymorphic one.
pub struct WrapperReader<F: Family, T> {
    variant: F,
    wrappers: &'static [&'static str],
    populate: Populate<F, T>,
}

impl<F: Family, T> WrapperReader<F, T> {
    pub fn new(variant: F, wrappers: &'static [&'static str], populate: Populate<F, T>) -> Self {
        Self {
            variant,
            wrappers,
            populate,
        }
    }
}

impl<F: Family, T> VariantReader<F, T> for WrapperReader<F, T> {
    fn can_read(&self, variant: F) -> bool {
        variant == self.variant
    }
    fn read(&self, variant: F, object: Map<String, Value>) -> Result<T, ConvertError> {
        let source = DiscriminatorSource::wrapped("", self.wrappers);
        let wrapper = source.wrapper_of(&object);
        let fragments = flatten(&object, Location::Absent, wrapper, &[]);
        (self.populate)(variant, &fragments)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use serde::Deserialize;
    use serde_json::{json, Map, Value};
    use similar_asserts::assert_eq;
    use std::sync::OnceLock;

    use super::{PolymorphicConverter, VariantReader, WrapperReader};
    use crate::convert::registry::discriminator_family;
    use crate::convert::{ConvertError, Converter, DiscriminatorSource, Fragments};

    discriminator_family! {
        enum Pet in "pet" {
            Cat,
            Dog,
            Fish,
        }
    }

    #[derive(Debug, PartialEq, Deserialize, Default)]
    struct Animal {
        #[serde(skip)]
        kind: Pet,
        name: String,
        #[serde(default)]
        legs: u8,
        #[serde(skip)]
        read_by: &'static str,
    }

    fn populate(kind: Pet, fragments: &Fragments) -> Result<Animal, ConvertError> {
        let mut animal: Animal = fragments.populate("animal")?;
        animal.kind = kind;
        Ok(animal)
    }

    struct DogReader;
    impl VariantReader<Pet, Animal> for DogReader {
        fn can_read(&self, variant: Pet) -> bool {
            variant == Pet::Dog
        }
        fn read(&self, variant: Pet, object: Map<String, Value>) -> Result<Animal, ConvertError> {
            assert!(!object.contains_key("pet_type"));
            Ok(Animal {
                kind: variant,
                name: "dog reader".to_string(),
                legs: 4,
                read_by: "first",
            })
        }
    }
    struct SecondDogReader;
    impl VariantReader<Pet, Animal> for SecondDogReader {
        fn can_read(&self, variant: Pet) -> bool {
            matches!(variant, Pet::Dog | Pet::Unknown)
        }
        fn read(&self, variant: Pet, _: Map<String, Value>) -> Result<Animal, ConvertError> {
            Ok(Animal {
                kind: variant,
                read_by: "second",
                ..Default::default()
            })
        }
    }

    #[fixture]
    #[once]
    fn converter() -> PolymorphicConverter<Pet, Animal> {
        PolymorphicConverter::new(
            DiscriminatorSource::wrapped("pet_type", &["pet"]),
            populate,
        )
        .with_reader(DogReader)
        .with_reader(SecondDogReader)
    }

    #[rstest]
    fn generic_path_populates(converter: &PolymorphicConverter<Pet, Animal>) {
        let animal = converter
            .convert(json!({"name": "tom", "pet": {"type": "Cat", "legs": 4}}))
            .expect("failed to convert cat");
        assert_eq!(animal.kind, Pet::Cat);
        assert_eq!(animal.legs, 4);
    }

    #[rstest]
    fn first_capable_reader_wins(converter: &PolymorphicConverter<Pet, Animal>) {
        let dog = converter
            .convert(json!({"pet_type": "Dog", "name": "rex"}))
            .expect("failed to convert dog");
        assert_eq!(dog.read_by, "first");
        // the second reader also takes over unknown pets
        let unknown = converter
            .convert(json!({"pet_type": "Dragon", "name": "puff"}))
            .expect("failed to convert dragon");
        assert_eq!(unknown.kind, Pet::Unknown);
        assert_eq!(unknown.read_by, "second");
    }

    #[rstest]
    fn unknown_discriminator_still_binds_other_fields() {
        static PLAIN: OnceLock<PolymorphicConverter<Pet, Animal>> = OnceLock::new();
        let plain = PLAIN.get_or_init(|| {
            PolymorphicConverter::new(DiscriminatorSource::direct("pet_type"), populate)
        });
        let animal = plain
            .convert(json!({"pet_type": {"nested": "garbage"}, "name": "nemo", "legs": 0}))
            .expect("malformed discriminator must not fail");
        assert_eq!(
            animal,
            Animal {
                kind: Pet::Unknown,
                name: "nemo".to_string(),
                legs: 0,
                read_by: ""
            }
        );
    }

    #[rstest]
    fn non_object_is_an_error(converter: &PolymorphicConverter<Pet, Animal>) {
        assert!(matches!(
            converter.convert(json!([1, 2, 3])),
            Err(ConvertError::NotAnObject {
                family: "pet",
                found: "array"
            })
        ));
    }

    #[rstest]
    fn wrapper_reader_flattens_without_discriminator() {
        let reader = WrapperReader::new(Pet::Fish, &["pet", "details"], populate);
        let object = json!({"name": "wanda", "details": {"legs": 0, "name": "ignored"}});
        let fish = reader
            .read(Pet::Fish, object.as_object().cloned().expect("object payload"))
            .expect("failed to read fish");
        assert_eq!(fish.name, "wanda");
        assert_eq!(fish.kind, Pet::Fish);
    }
}
