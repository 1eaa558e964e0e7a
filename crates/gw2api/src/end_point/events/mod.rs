//! Dynamic events, v1 only. `/v1/event_details.json` keys events by their id and describes
//! where they happen with a polymorphic `location`.
use std::sync::OnceLock;

use crate::convert::error::json_kind;
use crate::convert::registry::discriminator_family;
use crate::convert::{DiscriminatorSource, Fragments, JsonConverter, PolymorphicConverter};
use crate::de;
use crate::prelude::*;

/// a guid like `EED8A79F-B374-4AE6-BA6F-B7B98D9D7142`
pub type EventId = String;

discriminator_family! {
    pub enum LocationKind in "event location" {
        Sphere = "sphere",
        Cylinder = "cylinder",
        Poly = "poly",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sphere {
    #[serde(default, deserialize_with = "de::null_default")]
    pub center: [f64; 3],
    #[serde(default, deserialize_with = "de::null_default")]
    pub radius: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub rotation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Cylinder {
    #[serde(default, deserialize_with = "de::null_default")]
    pub center: [f64; 3],
    #[serde(default, deserialize_with = "de::null_default")]
    pub height: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub radius: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub rotation: f64,
}

/// a prism: polygon on the xy plane, extruded along z
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Poly {
    #[serde(default, deserialize_with = "de::null_default")]
    pub center: [f64; 3],
    #[serde(default, deserialize_with = "de::null_default")]
    pub z_range: [f64; 2],
    #[serde(default, deserialize_with = "de::null_default")]
    pub points: Vec<[f64; 2]>,
}

/// map coordinates of the area an event takes place in
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventLocation {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Poly(Poly),
    #[default]
    Unknown,
}

fn populate_location(kind: LocationKind, fragments: &Fragments) -> Result<EventLocation, ConvertError> {
    Ok(match kind {
        LocationKind::Sphere => EventLocation::Sphere(fragments.populate("Sphere")?),
        LocationKind::Cylinder => EventLocation::Cylinder(fragments.populate("Cylinder")?),
        LocationKind::Poly => EventLocation::Poly(fragments.populate("Poly")?),
        LocationKind::Unknown => EventLocation::Unknown,
    })
}

pub fn location_converter() -> &'static PolymorphicConverter<LocationKind, EventLocation> {
    static CONVERTER: OnceLock<PolymorphicConverter<LocationKind, EventLocation>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(DiscriminatorSource::direct("type"), populate_location)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventDetails {
    /// the key of the event in the response
    #[serde(default, deserialize_with = "de::null_default")]
    pub id: EventId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::lenient")]
    pub level: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub map_id: u32,
    /// `group_event`, `map_wide`
    #[serde(default, deserialize_with = "de::string_list")]
    pub flags: Vec<String>,
    #[serde(skip)]
    pub location: EventLocation,
    #[serde(skip)]
    pub locale: Option<Locale>,
}

impl Stampable for EventDetails {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
}

/// binds the event structurally and its location through [location_converter]
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDetailsConverter;

impl Converter<EventDetails> for EventDetailsConverter {
    fn convert(&self, value: Value) -> Result<EventDetails, ConvertError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ConvertError::NotAnObject {
                    family: "event",
                    found: json_kind(&other),
                })
            }
        };
        let location = match object.remove("location") {
            Some(Value::Object(location)) => location_converter().convert_object(location)?,
            _ => EventLocation::Unknown,
        };
        let mut event: EventDetails = JsonConverter::new().convert(Value::Object(object))?;
        event.location = location;
        Ok(event)
    }
}
