//! The v1 services. They answer one entity per request, use `.json` paths and wrap lists in an
//! object (`{"items": [..]}`, `{"events": {"<id>": {..}}}`).
//!
//! The entities are the same as in v2, the converters understand both shapes.
use crate::client::{ApiError, Gw2Client, Request, Transport};
use crate::convert::JsonConverter;
use crate::de;
use crate::end_point::events::{EventDetails, EventDetailsConverter, EventId};
use crate::end_point::files::File;
use crate::end_point::ids_of;
use crate::end_point::items::{item_converter, Item, ItemId, SkinId};
use crate::end_point::recipes::{recipe_converter, Recipe, RecipeId};
use crate::end_point::skins::{skin_converter, Skin};
use crate::envelope::{
    CollectionConverter, DictionaryRange, DictionaryRangeConverter, SingleConverter,
};
use crate::prelude::*;

macro_rules! v1_url {
    ($path:literal) => {
        const_format::concatcp!(API_V1_PATH, "/", $path)
    };
}

/// Entry of the `*_names.json` services
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Name {
    /// v1 sends ids as strings
    #[serde(default, deserialize_with = "de::null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(skip)]
    pub locale: Option<Locale>,
}

impl Stampable for Name {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
}

/// `{"<key>": {..}, ..}` into `[{"id": "<key>", ..}, ..]`, optionally unwrapping `wrapper` first.
/// An `id` already in the object is kept.
pub(crate) fn keyed_to_array(content: Value, wrapper: Option<&str>) -> Option<Value> {
    let content = match (wrapper, content) {
        (Some(wrapper), Value::Object(mut object)) => object.remove(wrapper)?,
        (_, content) => content,
    };
    let Value::Object(keyed) = content else {
        return None;
    };
    let items = keyed
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Object(mut object) => {
                object.entry("id").or_insert(Value::String(key));
                Some(Value::Object(object))
            }
            _ => None,
        })
        .collect();
    Some(Value::Array(items))
}

/// v1 services of a [Gw2Client]
pub struct V1Services<'c, T> {
    client: &'c Gw2Client<T>,
    locale: Option<Locale>,
}

impl<T: Transport> Gw2Client<T> {
    pub fn v1(&self) -> V1Services<'_, T> {
        V1Services {
            locale: self.locale(),
            client: self,
        }
    }
}

impl<'c, T: Transport> V1Services<'c, T> {
    pub fn with_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    fn localized(&self, request: Request) -> Request {
        match &self.locale {
            Some(locale) => request.query("lang", locale),
            None => request,
        }
    }

    fn ids<Id: serde::de::DeserializeOwned>(&self, url: &str, wrapper: &str) -> Result<Vec<Id>, ApiError> {
        let response = self.client.send(&Request::new(url))?;
        let response = response.map_content(|mut content| content.get_mut(wrapper).map(Value::take));
        Ok(ids_of(response)?)
    }

    pub fn item_ids(&self) -> Result<Vec<ItemId>, ApiError> {
        self.ids(v1_url!("items.json"), "items")
    }

    pub fn recipe_ids(&self) -> Result<Vec<RecipeId>, ApiError> {
        self.ids(v1_url!("recipes.json"), "recipes")
    }

    pub fn skin_ids(&self) -> Result<Vec<SkinId>, ApiError> {
        self.ids(v1_url!("skins.json"), "skins")
    }

    pub fn item_details(&self, id: ItemId) -> Result<Item, ApiError> {
        let request = Request::new(v1_url!("item_details.json")).query("item_id", id);
        let response = self.client.send(&self.localized(request))?;
        Ok(SingleConverter::new(item_converter()).convert(response)?)
    }

    pub fn recipe_details(&self, id: RecipeId) -> Result<Recipe, ApiError> {
        let request = Request::new(v1_url!("recipe_details.json")).query("recipe_id", id);
        let response = self.client.send(&self.localized(request))?;
        Ok(SingleConverter::new(recipe_converter()).convert(response)?)
    }

    pub fn skin_details(&self, id: SkinId) -> Result<Skin, ApiError> {
        let request = Request::new(v1_url!("skin_details.json")).query("skin_id", id);
        let response = self.client.send(&self.localized(request))?;
        Ok(SingleConverter::new(skin_converter()).convert(response)?)
    }

    /// all events, or just the one with `event_id`
    pub fn event_details(
        &self,
        event_id: Option<&str>,
    ) -> Result<DictionaryRange<EventId, EventDetails>, ApiError> {
        let mut request = Request::new(v1_url!("event_details.json"));
        if let Some(event_id) = event_id {
            request = request.query("event_id", event_id);
        }
        let response = self.client.send(&self.localized(request))?;
        let response = response.map_content(|content| keyed_to_array(content, Some("events")));
        Ok(
            DictionaryRangeConverter::new(EventDetailsConverter, |event: &EventDetails| {
                event.id.clone()
            })
            .convert(response)?,
        )
    }

    /// files keyed by their name. eg: `map_complete`
    pub fn files(&self) -> Result<DictionaryRange<String, File>, ApiError> {
        let response = self.client.send(&Request::new(v1_url!("files.json")))?;
        let response = response.map_content(|content| keyed_to_array(content, None));
        Ok(
            DictionaryRangeConverter::new(JsonConverter::<File>::new(), |file: &File| {
                file.id.clone()
            })
            .convert(response)?,
        )
    }

    fn names(&self, url: &str) -> Result<Vec<Name>, ApiError> {
        let response = self.client.send(&self.localized(Request::new(url)))?;
        Ok(CollectionConverter::new(JsonConverter::<Name>::new()).convert(response)?)
    }

    pub fn world_names(&self) -> Result<Vec<Name>, ApiError> {
        self.names(v1_url!("world_names.json"))
    }

    pub fn map_names(&self) -> Result<Vec<Name>, ApiError> {
        self.names(v1_url!("map_names.json"))
    }

    pub fn event_names(&self) -> Result<Vec<Name>, ApiError> {
        self.names(v1_url!("event_names.json"))
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::keyed_to_array;

    #[rstest]
    fn events_are_keyed_by_id() {
        let content = json!({"events": {
            "A": {"name": "first"},
            "B": {"name": "second", "id": "kept"},
            "C": "not an object"
        }});
        assert_eq!(
            keyed_to_array(content, Some("events")),
            Some(json!([
                {"name": "first", "id": "A"},
                {"name": "second", "id": "kept"}
            ]))
        );
    }

    #[rstest]
    #[case(json!({"other": {}}), Some("events"))]
    #[case(json!([1, 2]), None)]
    fn nothing_keyed(#[case] content: serde_json::Value, #[case] wrapper: Option<&str>) {
        assert_eq!(keyed_to_array(content, wrapper), None);
    }
}
