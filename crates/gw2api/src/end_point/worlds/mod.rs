use crate::de;
use crate::end_point::plain_end_point;
use crate::prelude::*;

pub type WorldId = u32;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/worlds");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct World {
    #[serde(default, deserialize_with = "de::lenient")]
    pub id: WorldId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    /// `Low`, `Medium`, `High`, `VeryHigh` or `Full`
    #[serde(default, deserialize_with = "de::null_default")]
    pub population: String,
    #[serde(skip)]
    pub locale: Option<Locale>,
}

impl Stampable for World {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
}

plain_end_point!(Worlds, World, WorldId, E_P_URL, localized: true);
