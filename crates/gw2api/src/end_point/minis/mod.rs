use crate::de;
use crate::end_point::items::ItemId;
use crate::end_point::plain_end_point;
use crate::prelude::*;

pub type MiniId = u32;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/minis");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Mini {
    #[serde(default, deserialize_with = "de::lenient")]
    pub id: MiniId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    /// how to unlock it, when it isn't obvious
    #[serde(default)]
    pub unlock: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon: Option<Url>,
    /// sort order in the collection ui
    #[serde(default, deserialize_with = "de::lenient")]
    pub order: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub item_id: ItemId,
    #[serde(skip)]
    pub locale: Option<Locale>,
}

impl Stampable for Mini {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
}

plain_end_point!(Minis, Mini, MiniId, E_P_URL, localized: true);
