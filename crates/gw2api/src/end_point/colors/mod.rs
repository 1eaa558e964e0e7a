use crate::de;
use crate::end_point::items::ItemId;
use crate::end_point::plain_end_point;
use crate::prelude::*;

pub type ColorId = u32;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/colors");

/// how a dye looks on one material
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColorMaterial {
    #[serde(default, deserialize_with = "de::null_default")]
    pub brightness: i32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub contrast: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub hue: i32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub saturation: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub lightness: f64,
    #[serde(default, deserialize_with = "de::null_default")]
    pub rgb: [u8; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Color {
    #[serde(default, deserialize_with = "de::lenient")]
    pub id: ColorId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub base_rgb: [u8; 3],
    #[serde(default)]
    pub cloth: Option<ColorMaterial>,
    #[serde(default)]
    pub leather: Option<ColorMaterial>,
    #[serde(default)]
    pub metal: Option<ColorMaterial>,
    #[serde(default)]
    pub fur: Option<ColorMaterial>,
    /// the dye item unlocking this color
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub item: Option<ItemId>,
    /// hue, material and rarity. eg: `["Gray", "Metal", "Starter"]`
    #[serde(default, deserialize_with = "de::string_list")]
    pub categories: Vec<String>,
    #[serde(skip)]
    pub locale: Option<Locale>,
}

impl Stampable for Color {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
}

plain_end_point!(Colors, Color, ColorId, E_P_URL, localized: true);
