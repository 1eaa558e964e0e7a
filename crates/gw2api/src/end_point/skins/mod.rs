use std::sync::OnceLock;

use crate::convert::registry::discriminator_family;
use crate::convert::{DiscriminatorSource, Fragments, NestedFamilyReader, PolymorphicConverter};
use crate::de;
use crate::end_point::items::{ArmorKind, GatheringToolKind, Rarity, SkinId, WeaponKind};
use crate::end_point::EndPoint;
use crate::prelude::*;

const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/skins");

discriminator_family! {
    pub enum SkinKind in "skin" {
        Armor,
        Back,
        Gathering,
        Weapon,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArmorSkin {
    #[serde(skip)]
    pub kind: ArmorKind,
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight_class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeaponSkin {
    #[serde(skip)]
    pub kind: WeaponKind,
    #[serde(default)]
    pub damage_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatheringSkin {
    #[serde(skip)]
    pub kind: GatheringToolKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SkinDetails {
    Armor(ArmorSkin),
    Back,
    Gathering(GatheringSkin),
    Weapon(WeaponSkin),
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Skin {
    #[serde(default, alias = "skin_id", deserialize_with = "de::lenient")]
    pub id: SkinId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(skip)]
    pub kind: SkinKind,
    #[serde(default, deserialize_with = "de::string_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon: Option<Url>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon_file_id: Option<u32>,
    #[serde(default)]
    pub icon_file_signature: Option<String>,
    #[serde(skip)]
    pub details: SkinDetails,
    #[serde(skip)]
    pub locale: Option<Locale>,
    #[serde(skip)]
    pub last_modified: Option<OffsetDateTime>,
}

impl Stampable for Skin {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
    fn set_last_modified(&mut self, timestamp: OffsetDateTime) {
        self.last_modified = Some(timestamp);
    }
}

fn skin_with(fragments: &Fragments, kind: SkinKind, details: SkinDetails) -> Result<Skin, ConvertError> {
    let mut skin: Skin = fragments.populate("skin")?;
    skin.kind = kind;
    skin.details = details;
    Ok(skin)
}

fn populate_skin(kind: SkinKind, fragments: &Fragments) -> Result<Skin, ConvertError> {
    let details = match kind {
        SkinKind::Back => SkinDetails::Back,
        _ => SkinDetails::Unknown,
    };
    skin_with(fragments, kind, details)
}

fn armor_skin_converter() -> &'static PolymorphicConverter<ArmorKind, Skin> {
    static CONVERTER: OnceLock<PolymorphicConverter<ArmorKind, Skin>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(
            DiscriminatorSource::wrapped("armor_type", &["armor", "details"]),
            |kind, fragments| {
                let mut armor: ArmorSkin = fragments.populate("ArmorSkin")?;
                armor.kind = kind;
                skin_with(fragments, SkinKind::Armor, SkinDetails::Armor(armor))
            },
        )
    })
}

fn weapon_skin_converter() -> &'static PolymorphicConverter<WeaponKind, Skin> {
    static CONVERTER: OnceLock<PolymorphicConverter<WeaponKind, Skin>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(
            DiscriminatorSource::wrapped("weapon_type", &["weapon", "details"]),
            |kind, fragments| {
                let mut weapon: WeaponSkin = fragments.populate("WeaponSkin")?;
                weapon.kind = kind;
                skin_with(fragments, SkinKind::Weapon, SkinDetails::Weapon(weapon))
            },
        )
    })
}

fn gathering_skin_converter() -> &'static PolymorphicConverter<GatheringToolKind, Skin> {
    static CONVERTER: OnceLock<PolymorphicConverter<GatheringToolKind, Skin>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(
            DiscriminatorSource::wrapped("gathering_type", &["gathering", "details"]),
            |kind, fragments| {
                let mut gathering: GatheringSkin = fragments.populate("GatheringSkin")?;
                gathering.kind = kind;
                skin_with(fragments, SkinKind::Gathering, SkinDetails::Gathering(gathering))
            },
        )
    })
}

/// skins share the sub kinds of items
pub fn skin_converter() -> &'static PolymorphicConverter<SkinKind, Skin> {
    static CONVERTER: OnceLock<PolymorphicConverter<SkinKind, Skin>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(DiscriminatorSource::direct("type"), populate_skin)
            .with_reader(NestedFamilyReader::new(SkinKind::Armor, armor_skin_converter()))
            .with_reader(NestedFamilyReader::new(SkinKind::Weapon, weapon_skin_converter()))
            .with_reader(NestedFamilyReader::new(
                SkinKind::Gathering,
                gathering_skin_converter(),
            ))
    })
}

pub struct Skins;

impl EndPoint for Skins {
    type Id = SkinId;
    type Entity = Skin;
    type Converter = PolymorphicConverter<SkinKind, Skin>;
    const URL: &'static str = E_P_URL;
    const LOCALIZED: bool = true;
    fn converter() -> &'static Self::Converter {
        skin_converter()
    }
    fn id(skin: &Skin) -> SkinId {
        skin.id
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::convert::Converter;

    #[rstest]
    fn v1_weapon_skin() {
        let skin = skin_converter()
            .convert(json!({
                "skin_id": "1343",
                "name": "Zap",
                "type": "Weapon",
                "flags": ["ShowInWardrobe"],
                "restrictions": [],
                "icon_file_id": "455958",
                "icon_file_signature": "38F3D2A5CC7A4D6EDC7C4C5F1B5F3F0ACD4E8BB0",
                "weapon": {"type": "Sword", "damage_type": "Lightning"}
            }))
            .expect("failed to convert skin");
        assert_eq!(skin.id, 1343);
        assert_eq!(skin.kind, SkinKind::Weapon);
        assert_eq!(
            skin.details,
            SkinDetails::Weapon(WeaponSkin {
                kind: WeaponKind::Sword,
                damage_type: Some("Lightning".to_string())
            })
        );
    }

    #[rstest]
    fn v2_armor_skin() {
        let skin = skin_converter()
            .convert(json!({
                "id": 10,
                "name": "Seer Coat",
                "type": "Armor",
                "rarity": "Basic",
                "details": {"type": "Coat", "weight_class": "Light", "dye_slots": {"default": []}}
            }))
            .expect("failed to convert skin");
        assert_eq!(skin.rarity, Some(Rarity::Basic));
        assert_eq!(
            skin.details,
            SkinDetails::Armor(ArmorSkin {
                kind: ArmorKind::Coat,
                weight_class: "Light".to_string()
            })
        );
    }

    #[rstest]
    #[case(json!({"id": 2, "type": "Back"}), SkinKind::Back, SkinDetails::Back)]
    #[case(json!({"id": 2, "type": "Glider"}), SkinKind::Unknown, SkinDetails::Unknown)]
    fn skins_without_details(#[case] raw: Value, #[case] kind: SkinKind, #[case] details: SkinDetails) {
        let skin = skin_converter().convert(raw).expect("failed to convert skin");
        assert_eq!(skin.id, 2);
        assert_eq!(skin.kind, kind);
        assert_eq!(skin.details, details);
    }
}
