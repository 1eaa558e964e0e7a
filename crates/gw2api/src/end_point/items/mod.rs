use std::sync::OnceLock;

use enumflags2::BitFlags;

use crate::convert::registry::discriminator_family;
use crate::convert::{
    DiscriminatorSource, Fragments, NestedFamilyReader, PolymorphicConverter, Rename,
    WrapperReader,
};
use crate::de::{self, GameType};
use crate::end_point::EndPoint;
use crate::prelude::*;

pub mod details;

pub use details::*;

pub type ItemId = u32;
pub type SkinId = u32;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/items");

discriminator_family! {
    pub enum ItemKind in "item" {
        Armor,
        Back,
        Bag,
        Consumable,
        Container,
        CraftingMaterial,
        Gathering,
        Gizmo,
        JadeTechModule,
        Key,
        MiniPet,
        PowerCore,
        Relic,
        Tool,
        Trait,
        Trinket,
        Trophy,
        UpgradeComponent,
        Weapon,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Junk,
    Basic,
    Fine,
    Masterwork,
    Rare,
    Exotic,
    Ascended,
    Legendary,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemUpgrade {
    /// `Attunement`, `Infusion`..
    #[serde(default, deserialize_with = "de::null_default")]
    pub upgrade: String,
    #[serde(default, deserialize_with = "de::lenient")]
    pub item_id: ItemId,
}

/// An item from `/v2/items` or `/v1/item_details.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default, alias = "item_id", deserialize_with = "de::lenient")]
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::null_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(skip)]
    pub kind: ItemKind,
    #[serde(default, deserialize_with = "de::lenient")]
    pub level: u32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub rarity: Rarity,
    #[serde(default, deserialize_with = "de::lenient")]
    pub vendor_value: u32,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub default_skin: Option<SkinId>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "de::game_types")]
    pub game_types: BitFlags<GameType>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub chat_link: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon: Option<Url>,
    /// v1 only. see [crate::end_point::files::File::render_url]
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon_file_id: Option<u32>,
    #[serde(default)]
    pub icon_file_signature: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub upgrades_into: Vec<ItemUpgrade>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub upgrades_from: Vec<ItemUpgrade>,
    #[serde(skip)]
    pub details: ItemDetails,
    #[serde(skip)]
    pub locale: Option<Locale>,
    #[serde(skip)]
    pub last_modified: Option<OffsetDateTime>,
}

impl Stampable for Item {
    fn set_locale(&mut self, locale: &Locale) {
        self.locale = Some(locale.clone());
    }
    fn set_last_modified(&mut self, timestamp: OffsetDateTime) {
        self.last_modified = Some(timestamp);
    }
}

fn item_with(fragments: &Fragments, kind: ItemKind, details: ItemDetails) -> Result<Item, ConvertError> {
    let mut item: Item = fragments.populate("item")?;
    item.kind = kind;
    item.details = details;
    Ok(item)
}

/// kinds that nobody else reads
fn populate_item(kind: ItemKind, fragments: &Fragments) -> Result<Item, ConvertError> {
    let details = match kind {
        ItemKind::CraftingMaterial => ItemDetails::CraftingMaterial,
        ItemKind::Trait => ItemDetails::Trait,
        ItemKind::Trophy => ItemDetails::Trophy,
        ItemKind::JadeTechModule | ItemKind::Key | ItemKind::PowerCore | ItemKind::Relic => {
            ItemDetails::Empty
        }
        _ => ItemDetails::Unknown,
    };
    item_with(fragments, kind, details)
}

/// flags of an upgrade component would overwrite the flags of the item
const UPGRADE_COMPONENT_RENAMES: &[Rename] = &[Rename {
    from: "flags",
    to: "upgrade_flags",
}];

const CONSUMABLE_RENAMES: &[Rename] = &[
    Rename {
        from: "name",
        to: "effect_name",
    },
    Rename {
        from: "description",
        to: "effect_description",
    },
    Rename {
        from: "icon",
        to: "effect_icon",
    },
];

macro_rules! details_converter {
    (
        $fn_name:ident: $kind:ident($details:ident) by $family:ty,
        $direct:literal in [$($wrapper:literal),+],
        $populate:ident $(, $renames:expr)?
    ) => {
        fn $fn_name() -> &'static PolymorphicConverter<$family, Item> {
            static CONVERTER: OnceLock<PolymorphicConverter<$family, Item>> = OnceLock::new();
            CONVERTER.get_or_init(|| {
                PolymorphicConverter::new(
                    DiscriminatorSource::wrapped($direct, &[$($wrapper),+]),
                    |kind, fragments| {
                        let mut details: $details = fragments.$populate(stringify!($details))?;
                        details.kind = kind;
                        item_with(fragments, ItemKind::$kind, ItemDetails::$kind(details))
                    },
                )
                $( .with_renames($renames) )?
            })
        }
    };
}

details_converter!(armor_converter: Armor(Armor) by ArmorKind,
    "armor_type" in ["armor", "details"], populate_layered);
details_converter!(consumable_converter: Consumable(Consumable) by ConsumableKind,
    "consumable_type" in ["consumable", "details"], populate, CONSUMABLE_RENAMES);
details_converter!(container_converter: Container(Container) by ContainerKind,
    "container_type" in ["container", "details"], populate);
details_converter!(gathering_converter: Gathering(GatheringTool) by GatheringToolKind,
    "gathering_type" in ["gathering", "details"], populate);
details_converter!(gizmo_converter: Gizmo(Gizmo) by GizmoKind,
    "gizmo_type" in ["gizmo", "details"], populate);
details_converter!(tool_converter: Tool(Tool) by ToolKind,
    "tool_type" in ["tool", "details"], populate);
details_converter!(trinket_converter: Trinket(Trinket) by TrinketKind,
    "trinket_type" in ["trinket", "details"], populate_layered);
details_converter!(upgrade_component_converter: UpgradeComponent(UpgradeComponent) by UpgradeComponentKind,
    "upgrade_component_type" in ["upgrade_component", "details"], populate_layered,
    UPGRADE_COMPONENT_RENAMES);
details_converter!(weapon_converter: Weapon(Weapon) by WeaponKind,
    "weapon_type" in ["weapon", "details"], populate_layered);

fn populate_back(_: ItemKind, fragments: &Fragments) -> Result<Item, ConvertError> {
    let back: Back = fragments.populate_layered("Back")?;
    item_with(fragments, ItemKind::Back, ItemDetails::Back(back))
}

fn populate_bag(_: ItemKind, fragments: &Fragments) -> Result<Item, ConvertError> {
    let bag: Bag = fragments.populate("Bag")?;
    item_with(fragments, ItemKind::Bag, ItemDetails::Bag(bag))
}

fn populate_mini_pet(_: ItemKind, fragments: &Fragments) -> Result<Item, ConvertError> {
    let mini_pet: MiniPet = fragments.populate("MiniPet")?;
    item_with(fragments, ItemKind::MiniPet, ItemDetails::MiniPet(mini_pet))
}

/// Converts items of both api versions
pub fn item_converter() -> &'static PolymorphicConverter<ItemKind, Item> {
    static CONVERTER: OnceLock<PolymorphicConverter<ItemKind, Item>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(DiscriminatorSource::direct("type"), populate_item)
            .with_reader(NestedFamilyReader::new(ItemKind::Armor, armor_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Consumable, consumable_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Container, container_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Gathering, gathering_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Gizmo, gizmo_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Tool, tool_converter()))
            .with_reader(NestedFamilyReader::new(ItemKind::Trinket, trinket_converter()))
            .with_reader(NestedFamilyReader::new(
                ItemKind::UpgradeComponent,
                upgrade_component_converter(),
            ))
            .with_reader(NestedFamilyReader::new(ItemKind::Weapon, weapon_converter()))
            .with_reader(WrapperReader::new(ItemKind::Back, &["back", "details"], populate_back))
            .with_reader(WrapperReader::new(ItemKind::Bag, &["bag", "details"], populate_bag))
            .with_reader(WrapperReader::new(
                ItemKind::MiniPet,
                &["mini_pet", "details"],
                populate_mini_pet,
            ))
    })
}

pub struct Items;

impl EndPoint for Items {
    type Id = ItemId;
    type Entity = Item;
    type Converter = PolymorphicConverter<ItemKind, Item>;
    const URL: &'static str = E_P_URL;
    const LOCALIZED: bool = true;
    fn converter() -> &'static Self::Converter {
        item_converter()
    }
    fn id(item: &Item) -> ItemId {
        item.id
    }
}
