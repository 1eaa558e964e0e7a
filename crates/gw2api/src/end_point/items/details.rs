//! The kind specific part of an item.
//!
//! v1 nests these in an object named after the kind (`weapon`, `upgrade_component`..),
//! v2 always calls it `details`. Both carry the sub kind as `type`.
use crate::convert::registry::discriminator_family;
use crate::convert::InfixUpgradeTarget;
use crate::de;
use crate::prelude::*;

use super::ItemId;

discriminator_family! {
    pub enum WeaponKind in "weapon" {
        Axe,
        Dagger,
        Focus,
        Greatsword,
        Hammer,
        Harpoon,
        LongBow,
        Mace,
        Pistol,
        Rifle,
        Scepter,
        Shield,
        ShortBow,
        Speargun,
        Staff,
        Sword,
        Torch,
        Trident,
        Warhorn,
        LargeBundle,
        SmallBundle,
        Toy,
        ToyTwoHanded,
    }
}

discriminator_family! {
    pub enum ArmorKind in "armor" {
        Boots,
        Coat,
        Gloves,
        Helm,
        HelmAquatic,
        Leggings,
        Shoulders,
    }
}

discriminator_family! {
    pub enum ConsumableKind in "consumable" {
        AppearanceChange,
        Booze,
        ContractNpc,
        Currency,
        Food,
        Generic,
        Halloween,
        Immediate,
        MountRandomUnlock,
        RandomUnlock,
        TeleportToFriend,
        Transmutation,
        Unlock,
        UpgradeRemoval,
        Utility,
    }
}

discriminator_family! {
    pub enum ContainerKind in "container" {
        Default,
        GiftBox,
        Immediate,
        OpenUi = "OpenUI",
    }
}

discriminator_family! {
    pub enum GatheringToolKind in "gathering tool" {
        Foraging,
        Logging,
        Mining,
        Bait,
        Lure,
    }
}

discriminator_family! {
    pub enum GizmoKind in "gizmo" {
        Default,
        ContainerKey,
        RentableContractNpc,
        UnlimitedConsumable,
    }
}

discriminator_family! {
    pub enum ToolKind in "tool" {
        Salvage,
    }
}

discriminator_family! {
    pub enum TrinketKind in "trinket" {
        Accessory,
        Amulet,
        Ring,
    }
}

discriminator_family! {
    pub enum UpgradeComponentKind in "upgrade component" {
        Default,
        Gem,
        Rune,
        Sigil,
    }
}

/// Stat bonuses. Bound after the rest of the details, see [InfixUpgradeTarget].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfixUpgrade {
    /// itemstat id, v2 only
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub id: Option<u32>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub attributes: Vec<InfixAttribute>,
    #[serde(default)]
    pub buff: Option<InfixBuff>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfixAttribute {
    #[serde(default, deserialize_with = "de::null_default")]
    pub attribute: String,
    #[serde(default, deserialize_with = "de::lenient")]
    pub modifier: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfixBuff {
    #[serde(default, deserialize_with = "de::lenient")]
    pub skill_id: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfusionSlot {
    /// `Infusion`, `Enrichment`..
    #[serde(default, deserialize_with = "de::string_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub item_id: Option<ItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Weapon {
    #[serde(skip)]
    pub kind: WeaponKind,
    /// `Physical`, `Fire`, `Ice`, `Lightning`, `Choking`
    #[serde(default)]
    pub damage_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub min_power: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub max_power: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub defense: u32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub infusion_slots: Vec<InfusionSlot>,
    #[serde(skip)]
    pub infix_upgrade: Option<InfixUpgrade>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub secondary_suffix_item_id: Option<ItemId>,
    /// selectable itemstat ids
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub stat_choices: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Armor {
    #[serde(skip)]
    pub kind: ArmorKind,
    /// `Heavy`, `Medium`, `Light` or `Clothing`
    #[serde(default, deserialize_with = "de::null_default")]
    pub weight_class: String,
    #[serde(default, deserialize_with = "de::lenient")]
    pub defense: u32,
    #[serde(default, deserialize_with = "de::null_default")]
    pub infusion_slots: Vec<InfusionSlot>,
    #[serde(skip)]
    pub infix_upgrade: Option<InfixUpgrade>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub secondary_suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub stat_choices: Vec<u32>,
}

/// back items have no sub kind
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Back {
    #[serde(default, deserialize_with = "de::null_default")]
    pub infusion_slots: Vec<InfusionSlot>,
    #[serde(skip)]
    pub infix_upgrade: Option<InfixUpgrade>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub secondary_suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub stat_choices: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bag {
    #[serde(default, deserialize_with = "de::lenient")]
    pub size: u32,
    /// contents are hidden from vendors and sorting
    #[serde(default, deserialize_with = "de::lenient_bool")]
    pub no_sell_or_sort: bool,
}

/// The effect `name`, `description` and `icon` are renamed to `effect_*` before merging, they
/// would collide with the fields of the item itself.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Consumable {
    #[serde(skip)]
    pub kind: ConsumableKind,
    #[serde(default)]
    pub effect_name: Option<String>,
    #[serde(default)]
    pub effect_description: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub effect_icon: Option<Url>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub duration_ms: Option<u64>,
    /// what an `Unlock` consumable unlocks. `Dye`, `CraftingRecipe`..
    #[serde(default)]
    pub unlock_type: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub color_id: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub recipe_id: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub extra_recipe_ids: Vec<u32>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub guild_upgrade_id: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub apply_count: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub skins: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Container {
    #[serde(skip)]
    pub kind: ContainerKind,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatheringTool {
    #[serde(skip)]
    pub kind: GatheringToolKind,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Gizmo {
    #[serde(skip)]
    pub kind: GizmoKind,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub guild_upgrade_id: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub vendor_ids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MiniPet {
    #[serde(default, deserialize_with = "de::lenient")]
    pub minipet_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tool {
    #[serde(skip)]
    pub kind: ToolKind,
    #[serde(default, deserialize_with = "de::lenient")]
    pub charges: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trinket {
    #[serde(skip)]
    pub kind: TrinketKind,
    #[serde(default, deserialize_with = "de::null_default")]
    pub infusion_slots: Vec<InfusionSlot>,
    #[serde(skip)]
    pub infix_upgrade: Option<InfixUpgrade>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub secondary_suffix_item_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub stat_choices: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpgradeComponent {
    #[serde(skip)]
    pub kind: UpgradeComponentKind,
    /// the `flags` of the details object. which equipment the upgrade fits in
    #[serde(default, deserialize_with = "de::string_list")]
    pub upgrade_flags: Vec<String>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub infusion_upgrade_flags: Vec<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(skip)]
    pub infix_upgrade: Option<InfixUpgrade>,
    /// rune bonuses, one per equipped piece
    #[serde(default, deserialize_with = "de::string_list")]
    pub bonuses: Vec<String>,
}

macro_rules! infix_upgrade_target {
    ($($details:ty),+) => {
        $(
            impl InfixUpgradeTarget for $details {
                type InfixUpgrade = InfixUpgrade;
                fn layer_infix_upgrade(&mut self, infix_upgrade: InfixUpgrade) {
                    self.infix_upgrade.get_or_insert(infix_upgrade);
                }
            }
        )+
    };
}
infix_upgrade_target!(Weapon, Armor, Back, Trinket, UpgradeComponent);

/// Details of an [super::Item]. Kinds without details of their own are unit variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemDetails {
    Armor(Armor),
    Back(Back),
    Bag(Bag),
    Consumable(Consumable),
    Container(Container),
    CraftingMaterial,
    Gathering(GatheringTool),
    Gizmo(Gizmo),
    MiniPet(MiniPet),
    Tool(Tool),
    Trait,
    Trinket(Trinket),
    Trophy,
    UpgradeComponent(UpgradeComponent),
    Weapon(Weapon),
    /// known kind that never has details. eg: `Key`, `Relic`
    Empty,
    #[default]
    Unknown,
}

impl ItemDetails {
    /// the stat bonuses, for the kinds that can have them
    pub fn infix_upgrade(&self) -> Option<&InfixUpgrade> {
        match self {
            Self::Armor(d) => d.infix_upgrade.as_ref(),
            Self::Back(d) => d.infix_upgrade.as_ref(),
            Self::Trinket(d) => d.infix_upgrade.as_ref(),
            Self::UpgradeComponent(d) => d.infix_upgrade.as_ref(),
            Self::Weapon(d) => d.infix_upgrade.as_ref(),
            _ => None,
        }
    }
}
