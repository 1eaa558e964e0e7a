use std::sync::OnceLock;

use crate::convert::registry::discriminator_family;
use crate::convert::{DiscriminatorSource, Fragments, PolymorphicConverter};
use crate::de;
use crate::end_point::items::ItemId;
use crate::end_point::EndPoint;
use crate::prelude::*;

pub type RecipeId = u32;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/recipes");

discriminator_family! {
    /// what a recipe produces
    pub enum RecipeKind in "recipe" {
        // weapons
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
        // armor
        Boots,
        Coat,
        Gloves,
        Helm,
        Leggings,
        Shoulders,
        // trinkets
        Amulet,
        Earring,
        Ring,
        // cooking
        Dessert,
        Feast,
        IngredientCooking,
        Meal,
        Seasoning,
        Snack,
        Soup,
        Food,
        // crafting components
        Component,
        Inscription,
        Insignia,
        LegendaryComponent,
        Refinement,
        RefinementEctoplasm,
        RefinementObsidian,
        // guild
        GuildConsumable,
        GuildDecoration,
        GuildConsumableWvw,
        // everything else
        Backpack,
        Bag,
        Bulk,
        Consumable,
        Dye,
        Potion,
        UpgradeComponent,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "de::lenient")]
    pub item_id: ItemId,
    #[serde(default, deserialize_with = "de::lenient")]
    pub count: u32,
}

/// guild upgrades consumed by guild hall recipes
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GuildIngredient {
    #[serde(default, deserialize_with = "de::lenient")]
    pub upgrade_id: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Recipe {
    #[serde(default, alias = "recipe_id", deserialize_with = "de::lenient")]
    pub id: RecipeId,
    #[serde(skip)]
    pub kind: RecipeKind,
    #[serde(default, deserialize_with = "de::lenient")]
    pub output_item_id: ItemId,
    #[serde(default, deserialize_with = "de::lenient")]
    pub output_item_count: u32,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub output_upgrade_id: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub min_rating: u32,
    #[serde(default, deserialize_with = "de::lenient")]
    pub time_to_craft_ms: u32,
    /// `Armorsmith`, `Chef`..
    #[serde(default, deserialize_with = "de::string_list")]
    pub disciplines: Vec<String>,
    /// `AutoLearned`, `LearnedFromItem`
    #[serde(default, deserialize_with = "de::string_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub guild_ingredients: Vec<GuildIngredient>,
    #[serde(default)]
    pub chat_link: Option<String>,
    #[serde(skip)]
    pub last_modified: Option<OffsetDateTime>,
}

// recipes are not localized
impl Stampable for Recipe {
    fn set_last_modified(&mut self, timestamp: OffsetDateTime) {
        self.last_modified = Some(timestamp);
    }
}

fn populate_recipe(kind: RecipeKind, fragments: &Fragments) -> Result<Recipe, ConvertError> {
    let mut recipe: Recipe = fragments.populate("recipe")?;
    recipe.kind = kind;
    Ok(recipe)
}

pub fn recipe_converter() -> &'static PolymorphicConverter<RecipeKind, Recipe> {
    static CONVERTER: OnceLock<PolymorphicConverter<RecipeKind, Recipe>> = OnceLock::new();
    CONVERTER.get_or_init(|| {
        PolymorphicConverter::new(DiscriminatorSource::direct("type"), populate_recipe)
    })
}

pub struct Recipes;

impl EndPoint for Recipes {
    type Id = RecipeId;
    type Entity = Recipe;
    type Converter = PolymorphicConverter<RecipeKind, Recipe>;
    const URL: &'static str = E_P_URL;
    const LOCALIZED: bool = false;
    fn converter() -> &'static Self::Converter {
        recipe_converter()
    }
    fn id(recipe: &Recipe) -> RecipeId {
        recipe.id
    }
}
