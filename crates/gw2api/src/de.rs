//! Forgiving field decoders.
//!
//! v1 sends most numbers as strings (`"level": "80"`) and empty strings for absent ids
//! (`"suffix_item_id": ""`). Both versions occasionally grow values we don't know.
//! None of that should make a whole item unreadable.
use std::str::FromStr;

use enumflags2::{bitflags, BitFlags};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

fn decode<T>(value: Value) -> Option<T>
where
    T: FromStr + DeserializeOwned,
{
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(value = %s, "malformed numeric string");
                None
            }
        },
        other => match serde_json::from_value(other) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(%e, "malformed value");
                None
            }
        },
    }
}

/// number or numeric string. anything else is `T::default()`
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned + Default,
{
    Ok(decode(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// number or numeric string. anything else is None
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
{
    Ok(decode(Value::deserialize(deserializer)?))
}

/// `null` and values of the wrong shape are `T::default()`. `#[serde(default)]` alone only
/// covers a missing key
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => T::default(),
        value => serde_json::from_value(value).unwrap_or_else(|e| {
            debug!(%e, "malformed value");
            T::default()
        }),
    })
}

/// `true`, `1` or `"1"`. v1 sends flags as numeric strings
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_u64().map_or(false, |n| n != 0),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

/// list of numbers or numeric strings. malformed entries are skipped
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().filter_map(decode).collect(),
        _ => Vec::new(),
    })
}

/// list of strings. anything that isn't a string is dropped
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// The game modes an item or skin can be used in
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Activity = 1 << 0,
    Dungeon = 1 << 1,
    Pve = 1 << 2,
    Pvp = 1 << 3,
    PvpLobby = 1 << 4,
    Wvw = 1 << 5,
}

impl FromStr for GameType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Activity" => Self::Activity,
            "Dungeon" => Self::Dungeon,
            "Pve" | "PvE" => Self::Pve,
            "Pvp" | "PvP" => Self::Pvp,
            "PvpLobby" | "PvPLobby" => Self::PvpLobby,
            "Wvw" | "WvW" => Self::Wvw,
            _ => return Err(()),
        })
    }
}

/// game type names into flags. unknown names are skipped
pub fn game_types<'de, D>(deserializer: D) -> Result<BitFlags<GameType>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut flags = BitFlags::empty();
    for name in string_list(deserializer)? {
        match name.parse::<GameType>() {
            Ok(game_type) => flags.insert(game_type),
            Err(_) => debug!(%name, "unknown game type"),
        }
    }
    Ok(flags)
}

#[cfg(test)]
mod test {
    use enumflags2::BitFlags;
    use rstest::*;
    use serde::Deserialize;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::GameType;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Fields {
        #[serde(default, deserialize_with = "super::lenient")]
        level: u32,
        #[serde(default, deserialize_with = "super::lenient_option")]
        suffix_item_id: Option<u32>,
        #[serde(default, deserialize_with = "super::lenient_vec")]
        ids: Vec<u32>,
        #[serde(default, deserialize_with = "super::game_types")]
        game_types: BitFlags<GameType>,
        #[serde(default, deserialize_with = "super::lenient_bool")]
        no_sell_or_sort: bool,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Optional {
        #[serde(default, deserialize_with = "super::null_default")]
        name: String,
        #[serde(default, deserialize_with = "super::null_default")]
        slots: Vec<u32>,
        #[serde(default, deserialize_with = "super::null_default")]
        center: [f64; 3],
    }

    #[rstest]
    #[case(json!({"level": "80", "suffix_item_id": "", "ids": ["1", 2, "x"]}), 80, None, vec![1, 2])]
    #[case(json!({"level": 80, "suffix_item_id": 24554}), 80, Some(24554), vec![])]
    #[case(json!({"level": "eighty", "suffix_item_id": null, "ids": "1"}), 0, None, vec![])]
    #[case(json!({}), 0, None, vec![])]
    fn v1_and_v2_numbers(
        #[case] raw: serde_json::Value,
        #[case] level: u32,
        #[case] suffix_item_id: Option<u32>,
        #[case] ids: Vec<u32>,
    ) {
        let fields: Fields = serde_json::from_value(raw).expect("lenient fields never fail");
        assert_eq!(fields.level, level);
        assert_eq!(fields.suffix_item_id, suffix_item_id);
        assert_eq!(fields.ids, ids);
    }

    #[rstest]
    #[case(json!({"no_sell_or_sort": "1"}), true)]
    #[case(json!({"no_sell_or_sort": "0"}), false)]
    #[case(json!({"no_sell_or_sort": true}), true)]
    #[case(json!({"no_sell_or_sort": 1}), true)]
    #[case(json!({}), false)]
    fn flags_as_numbers(#[case] raw: serde_json::Value, #[case] expected: bool) {
        let fields: Fields = serde_json::from_value(raw).expect("lenient fields never fail");
        assert_eq!(fields.no_sell_or_sort, expected);
    }

    #[rstest]
    #[case(json!({"name": null, "slots": null, "center": null}), Optional::default())]
    #[case(json!({"name": 5, "slots": "1,2", "center": [1.0]}), Optional::default())]
    #[case(
        json!({"name": "x", "slots": [1], "center": [1.0, 2.0, 3.0]}),
        Optional { name: "x".to_string(), slots: vec![1], center: [1.0, 2.0, 3.0] }
    )]
    fn nulls_are_defaults(#[case] raw: serde_json::Value, #[case] expected: Optional) {
        let fields: Optional = serde_json::from_value(raw).expect("null defaults never fail");
        assert_eq!(fields, expected);
    }

    #[rstest]
    fn unknown_game_types_are_skipped() {
        let fields: Fields =
            serde_json::from_value(json!({"game_types": ["Pve", "Wvw", "Raid", 3]}))
                .expect("failed to decode game types");
        assert_eq!(fields.game_types, GameType::Pve | GameType::Wvw);
    }
}
