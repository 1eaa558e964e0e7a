use crate::de;
use crate::end_point::plain_end_point;
use crate::prelude::*;

pub type QuagganId = String;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/quaggans");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quaggan {
    #[serde(default, deserialize_with = "de::null_default")]
    pub id: QuagganId,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub url: Option<Url>,
}

impl Stampable for Quaggan {}

plain_end_point!(Quaggans, Quaggan, QuagganId, E_P_URL, localized: false);
