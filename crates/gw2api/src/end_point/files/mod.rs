use crate::de;
use crate::end_point::plain_end_point;
use crate::prelude::*;

pub type FileId = String;
const E_P_URL: &str = const_format::concatcp!(API_V2_PATH, "/files");
const RENDER_URL: &str = "https://render.guildwars2.com/file/";

/// A commonly used asset. v2 links the icon directly,
/// v1 only has the signature and file id the render service needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// eg: `map_complete`
    #[serde(default, deserialize_with = "de::null_default")]
    pub id: FileId,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub icon: Option<Url>,
    #[serde(default, deserialize_with = "de::lenient_option")]
    pub file_id: Option<u32>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Stampable for File {}

impl File {
    /// `icon`, or the render service url built from the signature
    pub fn render_url(&self) -> Option<Url> {
        if let Some(icon) = &self.icon {
            return Some(icon.clone());
        }
        let (Some(signature), Some(file_id)) = (&self.signature, self.file_id) else {
            return None;
        };
        render_url(signature, file_id, "png")
    }
}

pub fn render_url(signature: &str, file_id: u32, format: &str) -> Option<Url> {
    Url::parse(&format!("{RENDER_URL}{signature}/{file_id}.{format}")).ok()
}

plain_end_point!(Files, File, FileId, E_P_URL, localized: false);
