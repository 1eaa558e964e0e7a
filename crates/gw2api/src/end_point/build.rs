use crate::client::{ApiError, Gw2Client, Request, Transport};
use crate::convert::JsonConverter;
use crate::de;
use crate::envelope::SingleConverter;
use crate::prelude::*;

const V1_URL: &str = const_format::concatcp!(API_V1_PATH, "/build.json");
const V2_URL: &str = const_format::concatcp!(API_V2_PATH, "/build");

/// current game build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Build {
    #[serde(alias = "build_id", default, deserialize_with = "de::lenient")]
    pub id: u32,
    /// when the server last saw the build change
    #[serde(skip)]
    pub last_modified: Option<OffsetDateTime>,
}

impl Stampable for Build {
    fn set_last_modified(&mut self, timestamp: OffsetDateTime) {
        self.last_modified = Some(timestamp);
    }
}

impl<T: Transport> Gw2Client<T> {
    pub fn build(&self) -> Result<Build, ApiError> {
        self.build_from(V2_URL)
    }

    /// same number, older endpoint
    pub fn build_v1(&self) -> Result<Build, ApiError> {
        self.build_from(V1_URL)
    }

    fn build_from(&self, url: &str) -> Result<Build, ApiError> {
        let response = self.send(&Request::new(url))?;
        let timestamp = response.timestamp();
        let mut build: Build = SingleConverter::new(JsonConverter::<Build>::new()).convert(response)?;
        if let Some(timestamp) = timestamp {
            build.set_last_modified(timestamp);
        }
        Ok(build)
    }
}
