//! Client for the public Guild Wars 2 api (v1 and v2).
//!
//! The interesting part lives in [convert]: most payloads are polymorphic, tagged by a `type`
//! property that may sit on the object itself or inside a nested details object. Those get
//! resolved against a fixed registry of known discriminators, reshaped into one flat object and
//! then decoded into sum types. Discriminators we don't know yet decode into an `Unknown` variant
//! instead of failing the whole response.
//!
//! [envelope] wraps the decoded content with the metadata the server sends in headers
//! (pagination counts, locale, timestamps) and [end_point] ties it all together with a
//! [client::Transport].
//!
//! resources:
//! 1. https://wiki.guildwars2.com/wiki/API:Main
//! 2. https://wiki.guildwars2.com/wiki/API:2
//! 3. https://wiki.guildwars2.com/wiki/API:1
pub mod client;
pub mod convert;
pub mod de;
pub mod end_point;
pub mod envelope;

pub use client::{ApiError, Gw2Client, Transport, UreqTransport};
pub use end_point::{init_registries, EndPoint, Repository};
pub use envelope::{DictionaryRange, Locale, PageCollection, Response};

pub(crate) mod prelude {
    pub use crate::convert::{ConvertError, Converter, Family};
    pub use crate::envelope::{Locale, Stampable};
    pub use gw2_core::prelude::*;
    // paths are joined onto the configured base url
    pub const API_V1_PATH: &str = "v1";
    pub const API_V2_PATH: &str = "v2";
}
