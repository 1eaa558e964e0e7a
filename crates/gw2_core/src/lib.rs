//! Shared plumbing for the gw2api crates: logging, configuration and a prelude of the
//! stack every crate in this workspace uses.
pub mod config;
pub mod trace;

pub mod prelude {
    pub use miette;
    pub use miette::{bail, Context, Diagnostic, IntoDiagnostic, Result};
    pub use serde;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{from_str, from_value, to_string_pretty, Map, Value};
    pub use smol_str::SmolStr;
    pub use std::collections::{BTreeMap, BTreeSet};
    pub use std::sync::Arc;
    pub use thiserror::{self, Error};
    pub use time::OffsetDateTime;
    pub use tracing::{
        debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
    };
    pub use url::Url;
}
