use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
pub enum ConvertError {
    #[error("expected a json object for a {family} payload, found {found}")]
    #[diagnostic(code(convert_error::not_an_object))]
    NotAnObject {
        family: &'static str,
        found: &'static str,
    },
    #[error("expected a json array of entities, found {found}")]
    #[diagnostic(code(convert_error::not_an_array))]
    NotAnArray { found: &'static str },
    #[error("failed to populate {entity} from json")]
    #[diagnostic(code(convert_error::deserialize))]
    Deserialize {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Only happens when a family is declared wrong, so it's reported when the registry is built
/// instead of when some item happens to carry the duplicated discriminator.
#[derive(Debug, Diagnostic, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("discriminator {discriminator:?} registered twice in family {family}")]
    #[diagnostic(code(registry_error::duplicate_discriminator))]
    DuplicateDiscriminator {
        family: &'static str,
        discriminator: String,
    },
}

/// name of the json kind for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
