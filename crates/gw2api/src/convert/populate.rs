use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ConvertError, Fragments};

/// Entities that receive the detached `infix_upgrade` fragment after their own fields are bound.
pub trait InfixUpgradeTarget {
    type InfixUpgrade: DeserializeOwned;
    /// must not replace an infix upgrade that is already bound
    fn layer_infix_upgrade(&mut self, infix_upgrade: Self::InfixUpgrade);
}

impl Fragments {
    /// binds the base fragment by name. fields `T` doesn't know are ignored.
    pub fn populate<T: DeserializeOwned>(&self, entity: &'static str) -> Result<T, ConvertError> {
        serde_json::from_value(Value::Object(self.base.clone()))
            .map_err(|source| ConvertError::Deserialize { entity, source })
    }

    /// [Self::populate], then the infix upgrade fragment on top.
    /// A malformed infix upgrade is dropped rather than failing the entity.
    pub fn populate_layered<T>(&self, entity: &'static str) -> Result<T, ConvertError>
    where
        T: DeserializeOwned + InfixUpgradeTarget,
    {
        let mut populated: T = self.populate(entity)?;
        if let Some(infix) = &self.infix_upgrade {
            match serde_json::from_value(Value::Object(infix.clone())) {
                Ok(infix) => populated.layer_infix_upgrade(infix),
                Err(e) => debug!(entity, %e, "dropping malformed infix_upgrade"),
            }
        }
        Ok(populated)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use serde::Deserialize;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::InfixUpgradeTarget;
    use crate::convert::{discriminator::Location, flatten};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bonus {
        id: u32,
    }
    #[derive(Debug, Deserialize, PartialEq)]
    struct Blade {
        min_power: u32,
        #[serde(default)]
        infix_upgrade: Option<Bonus>,
    }
    impl InfixUpgradeTarget for Blade {
        type InfixUpgrade = Bonus;
        fn layer_infix_upgrade(&mut self, infix_upgrade: Bonus) {
            if self.infix_upgrade.is_none() {
                self.infix_upgrade = Some(infix_upgrade);
            }
        }
    }

    #[rstest]
    #[case(json!({"weapon": {"type": "Sword", "min_power": 100, "infix_upgrade": {"id": 5}}}), Some(Bonus { id: 5 }))]
    #[case(json!({"weapon": {"type": "Sword", "min_power": 100, "infix_upgrade": {"id": "five"}}}), None)]
    #[case(json!({"weapon": {"type": "Sword", "min_power": 100}}), None)]
    fn infix_upgrade_is_layered(#[case] raw: serde_json::Value, #[case] expected: Option<Bonus>) {
        let raw = raw.as_object().expect("object payload");
        let fragments = flatten(raw, Location::Nested("weapon"), Some("weapon"), &[]);
        let blade: Blade = fragments
            .populate_layered("blade")
            .expect("failed to populate blade");
        assert_eq!(
            blade,
            Blade {
                min_power: 100,
                infix_upgrade: expected
            }
        );
    }

    #[rstest]
    fn wrong_field_type_is_an_error() {
        let raw = json!({"weapon": {"min_power": "lots"}});
        let fragments = flatten(
            raw.as_object().expect("object payload"),
            Location::Absent,
            Some("weapon"),
            &[],
        );
        assert!(fragments.populate::<Blade>("blade").is_err());
    }
}
