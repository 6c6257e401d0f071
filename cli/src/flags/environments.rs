//! Environment class to environment directory mapping.
//!
//! A deployment repository keeps one config directory per environment under
//! each project. Operators select environments by class, never individually:
//! - `Prod` touches only the production environment
//! - `NonProd` touches every pre-production environment

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::flags::error::FlagError;

/// Environment directories touched by a production rollout.
const PROD_ENVIRONMENTS: &[&str] = &["prod"];

/// Environment directories touched by a pre-production rollout.
const NON_PROD_ENVIRONMENTS: &[&str] = &["main", "ondemand", "stage", "preprod"];

/// Which class of environments a flag change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentClass {
    /// Production only.
    Prod,
    /// All pre-production environments.
    NonProd,
}

impl EnvironmentClass {
    /// Returns the environment directory names for this class.
    #[must_use]
    pub const fn environments(self) -> &'static [&'static str] {
        match self {
            Self::Prod => PROD_ENVIRONMENTS,
            Self::NonProd => NON_PROD_ENVIRONMENTS,
        }
    }
}

impl fmt::Display for EnvironmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prod => write!(f, "prod"),
            Self::NonProd => write!(f, "non-prod"),
        }
    }
}

impl FromStr for EnvironmentClass {
    type Err = FlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prod" => Ok(Self::Prod),
            "non-prod" | "nonprod" => Ok(Self::NonProd),
            other => Err(FlagError::InvalidEnvironmentClass(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prod_maps_to_prod_only() {
        let envs: HashSet<_> = EnvironmentClass::Prod.environments().iter().collect();
        assert_eq!(envs, HashSet::from([&"prod"]));
    }

    #[test]
    fn non_prod_maps_to_all_preproduction_environments() {
        let envs: HashSet<_> = EnvironmentClass::NonProd.environments().iter().collect();
        assert_eq!(envs, HashSet::from([&"main", &"ondemand", &"stage", &"preprod"]));
    }

    #[test]
    fn classes_do_not_overlap() {
        for env in EnvironmentClass::Prod.environments() {
            assert!(!EnvironmentClass::NonProd.environments().contains(env));
        }
    }

    #[test]
    fn parse_accepts_both_spellings_of_non_prod() {
        assert_eq!(
            "non-prod".parse::<EnvironmentClass>().unwrap(),
            EnvironmentClass::NonProd
        );
        assert_eq!(
            "nonprod".parse::<EnvironmentClass>().unwrap(),
            EnvironmentClass::NonProd
        );
        assert_eq!("PROD".parse::<EnvironmentClass>().unwrap(), EnvironmentClass::Prod);
    }

    #[test]
    fn parse_rejects_unknown_selector() {
        let err = "staging".parse::<EnvironmentClass>().unwrap_err();
        assert!(matches!(err, FlagError::InvalidEnvironmentClass(_)));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for class in [EnvironmentClass::Prod, EnvironmentClass::NonProd] {
            assert_eq!(class.to_string().parse::<EnvironmentClass>().unwrap(), class);
        }
    }
}
