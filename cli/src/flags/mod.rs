//! Feature flag domain for flagctl.
//!
//! Provides the request model and the file-level mutation logic:
//! - Environment class to environment directory mapping
//! - Idempotent flag insertion/removal in config files

pub mod environments;
pub mod error;
pub mod mutator;
pub mod request;

#[allow(unused_imports)]
pub use environments::EnvironmentClass;
#[allow(unused_imports)]
pub use error::FlagError;
#[allow(unused_imports)]
pub use mutator::{apply, MutationOutcome};
#[allow(unused_imports)]
pub use request::{EnvironmentTarget, FeatureFlagRequest, Operation};
