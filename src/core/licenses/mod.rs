//! Third-party license collection and aggregation.
//!
//! - `lookup`: license entries for media files and the static library table
//! - `aggregate`: the third-party report embedded in every artifact

pub mod aggregate;
pub mod lookup;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use aggregate::*;
pub use lookup::*;

/// License record for a single resource. Only `projectURL` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LicenseEntry {
    #[serde(rename = "projectURL", default)]
    pub project_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Media type -> resource name -> entry, `None` where the lookup failed.
pub type CollectedLicenses = BTreeMap<String, BTreeMap<String, Option<LicenseEntry>>>;
