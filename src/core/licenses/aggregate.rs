use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CollectedLicenses, LicenseEntry};
use crate::config::Config;

/// Third-party license report: the static `lib` bucket plus one bucket per
/// media type that has at least one third-party resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ThirdPartyEntries {
    pub lib: BTreeMap<String, LicenseEntry>,
    #[serde(flatten)]
    pub media: BTreeMap<String, BTreeMap<String, LicenseEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseReport {
    pub third_party: ThirdPartyEntries,
    /// Resources without a license entry, recorded only for release brands.
    pub missing: Vec<String>,
}

/// Which license entries count as in-house and which brands must have complete licenses.
#[derive(Debug, Clone)]
pub struct LicensePolicy {
    pub first_party_urls: Vec<String>,
    pub release_brands: Vec<String>,
}

impl LicensePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            first_party_urls: config.first_party_urls.clone(),
            release_brands: config.release_brands.clone(),
        }
    }

    pub fn is_first_party(&self, entry: &LicenseEntry) -> bool {
        self.first_party_urls
            .iter()
            .any(|url| *url == entry.project_url)
    }

    pub fn is_release_brand(&self, brand: &str) -> bool {
        self.release_brands.iter().any(|b| b == brand)
    }
}

/// Combine the static library entries with the collected media entries.
///
/// First-party media is dropped. A resource whose lookup failed is never
/// included; for release brands it is logged as an error and listed in
/// [`LicenseReport::missing`], which does not fail the build.
pub fn aggregate(
    lib_entries: &BTreeMap<String, LicenseEntry>,
    collected: &CollectedLicenses,
    brand: &str,
    policy: &LicensePolicy,
) -> LicenseReport {
    let mut report = LicenseReport {
        third_party: ThirdPartyEntries {
            lib: lib_entries.clone(),
            media: BTreeMap::new(),
        },
        missing: Vec::new(),
    };

    for (media_type, resources) in collected {
        for (resource_name, entry) in resources {
            match entry {
                None => {
                    if policy.is_release_brand(brand) {
                        tracing::error!(
                            brand = %brand,
                            "no license for {} {}",
                            media_type,
                            resource_name
                        );
                        report.missing.push(resource_name.clone());
                    }
                }
                Some(entry) if policy.is_first_party(entry) => {}
                Some(entry) => {
                    report
                        .third_party
                        .media
                        .entry(media_type.clone())
                        .or_default()
                        .insert(resource_name.clone(), entry.clone());
                }
            }
        }
    }

    report
}
