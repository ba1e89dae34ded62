// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use url::Url;

pub static IDENTIFIER_SEPARATOR: &str = ":";

#[derive(Clone, Debug, PartialEq, Hash, Eq)]
pub struct Identifier {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Identifier {
    pub fn new(kind: &str, namespace: &str, name: &str, version: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    // reporting-only identity for filesystem scans; fields must stay free
    // of the canonical separator
    pub fn synthesized_from(input_path: &Path) -> Self {
        let name = input_path
            .file_name()
            .map(|segment| segment.to_string_lossy().replace(IDENTIFIER_SEPARATOR, "_"))
            .unwrap_or_else(|| "unknown".to_string());

        Self::new("filesystem", "", &name, "")
    }
}

impl TryFrom<String> for Identifier {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        let purl = PackageUrl::from_str(value.as_str())?;
        let namespace = purl.namespace().unwrap_or_default();
        let version = purl.version().unwrap_or_default();
        Ok(Identifier::new(purl.ty(), namespace, purl.name(), version))
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let coordinates = [
            self.kind.as_str(),
            self.namespace.as_str(),
            self.name.as_str(),
            self.version.as_str(),
        ];
        f.write_str(&coordinates.join(IDENTIFIER_SEPARATOR))
    }
}

// identifiers travel as plain strings : the canonical coordinate form when
// serialized, and either that form or a package url when deserialized
impl Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        if raw.starts_with("pkg:") {
            return Identifier::try_from(raw).map_err(serde::de::Error::custom);
        }

        let coordinates = raw.splitn(4, IDENTIFIER_SEPARATOR).collect::<Vec<_>>();

        let [kind, namespace, name, version] = coordinates.as_slice() else {
            return Err(serde::de::Error::custom(format!("malformed identifier : {}", raw)));
        };

        Ok(Identifier::new(kind, namespace, name, version))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtifact {
    pub url: Url,
    pub hash: String,
    pub hash_algorithm: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    pub kind: String,
    pub url: String,
    pub revision: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: Identifier,
    #[serde(default)]
    pub declared_licenses: Vec<String>,
    #[serde(default)]
    pub homepage_url: Option<Url>,
    #[serde(default)]
    pub vcs: Option<VcsInfo>,
    #[serde(default)]
    pub source_artifact: Option<RemoteArtifact>,
    #[serde(default)]
    pub binary_artifact: Option<RemoteArtifact>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub download_time: DateTime<Utc>,
    pub source_artifact: Option<RemoteArtifact>,
    pub vcs_info: Option<VcsInfo>,
    pub original_vcs_info: Option<VcsInfo>,
}

impl Provenance {
    pub fn empty(observed_at: DateTime<Utc>) -> Self {
        Self {
            download_time: observed_at,
            source_artifact: None,
            vcs_info: None,
            original_vcs_info: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Hash, Eq, Serialize, Deserialize)]
pub struct ScannerDetails {
    pub name: String,
    pub version: String,
    pub configuration: String,
}

impl ScannerDetails {
    pub fn new(name: &str, version: &str, configuration: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            configuration: configuration.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LicenseFinding {
    pub license: String,
    pub location: String,
}

impl LicenseFinding {
    pub fn new(license: &str, location: &str) -> Self {
        Self {
            license: license.to_string(),
            location: location.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub source: String,
    pub message: String,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl Issue {
    pub fn new(source: &str, message: &str, severity: Option<Severity>) -> Self {
        Self {
            source: source.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub file_count: u32,
    pub license_findings: Vec<LicenseFinding>,
    pub issues: Vec<Issue>,
}

impl ScanSummary {
    pub fn empty(start_time: DateTime<Utc>, end_time: DateTime<Utc>, issue: Issue) -> Self {
        Self {
            start_time,
            end_time,
            file_count: 0,
            license_findings: vec![],
            issues: vec![issue],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub provenance: Provenance,
    pub scanner: ScannerDetails,
    pub summary: ScanSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<Utf8PathBuf>,
}

impl ScanResult {
    pub fn succeeded(&self) -> bool {
        self.summary.issues.is_empty()
    }
}

// a downloaded source tree plus the record of what exactly was fetched
#[derive(Clone, Debug, PartialEq)]
pub struct ProvisionedSource {
    pub source_dir: Utf8PathBuf,
    pub provenance: Provenance,
}

// what a scanner engine extracts from its raw output, before normalization
#[derive(Clone, Debug, PartialEq)]
pub struct RawScanOutcome {
    pub file_count: u32,
    pub findings: Vec<LicenseFinding>,
    pub issues: Vec<Issue>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub reads: u64,
    pub writes: u64,
}

pub type ScanOutcome = (Package, Vec<ScanResult>);

pub struct BatchScanResults {
    pub outcomes: Vec<ScanOutcome>,
}

#[derive(ValueEnum, Debug, Clone)]
pub enum CleanupScope {
    Everything,
    Results,
    Sources,
    Tools,
}

#[cfg(test)]
mod tests {
    use crate::core::models::{IDENTIFIER_SEPARATOR, Identifier};
    use assertor::{BooleanAssertion, EqualityAssertion};
    use std::path::Path;

    #[test]
    fn should_parse_identifier_from_package_url() {
        let identifier = Identifier::try_from("pkg:npm/leftpad@1.0.0".to_string()).expect("not a valid purl");

        assertor::assert_that!(identifier).is_equal_to(Identifier::new("npm", "", "leftpad", "1.0.0"));
        assertor::assert_that!(identifier.to_string()).is_equal_to("npm::leftpad:1.0.0".to_string());
    }

    #[test]
    fn should_parse_namespaced_identifier_from_package_url() {
        let identifier = Identifier::try_from("pkg:maven/org.apache/commons@2.11".to_string()).expect("invalid purl");

        assertor::assert_that!(identifier).is_equal_to(Identifier::new("maven", "org.apache", "commons", "2.11"));
    }

    #[test]
    fn should_roundtrip_identifiers_through_the_canonical_form() {
        let identifier = Identifier::new("npm", "", "leftpad", "1.0.0");

        let serialized = serde_json::to_string(&identifier).expect("cannot serialize identifier");
        assertor::assert_that!(serialized.clone()).is_equal_to(r#""npm::leftpad:1.0.0""#.to_string());

        let deserialized: Identifier = serde_json::from_str(&serialized).expect("cannot deserialize identifier");
        assertor::assert_that!(deserialized).is_equal_to(identifier);
    }

    #[test]
    fn should_sanitize_synthesized_identifiers() {
        let identifier = Identifier::synthesized_from(Path::new("/tmp/downloads/npm:leftpad"));

        assertor::assert_that!(identifier.name).is_equal_to("npm_leftpad".to_string());
        assertor::assert_that!(identifier.name.contains(IDENTIFIER_SEPARATOR)).is_false();
    }
}
