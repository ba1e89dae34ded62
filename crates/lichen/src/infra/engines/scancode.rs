// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::interfaces::ScannerOperations;
use crate::core::models::{Issue, LicenseFinding, RawScanOutcome, ScannerDetails, Severity};
use crate::infra::engines::installed_version;
use anyhow::{Context, bail};
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::sync::OnceCell;

pub static SCANNER_NAME: &str = "scancode";

static SCANNER_EXECUTABLE: &str = "scancode";
static VERSION_OUTPUT_PREFIX: &str = "ScanCode version";

pub struct ScanCodeEngine {
    required_version: String,
    configuration: String,
    install_dir: PathBuf,
    resolved_executable: OnceCell<PathBuf>,
}

impl ScanCodeEngine {
    pub fn new(required_version: &str, configuration: &str, install_dir: PathBuf) -> Self {
        Self {
            required_version: required_version.to_string(),
            configuration: configuration.to_string(),
            install_dir,
            resolved_executable: OnceCell::new(),
        }
    }

    fn locate_installed(&self) -> Option<PathBuf> {
        let candidates = [
            PathBuf::from(SCANNER_EXECUTABLE),
            self.install_dir.join("bin").join(SCANNER_EXECUTABLE),
        ];

        candidates.into_iter().find(|candidate| {
            installed_version(candidate, "--version", VERSION_OUTPUT_PREFIX)
                .is_some_and(|version| version == self.required_version)
        })
    }

    fn bootstrap(&self) -> anyhow::Result<PathBuf> {
        log::info!(
            "[lichen.scancode] bootstrapping scancode-toolkit {} into {:?}",
            self.required_version,
            self.install_dir
        );

        fs::create_dir_all(&self.install_dir).context("cannot create tools folder")?;

        let requirement = format!("scancode-toolkit=={}", self.required_version);
        let installation = Command::new("pip")
            .arg("install")
            .arg("--quiet")
            .arg("--target")
            .arg(&self.install_dir)
            .arg(&requirement)
            .status();

        match installation {
            Ok(status) if status.success() => {},
            Ok(status) => bail!("pip install for {} failed : {:?}", requirement, status),
            Err(error) => bail!("couldn't run pip to bootstrap {} : {}", requirement, error),
        }

        let executable = self.install_dir.join("bin").join(SCANNER_EXECUTABLE);

        // a version mismatch after bootstrap is fatal and never retried
        let Some(provisioned) = installed_version(&executable, "--version", VERSION_OUTPUT_PREFIX) else {
            bail!("bootstrapped scancode at {:?} does not report a version", executable)
        };

        if provisioned != self.required_version {
            bail!(
                "bootstrapped scancode reports version {} instead of {}",
                provisioned,
                self.required_version
            )
        }

        Ok(executable)
    }

    fn locate_or_bootstrap(&self) -> anyhow::Result<PathBuf> {
        if let Some(found) = self.locate_installed() {
            log::info!("[lichen.scancode] found matching installation at {:?}", found);
            return Ok(found);
        }

        self.bootstrap()
    }
}

impl ScannerOperations for ScanCodeEngine {
    fn details(&self) -> ScannerDetails {
        ScannerDetails::new(SCANNER_NAME, &self.required_version, &self.configuration)
    }

    async fn provision(&self) -> anyhow::Result<Option<PathBuf>> {
        let executable = self
            .resolved_executable
            .get_or_try_init(|| async { self.locate_or_bootstrap() })
            .await?;

        Ok(Some(executable.clone()))
    }

    async fn run(&self, source_dir: &Utf8Path, raw_output: &Utf8Path) -> anyhow::Result<()> {
        let Some(executable) = self.provision().await? else {
            bail!("no scancode executable available")
        };

        log::info!("[lichen.scancode] scanning {}", source_dir);

        let execution = Command::new(executable)
            .arg("--license")
            .arg("--copyright")
            .arg("--quiet")
            .arg("--json-pp")
            .arg(raw_output.as_str())
            .arg(source_dir.as_str())
            .output()
            .context("couldn't run the scancode executable")?;

        if !execution.status.success() {
            let stderr = String::from_utf8_lossy(&execution.stderr);
            bail!("scancode failed with {:?} : {}", execution.status, stderr.trim())
        }

        Ok(())
    }

    fn parse(&self, raw_output: &str) -> anyhow::Result<RawScanOutcome> {
        let parsed: RawScanCodeOutput = serde_json::from_str(raw_output).context("unusable scancode output")?;

        let file_count = parsed.files.iter().filter(|entry| entry.kind == "file").count() as u32;

        let findings = parsed
            .files
            .iter()
            .flat_map(|entry| {
                entry
                    .license_detections
                    .iter()
                    .map(|detection| LicenseFinding::new(&detection.license_expression, &entry.path))
            })
            .collect::<Vec<_>>();

        let mut issues = parsed
            .headers
            .iter()
            .flat_map(|header| header.errors.iter())
            .map(|message| Issue::new(SCANNER_NAME, message, Some(Severity::Error)))
            .collect::<Vec<_>>();

        for entry in &parsed.files {
            for scan_error in &entry.scan_errors {
                let message = format!("{} : {}", entry.path, scan_error);
                issues.push(Issue::new(SCANNER_NAME, &message, Some(Severity::Warning)));
            }
        }

        Ok(RawScanOutcome {
            file_count,
            findings,
            issues,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawScanCodeOutput {
    #[serde(default)]
    headers: Vec<RawHeader>,
    #[serde(default)]
    files: Vec<RawFileEntry>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawFileEntry {
    path: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    license_detections: Vec<RawLicenseDetection>,
    #[serde(default)]
    scan_errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLicenseDetection {
    license_expression: String,
}

#[cfg(test)]
mod tests {
    use crate::core::interfaces::ScannerOperations;
    use crate::core::models::LicenseFinding;
    use crate::infra::engines::scancode::ScanCodeEngine;
    use assertor::{BooleanAssertion, EqualityAssertion};
    use std::path::PathBuf;

    static RAW_SCANCODE_OUTPUT: &str = r#"
        {
            "headers": [
                {
                    "tool_name": "scancode-toolkit",
                    "errors": []
                }
            ],
            "files": [
                {
                    "path": "leftpad-1.0.0",
                    "type": "directory",
                    "license_detections": [],
                    "scan_errors": []
                },
                {
                    "path": "leftpad-1.0.0/LICENSE",
                    "type": "file",
                    "license_detections": [
                        { "license_expression": "MIT" }
                    ],
                    "scan_errors": []
                },
                {
                    "path": "leftpad-1.0.0/index.js",
                    "type": "file",
                    "license_detections": [],
                    "scan_errors": ["ERROR: timeout after 120 seconds"]
                }
            ]
        }
    "#;

    fn engine() -> ScanCodeEngine {
        ScanCodeEngine::new("32.4.1", "copyright=true license=true", PathBuf::from("/tmp/lichen-tools"))
    }

    #[test]
    fn should_extract_findings_from_raw_output() {
        let outcome = engine().parse(RAW_SCANCODE_OUTPUT).expect("unparsable output");

        assertor::assert_that!(outcome.file_count).is_equal_to(2);
        assertor::assert_that!(outcome.findings)
            .is_equal_to(vec![LicenseFinding::new("MIT", "leftpad-1.0.0/LICENSE")]);
        assertor::assert_that!(outcome.issues.len()).is_equal_to(1);
        assertor::assert_that!(outcome.issues[0].source.clone()).is_equal_to("scancode".to_string());
    }

    #[test]
    fn should_reject_unusable_raw_output() {
        let outcome = engine().parse("not even json");

        assertor::assert_that!(outcome.is_err()).is_true();
    }
}
