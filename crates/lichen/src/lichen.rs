// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::{CleanupScope, Package};
use crate::core::pipeline::ScanPipeline;
use crate::infra::caching::CacheManager;
use crate::infra::reporting::console::ConsoleReporter;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub enum LichenTask {
    ScanPackages(PathBuf),
    ScanPath(PathBuf),
    CleanupEverything,
    CleanupResults,
    CleanupSources,
    CleanupTools,
}

pub struct Lichen {
    cache_manager: CacheManager,
    pipeline: ScanPipeline,
    reporter: ConsoleReporter,
}

impl Lichen {
    pub fn new(cache_manager: CacheManager, pipeline: ScanPipeline, reporter: ConsoleReporter) -> Self {
        Self {
            cache_manager,
            pipeline,
            reporter,
        }
    }

    pub async fn execute(&self, task: LichenTask) -> anyhow::Result<()> {
        match task {
            LichenTask::ScanPackages(descriptors) => self.scan_packages(&descriptors).await,
            LichenTask::ScanPath(input) => self.scan_filesystem(&input).await,
            LichenTask::CleanupEverything => self.cleanup(&CleanupScope::Everything),
            LichenTask::CleanupResults => self.cleanup(&CleanupScope::Results),
            LichenTask::CleanupSources => self.cleanup(&CleanupScope::Sources),
            LichenTask::CleanupTools => self.cleanup(&CleanupScope::Tools),
        }
    }

    async fn scan_packages(&self, descriptors: &Path) -> anyhow::Result<()> {
        let packages = load_package_descriptors(descriptors)?;

        self.reporter.report_scan_started();
        let results = self.pipeline.scan_packages(packages).await?;
        self.reporter.report_batch_outcomes(&results, self.pipeline.storage_stats());
        Ok(())
    }

    async fn scan_filesystem(&self, input: &Path) -> anyhow::Result<()> {
        let (identifier, scan_result) = self.pipeline.scan_path(input).await?;
        self.reporter.report_path_outcome(&identifier, &scan_result);
        Ok(())
    }

    fn cleanup(&self, scope: &CleanupScope) -> anyhow::Result<()> {
        match scope {
            CleanupScope::Everything => self.cache_manager.cleanup_all(),
            CleanupScope::Results => self.cache_manager.cleanup_scan_results(),
            CleanupScope::Sources => self.cache_manager.cleanup_downloaded_sources(),
            CleanupScope::Tools => self.cache_manager.cleanup_provisioned_tools(),
        }

        self.reporter.report_cleaning_finished(scope);
        Ok(())
    }
}

// descriptors are produced upstream by an ecosystem-specific dependency
// resolver; this tool only consumes them
fn load_package_descriptors(descriptors: &Path) -> anyhow::Result<Vec<Package>> {
    let serialized = std::fs::read(descriptors).context("cannot read package descriptors")?;
    let packages: Vec<Package> = serde_json::from_slice(&serialized).context("unusable package descriptors")?;
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use crate::lichen::load_package_descriptors;
    use assertor::EqualityAssertion;
    use std::fs;
    use temp_dir::TempDir;

    #[test]
    fn should_load_package_descriptors_from_json() {
        let descriptors_contents = r#"
            [
                {
                    "id": "pkg:npm/leftpad@1.0.0",
                    "declared_licenses": ["MIT"],
                    "source_artifact": {
                        "url": "https://registry.npmjs.org/leftpad/-/leftpad-1.0.0.tgz",
                        "hash": "86b1a4de4face2a44cd56f649b1d53c8316c8a9c",
                        "hash_algorithm": "SHA-1"
                    }
                },
                {
                    "id": "npm::rightpad:2.0.0"
                }
            ]
        "#;

        let workdir = TempDir::new().expect("cannot create temp dir");
        let descriptors_path = workdir.path().join("descriptors.json");
        fs::write(&descriptors_path, descriptors_contents).expect("cannot write descriptors file");

        let packages = load_package_descriptors(&descriptors_path).expect("cannot load descriptors");

        assertor::assert_that!(packages.len()).is_equal_to(2);
        assertor::assert_that!(packages[0].id.name.clone()).is_equal_to("leftpad".to_string());
        assertor::assert_that!(packages[1].id.version.clone()).is_equal_to("2.0.0".to_string());
        assertor::assert_that!(packages[1].source_artifact.clone()).is_equal_to(None);
    }
}
