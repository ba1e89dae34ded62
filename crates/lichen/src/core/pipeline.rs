// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::collaborators::{ResultsStore, ScannerEngine, SourceProvisioner};
use crate::core::interfaces::{ScanResultsStorage, ScannerOperations, SourceProvisioning};
use crate::core::models::{
    BatchScanResults, Identifier, Issue, Package, Provenance, ProvisionedSource, ScanResult, ScanSummary,
    ScannerDetails, Severity, StorageStats,
};
use crate::core::normalizing;
use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use std::path::Path;

pub struct ScanPipeline {
    results_store: ResultsStore,
    source_provisioner: SourceProvisioner,
    engine: ScannerEngine,
}

impl ScanPipeline {
    pub fn new(results_store: ResultsStore, source_provisioner: SourceProvisioner, engine: ScannerEngine) -> Self {
        Self {
            results_store,
            source_provisioner,
            engine,
        }
    }

    // Batch contract : one outcome per package, in input order. A package
    // failing to download or scan never aborts the others; only a
    // non-provisionable tool fails the whole run.
    pub async fn scan_packages(&self, packages: Vec<Package>) -> anyhow::Result<BatchScanResults> {
        self.engine.provision().await?;

        let mut outcomes = vec![];

        for package in packages {
            log::info!("[lichen.pipeline] processing {}", package.id);
            let results = self.scan_package(&package).await;
            outcomes.push((package, results));
        }

        Ok(BatchScanResults { outcomes })
    }

    // Path-only variant : no package identity to key on, hence the results
    // store is never consulted and the outcome is never persisted
    pub async fn scan_path(&self, input: &Path) -> anyhow::Result<(Identifier, ScanResult)> {
        if !input.exists() {
            bail!("lichen.pipeline : no such file or directory ({:?})", input)
        }

        self.engine.provision().await?;

        let identifier = Identifier::synthesized_from(input);
        let source_dir = Utf8PathBuf::try_from(input.to_path_buf()).context("cannot get an utf-8 path")?;

        let observed_at = Utc::now();
        let provisioned = ProvisionedSource {
            source_dir,
            provenance: Provenance::empty(observed_at),
        };

        let scanner = self.engine.details();
        let scan_result = self
            .run_scanner(&provisioned, &scanner)
            .await
            .unwrap_or_else(|error| failed_result(&provisioned.provenance, &scanner, &error));

        Ok((identifier, scan_result))
    }

    async fn scan_package(&self, package: &Package) -> Vec<ScanResult> {
        let scanner = self.engine.details();

        let existing = match self.results_store.read(&package.id, &scanner) {
            Ok(found) => found,
            Err(error) => {
                // a broken store read counts as a miss, never as a failure
                log::error!("[lichen.pipeline] store read failed for {} | {}", package.id, error);
                vec![]
            },
        };

        if !existing.is_empty() {
            log::info!("[lichen.pipeline] reusing stored scan results for {}", package.id);
            return existing;
        }

        let lookup_time = Utc::now();

        let provisioned = match self.source_provisioner.fetch(package).await {
            Ok(downloaded) => downloaded,
            Err(error) => {
                log::warn!("[lichen.pipeline] cannot download sources for {} | {}", package.id, error);
                let provenance = Provenance::empty(lookup_time);
                return vec![failed_result(&provenance, &scanner, &error)];
            },
        };

        let scan_result = match self.run_scanner(&provisioned, &scanner).await {
            Ok(complete) => complete,
            Err(error) => {
                // returned but not stored, so a future run retries the scan
                log::warn!("[lichen.pipeline] cannot scan sources for {} | {}", package.id, error);
                return vec![failed_result(&provisioned.provenance, &scanner, &error)];
            },
        };

        if let Err(error) = self.results_store.write(&package.id, &scan_result) {
            log::error!("[lichen.pipeline] store write failed for {} | {}", package.id, error);
        }

        vec![scan_result]
    }

    async fn run_scanner(
        &self,
        provisioned: &ProvisionedSource,
        scanner: &ScannerDetails,
    ) -> anyhow::Result<ScanResult> {
        let raw_artifact = raw_artifact_path(&provisioned.source_dir, &scanner.name);

        let start_time = Utc::now();
        self.engine.run(&provisioned.source_dir, &raw_artifact).await?;
        let end_time = Utc::now();

        let raw_output = std::fs::read_to_string(&raw_artifact).context("cannot read raw scanner output")?;
        let outcome = self.engine.parse(&raw_output)?;
        let summary = normalizing::normalize(start_time, end_time, outcome);

        let scan_result = ScanResult {
            provenance: provisioned.provenance.clone(),
            scanner: scanner.clone(),
            summary,
            raw_result: Some(raw_artifact),
        };

        Ok(scan_result)
    }

    pub fn storage_stats(&self) -> StorageStats {
        self.results_store.stats()
    }
}

// one raw artifact per (package, scanner) pair, deterministically named
// after the scanned directory; outlives the in-memory reference to it
fn raw_artifact_path(source_dir: &Utf8Path, scanner_name: &str) -> Utf8PathBuf {
    let dir_name = source_dir.file_name().unwrap_or("scan");
    let artifact_name = format!("{}_{}.json", dir_name, scanner_name);
    match source_dir.parent() {
        Some(parent) => parent.join(artifact_name),
        None => source_dir.join(artifact_name),
    }
}

fn failed_result(provenance: &Provenance, scanner: &ScannerDetails, error: &anyhow::Error) -> ScanResult {
    let issue = Issue::new(&scanner.name, &error.to_string(), Some(Severity::Error));
    let observed_at = Utc::now();

    ScanResult {
        provenance: provenance.clone(),
        scanner: scanner.clone(),
        summary: ScanSummary::empty(provenance.download_time, observed_at, issue),
        raw_result: None,
    }
}
