// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::{
    Identifier, Package, ProvisionedSource, RawScanOutcome, ScanResult, ScannerDetails, StorageStats,
};
use camino::Utf8Path;
use std::path::PathBuf;

pub trait ScanResultsStorage {
    fn read(&self, identifier: &Identifier, scanner: &ScannerDetails) -> anyhow::Result<Vec<ScanResult>>;
    fn write(&self, identifier: &Identifier, scan_result: &ScanResult) -> anyhow::Result<()>;
    fn stats(&self) -> StorageStats;
}

pub trait SourceProvisioning {
    async fn fetch(&self, package: &Package) -> anyhow::Result<ProvisionedSource>;
}

pub trait ScannerOperations {
    fn details(&self) -> ScannerDetails;

    // resolves the tool executable at most once per process; None for
    // library-only engines with no standalone executable
    async fn provision(&self) -> anyhow::Result<Option<PathBuf>>;

    async fn run(&self, source_dir: &Utf8Path, raw_output: &Utf8Path) -> anyhow::Result<()>;

    fn parse(&self, raw_output: &str) -> anyhow::Result<RawScanOutcome>;
}
