// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::interfaces::{ScanResultsStorage, ScannerOperations, SourceProvisioning};
use crate::core::models::{
    Identifier, Package, ProvisionedSource, RawScanOutcome, ScanResult, ScannerDetails, StorageStats,
};
use crate::infra::caching::results::FileBasedResultsStore;
use crate::infra::downloading::ArtifactDownloader;
use crate::infra::engines::scancode::ScanCodeEngine;
use camino::Utf8Path;
use std::path::PathBuf;

#[cfg(test)]
use crate::core::keys::CacheKey;
#[cfg(test)]
use crate::core::models::Provenance;
#[cfg(test)]
use anyhow::bail;
#[cfg(test)]
use camino::Utf8PathBuf;
#[cfg(test)]
use chrono::Utc;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

pub enum ResultsStore {
    FileSystem(FileBasedResultsStore),
    #[cfg(test)]
    InMemory(InMemoryResultsStore),
}

impl ScanResultsStorage for ResultsStore {
    fn read(&self, identifier: &Identifier, scanner: &ScannerDetails) -> anyhow::Result<Vec<ScanResult>> {
        match self {
            ResultsStore::FileSystem(delegate) => delegate.read(identifier, scanner),
            #[cfg(test)]
            ResultsStore::InMemory(fake) => fake.read(identifier, scanner),
        }
    }

    fn write(&self, identifier: &Identifier, scan_result: &ScanResult) -> anyhow::Result<()> {
        match self {
            ResultsStore::FileSystem(delegate) => delegate.write(identifier, scan_result),
            #[cfg(test)]
            ResultsStore::InMemory(fake) => fake.write(identifier, scan_result),
        }
    }

    fn stats(&self) -> StorageStats {
        match self {
            ResultsStore::FileSystem(delegate) => delegate.stats(),
            #[cfg(test)]
            ResultsStore::InMemory(fake) => fake.stats(),
        }
    }
}

pub enum SourceProvisioner {
    RemoteArtifact(ArtifactDownloader),
    #[cfg(test)]
    Fake(FakeSourceProvisioner),
}

impl SourceProvisioning for SourceProvisioner {
    async fn fetch(&self, package: &Package) -> anyhow::Result<ProvisionedSource> {
        match self {
            SourceProvisioner::RemoteArtifact(delegate) => delegate.fetch(package).await,
            #[cfg(test)]
            SourceProvisioner::Fake(fake) => fake.fetch(package).await,
        }
    }
}

pub enum ScannerEngine {
    ScanCode(ScanCodeEngine),
    #[cfg(test)]
    Fake(FakeScannerEngine),
}

impl ScannerOperations for ScannerEngine {
    fn details(&self) -> ScannerDetails {
        match self {
            ScannerEngine::ScanCode(delegate) => delegate.details(),
            #[cfg(test)]
            ScannerEngine::Fake(fake) => fake.details(),
        }
    }

    async fn provision(&self) -> anyhow::Result<Option<PathBuf>> {
        match self {
            ScannerEngine::ScanCode(delegate) => delegate.provision().await,
            #[cfg(test)]
            ScannerEngine::Fake(fake) => fake.provision().await,
        }
    }

    async fn run(&self, source_dir: &Utf8Path, raw_output: &Utf8Path) -> anyhow::Result<()> {
        match self {
            ScannerEngine::ScanCode(delegate) => delegate.run(source_dir, raw_output).await,
            #[cfg(test)]
            ScannerEngine::Fake(fake) => fake.run(source_dir, raw_output).await,
        }
    }

    fn parse(&self, raw_output: &str) -> anyhow::Result<RawScanOutcome> {
        match self {
            ScannerEngine::ScanCode(delegate) => delegate.parse(raw_output),
            #[cfg(test)]
            ScannerEngine::Fake(fake) => fake.parse(raw_output),
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct InMemoryResultsStore {
    entries: Mutex<HashMap<String, Vec<ScanResult>>>,
    reads: AtomicU64,
    writes: AtomicU64,
    failing: bool,
}

#[cfg(test)]
impl InMemoryResultsStore {
    pub fn broken() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("poisoned store lock").len()
    }
}

#[cfg(test)]
impl ScanResultsStorage for InMemoryResultsStore {
    fn read(&self, identifier: &Identifier, scanner: &ScannerDetails) -> anyhow::Result<Vec<ScanResult>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            bail!("cannot read stored scan results")
        }

        let key = CacheKey::derive(identifier, scanner);
        let entries = self.entries.lock().expect("poisoned store lock");
        Ok(entries.get(key.as_str()).cloned().unwrap_or_default())
    }

    fn write(&self, identifier: &Identifier, scan_result: &ScanResult) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            bail!("cannot persist scan results")
        }

        let key = CacheKey::derive(identifier, &scan_result.scanner);
        let mut entries = self.entries.lock().expect("poisoned store lock");
        entries.entry(key.as_str().to_string()).or_default().push(scan_result.clone());
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
pub struct FakeSourceProvisioner {
    failing_packages: Vec<String>,
    fetches: AtomicU64,
}

#[cfg(test)]
impl FakeSourceProvisioner {
    pub fn new(failing_packages: Vec<String>) -> Self {
        Self {
            failing_packages,
            fetches: AtomicU64::new(0),
        }
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SourceProvisioning for FakeSourceProvisioner {
    async fn fetch(&self, package: &Package) -> anyhow::Result<ProvisionedSource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.failing_packages.contains(&package.id.name) {
            bail!("cannot fetch source artifact for {}", package.id)
        }

        let scratch = std::env::temp_dir()
            .join("lichen-fake-sources")
            .join(&package.id.name)
            .join(&package.id.version);
        std::fs::create_dir_all(&scratch)?;
        std::fs::write(scratch.join("README.md"), "fixture")?;

        let provenance = Provenance {
            download_time: Utc::now(),
            source_artifact: package.source_artifact.clone(),
            vcs_info: package.vcs.clone(),
            original_vcs_info: package.vcs.clone(),
        };

        let source_dir = Utf8PathBuf::try_from(scratch).expect("non utf-8 scratch dir");
        Ok(ProvisionedSource { source_dir, provenance })
    }
}

#[cfg(test)]
pub struct FakeScannerEngine {
    details: ScannerDetails,
    outcome: RawScanOutcome,
    failing: bool,
    invocations: AtomicU64,
}

#[cfg(test)]
impl FakeScannerEngine {
    pub fn new(details: ScannerDetails, outcome: RawScanOutcome) -> Self {
        Self {
            details,
            outcome,
            failing: false,
            invocations: AtomicU64::new(0),
        }
    }

    pub fn broken(details: ScannerDetails) -> Self {
        Self {
            details,
            outcome: RawScanOutcome {
                file_count: 0,
                findings: vec![],
                issues: vec![],
            },
            failing: true,
            invocations: AtomicU64::new(0),
        }
    }

    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl ScannerOperations for FakeScannerEngine {
    fn details(&self) -> ScannerDetails {
        self.details.clone()
    }

    async fn provision(&self) -> anyhow::Result<Option<PathBuf>> {
        Ok(None)
    }

    async fn run(&self, _: &Utf8Path, raw_output: &Utf8Path) -> anyhow::Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            bail!("scanner exited with status 2")
        }

        std::fs::write(raw_output, "{}")?;
        Ok(())
    }

    fn parse(&self, _: &str) -> anyhow::Result<RawScanOutcome> {
        Ok(self.outcome.clone())
    }
}
