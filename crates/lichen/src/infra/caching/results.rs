// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::interfaces::ScanResultsStorage;
use crate::core::keys::CacheKey;
use crate::core::models::{Identifier, ScanResult, ScannerDetails, StorageStats};
use crate::infra::caching::CacheManager;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static SCAN_RESULT_FILE_NAME: &str = "scan-result.json";

pub struct FileBasedResultsStore {
    cache_manager: CacheManager,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl FileBasedResultsStore {
    pub fn new(cache_manager: CacheManager) -> Self {
        Self {
            cache_manager,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    fn data_dir(&self, cache_key: &CacheKey) -> PathBuf {
        self.cache_manager.scan_results_dir().join(cache_key.as_str())
    }
}

impl ScanResultsStorage for FileBasedResultsStore {
    fn read(&self, identifier: &Identifier, scanner: &ScannerDetails) -> anyhow::Result<Vec<ScanResult>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let destination_dir = self.data_dir(&CacheKey::derive(identifier, scanner));
        let cache_file = destination_dir.join(SCAN_RESULT_FILE_NAME);

        if !cache_file.exists() {
            log::info!("[lichen.cache] {:?} not found", destination_dir);
            return Ok(vec![]);
        }

        log::info!("[lichen.cache] cache hit at {:?}", cache_file);
        let serialized = std::fs::read(cache_file)?;
        let scan_result: ScanResult = serde_json::from_slice(&serialized)?;
        Ok(vec![scan_result])
    }

    fn write(&self, identifier: &Identifier, scan_result: &ScanResult) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        let destination_dir = self.data_dir(&CacheKey::derive(identifier, &scan_result.scanner));
        let cache_file = destination_dir.join(SCAN_RESULT_FILE_NAME);

        if !destination_dir.exists() {
            std::fs::create_dir_all(&destination_dir)?;
            log::info!("[lichen.cache] {:?} created", destination_dir);
        }

        // only complete scan results land here; entries under other keys
        // stay untouched since every key owns its own directory
        let serialized = serde_json::to_vec(scan_result)?;
        std::fs::write(&cache_file, serialized)?;
        log::info!("[lichen.cache] {:?} saved", cache_file);
        Ok(())
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
        }
    }
}
