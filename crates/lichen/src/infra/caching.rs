// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use std::env::home_dir;
use std::path::{Path, PathBuf};

pub mod results;

static CACHE_FOLDER_RESULTS: &str = "results";
static CACHE_FOLDER_TOOLS: &str = "tools";
static TEMP_DOWNLOADS_FOLDER: &str = "downloads";

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn get() -> Self {
        let cache_dir = match home_dir() {
            None => PathBuf::from("/var/cache/.lichen"),
            Some(dir) => dir.join(".lichen"),
        };
        Self { cache_dir }
    }

    #[cfg(test)]
    pub fn rooted_at(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn temporary_downloads_dir(&self) -> PathBuf {
        self.cache_dir.join(TEMP_DOWNLOADS_FOLDER)
    }

    pub fn scan_results_dir(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FOLDER_RESULTS)
    }

    pub fn provisioned_tools_dir(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FOLDER_TOOLS)
    }

    pub fn cleanup_scan_results(&self) {
        self.cleanup(self.scan_results_dir().as_path());
    }

    pub fn cleanup_downloaded_sources(&self) {
        self.cleanup(self.temporary_downloads_dir().as_path());
    }

    pub fn cleanup_provisioned_tools(&self) {
        self.cleanup(self.provisioned_tools_dir().as_path());
    }

    pub fn cleanup_all(&self) {
        self.cleanup(self.cache_dir.as_path());
    }

    fn cleanup(&self, target_folder: &Path) {
        match std::fs::remove_dir_all(target_folder) {
            Ok(_) => log::info!("[lichen.cache] removed {:?}", target_folder),
            Err(_) => log::error!("[lichen.cache] cannot remove : {:?}", target_folder),
        }
    }
}
