// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::collaborators::{ResultsStore, ScannerEngine, SourceProvisioner};
use crate::core::keys::canonical_configuration;
use crate::core::pipeline::ScanPipeline;
use crate::infra::caching::CacheManager;
use crate::infra::caching::results::FileBasedResultsStore;
use crate::infra::downloading::ArtifactDownloader;
use crate::infra::engines::scancode::ScanCodeEngine;
use crate::infra::networking::http::HTTP_CLIENT;
use crate::infra::reporting::console::ConsoleReporter;
use crate::lichen::Lichen;

pub static REQUIRED_SCANCODE_VERSION: &str = "32.4.1";

fn results_store() -> ResultsStore {
    let delegate = FileBasedResultsStore::new(CacheManager::get());
    ResultsStore::FileSystem(delegate)
}

fn source_provisioner() -> SourceProvisioner {
    let delegate = ArtifactDownloader::new(HTTP_CLIENT.clone(), CacheManager::get());
    SourceProvisioner::RemoteArtifact(delegate)
}

fn scanner_engine() -> ScannerEngine {
    let configuration = canonical_configuration(&[("copyright", "true"), ("license", "true")]);
    let install_dir = CacheManager::get().provisioned_tools_dir().join("scancode");
    let delegate = ScanCodeEngine::new(REQUIRED_SCANCODE_VERSION, &configuration, install_dir);
    ScannerEngine::ScanCode(delegate)
}

pub fn create_lichen(turnoff_colors: bool) -> Lichen {
    let pipeline = ScanPipeline::new(results_store(), source_provisioner(), scanner_engine());
    let reporter = ConsoleReporter::new(!turnoff_colors);
    Lichen::new(CacheManager::get(), pipeline, reporter)
}
