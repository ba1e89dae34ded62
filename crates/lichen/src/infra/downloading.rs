// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::interfaces::SourceProvisioning;
use crate::core::models::{Package, Provenance, ProvisionedSource};
use crate::infra::caching::CacheManager;
use crate::infra::networking::http::HTTPClient;
use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use chrono::Utc;
use decompress::{Decompressor, ExtractOptsBuilder, decompressors};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

static SOURCE_TARBALL_FILE_NAME: &str = "source.tar.gz";

pub struct ArtifactDownloader {
    http_client: Arc<HTTPClient>,
    cache_manager: CacheManager,
}

impl ArtifactDownloader {
    pub fn new(http_client: Arc<HTTPClient>, cache_manager: CacheManager) -> Self {
        Self {
            http_client,
            cache_manager,
        }
    }

    async fn download_tarball(&self, endpoint: &str) -> anyhow::Result<bytes::Bytes> {
        let response = self
            .http_client
            .get(endpoint)
            .send()
            .await?
            .error_for_status()
            .context("[lichen.downloads] failed to download source artifact")?;

        let downloaded = response.bytes().await?;
        Ok(downloaded)
    }

    // the scratch directory is exclusive to this fetch : any leftovers from
    // an earlier run are wiped before extraction
    fn scratch_dir(&self, package: &Package) -> anyhow::Result<std::path::PathBuf> {
        let scratch = self
            .cache_manager
            .temporary_downloads_dir()
            .join(format!("{}-{}", package.id.name, package.id.version));

        match fs::remove_dir_all(&scratch) {
            Ok(_) => log::info!("[lichen.downloads] removed previous sources for {}", package.id),
            Err(_) => log::info!("[lichen.downloads] no previous sources found for {}", package.id),
        };

        fs::create_dir_all(&scratch).context("failed to create download folder")?;
        Ok(scratch)
    }
}

impl SourceProvisioning for ArtifactDownloader {
    async fn fetch(&self, package: &Package) -> anyhow::Result<ProvisionedSource> {
        let Some(source_artifact) = &package.source_artifact else {
            bail!("no source artifact declared for {}", package.id)
        };

        log::info!("[lichen.downloads] downloading sources for {}", package.id);
        let downloaded = self.download_tarball(source_artifact.url.as_str()).await?;
        let download_time = Utc::now();

        let scratch = self.scratch_dir(package)?;
        let tarball_path = scratch.join(SOURCE_TARBALL_FILE_NAME);
        fs::write(&tarball_path, downloaded).context("failed to save source archive")?;

        log::info!("[lichen.downloads] decompressing sources for {}", package.id);
        let decompressor = decompressors::targz::Targz::default();
        let extraction_opts = ExtractOptsBuilder::default().build()?;
        decompressor.decompress(&tarball_path, &scratch, &extraction_opts)?;
        fs::remove_file(&tarball_path).context("failed to remove source archive")?;

        let extracted_root = locate_extracted_root(&scratch)?;

        if !contains_any_file(&extracted_root) {
            bail!("source artifact for {} extracted to an empty tree", package.id)
        }

        let provenance = Provenance {
            download_time,
            source_artifact: Some(source_artifact.clone()),
            vcs_info: package.vcs.clone(),
            original_vcs_info: package.vcs.clone(),
        };

        log::info!("[lichen.downloads] sources ready for {}", package.id);
        let source_dir = Utf8PathBuf::try_from(extracted_root).context("cannot get an utf-8 path")?;
        Ok(ProvisionedSource { source_dir, provenance })
    }
}

// tarballs conventionally extract to a single name-version folder; anything
// else is treated as extracted-in-place
fn locate_extracted_root(scratch: &Path) -> anyhow::Result<std::path::PathBuf> {
    let entries = fs::read_dir(scratch)?
        .filter_map(|entry| entry.ok())
        .collect::<Vec<_>>();

    if entries.len() == 1 && entries[0].path().is_dir() {
        return Ok(entries[0].path());
    }

    Ok(scratch.to_path_buf())
}

fn contains_any_file(root: &Path) -> bool {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_type().is_file())
}

#[cfg(test)]
mod tests {
    use crate::core::interfaces::SourceProvisioning;
    use crate::core::models::{Identifier, Package, RemoteArtifact};
    use crate::infra::caching::CacheManager;
    use crate::infra::downloading::ArtifactDownloader;
    use crate::infra::networking::http::HTTP_CLIENT;
    use assertor::{BooleanAssertion, EqualityAssertion};
    use httpmock::prelude::*;
    use temp_dir::TempDir;
    use url::Url;

    static LEFTPAD_TARBALL: &[u8] = include_bytes!("../../tests/fixtures/leftpad-1.0.0.tar.gz");

    fn package_with_artifact(artifact_url: &str) -> Package {
        Package {
            id: Identifier::new("npm", "", "leftpad", "1.0.0"),
            declared_licenses: vec!["MIT".to_string()],
            homepage_url: None,
            vcs: None,
            source_artifact: Some(RemoteArtifact {
                url: Url::parse(artifact_url).expect("invalid artifact url"),
                hash: "abc123".to_string(),
                hash_algorithm: "SHA-1".to_string(),
            }),
            binary_artifact: None,
        }
    }

    #[tokio::test]
    async fn should_download_and_extract_source_artifacts() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/artifacts/leftpad-1.0.0.tar.gz");
                then.status(200).body(LEFTPAD_TARBALL);
            })
            .await;

        let cache_root = TempDir::new().expect("cannot create temp dir");
        let downloader = ArtifactDownloader::new(
            HTTP_CLIENT.clone(),
            CacheManager::rooted_at(cache_root.path().to_path_buf()),
        );

        let artifact_url = server.url("/artifacts/leftpad-1.0.0.tar.gz");
        let package = package_with_artifact(&artifact_url);

        let provisioned = downloader.fetch(&package).await.expect("fetch failed");

        assertor::assert_that!(provisioned.source_dir.join("LICENSE").exists()).is_true();
        assertor::assert_that!(provisioned.provenance.source_artifact).is_equal_to(package.source_artifact);
    }

    #[tokio::test]
    async fn should_fail_when_the_artifact_is_unreachable() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/artifacts/leftpad-1.0.0.tar.gz");
                then.status(404);
            })
            .await;

        let cache_root = TempDir::new().expect("cannot create temp dir");
        let downloader = ArtifactDownloader::new(
            HTTP_CLIENT.clone(),
            CacheManager::rooted_at(cache_root.path().to_path_buf()),
        );

        let artifact_url = server.url("/artifacts/leftpad-1.0.0.tar.gz");
        let package = package_with_artifact(&artifact_url);

        let outcome = downloader.fetch(&package).await;

        assertor::assert_that!(outcome.is_err()).is_true();
    }

    #[tokio::test]
    async fn should_fail_when_no_source_artifact_is_declared() {
        let cache_root = TempDir::new().expect("cannot create temp dir");
        let downloader = ArtifactDownloader::new(
            HTTP_CLIENT.clone(),
            CacheManager::rooted_at(cache_root.path().to_path_buf()),
        );

        let mut package = package_with_artifact("https://registry.invalid/leftpad.tar.gz");
        package.source_artifact = None;

        let outcome = downloader.fetch(&package).await;

        assertor::assert_that!(outcome.is_err()).is_true();
    }
}
