use crate::core::clean::remove_dir_force;
use crate::domain::model::FetchOutcome;
use crate::utils::error::{PackagerError, Result};
use reqwest::Client;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use zip::ZipArchive;

/// Where the JavaFX modules should live and which archive provides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub target_dir: PathBuf,
    pub version: String,
    pub classifier: String,
    pub base_url: String,
}

impl FetchRequest {
    pub fn archive_name(&self) -> String {
        format!("openjfx-{}_{}_bin-jmods.zip", self.version, self.classifier)
    }

    pub fn download_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.version,
            self.archive_name()
        )
    }

    /// Directory the archive unpacks to inside `target_dir`.
    pub fn module_dir(&self) -> PathBuf {
        self.target_dir.join(format!("javafx-jmods-{}", self.version))
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .target_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jmods".to_string());
        self.target_dir.with_file_name(format!("{}{}", name, suffix))
    }

    fn staging_dir(&self) -> PathBuf {
        self.sibling(".partial")
    }

    fn archive_path(&self) -> PathBuf {
        self.sibling(".download.zip")
    }
}

pub struct AssetFetcher {
    client: Client,
}

impl AssetFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Make sure the modules in `request` exist locally.
    ///
    /// An existing target directory is never re-downloaded. A fresh download
    /// is unpacked into a staging directory and only moved into place once
    /// every entry was written, so a failed run leaves nothing behind.
    pub async fn ensure(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        if request.target_dir.exists() {
            tracing::info!(
                "JavaFX modules already present in {}",
                request.target_dir.display()
            );
            verify_module_layout(&request.module_dir())?;
            return Ok(FetchOutcome::AlreadyPresent {
                module_dir: request.module_dir(),
            });
        }

        if let Some(parent) = request.target_dir.parent() {
            fs::create_dir_all(parent).map_err(|e| PackagerError::fs("creating", parent, e))?;
        }

        let staging = request.staging_dir();
        let archive = request.archive_path();
        remove_dir_force(&staging)?;
        remove_dir_force(&archive)?;

        let result = self.download_and_extract(request, &archive, &staging).await;

        if let Err(e) = remove_dir_force(&archive) {
            tracing::warn!("Could not remove {}: {}", archive.display(), e);
        }

        let files = match result {
            Ok(files) => files,
            Err(e) => {
                discard_staging(&staging);
                return Err(e);
            }
        };
        promote_staging(&staging, &request.target_dir)?;
        tracing::info!(
            "Extracted {} files into {}",
            files,
            request.target_dir.display()
        );
        Ok(FetchOutcome::Downloaded {
            url: request.download_url(),
            files,
            module_dir: request.module_dir(),
        })
    }

    async fn download_and_extract(
        &self,
        request: &FetchRequest,
        archive: &Path,
        staging: &Path,
    ) -> Result<usize> {
        let url = request.download_url();
        tracing::info!("Downloading JavaFX jmods from {}", url);

        let bytes = self.download(&url, archive).await?;
        tracing::debug!("Downloaded {} bytes to {}", bytes, archive.display());

        let files = extract_archive(archive, staging)?;
        let module_dir_name = request
            .module_dir()
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        verify_module_layout(&staging.join(module_dir_name))?;
        Ok(files)
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(PackagerError::DownloadStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| PackagerError::fs("creating", destination, e))?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(|e| PackagerError::fs("writing", destination, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| PackagerError::fs("writing", destination, e))?;

        Ok(written)
    }
}

impl Default for AssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Move a fully extracted staging directory to its final location.
fn promote_staging(staging: &Path, target: &Path) -> Result<()> {
    fs::rename(staging, target).map_err(|e| {
        discard_staging(staging);
        PackagerError::fs("moving modules into", target, e)
    })
}

fn discard_staging(staging: &Path) {
    if let Err(e) = remove_dir_force(staging) {
        tracing::warn!("Could not remove {}: {}", staging.display(), e);
    }
}

/// Unpack every entry of `archive` under `destination`, keeping directory
/// structure. Returns the number of files written.
pub fn extract_archive(archive: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive).map_err(|e| PackagerError::fs("opening", archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(destination)
        .map_err(|e| PackagerError::fs("creating", destination, e))?;

    let mut files = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| PackagerError::ExtractionError {
                entry: entry.name().to_string(),
                message: "entry path escapes the target directory".to_string(),
            })?;
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| PackagerError::fs("creating", &out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PackagerError::fs("creating", parent, e))?;
        }
        let mut out =
            File::create(&out_path).map_err(|e| PackagerError::fs("creating", &out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| PackagerError::ExtractionError {
            entry: entry.name().to_string(),
            message: e.to_string(),
        })?;
        files += 1;
    }

    Ok(files)
}

/// The module directory must hold at least one `.jmod` before linking.
pub fn verify_module_layout(module_dir: &Path) -> Result<()> {
    let entries = fs::read_dir(module_dir).map_err(|_| PackagerError::ModuleLayoutError {
        path: module_dir.to_path_buf(),
        message: "expected module directory is missing".to_string(),
    })?;

    let has_jmod = entries
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "jmod"));

    if has_jmod {
        Ok(())
    } else {
        Err(PackagerError::ModuleLayoutError {
            path: module_dir.to_path_buf(),
            message: "no .jmod files found".to_string(),
        })
    }
}
