//! Content-addressed manifest of the local asset directory uploaded into the
//! data bucket, plus zip staging for the cloud assembly.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, SynthError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFile {
    /// Path relative to the asset root, `/`-separated.
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub hash: String,
    pub files: Vec<AssetFile>,
}

impl AssetManifest {
    /// Walks `dir` and hashes every regular file below it.
    ///
    /// The hash covers relative paths and contents only, never timestamps.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SynthError::MissingAssetDirectory(dir.to_path_buf()));
        }

        let mut relative_paths = Vec::new();
        collect_files(dir, dir, &mut relative_paths)?;
        relative_paths.sort();

        let mut hasher = Sha256::new();
        let mut files = Vec::with_capacity(relative_paths.len());
        for path in relative_paths {
            let contents = fs::read(dir.join(&path))?;
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update((contents.len() as u64).to_le_bytes());
            hasher.update(&contents);
            files.push(AssetFile {
                path,
                size: contents.len() as u64,
            });
        }

        Ok(Self {
            hash: format!("{:x}", hasher.finalize()),
            files,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.iter().any(|file| file.path == key)
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }

    pub fn zip_file_name(&self) -> String {
        format!("asset.{}.zip", self.hash)
    }

    /// Writes the manifest's files from `source_dir` into
    /// `<out_dir>/asset.<hash>.zip` and returns the archive path.
    pub fn stage_zip(&self, source_dir: &Path, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let zip_path = out_dir.join(self.zip_file_name());

        let file = fs::File::create(&zip_path)?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);

        for asset in &self.files {
            let contents = fs::read(source_dir.join(&asset.path))?;
            zip.start_file(asset.path.as_str(), options)?;
            zip.write_all(&contents)?;
        }
        zip.finish()?;

        tracing::debug!(
            path = %zip_path.display(),
            files = self.files.len(),
            "staged asset archive"
        );
        Ok(zip_path)
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(root)
                .map_err(|error| std::io::Error::new(std::io::ErrorKind::Other, error))?;
            let key = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(key);
        }
    }
    Ok(())
}
