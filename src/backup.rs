//! Workspace backup bundles.
//!
//! A bundle is a zip holding `manifest.json`, the workspace database and a
//! small metadata entry. The manifest records the SHA-256 of the database so
//! an import can refuse a damaged bundle. A bare SQLite file is also accepted
//! on import and copied into place as-is.

use crate::model::timestamp;
use crate::store::sqlite::DB_FILE_NAME;
use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/tuition.sqlite3";
const META_WORKSPACE_ENTRY: &str = "meta/workspace.json";
pub const BUNDLE_FORMAT: &str = "tuition-workspace-v1";
pub const RAW_SQLITE_FORMAT: &str = "raw-sqlite3";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub db_sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_json_entry(
    zip: &mut ZipWriter<File>,
    name: &str,
    value: &serde_json::Value,
    opts: FileOptions,
) -> anyhow::Result<()> {
    zip.start_file(name, opts)
        .with_context(|| format!("failed to start {} entry", name))?;
    zip.write_all(
        serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {}", name))?
            .as_bytes(),
    )
    .with_context(|| format!("failed to write {} entry", name))
}

pub fn export_workspace_bundle(
    workspace_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let db_path = workspace_path.join(DB_FILE_NAME);
    if !db_path.is_file() {
        return Err(anyhow!(
            "workspace database not found: {}",
            db_path.to_string_lossy()
        ));
    }
    let db_bytes = std::fs::read(&db_path)
        .with_context(|| format!("failed to read database {}", db_path.to_string_lossy()))?;
    let digest = sha256_hex(&db_bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create output file {}", out_path.to_string_lossy()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": timestamp::format(&chrono::Utc::now()),
        "dbSha256": digest,
    });
    write_json_entry(&mut zip, MANIFEST_ENTRY, &manifest, opts)?;

    zip.start_file(DB_ENTRY, opts)
        .context("failed to start database entry")?;
    zip.write_all(&db_bytes)
        .context("failed to write database entry")?;

    let workspace_meta = json!({
        "sourceWorkspace": workspace_path.to_string_lossy(),
    });
    write_json_entry(&mut zip, META_WORKSPACE_ENTRY, &workspace_meta, opts)?;

    zip.finish().context("failed to finalize zip bundle")?;
    info!(out = %out_path.to_string_lossy(), sha256 = %digest, "workspace bundle exported");

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT.to_string(),
        entry_count: 3,
        db_sha256: digest,
    })
}

/// A verified database written next to the live one, waiting to replace it.
#[derive(Debug)]
pub struct StagedImport {
    staged_path: PathBuf,
    dst: PathBuf,
    summary: ImportSummary,
}

impl StagedImport {
    /// Moves the staged database over the workspace database. The caller must
    /// not hold the database open.
    pub fn commit(self) -> anyhow::Result<ImportSummary> {
        if self.dst.exists() {
            std::fs::remove_file(&self.dst).with_context(|| {
                format!("failed to remove existing database {}", self.dst.to_string_lossy())
            })?;
        }
        std::fs::rename(&self.staged_path, &self.dst).with_context(|| {
            format!(
                "failed to move extracted database to {}",
                self.dst.to_string_lossy()
            )
        })?;
        info!(
            db = %self.dst.to_string_lossy(),
            sha256 = %self.summary.db_sha256,
            "workspace bundle imported"
        );
        Ok(self.summary)
    }
}

/// Reads and verifies a bundle (or a bare SQLite file) and stages its
/// database inside `workspace_path`. The live database is not touched, so a
/// failure here leaves the workspace usable.
pub fn stage_workspace_import(
    in_path: &Path,
    workspace_path: &Path,
) -> anyhow::Result<StagedImport> {
    std::fs::create_dir_all(workspace_path).with_context(|| {
        format!("failed to create workspace {}", workspace_path.to_string_lossy())
    })?;

    let (db_bytes, format) = if is_zip_file(in_path)? {
        (read_bundle_database(in_path)?, BUNDLE_FORMAT)
    } else {
        let bytes = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        (bytes, RAW_SQLITE_FORMAT)
    };

    let staged_path = workspace_path.join(format!("{}.importing", DB_FILE_NAME));
    {
        let mut db_out = File::create(&staged_path).with_context(|| {
            format!("failed to create temp database {}", staged_path.to_string_lossy())
        })?;
        db_out
            .write_all(&db_bytes)
            .context("failed to write extracted database")?;
        db_out.flush().context("failed to flush extracted database")?;
    }

    Ok(StagedImport {
        staged_path,
        dst: workspace_path.join(DB_FILE_NAME),
        summary: ImportSummary {
            bundle_format_detected: format.to_string(),
            db_sha256: sha256_hex(&db_bytes),
        },
    })
}

/// Restores a bundle (or a bare SQLite file) into `workspace_path`, replacing
/// any database already there. The caller must not hold the database open.
pub fn import_workspace_bundle(
    in_path: &Path,
    workspace_path: &Path,
) -> anyhow::Result<ImportSummary> {
    stage_workspace_import(in_path, workspace_path)?.commit()
}

/// The database entry of a bundle, checked against the manifest digest.
fn read_bundle_database(in_path: &Path) -> anyhow::Result<Vec<u8>> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut db_bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .with_context(|| format!("bundle missing {}", DB_ENTRY))?
        .read_to_end(&mut db_bytes)
        .context("failed to extract database entry")?;

    let digest = sha256_hex(&db_bytes);
    if let Some(expected) = manifest.get("dbSha256").and_then(|v| v.as_str()) {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(anyhow!(
                "database checksum mismatch: manifest {}, bundle {}",
                expected,
                digest
            ));
        }
    }
    Ok(db_bytes)
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
