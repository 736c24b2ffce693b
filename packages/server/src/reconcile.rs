//! Read-only cross-check between stored blobs and records.

use std::collections::{BTreeMap, HashMap, HashSet};

use common::storage::{BlobEntry, BlobStore, StorageKind, blob_name_from_ref};

use crate::error::AppError;
use crate::models::diagnostics::{MissingFile, ServerFile, ServerFilesResponse};
use crate::store::{RecordStore, TattooRecord};

/// Enumerate both stores and build the reconciliation report.
pub async fn inspect(
    blobs: &dyn BlobStore,
    records: &dyn RecordStore,
) -> Result<ServerFilesResponse, AppError> {
    let listing = blobs.list().await?;
    let records = records.list_all().await?;
    Ok(reconcile(blobs.kind(), listing, &records))
}

/// Compute unused blobs and records with missing blobs.
///
/// `listing` is `None` for stores that cannot be enumerated; the blob set is
/// then derived from the records themselves, so only references without a
/// usable blob name can be reported missing.
pub fn reconcile(
    kind: StorageKind,
    listing: Option<Vec<BlobEntry>>,
    records: &[TattooRecord],
) -> ServerFilesResponse {
    let mut referenced: HashMap<&str, Vec<String>> = HashMap::new();
    for record in records {
        if let Some(name) = blob_name_from_ref(&record.image_ref) {
            referenced
                .entry(name)
                .or_default()
                .push(record.id.to_string());
        }
    }

    let enumerable = listing.is_some();
    let blobs = listing.unwrap_or_else(|| derive_blobs(records));
    let known: HashSet<&str> = blobs.iter().map(|b| b.name.as_str()).collect();

    let mut files: Vec<ServerFile> = blobs
        .iter()
        .map(|blob| {
            let record_ids = referenced
                .get(blob.name.as_str())
                .cloned()
                .unwrap_or_default();
            ServerFile {
                name: blob.name.clone(),
                url: blob.url.clone(),
                size: blob.size,
                used: !record_ids.is_empty(),
                record_ids,
            }
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let missing_files: Vec<MissingFile> = records
        .iter()
        .filter_map(|record| {
            let name = blob_name_from_ref(&record.image_ref);
            match name {
                Some(n) if known.contains(n) => None,
                _ => Some(MissingFile {
                    record_id: record.id.to_string(),
                    image_ref: record.image_ref.clone(),
                    name: name.map(str::to_string),
                }),
            }
        })
        .collect();

    let used_files = files.iter().filter(|f| f.used).count();

    ServerFilesResponse {
        storage: kind.as_str().to_string(),
        enumerable,
        total_files: files.len(),
        used_files,
        unused_files: files.len() - used_files,
        total_records: records.len(),
        files,
        missing_files,
    }
}

/// Blob set implied by record references, one entry per distinct name.
fn derive_blobs(records: &[TattooRecord]) -> Vec<BlobEntry> {
    let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();
    for record in records {
        if let Some(name) = blob_name_from_ref(&record.image_ref) {
            by_name.entry(name).or_insert(&record.image_ref);
        }
    }
    by_name
        .into_iter()
        .map(|(name, url)| BlobEntry {
            name: name.to_string(),
            url: url.to_string(),
            size: None,
        })
        .collect()
}
