//! Splitting of oversize downloads into sequential upload parts.
//!
//! # Design
//! - Files at or below the limit are returned unchanged; no copy is made.
//! - Parts are named `<stem>.part<N><ext>` both on disk and for display, with
//!   `N` starting at 1.
//! - A failure removes every part written so far.

use std::path::{Path, PathBuf};

use mediarelay_core::DownloadResult;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

use crate::error::{FetchError, FetchResult};
use crate::temp::remove_quietly;

/// Split `result` into parts of at most `part_bytes` bytes.
///
/// # Errors
///
/// Returns [`FetchError::Io`] when the source cannot be read or a part cannot
/// be written.
pub async fn split_into_parts(
    result: &DownloadResult,
    part_bytes: u64,
) -> FetchResult<Vec<DownloadResult>> {
    if part_bytes == 0 || result.size <= part_bytes {
        return Ok(vec![result.clone()]);
    }

    let mut written = Vec::new();
    match write_parts(result, part_bytes, &mut written).await {
        Ok(()) => {
            info!(
                source = %result.path.display(),
                parts = written.len(),
                "split oversize download"
            );
            Ok(written)
        }
        Err(err) => {
            for part in &written {
                remove_quietly(&part.path).await;
            }
            Err(err)
        }
    }
}

async fn write_parts(
    result: &DownloadResult,
    part_bytes: u64,
    written: &mut Vec<DownloadResult>,
) -> FetchResult<()> {
    let source = tokio::fs::File::open(&result.path)
        .await
        .map_err(|err| FetchError::io("parts.open", &result.path, err))?;
    let mut remaining = result.size;
    let mut reader = source;
    let mut index = 1_usize;

    while remaining > 0 {
        let path = part_path(&result.path, index);
        let mut part = tokio::fs::File::create(&path)
            .await
            .map_err(|err| FetchError::io("parts.create", &path, err))?;
        written.push(DownloadResult {
            path: path.clone(),
            file_name: part_name(&result.file_name, index),
            size: 0,
        });

        let mut limited = (&mut reader).take(part_bytes);
        let copied = tokio::io::copy(&mut limited, &mut part)
            .await
            .map_err(|err| FetchError::io("parts.copy", &path, err))?;
        part.flush()
            .await
            .map_err(|err| FetchError::io("parts.flush", &path, err))?;
        if copied == 0 {
            remove_quietly(&path).await;
            written.pop();
            break;
        }
        if let Some(last) = written.last_mut() {
            last.size = copied;
        }
        remaining = remaining.saturating_sub(copied);
        index += 1;
    }
    Ok(())
}

/// Name of part `index` for `name`: `<stem>.part<index><ext>`.
#[must_use]
pub fn part_name(name: &str, index: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}.part{index}{}", &name[..dot], &name[dot..]),
        _ => format!("{name}.part{index}"),
    }
}

fn part_path(path: &Path, index: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(part_name(&name, index))
}
