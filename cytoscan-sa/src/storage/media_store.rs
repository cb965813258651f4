//! Filesystem-backed media store
//!
//! The object-store collaborator of the upload handler: accepts raw
//! bytes, files them under the root folder per media kind, and returns
//! the key plus the public URL the router serves them back from.
//!
//! Keys are prefixed with a content digest so duplicate uploads of the
//! same bytes land on the same key instead of piling up copies.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use cytoscan_common::{Error, Result};

use crate::models::MediaKind;

/// Stored media handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Storage key within the bucket (digest-prefixed filename)
    pub key: String,
    /// URL the file is served back from
    pub public_url: String,
    /// Absolute path of the stored file
    pub path: PathBuf,
}

/// Filesystem media store rooted at `<root folder>/media`
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory all media is stored under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the bucket directories if missing
    pub fn ensure_buckets(&self) -> Result<()> {
        for kind in [MediaKind::Video, MediaKind::Image] {
            std::fs::create_dir_all(self.root.join(kind.bucket()))
                .map_err(|e| Error::Storage(format!("Failed to create bucket: {}", e)))?;
        }
        Ok(())
    }

    /// Store one upload and return its key and public URL
    ///
    /// Writes via a temp file and rename so a crash never leaves a
    /// half-written object at the final key.
    pub fn store(&self, kind: MediaKind, filename: &str, bytes: &[u8]) -> Result<StoredMedia> {
        let key = Self::object_key(filename, bytes);
        let bucket_dir = self.root.join(kind.bucket());
        let final_path = bucket_dir.join(&key);

        if !final_path.exists() {
            std::fs::create_dir_all(&bucket_dir)
                .map_err(|e| Error::Storage(format!("Failed to create bucket: {}", e)))?;

            let tmp_path = bucket_dir.join(format!(".{}.tmp", key));
            std::fs::write(&tmp_path, bytes)
                .map_err(|e| Error::Storage(format!("Failed to write media: {}", e)))?;
            std::fs::rename(&tmp_path, &final_path)
                .map_err(|e| Error::Storage(format!("Failed to finalize media: {}", e)))?;

            tracing::info!(key = %key, bucket = kind.bucket(), bytes = bytes.len(), "Stored media object");
        } else {
            tracing::debug!(key = %key, bucket = kind.bucket(), "Media object already stored");
        }

        Ok(StoredMedia {
            public_url: format!("/media/{}/{}", kind.bucket(), key),
            path: final_path,
            key,
        })
    }

    /// Content-addressed key: short SHA-256 digest + sanitized filename
    fn object_key(filename: &str, bytes: &[u8]) -> String {
        let digest = Sha256::digest(bytes);
        let prefix: String = digest
            .iter()
            .take(8)
            .map(|b| format!("{:02x}", b))
            .collect();

        format!("{}-{}", prefix, Self::sanitize_filename(filename))
    }

    /// Keep keys path-safe: alphanumerics, dot, dash, underscore
    fn sanitize_filename(filename: &str) -> String {
        let cleaned: String = filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if cleaned.is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("media"));
        store.ensure_buckets().unwrap();
        (dir, store)
    }

    #[test]
    fn stores_bytes_under_the_kind_bucket() {
        let (_dir, store) = store();
        let stored = store
            .store(MediaKind::Video, "clip.mp4", b"fake video bytes")
            .unwrap();

        assert!(stored.path.exists());
        assert!(stored.public_url.starts_with("/media/videos/"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"fake video bytes");
    }

    #[test]
    fn identical_content_shares_a_key() {
        let (_dir, store) = store();
        let first = store
            .store(MediaKind::Image, "scan.png", b"same bytes")
            .unwrap();
        let second = store
            .store(MediaKind::Image, "scan.png", b"same bytes")
            .unwrap();

        assert_eq!(first.key, second.key);
        assert_eq!(first.path, second.path);
    }

    #[test]
    fn different_content_gets_distinct_keys() {
        let (_dir, store) = store();
        let a = store.store(MediaKind::Image, "scan.png", b"aaa").unwrap();
        let b = store.store(MediaKind::Image, "scan.png", b"bbb").unwrap();
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn filenames_are_sanitized() {
        let (_dir, store) = store();
        let stored = store
            .store(MediaKind::Video, "../..//weird name?.mp4", b"x")
            .unwrap();

        assert!(!stored.key.contains('/'));
        assert!(!stored.key.contains('?'));
        assert!(stored.path.starts_with(store.root()));
    }

    #[test]
    fn empty_filename_falls_back() {
        let key = MediaStore::object_key("", b"data");
        assert!(key.ends_with("-upload"));
    }
}
