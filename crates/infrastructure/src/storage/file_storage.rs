//! File-backed storage.
//!
//! All keys live in one JSON object on disk:
//! ```json
//! {
//!   "accessToken": "eyJhbGciOi...",
//!   "guestCart": "{\"items\":[]}",
//!   "refreshToken": "c2Vzc2lvbi..."
//! }
//! ```
//! Every mutation rewrites the whole document through a temporary file and
//! a rename, so a crash never leaves half a document behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shopfront_application::ports::{LocalStorage, StorageError};
use tokio::sync::Mutex;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Document = BTreeMap<String, String>;

/// `LocalStorage` persisted to a single JSON file.
#[derive(Debug)]
pub struct FileLocalStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileLocalStorage {
    /// Creates a store at `path`. The file and its parent directory are
    /// created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::new()),
            Ok(bytes) => {
                from_json_bytes(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }

    async fn persist(&self, document: &Document) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        let content =
            to_json_stable_bytes(document).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &content)
            .await
            .map_err(|e| io_error(&tmp, &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, &e))
    }

    async fn modify(
        &self,
        change: impl FnOnce(&mut Document) -> bool + Send,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        if change(&mut document) {
            self.persist(&document).await?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, error: &std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {error}", path.display()))
}

#[async_trait]
impl LocalStorage for FileLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|document| {
            document.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|document| document.remove(key).is_some()).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.modify(|document| {
            keys.iter()
                .fold(false, |changed, key| document.remove(*key).is_some() || changed)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> FileLocalStorage {
        FileLocalStorage::new(dir.path().join("session").join("storage.json"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage_in(&dir);

        assert_eq!(storage.get("accessToken").await.expect("get"), None);
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().expect("tempdir");
        storage_in(&dir)
            .set("accessToken", "tok1")
            .await
            .expect("set");

        let reopened = storage_in(&dir);
        assert_eq!(
            reopened.get("accessToken").await.expect("get"),
            Some("tok1".to_string())
        );
    }

    #[tokio::test]
    async fn test_document_is_stable_json() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage_in(&dir);
        storage.set("refreshToken", "r1").await.expect("set");
        storage.set("accessToken", "tok1").await.expect("set");

        let content = std::fs::read_to_string(storage.path()).expect("read");
        assert_eq!(
            content,
            "{\n  \"accessToken\": \"tok1\",\n  \"refreshToken\": \"r1\"\n}\n"
        );
    }

    #[tokio::test]
    async fn test_remove_many_clears_credentials_only() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage_in(&dir);
        storage.set("accessToken", "tok1").await.expect("set");
        storage.set("refreshToken", "r1").await.expect("set");
        storage.set("guestCart", r#"{"items":[]}"#).await.expect("set");

        storage
            .remove_many(&["accessToken", "refreshToken"])
            .await
            .expect("remove_many");

        assert_eq!(storage.get("accessToken").await.expect("get"), None);
        assert_eq!(storage.get("refreshToken").await.expect("get"), None);
        assert_eq!(
            storage.get("guestCart").await.expect("get"),
            Some(r#"{"items":[]}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage_in(&dir);
        std::fs::create_dir_all(dir.path().join("session")).expect("mkdir");
        std::fs::write(storage.path(), "not json").expect("write");

        let result = storage.get("accessToken").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_concurrent_writes_keep_every_key() {
        let dir = TempDir::new().expect("tempdir");
        let storage = std::sync::Arc::new(storage_in(&dir));

        let mut handles = Vec::new();
        for i in 0..8 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.set(&format!("key{i}"), "value").await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("set");
        }

        let reopened = storage_in(&dir);
        for i in 0..8 {
            assert!(reopened.get(&format!("key{i}")).await.expect("get").is_some());
        }
    }
}
