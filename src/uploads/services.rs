use bytes::Bytes;
use tracing::{info, warn};

use super::dto::StoredFile;
use super::gatekeeper::AcceptedUpload;
use crate::{error::ExpenseError, storage::StorageClient};

pub const PUBLIC_PREFIX: &str = "/uploads";

pub struct UploadItem {
    pub accepted: AcceptedUpload,
    pub body: Bytes,
}

/// Writes already-gated files in order. If one write fails, the files this
/// call already wrote are removed again before the error is returned.
pub async fn store_uploads(
    storage: &dyn StorageClient,
    items: Vec<UploadItem>,
) -> Result<Vec<StoredFile>, ExpenseError> {
    if items.is_empty() {
        return Err(ExpenseError::Validation("No file uploaded".into()));
    }

    let mut stored: Vec<StoredFile> = Vec::with_capacity(items.len());
    for UploadItem { accepted, body } in items {
        if let Err(e) = storage
            .put_object(&accepted.storage_name, body, &accepted.mime_type)
            .await
        {
            for done in &stored {
                if let Err(cleanup) = storage.delete_object(&done.storage_name).await {
                    warn!(error = %cleanup, storage_name = %done.storage_name, "cleanup after failed upload");
                }
            }
            return Err(ExpenseError::Storage(
                e.context(format!("store upload {}", accepted.storage_name)),
            ));
        }

        info!(
            storage_name = %accepted.storage_name,
            path = %accepted.path().display(),
            mime_type = %accepted.mime_type,
            "upload stored"
        );
        stored.push(StoredFile {
            url: format!("{PUBLIC_PREFIX}/{}", accepted.storage_name),
            field: accepted.field_name,
            original_name: accepted.original_name,
            storage_name: accepted.storage_name,
        });
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fake::MemoryStorage;
    use crate::uploads::gatekeeper::{FileDescriptor, UploadGatekeeper};

    fn item(gate: &UploadGatekeeper, name: &str) -> UploadItem {
        let accepted = gate
            .accept(&FileDescriptor {
                original_name: name.into(),
                mime_type: "image/png".into(),
                field_name: "receipt".into(),
            })
            .unwrap();
        UploadItem {
            accepted,
            body: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[tokio::test]
    async fn stores_every_item() {
        let gate = UploadGatekeeper::new("uploads");
        let storage = MemoryStorage::default();

        let stored = store_uploads(&storage, vec![item(&gate, "a.png"), item(&gate, "b.png")])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].original_name, "a.png");
        assert_eq!(stored[0].url, format!("/uploads/{}", stored[0].storage_name));
        assert_eq!(storage.keys().len(), 2);
    }

    #[tokio::test]
    async fn empty_request_is_validation_error() {
        let storage = MemoryStorage::default();
        let err = store_uploads(&storage, Vec::new()).await.unwrap_err();
        assert!(matches!(err, ExpenseError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_write_rolls_back_earlier_files() {
        let gate = UploadGatekeeper::new("uploads");
        let first = item(&gate, "a.png");
        let second = item(&gate, "b.png");
        let storage = MemoryStorage {
            fail_on: Some(second.accepted.storage_name.clone()),
            ..Default::default()
        };

        let err = store_uploads(&storage, vec![first, second]).await.unwrap_err();
        assert!(matches!(err, ExpenseError::Storage(_)));
        assert!(storage.keys().is_empty());
    }
}
