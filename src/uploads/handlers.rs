use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::UploadResponse;
use super::gatekeeper::FileDescriptor;
use super::services::{store_uploads, UploadItem};
use crate::{auth::AuthUser, error::ExpenseError, state::AppState};

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload_files))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// POST /uploads (multipart), one file per field.
/// Every part is gated before anything is written; one rejected part fails the
/// whole request.
#[instrument(skip(state, mp))]
pub async fn upload_files(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ExpenseError> {
    let mut items: Vec<UploadItem> = Vec::new();
    while let Some(field) = mp.next_field().await? {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let descriptor = FileDescriptor {
            original_name,
            mime_type: field
                .content_type()
                .map(str::to_owned)
                .unwrap_or_else(|| "application/octet-stream".into()),
            field_name: field.name().unwrap_or_default().to_owned(),
        };

        let accepted = state.gatekeeper.accept(&descriptor).map_err(|e| {
            warn!(%owner_id, mime_type = %descriptor.mime_type, field = %descriptor.field_name, "upload rejected");
            e
        })?;
        let body = field.bytes().await?;
        items.push(UploadItem { accepted, body });
    }

    let files = store_uploads(state.storage.as_ref(), items).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { files })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, extract::FromRequest, http::Request};
    use uuid::Uuid;

    use crate::storage::fake::MemoryStorage;

    const BOUNDARY: &str = "X-EXPENSE-BOUNDARY";

    async fn multipart(state: &AppState, parts: &[(&str, &str, &str)]) -> Multipart {
        let mut body = String::new();
        for (field, filename, mime) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\nbytes-of-{filename}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nlunch\r\n"
        ));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/uploads")
            .header(
                axum::http::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(req, state).await.unwrap()
    }

    #[tokio::test]
    async fn accepted_image_is_stored() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::fake_with_storage(storage.clone());
        let mp = multipart(&state, &[("receipt", "photo.png", "image/png")]).await;

        let (status, Json(resp)) = upload_files(State(state), AuthUser(Uuid::new_v4()), mp)
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp.files.len(), 1);
        let file = &resp.files[0];
        assert_eq!(file.field, "receipt");
        assert_eq!(file.original_name, "photo.png");
        assert!(file.storage_name.contains("-receipt-"));
        assert!(file.storage_name.ends_with(".png"));
        assert_eq!(storage.keys(), vec![file.storage_name.clone()]);
        assert_eq!(
            storage.objects.lock().unwrap()[&file.storage_name].as_ref(),
            b"bytes-of-photo.png"
        );
    }

    #[tokio::test]
    async fn one_rejected_part_writes_nothing() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::fake_with_storage(storage.clone());
        let mp = multipart(
            &state,
            &[("receipt", "photo.jpg", "image/jpeg"), ("scan", "scan.pdf", "application/pdf")],
        )
        .await;

        let err = upload_files(State(state), AuthUser(Uuid::new_v4()), mp)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn request_without_files_is_bad_request() {
        let state = AppState::fake();
        let mp = multipart(&state, &[]).await;

        let err = upload_files(State(state), AuthUser(Uuid::new_v4()), mp)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
