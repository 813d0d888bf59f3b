//! Content-type gate and storage naming for incoming attachments.

use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng};
use time::OffsetDateTime;

use crate::error::ExpenseError;

pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];
pub const REJECTED_TYPE_MESSAGE: &str = "Only .jpeg, .jpg and .png formats are allowed";

const SUFFIX_LEN: usize = 8;

/// What the client told us about one file part. Nothing here is trusted.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub original_name: String,
    pub mime_type: String,
    pub field_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub original_name: String,
    pub mime_type: String,
    pub field_name: String,
    pub storage_name: String,
    pub destination: PathBuf,
}

impl AcceptedUpload {
    pub fn path(&self) -> PathBuf {
        self.destination.join(&self.storage_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadGatekeeper {
    destination: PathBuf,
}

impl UploadGatekeeper {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn accept(&self, file: &FileDescriptor) -> Result<AcceptedUpload, ExpenseError> {
        self.accept_at(file, OffsetDateTime::now_utc())
    }

    /// The allow-list check runs first and has no side effects; a name is
    /// only generated for files that pass it.
    pub fn accept_at(
        &self,
        file: &FileDescriptor,
        now: OffsetDateTime,
    ) -> Result<AcceptedUpload, ExpenseError> {
        if !is_allowed(&file.mime_type) {
            return Err(ExpenseError::UnsupportedMediaType(REJECTED_TYPE_MESSAGE.into()));
        }

        let millis = now.unix_timestamp_nanos() / 1_000_000;
        let storage_name = format!(
            "{millis}-{}-{}{}",
            sanitize_field(&file.field_name),
            random_suffix(),
            extension_of(&file.original_name),
        );

        Ok(AcceptedUpload {
            original_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            field_name: file.field_name.clone(),
            storage_name,
            destination: self.destination.clone(),
        })
    }
}

pub fn is_allowed(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

/// `.ext` of the final path component, or empty.
pub fn extension_of(original_name: &str) -> String {
    let file_name = original_name.rsplit(['/', '\\']).next().unwrap_or_default();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{ext}")
        }
        _ => String::new(),
    }
}

fn sanitize_field(field_name: &str) -> String {
    let cleaned: String = field_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".into()
    } else {
        cleaned
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
