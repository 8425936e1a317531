// Multipart form collection for the upload endpoints

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart, MultipartError, MultipartRejection};
use tracing::warn;

use crate::types::{AppError, AppResult};
use crate::utils::datauri::UploadedFile;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    /// Drain the multipart stream. Text fields are kept by name; the `file`
    /// field becomes the upload, dropped if it carries no bytes.
    ///
    /// A missing or malformed body reads as an empty form, so the catalog
    /// still runs its role and existence checks and reports the absent file
    /// last.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Self {
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => {
                warn!("Request body is not multipart: {}", rejection.body_text());
                return Self::default();
            }
        };

        let mut form = UploadForm::default();
        loop {
            match multipart.next_field().await {
                Ok(Some(field)) => {
                    if let Err(e) = form.collect(field).await {
                        warn!("Discarding multipart body: {}", e);
                        return Self::default();
                    }
                }
                Ok(None) => return form,
                Err(e) => {
                    warn!("Discarding multipart body: {}", e);
                    return Self::default();
                }
            }
        }
    }

    async fn collect(&mut self, field: Field<'_>) -> Result<(), MultipartError> {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(|c| c.to_string());
            let bytes = field.bytes().await?;
            self.file = UploadedFile::new(file_name, content_type, bytes);
        } else if !name.is_empty() {
            let value = field.text().await?;
            self.fields.insert(name, value);
        }

        Ok(())
    }

    /// Trimmed text value, empty when the field was not sent.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn integer(&self, name: &str) -> Option<i32> {
        self.fields.get(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }
}

pub fn parse_id(raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}
