//! `POST /upload` and the file type shared by multipart endpoints.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError};

/// A file received from a browser form, ready to forward to the API.
#[derive(Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl Upload {
    pub(crate) fn into_part(self) -> Result<Part, ApiError> {
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(mime) => part.mime_str(&mime).map_err(|e| ApiError::Setup(e.to_string())),
            None => Ok(part),
        }
    }
}

#[derive(Deserialize)]
struct Uploaded {
    #[serde(alias = "path", alias = "location")]
    url: String,
}

impl ApiClient {
    /// `POST /upload` (multipart field `file`). Returns the stored file's URL.
    #[instrument(skip(self, token, upload), fields(file = %upload.file_name))]
    pub async fn upload(&self, token: &str, upload: Upload) -> Result<String, ApiError> {
        let form = Form::new().part("file", upload.into_part()?);
        let uploaded: Uploaded = self
            .send_json(self.request(Method::POST, "upload", Some(token))?.multipart(form))
            .await?;
        Ok(uploaded.url)
    }
}
