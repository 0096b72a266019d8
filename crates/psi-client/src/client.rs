//! Upload client for the rendezvous server

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};

use psi_core::{wire, DigestList};

use crate::error::{ClientError, Result};

pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:8080/upload";

/// What to put in the upload form
///
/// The caller chooses between a named file part and an inline text field.
#[derive(Debug, Clone)]
pub enum Payload {
    File { name: String, contents: Vec<u8> },
    Field { contents: String },
}

impl Payload {
    /// Read a digest file from disk as a named file part
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.csv".to_string());
        Ok(Payload::File { name, contents })
    }

    /// Send an in-memory list as an inline field
    pub fn from_digests(digests: &DigestList) -> Self {
        Payload::Field {
            contents: digests.to_text(),
        }
    }

    fn into_part(self) -> Part {
        match self {
            Payload::File { name, contents } => Part::bytes(contents).file_name(name),
            Payload::Field { contents } => Part::text(contents),
        }
    }
}

/// What the server said about our upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// We were first; the partner gets the result
    Waiting { message: String },
    /// We completed the round
    Intersection(DigestList),
    /// Both slots were taken
    Busy,
}

/// Client for one rendezvous server
pub struct PsiClient {
    http: Client,
    upload_url: String,
}

impl PsiClient {
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            upload_url: upload_url.into(),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Upload a digest file from disk
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadOutcome> {
        self.upload(Payload::from_file(path)?).await
    }

    /// Submit a payload and interpret the response
    pub async fn upload(&self, payload: Payload) -> Result<UploadOutcome> {
        let form = Form::new().part(wire::UPLOAD_FIELD, payload.into_part());

        tracing::debug!(url = %self.upload_url, "Uploading digests");
        let resp = self.http.post(&self.upload_url).multipart(form).send().await?;

        Self::read_outcome(resp).await
    }

    async fn read_outcome(resp: Response) -> Result<UploadOutcome> {
        let status = resp.status();
        let outcome = resp
            .headers()
            .get(wire::OUTCOME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if status == StatusCode::SERVICE_UNAVAILABLE
            && outcome.as_deref() == Some(wire::OUTCOME_BUSY)
        {
            return Ok(UploadOutcome::Busy);
        }

        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let body = resp.text().await?;
        match outcome.as_deref() {
            Some(wire::OUTCOME_WAITING) => Ok(UploadOutcome::Waiting {
                message: body.trim_end().to_string(),
            }),
            Some(wire::OUTCOME_RESULT) => Ok(UploadOutcome::Intersection(DigestList::parse(&body)?)),
            Some(other) => Err(ClientError::InvalidResponse(format!(
                "unknown outcome '{}'",
                other
            ))),
            None => Err(ClientError::InvalidResponse(format!(
                "missing {} header",
                wire::OUTCOME_HEADER
            ))),
        }
    }
}

impl Default for PsiClient {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_URL)
    }
}
