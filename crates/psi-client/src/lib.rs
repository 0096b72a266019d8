//! psi-client: uploads a digest file to a PSI rendezvous server
//!
//! The first party to upload is told to wait for its partner; the second
//! receives the intersection.

pub mod client;
pub mod error;

pub use client::{Payload, PsiClient, UploadOutcome, DEFAULT_UPLOAD_URL};
pub use error::ClientError;
