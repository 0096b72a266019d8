//! psi-core: Rendezvous and intersection engine for two-party digest matching
//!
//! Two parties each submit a sorted list of hex-encoded SHA-256 digests. The
//! coordinator pairs exactly two submissions per round, computes the
//! intersection once, hands it to the second party to complete its upload
//! and resets for the next round.
//!
//! # Threat Model
//!
//! This is plaintext matching of pre-hashed identifiers on a trusted (or
//! attested) coordinator, not a cryptographic PSI protocol.
//!
//! | Information | Who learns it |
//! |-------------|---------------|
//! | Intersection | Second party to complete its upload |
//! | First party's non-matching digests | Coordinator only |
//! | Second party's non-matching digests | Coordinator only |
//! | That a round is pending | Anyone who can query the round status |
//!
//! ## Non-goals
//!
//! - Protection against the coordinator itself
//! - More than two parties per round
//! - Persistence across restarts
//! - Authenticating which party is which

mod coordinator;
mod digest;
mod error;
mod intersect;
mod slot;

pub use coordinator::{
    CoordinatorConfig, RendezvousCoordinator, Reservation, RoundPhase, RoundStatus, SlotStatus,
    SubmitOutcome,
};
pub use digest::{Digest, DigestList};
pub use error::Error;
pub use intersect::intersect;
pub use slot::{Slot, SlotId};

pub type Result<T> = std::result::Result<T, Error>;

/// Constants for the digest file format
pub mod constants {
    /// Raw digest size in bytes (SHA-256)
    pub const DIGEST_SIZE: usize = 32;

    /// Hex-encoded digest length, one token per line
    pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE * 2;

    /// Number of slots per round
    pub const SLOT_COUNT: usize = 2;
}

/// Names shared by the HTTP gateway and the upload client
pub mod wire {
    /// Multipart field carrying the digest file
    pub const UPLOAD_FIELD: &str = "myFile";

    /// Response header naming the submission outcome
    pub const OUTCOME_HEADER: &str = "x-psi-outcome";

    pub const OUTCOME_BUSY: &str = "busy";
    pub const OUTCOME_WAITING: &str = "waiting";
    pub const OUTCOME_RESULT: &str = "result";

    pub const BUSY_MESSAGE: &str = "Sorry, I am busy, next time may be?";
    pub const WAITING_MESSAGE: &str = "You are the first one, I am waiting for your partner";
}
