//! psi-rendezvous: two-party digest intersection through a rendezvous server
//!
//! - [`psi_core`]: digest lists, the intersection engine and the coordinator
//! - [`psi_server`]: HTTP gateway in front of the coordinator
//! - [`psi_client`]: upload client
//! - [`digest_gen`]: fixture generator

pub use digest_gen;
pub use psi_client;
pub use psi_core;
pub use psi_server;
