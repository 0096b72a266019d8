//! psi-server: HTTP rendezvous server for two-party digest intersection
//!
//! Each party uploads its sorted digest file to `/upload`. The first upload
//! is told to wait; the second receives the intersection as the response
//! body. A third upload while both slots are held is turned away as busy.

pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use metrics::init_prometheus_recorder;
pub use routes::create_router;
pub use server::{PsiServer, ServerBuilder};
pub use state::{create_shared_state, ServerState, SharedState};
