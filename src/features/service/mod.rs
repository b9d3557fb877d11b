pub mod controller;
pub mod handler;
pub mod verifier;

pub use controller::{RestartOutcome, RunStatus, ServiceController};
pub use handler::create_service_router;
pub use verifier::{ConnectionStatus, ConnectivityVerifier, Verdict};
