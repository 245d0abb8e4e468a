//! `ragkit-server` exposes the ragkit document QA engine over HTTP.
//! Handlers stay thin: deserialize the request, delegate to
//! [`ragkit_core::RagService`], serialize the response. Provider selection
//! and configuration happen in the binary's composition root.

pub mod routes;
pub mod server;
pub mod settings;

pub use server::{AppState, app_router, run_server};
pub use settings::Settings;
