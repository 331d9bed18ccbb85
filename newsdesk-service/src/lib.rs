pub mod clients;
pub mod config;
pub mod models;
pub mod service;

pub use clients::LiveCollaborators;
pub use config::Config;
pub use service::{AppState, build_router, create_app};
