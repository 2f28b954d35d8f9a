pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod render;

pub use api::ApiClient;
pub use app::IdeaPage;
pub use config::ClientConfig;
