pub mod client;
pub mod ingest;
pub mod settings;

pub use client::Client;
pub use ingest::{index_folder, IndexResult};
pub use settings::Settings;
