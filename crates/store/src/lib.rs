pub mod index_store;
pub mod registry;

pub use index_store::{Document, IndexStore, Posting};
pub use registry::{ClientInfo, Registry};
