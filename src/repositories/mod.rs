pub mod appwrite_repo;
pub mod backend;

pub use appwrite_repo::AppwriteBackend;
pub use backend::{Backend, BackendError, PreviewOptions, Query, unique_id};
