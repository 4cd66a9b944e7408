//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&MySqlPool` as the first argument. Multi-row writes run
//! inside a single transaction.

pub mod editor_upload_repo;
pub mod model_image_repo;
pub mod model_repo;
pub mod user_repo;

pub use editor_upload_repo::EditorUploadRepo;
pub use model_image_repo::{AppendOutcome, DeleteImageOutcome, ModelImageRepo};
pub use model_repo::ModelRepo;
pub use user_repo::UserRepo;
