pub mod auth;
pub mod editor_upload;
pub mod gallery;
pub mod model_profile;
