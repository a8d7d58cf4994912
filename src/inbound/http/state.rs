//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they depend
//! only on the repository ports and remain testable against the in-memory
//! adapter.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::ports::{
    CategoriesRepository, RecipesRepository, ReviewsRepository, UsersRepository,
};
use crate::inbound::http::identity::TokenCodec;

/// Upload handling limits and destination directory.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Per-file size cap in bytes.
    pub max_bytes: usize,
    /// Maximum number of files accepted by the multi-file endpoint.
    pub max_files: usize,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersRepository>,
    pub categories: Arc<dyn CategoriesRepository>,
    pub recipes: Arc<dyn RecipesRepository>,
    pub reviews: Arc<dyn ReviewsRepository>,
    pub tokens: TokenCodec,
    pub uploads: UploadConfig,
}
