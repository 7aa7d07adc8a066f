/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Post service: creation, updates, publishing, likes, cascading deletes
/// - Comment service: one-level-deep threads, edits, deletes, like toggles
/// - Threads: read-side assembly of authors, replies and like counts
pub mod comments;
pub mod posts;
pub mod threads;

// Re-export commonly used services
pub use comments::CommentService;
pub use posts::{PostService, PostUpdate};
