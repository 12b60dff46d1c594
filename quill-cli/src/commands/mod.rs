//! CLI command implementations.

pub mod index;
pub mod list;
pub mod normalize;
pub mod render;
pub mod verify;

pub use index::write_content_index;
pub use list::list_posts;
pub use normalize::normalize_metadata;
pub use render::render_document;
pub use verify::verify_corpus;
