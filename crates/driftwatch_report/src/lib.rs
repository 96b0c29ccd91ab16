//! Drift report rendering.
//!
//! Pure functions of one [`DiffResult`] plus a run timestamp. The artifact
//! JSON is the sole input contract: no catalog access, no storage access,
//! so rendering the same artifact at the same timestamp is byte-identical.

pub mod html;
pub mod markdown;

pub use html::render_html;
pub use markdown::render_markdown;
