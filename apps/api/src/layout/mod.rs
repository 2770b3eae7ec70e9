// Layout: page geometry, font metrics, word wrap and the paginated renderer.
// Rendering is CPU-bound; the pipeline runs it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod geometry;
pub mod page;
pub mod renderer;
pub mod wrap;

pub use font_metrics::FontFamily;
pub use geometry::{PageGeometry, PageSize};
pub use page::Page;
pub use renderer::{render, RenderError};
