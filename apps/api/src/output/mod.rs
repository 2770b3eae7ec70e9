// Output: serializes laid-out pages to PDF bytes.

pub mod pdf;
pub mod winansi;

pub use pdf::{write_pdf, PDF_MAGIC};
