pub mod document;
pub mod profile;

pub use document::{Document, Item, Section};
pub use profile::Profile;
