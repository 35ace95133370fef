pub mod catalog;
pub mod chapters;
pub mod reference;
pub mod verse;

pub use catalog::{CatalogEntry, Theme, CATALOG};
pub use reference::VerseReference;
pub use verse::{Commentary, EnrichedVerse, VerseRecord};
