//! Repository seams for photos and saved comparisons, with in-memory backends.

pub mod comparison;
pub mod photo;

pub use comparison::{ComparisonRecord, ComparisonStore, InMemoryComparisonStore};
pub use photo::{
    InMemoryPhotoStore, PhotoCategory, PhotoPage, PhotoQuery, PhotoRecord, PhotoStats, PhotoStore,
};
