pub mod index;
pub mod labeler;

pub use index::{IndexedLabel, LabelId, SpatialIndex};
pub use labeler::{covering, InvalidationCallback, Labeler, Labelers};
