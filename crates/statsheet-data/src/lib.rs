pub mod dataset;
pub mod delimited;
pub mod fetch;
pub mod load;
pub mod normalize;
pub mod source;
pub mod xlsx;

pub use dataset::{Column, ColumnData, Dataset};
pub use load::{load_dataset, LoadedSource, SourceFormat};
pub use source::SourceLocator;
