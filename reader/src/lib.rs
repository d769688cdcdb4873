// Library interface for the reader pipeline
// This allows tests and other binaries to import modules

pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;

pub use error::ReaderError;
pub use extract::{ArticleExtractor, ReadabilityExtractor};
pub use fetch::{FetchResult, Fetcher};
pub use pipeline::{Pipeline, ResultRow, RunSummary};
