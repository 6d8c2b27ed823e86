pub mod catalog;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod related;

pub use pipeline::{PipelineSettings, RecommendationPipeline};
pub use providers::{CatalogProvider, CompletionProvider};
