//! Application layer - Use cases that coordinate domain services.
//!
//! This layer orchestrates the flow of data between the CLI layer and the
//! repository, packager and launcher services.

mod publish;

pub use publish::{PublishPipeline, PublishReport};
