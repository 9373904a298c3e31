pub mod cluster;
pub mod flatten;
pub mod mover;
pub mod namer;
pub mod orchestrator;
pub mod progress;
pub mod registry;

#[cfg(test)]
mod tests;

pub use cluster::AgglomerativeClusterer;
pub use flatten::{flatten_directory, FlattenReport};
pub use mover::FileMover;
pub use namer::FolderNamer;
pub use orchestrator::{Orchestrator, RunHandle};
pub use progress::{OrganizeEvent, ProgressState, Reporter, StopSignal};
pub use registry::ModelRegistry;
