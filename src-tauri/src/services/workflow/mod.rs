pub mod machine;
pub mod orchestrator;

pub use machine::TransitionError;
pub use orchestrator::Orchestrator;
