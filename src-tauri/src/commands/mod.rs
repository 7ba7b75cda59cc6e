pub mod links;
pub mod workflow;
