pub mod config;
pub mod gateway;
pub mod guide_service;
pub mod image_service;
pub mod workflow;
