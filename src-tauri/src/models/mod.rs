pub mod classify_types;
pub mod guide_types;
pub mod image_types;
pub mod video_types;
pub mod workflow_types;
