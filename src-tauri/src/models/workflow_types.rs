use crate::models::classify_types::{ClassificationResult, DetectionResult};
use crate::models::guide_types::RecyclingGuide;
use crate::models::image_types::ImagePreview;
use crate::models::video_types::VideoResult;
use crate::services::gateway::GatewayError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Empty,
    ImageSelected,
    Detecting,
    Detected,
    Classifying,
    Classified,
    GuideOpen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Empty => "no image is selected",
            Stage::ImageSelected => "an image is selected",
            Stage::Detecting => "detection is running",
            Stage::Detected => "an image has been detected",
            Stage::Classifying => "classification is running",
            Stage::Classified => "the item has been classified",
            Stage::GuideOpen => "the recycling guide is open",
        };
        write!(f, "{}", name)
    }
}

/// What the view renders. Never carries the raw image bytes.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    /// Increases with every applied change. The view ignores snapshots older than the one shown.
    pub revision: u64,
    pub stage: Stage,
    pub image: Option<ImagePreview>,
    pub detection: Option<DetectionResult>,
    pub detect_error: Option<GatewayError>,
    pub classification: Option<ClassificationResult>,
    pub classify_error: Option<GatewayError>,
    pub guide_open: bool,
    pub guide: Option<RecyclingGuide>,
    pub videos: Vec<VideoResult>,
    pub videos_loading: bool,
}
