use crate::models::classify_types::{ClassificationResult, DetectionResult, RECYCLABLE};
use crate::models::guide_types::RecyclingGuide;
use crate::models::image_types::UploadedImage;
use crate::models::video_types::VideoResult;
use crate::models::workflow_types::{Stage, WorkflowSnapshot};
use crate::services::gateway::GatewayError;
use crate::services::guide_service;
use std::sync::Arc;
use thiserror::Error;

/// The whole workflow record. Only `transition` produces new values.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    /// Counts applied changes. Set by the driver, carried through transitions unchanged.
    pub revision: u64,
    pub stage: Stage,
    pub image: Option<Arc<UploadedImage>>,
    /// Bumped on every image selection. Responses carrying an older token are stale.
    pub image_token: u64,
    pub detection: Option<DetectionResult>,
    pub detect_error: Option<GatewayError>,
    pub classification: Option<ClassificationResult>,
    pub classify_error: Option<GatewayError>,
    pub guide: Option<RecyclingGuide>,
    /// Bumped every time the guide opens, so a search from an earlier opening is ignored.
    pub guide_token: u64,
    pub videos: Vec<VideoResult>,
    pub videos_loading: bool,
}

impl WorkflowState {
    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            revision: self.revision,
            stage: self.stage,
            image: self.image.as_ref().map(|image| image.preview()),
            detection: self.detection.clone(),
            detect_error: self.detect_error.clone(),
            classification: self.classification.clone(),
            classify_error: self.classify_error.clone(),
            guide_open: self.stage == Stage::GuideOpen,
            guide: self.guide,
            videos: self.videos.clone(),
            videos_loading: self.videos_loading,
        }
    }

    fn clear_results(&mut self) {
        self.detection = None;
        self.detect_error = None;
        self.clear_classification();
    }

    fn clear_classification(&mut self) {
        self.classification = None;
        self.classify_error = None;
        self.close_guide();
    }

    fn close_guide(&mut self) {
        self.guide = None;
        self.videos.clear();
        self.videos_loading = false;
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    SelectImage(UploadedImage),
    DetectStarted,
    DetectFinished {
        image_token: u64,
        /// `Ok(None)` means the model recognised nothing.
        outcome: Result<Option<DetectionResult>, GatewayError>,
    },
    ClassifyStarted,
    ClassifyFinished {
        image_token: u64,
        outcome: Result<ClassificationResult, GatewayError>,
    },
    OpenGuide,
    VideosLoaded {
        image_token: u64,
        guide_token: u64,
        videos: Vec<VideoResult>,
    },
    CloseGuide,
}

impl Event {
    fn action(&self) -> &'static str {
        match self {
            Event::SelectImage(_) => "select an image",
            Event::DetectStarted => "detect",
            Event::DetectFinished { .. } => "finish detecting",
            Event::ClassifyStarted => "classify",
            Event::ClassifyFinished { .. } => "finish classifying",
            Event::OpenGuide => "open the recycling guide",
            Event::VideosLoaded { .. } => "show videos",
            Event::CloseGuide => "close the recycling guide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("Cannot {action} while {stage}")]
    Invalid { stage: Stage, action: &'static str },
    #[error("No image selected")]
    NoImage,
    #[error("Nothing has been detected to classify")]
    NoDetection,
    #[error("The classification has no recyclable candidate")]
    NotRecyclable,
    #[error("Discarded a response for a superseded request")]
    Stale,
}

fn invalid(stage: Stage, event: &Event) -> TransitionError {
    TransitionError::Invalid {
        stage,
        action: event.action(),
    }
}

/// Pure transition function for the classification workflow.
///
/// ```text
/// Empty -> ImageSelected -> Detecting -> Detected -> Classifying -> Classified <-> GuideOpen
///                             ^------------'  ^---------------------------'
/// ```
/// `SelectImage` is accepted from every stage and resets everything downstream.
pub fn transition(state: &WorkflowState, event: Event) -> Result<WorkflowState, TransitionError> {
    let mut next = state.clone();

    match event {
        Event::SelectImage(image) => {
            next = WorkflowState {
                revision: state.revision,
                stage: Stage::ImageSelected,
                image: Some(Arc::new(image)),
                image_token: state.image_token.wrapping_add(1),
                guide_token: state.guide_token,
                ..WorkflowState::default()
            };
        }

        Event::DetectStarted => {
            if state.image.is_none() {
                return Err(TransitionError::NoImage);
            }
            if !matches!(state.stage, Stage::ImageSelected | Stage::Detected) {
                return Err(invalid(state.stage, &event));
            }
            next.clear_results();
            next.stage = Stage::Detecting;
        }

        Event::DetectFinished {
            image_token,
            ref outcome,
        } => {
            if image_token != state.image_token {
                return Err(TransitionError::Stale);
            }
            if state.stage != Stage::Detecting {
                return Err(invalid(state.stage, &event));
            }
            match outcome {
                Ok(detection) => {
                    next.detection = detection.clone();
                    next.detect_error = None;
                }
                Err(e) => {
                    next.detection = None;
                    next.detect_error = Some(e.clone());
                }
            }
            next.stage = Stage::Detected;
        }

        Event::ClassifyStarted => {
            if state.detection.is_none() {
                return Err(TransitionError::NoDetection);
            }
            if !matches!(state.stage, Stage::Detected | Stage::Classified) {
                return Err(invalid(state.stage, &event));
            }
            next.clear_classification();
            next.stage = Stage::Classifying;
        }

        Event::ClassifyFinished {
            image_token,
            ref outcome,
        } => {
            if image_token != state.image_token {
                return Err(TransitionError::Stale);
            }
            if state.stage != Stage::Classifying {
                return Err(invalid(state.stage, &event));
            }
            match outcome {
                Ok(result) => {
                    next.classification = Some(result.clone());
                    next.classify_error = None;
                }
                Err(e) => {
                    next.classification = None;
                    next.classify_error = Some(e.clone());
                }
            }
            next.stage = Stage::Classified;
        }

        Event::OpenGuide => {
            if state.stage != Stage::Classified {
                return Err(invalid(state.stage, &event));
            }
            let recyclable = state
                .classification
                .as_ref()
                .map(|c| c.has_reported(RECYCLABLE))
                .unwrap_or(false);
            if !recyclable {
                return Err(TransitionError::NotRecyclable);
            }
            let detection = state.detection.as_ref().ok_or(TransitionError::NoDetection)?;

            next.guide = Some(guide_service::guide_for(&detection.label));
            next.guide_token = state.guide_token.wrapping_add(1);
            next.videos.clear();
            next.videos_loading = true;
            next.stage = Stage::GuideOpen;
        }

        Event::VideosLoaded {
            image_token,
            guide_token,
            videos,
        } => {
            if image_token != state.image_token
                || guide_token != state.guide_token
                || state.stage != Stage::GuideOpen
            {
                return Err(TransitionError::Stale);
            }
            next.videos = videos;
            next.videos_loading = false;
        }

        Event::CloseGuide => {
            if state.stage != Stage::GuideOpen {
                return Err(invalid(state.stage, &event));
            }
            next.close_guide();
            next.stage = Stage::Classified;
        }
    }

    Ok(next)
}

/// Search phrase used for the related videos of a detected label.
pub fn video_query(label: &str) -> String {
    format!("how to recycle {}", label)
}
