use super::machine::{transition, video_query, Event, TransitionError, WorkflowState};
use crate::models::classify_types::{ClassificationResult, CANDIDATE_LABELS};
use crate::models::image_types::UploadedImage;
use crate::models::workflow_types::WorkflowSnapshot;
use crate::services::gateway::{GatewayError, ImageLabeler, VideoSearch, ZeroShotClassifier};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const MAX_VIDEO_RESULTS: usize = 3;

/// Called with the new snapshot after every applied change, while the state is
/// still locked. Must not block.
pub type ChangeListener = Arc<dyn Fn(&WorkflowSnapshot) + Send + Sync>;

/// Drives the workflow: applies user actions, runs the gateway calls they need,
/// and feeds the results back through `transition`.
///
/// The state lock is never held across a network call. Each call remembers the
/// image token it started with, so a response for a replaced image is dropped.
#[derive(Clone)]
pub struct Orchestrator {
    state: Arc<Mutex<WorkflowState>>,
    labeler: Arc<dyn ImageLabeler>,
    classifier: Arc<dyn ZeroShotClassifier>,
    video_search: Arc<dyn VideoSearch>,
    listener: Option<ChangeListener>,
}

impl Orchestrator {
    pub fn new(
        labeler: Arc<dyn ImageLabeler>,
        classifier: Arc<dyn ZeroShotClassifier>,
        video_search: Arc<dyn VideoSearch>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkflowState::default())),
            labeler,
            classifier,
            video_search,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn select_image(&self, image: UploadedImage) -> Result<WorkflowSnapshot, TransitionError> {
        info!(
            "Selected {} ({}, {} bytes)",
            image.file_name,
            image.mime_type,
            image.bytes.len()
        );
        self.apply(Event::SelectImage(image), |_| ())
            .await
            .map(|(snapshot, _)| snapshot)
    }

    pub async fn detect(&self) -> Result<WorkflowSnapshot, TransitionError> {
        let (_, (image, image_token)) = self
            .apply(Event::DetectStarted, |s| (s.image.clone(), s.image_token))
            .await?;
        let image = image.ok_or(TransitionError::NoImage)?;

        let outcome = match self.labeler.detect(&image.bytes, &image.mime_type).await {
            Ok(detection) => {
                info!(
                    "Detected {:?} ({:.0}%)",
                    detection.label,
                    detection.confidence * 100.0
                );
                Ok(Some(detection))
            }
            Err(GatewayError::EmptyResult) => {
                info!("Nothing recognised in {}", image.file_name);
                Ok(None)
            }
            Err(e) => {
                warn!("Detection failed for {}: {}", image.file_name, e);
                Err(e)
            }
        };

        self.finish(Event::DetectFinished { image_token, outcome }).await
    }

    pub async fn classify(&self) -> Result<WorkflowSnapshot, TransitionError> {
        let (_, (detection, image_token)) = self
            .apply(Event::ClassifyStarted, |s| (s.detection.clone(), s.image_token))
            .await?;
        let label = detection.ok_or(TransitionError::NoDetection)?.label;

        let outcome = self
            .classifier
            .classify(&label, &CANDIDATE_LABELS)
            .await
            .map(|scored| ClassificationResult::rank(&CANDIDATE_LABELS, &scored));

        match &outcome {
            Ok(result) => {
                if let Some(top) = result.top() {
                    info!("Classified {:?} as {} ({:.2})", label, top.label, top.confidence);
                }
            }
            Err(e) => warn!("Classification failed for {:?}: {}", label, e),
        }

        self.finish(Event::ClassifyFinished { image_token, outcome }).await
    }

    /// Opens the guide and starts the related-video search in the background.
    /// The videos arrive later through the change listener.
    pub async fn open_guide(&self) -> Result<WorkflowSnapshot, TransitionError> {
        let (snapshot, (label, image_token, guide_token)) = self
            .apply(Event::OpenGuide, |s| {
                (
                    s.detection.as_ref().map(|d| d.label.clone()),
                    s.image_token,
                    s.guide_token,
                )
            })
            .await?;
        let label = label.ok_or(TransitionError::NoDetection)?;

        let this = self.clone();
        tokio::spawn(async move {
            this.load_videos(&label, image_token, guide_token).await;
        });

        Ok(snapshot)
    }

    pub async fn close_guide(&self) -> Result<WorkflowSnapshot, TransitionError> {
        self.apply(Event::CloseGuide, |_| ())
            .await
            .map(|(snapshot, _)| snapshot)
    }

    async fn load_videos(&self, label: &str, image_token: u64, guide_token: u64) {
        let query = video_query(label);
        debug!("Searching videos for {:?}", query);
        let videos = self.video_search.search(&query, MAX_VIDEO_RESULTS).await;
        let _ = self
            .finish(Event::VideosLoaded {
                image_token,
                guide_token,
                videos,
            })
            .await;
    }

    /// Applies a response event. Stale responses are logged and dropped, and the
    /// current snapshot is returned instead.
    async fn finish(&self, event: Event) -> Result<WorkflowSnapshot, TransitionError> {
        match self.apply(event, |_| ()).await {
            Ok((snapshot, _)) => Ok(snapshot),
            Err(TransitionError::Stale) => {
                info!("Dropped a response for a superseded request");
                Ok(self.snapshot().await)
            }
            Err(e) => Err(e),
        }
    }

    /// Runs one transition under the lock and reads what the caller needs from the
    /// new state. The listener is called before the lock is released, so listeners
    /// observe changes in the order they were applied.
    async fn apply<R, F>(&self, event: Event, read: F) -> Result<(WorkflowSnapshot, R), TransitionError>
    where
        F: FnOnce(&WorkflowState) -> R,
    {
        let mut state = self.state.lock().await;
        let mut next = transition(&state, event)?;
        next.revision = state.revision + 1;
        *state = next;

        let snapshot = state.snapshot();
        let extra = read(&*state);
        if let Some(listener) = &self.listener {
            listener(&snapshot);
        }
        Ok((snapshot, extra))
    }
}
