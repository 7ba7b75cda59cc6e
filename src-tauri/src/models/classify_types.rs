use serde::Serialize;
use std::cmp::Ordering;

/// Candidate set sent to the zero-shot model, in declaration order.
pub const CANDIDATE_LABELS: [&str; 3] = ["recyclable", "reusable", "sellable"];

pub const RECYCLABLE: &str = "recyclable";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DetectionResult {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClassificationCandidate {
    pub label: String,
    pub confidence: f32,
    /// False when the upstream response left this candidate out and the score was defaulted.
    pub reported: bool,
}

impl ClassificationCandidate {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            reported: true,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct ClassificationResult {
    pub candidates: Vec<ClassificationCandidate>,
}

impl ClassificationResult {
    /// Builds one entry per declared candidate, ranked by confidence descending.
    ///
    /// Candidates missing from `scored` get a confidence of 0. Scored labels outside
    /// the declared set are dropped. Ties keep declaration order.
    pub fn rank(declared: &[&str], scored: &[ClassificationCandidate]) -> Self {
        let mut candidates: Vec<ClassificationCandidate> = declared
            .iter()
            .map(|label| {
                match scored
                    .iter()
                    .find(|c| c.label.eq_ignore_ascii_case(label))
                {
                    Some(c) => ClassificationCandidate::new(*label, c.confidence),
                    None => ClassificationCandidate {
                        label: label.to_string(),
                        confidence: 0.0,
                        reported: false,
                    },
                }
            })
            .collect();

        // sort_by is stable, so equal scores stay in declaration order
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        Self { candidates }
    }

    pub fn top(&self) -> Option<&ClassificationCandidate> {
        self.candidates.first()
    }

    pub fn get(&self, label: &str) -> Option<&ClassificationCandidate> {
        self.candidates.iter().find(|c| c.label == label)
    }

    /// True only when the upstream actually scored `label`.
    pub fn has_reported(&self, label: &str) -> bool {
        self.get(label).map(|c| c.reported).unwrap_or(false)
    }
}
