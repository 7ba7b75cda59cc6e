use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RecyclingGuide {
    pub tips: &'static [&'static str],
    pub creative: &'static [&'static str],
    pub fact: &'static str,
}
