use serde::Serialize;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct VideoResult {
    pub title: String,
    pub video_id: String,
    pub thumbnail_url: String,
}

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL, video_id)
}
