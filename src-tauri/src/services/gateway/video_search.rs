use super::{http_client, read_json, with_transport_retry, GatewayError, VideoSearch};
use crate::models::video_types::VideoResult;
use crate::services::config::{ApiConfig, RetryPolicy};
use futures::future::{BoxFuture, FutureExt};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

impl SearchItem {
    fn into_video(self) -> Option<VideoResult> {
        let video_id = self.id?.video_id?;
        let snippet = self.snippet?;
        let thumbnail_url = snippet.thumbnails?.medium?.url?;
        Some(VideoResult {
            title: snippet.title?,
            video_id,
            thumbnail_url,
        })
    }
}

/// YouTube Data API v3 `search.list`.
pub struct YouTubeVideoSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl YouTubeVideoSearch {
    pub fn from_config(config: &ApiConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.video_search_url(),
            api_key: config.youtube_api_key.clone(),
            retry: config.retry,
        })
    }

    async fn search_once(&self, query: &str, max_results: usize) -> Result<Vec<VideoResult>, GatewayError> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body = read_json(response).await?;
        parse_videos(body)
    }
}

impl VideoSearch for YouTubeVideoSearch {
    fn search<'a>(&'a self, query: &'a str, max_results: usize) -> BoxFuture<'a, Vec<VideoResult>> {
        async move {
            if query.trim().is_empty() || max_results == 0 {
                return Vec::new();
            }
            let result = with_transport_retry(&self.retry, "Video search request", || {
                self.search_once(query, max_results)
            })
            .await;

            match result {
                Ok(mut videos) => {
                    videos.truncate(max_results);
                    info!("Found {} videos for {:?}", videos.len(), query);
                    videos
                }
                Err(e) => {
                    warn!("Video search for {:?} failed: {}", query, e);
                    Vec::new()
                }
            }
        }
        .boxed()
    }
}

/// Items missing an id, title or medium thumbnail are skipped.
fn parse_videos(body: Value) -> Result<Vec<VideoResult>, GatewayError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| GatewayError::malformed(format!("unexpected search response: {}", e)))?;

    Ok(response
        .items
        .into_iter()
        .filter_map(SearchItem::into_video)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video_types::watch_url;
    use crate::services::gateway::stub_server::serve_once;
    use serde_json::json;

    fn item(id: &str, title: &str) -> Value {
        json!({
            "kind": "youtube#searchResult",
            "id": {"kind": "youtube#video", "videoId": id},
            "snippet": {
                "title": title,
                "thumbnails": {
                    "default": {"url": format!("https://i.ytimg.com/vi/{}/default.jpg", id)},
                    "medium": {"url": format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id)}
                }
            }
        })
    }

    #[test]
    fn test_parse_videos_keeps_relevance_order() {
        let body = json!({"items": [item("abc", "Recycling bottles"), item("def", "Bottle crafts")]});
        let videos = parse_videos(body).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].video_id, "abc");
        assert_eq!(videos[0].title, "Recycling bottles");
        assert_eq!(videos[0].thumbnail_url, "https://i.ytimg.com/vi/abc/mqdefault.jpg");
        assert_eq!(videos[1].video_id, "def");
        assert_eq!(watch_url(&videos[0].video_id), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_parse_videos_skips_incomplete_items() {
        let channel = json!({
            "id": {"kind": "youtube#channel", "channelId": "UC123"},
            "snippet": {"title": "A channel", "thumbnails": {"medium": {"url": "x"}}}
        });
        let body = json!({"items": [channel, item("abc", "Recycling cans")]});
        let videos = parse_videos(body).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "abc");
    }

    #[test]
    fn test_parse_videos_without_items_is_empty() {
        assert!(parse_videos(json!({"kind": "youtube#searchListResponse"}))
            .unwrap()
            .is_empty());
    }

    fn search_for(base_url: &str) -> YouTubeVideoSearch {
        YouTubeVideoSearch::from_config(&ApiConfig {
            youtube_base_url: base_url.to_string(),
            youtube_api_key: "yt_test_key".to_string(),
            retry: RetryPolicy {
                max_retries: 0,
                base_delay: std::time::Duration::ZERO,
            },
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_parameters() {
        let body = json!({"items": [item("abc", "Recycling bottles"), item("def", "Bottle crafts")]});
        let (base_url, server) = serve_once("200 OK", &body.to_string()).await;

        let videos = search_for(&base_url).search("how to recycle bottle", 1).await;
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "abc");

        let request = server.await.unwrap();
        let line = request.request_line();
        assert!(line.starts_with("GET /search?"), "{}", line);
        let query = line
            .trim_start_matches("GET /search?")
            .trim_end_matches(" HTTP/1.1");
        let mut params: Vec<&str> = query.split('&').collect();
        params.sort_unstable();
        assert_eq!(
            params,
            vec![
                "key=yt_test_key",
                "maxResults=1",
                "part=snippet",
                "q=how+to+recycle+bottle",
                "type=video",
            ]
        );
    }

    #[tokio::test]
    async fn test_search_upstream_error_degrades_to_empty() {
        let (base_url, server) = serve_once(
            "403 Forbidden",
            r#"{"error":{"code":403,"message":"API key not valid"}}"#,
        )
        .await;
        assert!(search_for(&base_url).search("how to recycle can", 3).await.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_search_unreachable_host_degrades_to_empty() {
        let config = ApiConfig {
            youtube_base_url: "http://127.0.0.1:9".to_string(),
            retry: RetryPolicy {
                max_retries: 0,
                base_delay: std::time::Duration::ZERO,
            },
            ..ApiConfig::default()
        };
        let search = YouTubeVideoSearch::from_config(&config).unwrap();
        assert!(search.search("how to recycle bottle", 3).await.is_empty());
    }
}
