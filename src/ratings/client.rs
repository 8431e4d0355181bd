use serde_json::Value;
use tracing::debug;

use crate::ratings::dto::GameModeHistory;

/// Thin client for the Lichess public API. No caching, no retries; transport
/// defaults apply. The base URL is configurable so tests can point it at a
/// mock server.
#[derive(Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    base_url: String,
}

impl LichessClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Top players on the classical leaderboard, passed through untouched.
    pub async fn fetch_top_classical(&self, limit: u32) -> Result<Value, reqwest::Error> {
        let url = format!("{}/api/player/top/{}/classical", self.base_url, limit);
        debug!(%url, "fetching top classical players");
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Full rating history for one player, one entry per game mode.
    pub async fn fetch_rating_history(
        &self,
        username: &str,
    ) -> Result<Vec<GameModeHistory>, reqwest::Error> {
        let url = format!("{}/api/user/{}/rating-history", self.base_url, username);
        debug!(%url, "fetching rating history");
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_top_classical_as_passthrough_json() {
        let server = MockServer::start().await;
        let body = r#"{"users":[{"username":"DrNykterstein","perfs":{"classical":{"rating":2712,"progress":3}}}]}"#;
        Mock::given(method("GET"))
            .and(path("/api/player/top/50/classical"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = LichessClient::new(&server.uri());
        let top = client.fetch_top_classical(50).await.expect("fetch");
        assert_eq!(top["users"][0]["username"], "DrNykterstein");
        assert_eq!(top["users"][0]["perfs"]["classical"]["rating"], 2712);
    }

    #[tokio::test]
    async fn fetches_and_decodes_rating_history() {
        let server = MockServer::start().await;
        let body = r#"[{"name":"Classical","points":[[2024,4,12,2650],[2024,4,19,2655]]}]"#;
        Mock::given(method("GET"))
            .and(path("/api/user/magnus/rating-history"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = LichessClient::new(&server.uri());
        let history = client.fetch_rating_history("magnus").await.expect("fetch");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Classical");
        assert_eq!(history[0].points[1], [2024, 4, 19, 2655]);
    }

    #[tokio::test]
    async fn upstream_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/ghost/rating-history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = LichessClient::new(&server.uri());
        assert!(client.fetch_rating_history("ghost").await.is_err());
    }
}
