use anyhow::{Context, Result};
use reqwest::{Client, Request, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{require_games, ApiError, GamesApi};
use crate::{
    config::AppConfig,
    models::{Game, GameDetails, GameId},
};

const KEY_HEADER: &str = "x-rapidapi-key";
const HOST_HEADER: &str = "x-rapidapi-host";

/// HTTP client for the free-to-play listing service.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpGamesApi {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl HttpGamesApi {
    /// Build a client from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing reqwest client.
    pub fn with_client(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        }
    }

    /// One unfiltered listing request. Any 2xx answer counts as reachable,
    /// whatever the body holds.
    pub async fn probe(&self) -> bool {
        info!("testing API connection");
        let outcome = match self.listing_request(None) {
            Ok(request) => self.send(request).await,
            Err(err) => Err(ApiError::Transport(err)),
        };
        match outcome {
            Ok(_) => {
                info!("API connection ok");
                true
            }
            Err(err) => {
                warn!(error = %err, "API connection failed");
                false
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_credentials(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(KEY_HEADER, &self.api_key)
            .header(HOST_HEADER, &self.api_host)
    }

    fn listing_request(&self, category: Option<&str>) -> reqwest::Result<Request> {
        let mut builder = self.client.get(self.endpoint("games"));
        if let Some(category) = category {
            builder = builder.query(&[("category", category)]);
        }
        self.with_credentials(builder).build()
    }

    fn details_request(&self, id: GameId) -> reqwest::Result<Request> {
        let builder = self
            .client
            .get(self.endpoint("game"))
            .query(&[("id", id.get())]);
        self.with_credentials(builder).build()
    }

    async fn send(&self, request: Request) -> Result<String, ApiError> {
        let url = request.url().to_string();
        debug!(
            %url,
            host = %self.api_host,
            key = %mask(&self.api_key),
            "sending request"
        );

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%url, error = %err, "request failed before a response arrived");
                return Err(ApiError::Transport(err));
            }
        };

        let status = response.status();
        debug!(%url, status = status.as_u16(), "response received");
        let body = response.text().await?;
        check_status(status, body).map_err(|err| {
            warn!(%url, error = %err, "service returned an error");
            err
        })
    }
}

impl GamesApi for HttpGamesApi {
    async fn fetch_games(&self, category: Option<&str>) -> Result<Vec<Game>, ApiError> {
        debug!(category = category.unwrap_or(""), "fetching games");
        let request = self.listing_request(category)?;
        let body = self.send(request).await?;
        let games = require_games(decode(body)?)?;
        debug!(count = games.len(), first = ?games.first().map(|g| &g.title), "games received");
        Ok(games)
    }

    async fn fetch_game_details(&self, id: GameId) -> Result<GameDetails, ApiError> {
        debug!(game_id = %id, "fetching game details");
        let request = self.details_request(id)?;
        let body = self.send(request).await?;
        let details: GameDetails = decode(body)?;
        debug!(game_id = %id, title = %details.title(), "game details received");
        Ok(details)
    }
}

fn check_status(status: StatusCode, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Response {
            status: status.as_u16(),
            body,
        })
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, ApiError> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(source) => {
            warn!(error = %source, %body, "response body did not decode");
            Err(ApiError::Decode { source, body })
        }
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}…")
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
    };

    use super::*;

    fn config(base_url: &str) -> AppConfig {
        AppConfig {
            api_key: "test-key".to_string(),
            api_host: "games.example.com".to_string(),
            base_url: base_url.to_string(),
            loading_timeout_secs: 5,
            connect_timeout_secs: None,
            log_dir: None,
        }
    }

    fn api() -> HttpGamesApi {
        HttpGamesApi::with_client(Client::new(), &config("https://games.example.com/api/"))
    }

    /// Answer every connection on a local port with the same canned
    /// response and return a client pointed at it.
    fn local_api(status_line: &'static str, body: &'static str) -> anyhow::Result<HttpGamesApi> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(&stream);
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Ok(HttpGamesApi::with_client(
            Client::builder().no_proxy().build()?,
            &config(&format!("http://{addr}")),
        ))
    }

    #[test]
    fn listing_request_carries_category_and_credentials() -> reqwest::Result<()> {
        let api = api();

        let request = api.listing_request(Some("shooter"))?;
        assert_eq!(
            request.url().as_str(),
            "https://games.example.com/api/games?category=shooter"
        );
        assert_eq!(request.headers()[KEY_HEADER], "test-key");
        assert_eq!(request.headers()[HOST_HEADER], "games.example.com");

        let request = api.listing_request(None)?;
        assert_eq!(request.url().as_str(), "https://games.example.com/api/games");
        assert_eq!(request.url().query(), None);
        Ok(())
    }

    #[test]
    fn details_request_carries_id() -> reqwest::Result<()> {
        let request = api().details_request(GameId(42))?;
        assert_eq!(
            request.url().as_str(),
            "https://games.example.com/api/game?id=42"
        );
        assert_eq!(request.headers()[KEY_HEADER], "test-key");
        Ok(())
    }

    #[test]
    fn decode_keeps_body_for_diagnostics() {
        let body = r#"{"status":0,"status_message":"No active giveaways"}"#.to_string();
        match decode::<Vec<Game>>(body.clone()) {
            Err(ApiError::Decode { body: kept, .. }) => assert_eq!(kept, body),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn non_success_status_keeps_body() {
        match check_status(StatusCode::FORBIDDEN, "bad key".to_string()) {
            Err(ApiError::Response { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected response error, got {other:?}"),
        }
        assert_eq!(
            check_status(StatusCode::OK, "[]".to_string()).ok().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn empty_listing_is_reachable_but_not_a_catalog() -> anyhow::Result<()> {
        let api = local_api("200 OK", "[]")?;

        assert!(api.probe().await);
        assert!(matches!(api.fetch_games(None).await, Err(ApiError::Empty)));
        Ok(())
    }

    #[tokio::test]
    async fn error_status_is_unreachable_and_fails_listing() -> anyhow::Result<()> {
        let api = local_api("500 Internal Server Error", "upstream down")?;

        assert!(!api.probe().await);
        match api.fetch_games(Some("shooter")).await {
            Err(ApiError::Response { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected response error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn listing_and_details_decode_from_the_wire() -> anyhow::Result<()> {
        let api = local_api("200 OK", r#"[{"id":1,"title":"Alpha","genre":"Shooter"}]"#)?;
        let games = api.fetch_games(None).await?;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Alpha");

        let api = local_api(
            "200 OK",
            r#"{"id":42,"title":"Beta","screenshots":[{"id":1,"image":null}]}"#,
        )?;
        let details = api.fetch_game_details(GameId(42)).await?;
        assert_eq!(details.title(), "Beta");
        assert_eq!(details.screenshots[0].image, "");
        Ok(())
    }

    #[test]
    fn key_is_masked() {
        assert_eq!(mask("abcdef123"), "abcd…");
        assert_eq!(mask(""), "…");
    }
}
