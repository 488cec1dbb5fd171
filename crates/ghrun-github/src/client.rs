//! GitHub API client for listing workflow runs.

use async_trait::async_trait;
use ghrun_core::{Error, RepoRef, Result, RunFetcher, RunsPayload};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The runs-listing endpoint returns at most this many runs per page.
pub const MAX_PER_PAGE: u32 = 100;

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: Url,
    access_token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: &str, access_token: Option<String>) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), api_url, access_token)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        client: reqwest::Client,
        api_url: &str,
        access_token: Option<String>,
    ) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| Error::InvalidInput(format!("invalid API URL {:?}: {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "invalid API URL {:?}: not a base URL",
                api_url.as_str()
            )));
        }

        Ok(Self {
            client,
            api_url,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// URL of the runs listing for `repo`, requesting `limit` runs.
    pub fn runs_url(&self, repo: &RepoRef, limit: u32) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "actions", "runs"]);
        }
        url.query_pairs_mut()
            .append_pair("per_page", &limit.clamp(1, MAX_PER_PAGE).to_string());
        url
    }

    /// List the most recent workflow runs for a repository.
    pub async fn list_runs(&self, repo: &RepoRef, limit: u32) -> Result<RunsPayload> {
        let url = self.runs_url(repo, limit);
        debug!(%url, "listing workflow runs");

        let mut request = self
            .client
            .get(url)
            .header("User-Agent", "ghrun")
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &headers, &text));
        }

        let mut payload: RunsPayload = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        payload.workflow_runs.truncate(limit as usize);
        debug!(
            total_count = payload.total_count,
            returned = payload.workflow_runs.len(),
            "received workflow runs"
        );

        Ok(payload)
    }
}

#[async_trait]
impl RunFetcher for GitHubClient {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch_runs(&self, repo: &RepoRef, limit: u32) -> Result<RunsPayload> {
        self.list_runs(repo, limit).await
    }
}

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Map a non-success response to an error.
fn error_for_status(status: StatusCode, headers: &HeaderMap, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    let rate_limit_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        StatusCode::FORBIDDEN if rate_limit_exhausted => Error::RateLimited(message),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn repo() -> RepoRef {
        RepoRef::new("OWNER", "REPO")
    }

    fn local_client(base: &str, token: Option<String>) -> GitHubClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GitHubClient::with_http_client(http, base, token).unwrap()
    }

    /// Serve a single canned HTTP response and hand back the request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_runs_url() {
        let client = GitHubClient::new(DEFAULT_API_URL, None).unwrap();
        assert_eq!(
            client.runs_url(&repo(), 10).as_str(),
            "https://api.github.com/repos/OWNER/REPO/actions/runs?per_page=10"
        );
    }

    #[test]
    fn test_runs_url_keeps_base_path_and_caps_page_size() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", None).unwrap();
        assert_eq!(
            client.runs_url(&repo(), 500).as_str(),
            "https://ghe.example.com/api/v3/repos/OWNER/REPO/actions/runs?per_page=100"
        );
    }

    #[test]
    fn test_reject_invalid_api_url() {
        assert!(matches!(
            GitHubClient::new("not a url", None),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            GitHubClient::new("mailto:someone@example.com", None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_error_for_status() {
        let body = r#"{"message": "Bad credentials", "documentation_url": "https://docs"}"#;
        let empty = HeaderMap::new();

        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, &empty, body),
            Error::Unauthorized(ref m) if m == "Bad credentials"
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, &empty, r#"{"message": "Not Found"}"#),
            Error::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, &empty, body),
            Error::Forbidden(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, &empty, ""),
            Error::RateLimited(_)
        ));

        let mut exhausted = HeaderMap::new();
        exhausted.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, &exhausted, body),
            Error::RateLimited(_)
        ));

        match error_for_status(StatusCode::BAD_GATEWAY, &empty, "") {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_runs() {
        let body = r#"{"total_count": 2, "workflow_runs": [
            {"id": 1, "name": "CI", "status": "completed", "conclusion": "success",
             "event": "push", "head_branch": "trunk", "head_sha": "abc",
             "head_commit": {"message": "cool commit"},
             "created_at": "2021-02-23T04:51:00Z", "updated_at": "2021-02-23T04:55:34Z",
             "url": "runs/1", "jobs_url": "runs/1/jobs"},
            {"id": 2, "name": "CI", "status": "queued", "conclusion": null,
             "event": "push", "head_branch": "trunk", "head_sha": "def",
             "head_commit": {"message": "another commit"},
             "created_at": "2021-02-23T04:51:00Z", "updated_at": "2021-02-23T04:51:00Z",
             "url": "runs/2", "jobs_url": "runs/2/jobs"}
        ]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let client = local_client(&base, Some("secret".to_string()));
        let payload = client.fetch_runs(&repo(), 1).await.unwrap();

        assert_eq!(payload.total_count, 2);
        assert_eq!(payload.workflow_runs.len(), 1);
        assert_eq!(payload.workflow_runs[0].id, 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /repos/OWNER/REPO/actions/runs?per_page=1 HTTP/1.1"));
        let lowered = request.to_lowercase();
        assert!(lowered.contains("authorization: bearer secret"));
        assert!(lowered.contains("accept: application/vnd.github+json"));
    }

    #[tokio::test]
    async fn test_list_runs_not_found() {
        let (base, server) = serve_once("404 Not Found", r#"{"message": "Not Found"}"#).await;

        let client = local_client(&base, None);
        let result = client.fetch_runs(&repo(), 10).await;
        assert!(matches!(result, Err(Error::NotFound(ref m)) if m == "Not Found"));

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_list_runs_bad_body() {
        let (base, server) = serve_once("200 OK", "not json").await;

        let client = local_client(&base, None);
        let result = client.fetch_runs(&repo(), 10).await;
        assert!(matches!(result, Err(Error::Parse(_))));
        server.await.unwrap();
    }
}
