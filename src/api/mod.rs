use crate::models::{Note, NotePatch};
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

/// Client-side diagnostic for a failed store call.
///
/// The sync engine does not branch on `kind`; every failure is handled the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: &str, ctx: &str) -> Self {
        // The contents service answers errors with `{"error": "..."}`.
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.to_string());
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {detail}"),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateContentRequest {
    pub title: String,

    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// CRUD gateway to the remote content store.
///
/// One request per call, no retry.
pub trait ContentStore: Clone + 'static {
    fn list(&self) -> impl Future<Output = ApiResult<Vec<Note>>>;

    fn create(&self, title: &str, parent_id: Option<&str>) -> impl Future<Output = ApiResult<Note>>;

    fn update(&self, id: &str, patch: NotePatch) -> impl Future<Output = ApiResult<Note>>;

    fn delete(&self, id: &str) -> impl Future<Output = ApiResult<()>>;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn contents_url(&self) -> String {
        format!("{}/contents", self.base_url)
    }

    pub(crate) fn content_url(&self, id: &str) -> String {
        format!("{}/contents/{}", self.base_url, urlencoding::encode(id))
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, ctx))
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        ctx: &str,
    ) -> ApiResult<T> {
        self.send(req, ctx).await?.json().await.map_err(ApiError::parse)
    }
}

impl ContentStore for ApiClient {
    async fn list(&self) -> ApiResult<Vec<Note>> {
        self.send_json(self.http.get(self.contents_url()), "List contents failed")
            .await
    }

    async fn create(&self, title: &str, parent_id: Option<&str>) -> ApiResult<Note> {
        let body = CreateContentRequest {
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        self.send_json(
            self.http.post(self.contents_url()).json(&body),
            "Create content failed",
        )
        .await
    }

    async fn update(&self, id: &str, patch: NotePatch) -> ApiResult<Note> {
        self.send_json(
            self.http.put(self.content_url(id)).json(&patch),
            "Update content failed",
        )
        .await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        // 200 with a message body or 204 without one; neither is inspected.
        self.send(self.http.delete(self.content_url(id)), "Delete content failed")
            .await
            .map(|_| ())
    }
}
