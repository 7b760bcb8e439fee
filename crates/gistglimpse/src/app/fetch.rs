//! GitHub gists API client: one GET per preview, classified before parsing.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::app::fusion;
use crate::domain::errors::PreviewError;
use crate::domain::model::{GistId, PreviewBundle, SnippetManifest};
use crate::infra::config::Api;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Map a response status to the error kind callers present, or `Ok` for success.
pub fn classify_status(status: StatusCode) -> Result<(), PreviewError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND => Err(PreviewError::NotFound),
        StatusCode::FORBIDDEN => Err(PreviewError::RateLimited),
        other => Err(PreviewError::FetchFailed {
            status: Some(other.as_u16()),
            reason: format!("GitHub API responded with {other}"),
        }),
    }
}

/// Fetches gist manifests. Holds no per-request state and never retries.
#[derive(Debug, Clone)]
pub struct GistClient {
    http: reqwest::Client,
    base_url: String,
}

impl GistClient {
    pub fn new(settings: &Api) -> Result<Self, PreviewError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent())
            .default_headers(headers);
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PreviewError::fetch_failed(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url().trim_end_matches('/').to_owned(),
        })
    }

    fn manifest_url(&self, id: &GistId) -> String {
        format!("{}/gists/{}", self.base_url, id)
    }

    /// Fetch the raw manifest for `id`.
    pub async fn fetch_manifest(&self, id: &GistId) -> Result<SnippetManifest, PreviewError> {
        let url = self.manifest_url(id);
        tracing::debug!(id = %id, url = %url, "requesting gist manifest");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PreviewError::fetch_failed(e.to_string()))?;

        let status = response.status();
        if let Err(err) = classify_status(status) {
            tracing::warn!(id = %id, status = status.as_u16(), "gist request failed");
            return Err(err);
        }

        let manifest: SnippetManifest = response.json().await.map_err(|e| {
            PreviewError::FetchFailed {
                status: Some(status.as_u16()),
                reason: format!("malformed gist response: {e}"),
            }
        })?;

        for file in manifest.files.values().filter(|file| file.truncated) {
            tracing::warn!(
                id = %id,
                file = %file.filename,
                "gist file content was truncated by the API"
            );
        }

        tracing::info!(
            id = %id,
            files = manifest.files.len(),
            owner = manifest.owner.as_ref().map(|o| o.login.as_str()).unwrap_or("anonymous"),
            "retrieved gist manifest"
        );

        Ok(manifest)
    }

    /// Fetch the manifest for `id` and fuse it into a preview bundle.
    pub async fn fetch_and_fuse(&self, id: &GistId) -> Result<PreviewBundle, PreviewError> {
        let manifest = self.fetch_manifest(id).await?;
        Ok(fusion::fuse(&manifest))
    }
}
