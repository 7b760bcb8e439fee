//! Preview service tying resolution, fetching, fusion and rendering together.

use anyhow::{Context, Result};

use crate::app::fetch::GistClient;
use crate::app::fusion::{self, FusionReport};
use crate::app::render::{DocumentRenderer, OutputFormat};
use crate::app::resolve::Resolver;
use crate::domain::errors::PreviewError;
use crate::domain::model::{GistId, PreviewBundle, SnippetManifest};
use crate::infra::config::Config;

/// A fetched gist together with its fused bundle.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub id: GistId,
    pub manifest: SnippetManifest,
    pub bundle: PreviewBundle,
}

impl PreviewOutcome {
    pub fn report(&self) -> FusionReport<'_> {
        FusionReport::new(&self.manifest)
    }
}

/// Resolves user input and produces previews. Each call is independent.
pub struct PreviewService {
    resolver: Resolver,
    client: GistClient,
    renderer: DocumentRenderer,
}

impl PreviewService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GistClient::new(&config.api).context("failed to build GitHub API client")?;
        Ok(Self {
            resolver: Resolver::new(config.resolver.host()),
            client,
            renderer: DocumentRenderer::new()?,
        })
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolve `input` without touching the network.
    pub fn resolve(&self, input: &str) -> Result<GistId, PreviewError> {
        self.resolver.resolve_id(input)
    }

    /// Resolve `input`, fetch its manifest once and fuse it.
    pub async fn preview(&self, input: &str) -> Result<PreviewOutcome, PreviewError> {
        let id = self.resolve(input)?;
        let manifest = self.client.fetch_manifest(&id).await?;
        let bundle = fusion::fuse(&manifest);
        Ok(PreviewOutcome {
            id,
            manifest,
            bundle,
        })
    }

    pub fn render(&self, outcome: &PreviewOutcome, format: OutputFormat) -> Result<String> {
        self.renderer
            .render(format, &outcome.id, &outcome.bundle, &outcome.report())
    }
}
