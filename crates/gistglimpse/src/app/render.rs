//! Rendering of preview bundles into sandbox documents and reports.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::app::fusion::{ContentKind, FusionReport};
use crate::domain::model::{GistId, PreviewBundle};

/// Notice shown when a gist has nothing to render.
pub const NO_PREVIEW_NOTICE: &str =
    "This gist does not contain any renderable HTML, CSS, or JavaScript files.";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Standalone HTML document fusing the selected files.
    Html,
    /// The fused bundle as JSON.
    Json,
    /// Short plain text report of what was selected.
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Summary => "summary",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" | "document" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "summary" | "text" | "txt" => Ok(OutputFormat::Summary),
            other => Err(OutputFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`OutputFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OutputFormatParseError {
    #[error("unknown output format '{0}'")]
    UnknownFormat(String),
}

/// Renders bundles with the built-in templates.
pub struct DocumentRenderer {
    env: Environment<'static>,
}

impl DocumentRenderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
        })
    }

    /// Render the sandbox document: styles in the head, markup then script in the body.
    ///
    /// Fails with [`NO_PREVIEW_NOTICE`] when the bundle has no content at all.
    pub fn document(&self, bundle: &PreviewBundle) -> Result<String> {
        if bundle.is_empty() {
            return Err(anyhow!(NO_PREVIEW_NOTICE));
        }
        self.render_template("preview_document", bundle)
    }

    /// Render a short report naming the file picked for each slot.
    pub fn summary(
        &self,
        id: &GistId,
        bundle: &PreviewBundle,
        report: &FusionReport<'_>,
    ) -> Result<String> {
        let slots = ContentKind::ALL
            .iter()
            .map(|kind| SummarySlot {
                kind: kind.as_str(),
                filename: report.get(*kind).file().map(|file| file.filename.clone()),
            })
            .collect();
        let context = SummaryContext {
            id: id.as_str(),
            title: &bundle.title,
            badge: owner_badge(bundle),
            slots,
            notice: bundle.is_empty().then_some(NO_PREVIEW_NOTICE),
        };
        self.render_template("preview_summary", &context)
    }

    /// Render the bundle as pretty JSON stamped with the generation time.
    pub fn json(&self, id: &GistId, bundle: &PreviewBundle) -> Result<String> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("failed to format generation timestamp")?;
        let payload = JsonPayload {
            id: id.as_str(),
            generated_at,
            bundle,
        };
        serde_json::to_string_pretty(&payload).context("failed to serialize preview bundle")
    }

    pub fn render(
        &self,
        format: OutputFormat,
        id: &GistId,
        bundle: &PreviewBundle,
        report: &FusionReport<'_>,
    ) -> Result<String> {
        match format {
            OutputFormat::Html => self.document(bundle),
            OutputFormat::Json => self.json(id, bundle),
            OutputFormat::Summary => self.summary(id, bundle, report),
        }
    }

    fn render_template<S: Serialize>(&self, name: &str, context: &S) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .map_err(|err| anyhow!("missing built-in template '{name}': {err}"))?;
        template
            .render(context)
            .map_err(|err| anyhow!("failed to render template '{name}': {err}"))
    }
}

/// Identity badge text for the bundle's owner, if it has one.
pub fn owner_badge(bundle: &PreviewBundle) -> Option<String> {
    bundle.owner.as_ref().map(|owner| format!("by {}", owner.login))
}

/// Write rendered output to `path`, creating parent directories as needed.
pub fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    fs::write(path, rendered)
        .with_context(|| format!("failed to write preview output to {}", path.display()))
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("preview_document", DOCUMENT_TEMPLATE)
        .map_err(|err| anyhow!("failed to register document template: {err}"))?;
    env.add_template("preview_summary", SUMMARY_TEMPLATE)
        .map_err(|err| anyhow!("failed to register summary template: {err}"))?;
    Ok(env)
}

#[derive(Serialize)]
struct SummaryContext<'a> {
    id: &'a str,
    title: &'a str,
    badge: Option<String>,
    slots: Vec<SummarySlot>,
    notice: Option<&'static str>,
}

#[derive(Serialize)]
struct SummarySlot {
    kind: &'static str,
    filename: Option<String>,
}

#[derive(Serialize)]
struct JsonPayload<'a> {
    id: &'a str,
    generated_at: String,
    #[serde(flatten)]
    bundle: &'a PreviewBundle,
}

// Template names carry no extension so minijinja leaves content unescaped.
const DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ title|escape }}</title>
<style>{{ css }}</style>
</head>
<body>
{{ html }}
<script>{{ js }}</script>
</body>
</html>
"#;

const SUMMARY_TEMPLATE: &str = r#"{{ title }}{% if badge %} ({{ badge }}){% endif %}

id: {{ id }}
{% for slot in slots %}
{{ slot.kind }}: {% if slot.filename %}{{ slot.filename }}{% else %}-{% endif %}

{% endfor %}
{% if notice %}

{{ notice }}
{% endif %}
"#;
