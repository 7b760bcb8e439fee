//! Resolve free-form user input into a canonical gist identifier.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::errors::PreviewError;
use crate::domain::model::GistId;

/// Host serving gist pages.
pub const DEFAULT_GIST_HOST: &str = "gist.github.com";

static BARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{32}$").expect("bare id pattern compiles"));

static DEFAULT_RESOLVER: Lazy<Resolver> = Lazy::new(Resolver::default);

/// Outcome of a single resolution strategy.
enum Step {
    Resolved(GistId),
    Rejected,
    Next,
}

type Strategy = fn(&Resolver, &str) -> Step;

/// Strategies tried in order; the first one that does not return [`Step::Next`] decides.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("gist_url", Resolver::from_gist_url),
    ("bare_id", Resolver::from_bare_id),
    ("embedded_url", Resolver::from_embedded_url),
];

/// Parses gist URLs and bare ids for a configurable gist host.
#[derive(Debug, Clone)]
pub struct Resolver {
    host: String,
    embedded: Regex,
}

impl Resolver {
    /// `host` is matched case-insensitively; parsed URLs always report lowercase hosts.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into().to_ascii_lowercase();
        let pattern = format!(r"{}/[a-zA-Z0-9_-]+/([a-f0-9]{{32}})", regex::escape(&host));
        let embedded = Regex::new(&pattern).expect("escaped host yields a valid pattern");
        Self { host, embedded }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolve `input` to a gist id, or `None` when no strategy recognizes it.
    pub fn resolve(&self, input: &str) -> Option<GistId> {
        let input = input.trim();
        for (name, strategy) in STRATEGIES {
            match strategy(self, input) {
                Step::Resolved(id) => {
                    tracing::debug!(strategy = name, id = %id, "resolved gist identifier");
                    return Some(id);
                }
                Step::Rejected => {
                    tracing::debug!(strategy = name, "gist identifier rejected");
                    return None;
                }
                Step::Next => {}
            }
        }
        None
    }

    /// Like [`Resolver::resolve`] but reports failure as [`PreviewError::InvalidIdentifier`].
    pub fn resolve_id(&self, input: &str) -> Result<GistId, PreviewError> {
        self.resolve(input)
            .ok_or_else(|| PreviewError::InvalidIdentifier(input.trim().to_owned()))
    }

    fn from_gist_url(&self, input: &str) -> Step {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(_) => return Step::Next,
        };
        if url.host_str() != Some(self.host.as_str()) {
            return Step::Next;
        }

        let last_segment = url
            .path_segments()
            .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last());
        match last_segment {
            Some(segment) => Step::Resolved(GistId::new(segment)),
            None => Step::Rejected,
        }
    }

    fn from_bare_id(&self, input: &str) -> Step {
        if BARE_ID.is_match(input) {
            Step::Resolved(GistId::new(input))
        } else {
            Step::Next
        }
    }

    fn from_embedded_url(&self, input: &str) -> Step {
        self.embedded
            .captures(input)
            .and_then(|captures| captures.get(1))
            .map_or(Step::Next, |id| Step::Resolved(GistId::new(id.as_str())))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_GIST_HOST)
    }
}

/// Resolve `input` against the default gist host.
pub fn resolve(input: &str) -> Option<GistId> {
    DEFAULT_RESOLVER.resolve(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "deadbeefdeadbeefdeadbeefdeadbeef";

    fn resolved(input: &str) -> Option<String> {
        resolve(input).map(|id| id.as_str().to_owned())
    }

    #[test]
    fn bare_hex_ids_resolve_to_themselves() {
        for id in [ID, "0123456789abcdef0123456789abcdef", "ffffffffffffffffffffffffffffffff"] {
            assert_eq!(resolved(id).as_deref(), Some(id));
        }
    }

    #[test]
    fn gist_url_with_user_resolves_to_last_segment() {
        let input = format!("https://gist.github.com/alice/{ID}");
        assert_eq!(resolved(&input).as_deref(), Some(ID));
    }

    #[test]
    fn trailing_slash_and_whitespace_are_ignored() {
        let input = format!("  https://gist.github.com/alice/{ID}/  ");
        assert_eq!(resolved(&input).as_deref(), Some(ID));
    }

    #[test]
    fn gist_url_takes_last_segment_even_when_not_hex() {
        assert_eq!(
            resolved("https://gist.github.com/alice/my-gist").as_deref(),
            Some("my-gist")
        );
    }

    #[test]
    fn gist_host_without_path_is_invalid() {
        assert!(resolve("https://gist.github.com/").is_none());
    }

    #[test]
    fn prose_is_invalid() {
        assert!(resolve("not a url and not hex").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn uppercase_or_short_hex_is_invalid() {
        assert!(resolve(&ID.to_uppercase()).is_none());
        assert!(resolve(&ID[..31]).is_none());
    }

    #[test]
    fn schemeless_gist_url_uses_embedded_pattern() {
        let input = format!("gist.github.com/alice/{ID}");
        assert_eq!(resolved(&input).as_deref(), Some(ID));
    }

    #[test]
    fn foreign_host_falls_through_to_embedded_pattern() {
        let input = format!("https://example.com/?next=gist.github.com/alice/{ID}");
        assert_eq!(resolved(&input).as_deref(), Some(ID));
        assert!(resolve(&format!("https://example.com/alice/{ID}")).is_none());
    }

    #[test]
    fn custom_host_is_respected() {
        let resolver = Resolver::new("gist.example.org");
        let input = format!("https://gist.example.org/bob/{ID}");
        assert_eq!(resolver.resolve(&input).map(|id| id.to_string()).as_deref(), Some(ID));
        assert!(resolver.resolve(&format!("https://gist.github.com/bob/{ID}")).is_none());
    }

    #[test]
    fn configured_host_is_lowercased() {
        let resolver = Resolver::new("Gist.Example.org");
        assert_eq!(resolver.host(), "gist.example.org");
        let input = format!("https://gist.example.org/bob/{ID}");
        assert_eq!(resolver.resolve(&input).map(|id| id.to_string()).as_deref(), Some(ID));
        let mixed = format!("https://GIST.Example.ORG/bob/{ID}");
        assert_eq!(resolver.resolve(&mixed).map(|id| id.to_string()).as_deref(), Some(ID));
    }

    #[test]
    fn resolve_id_reports_invalid_identifier() {
        let err = Resolver::default().resolve_id(" nope ").unwrap_err();
        assert_eq!(err, PreviewError::InvalidIdentifier("nope".into()));
    }
}
