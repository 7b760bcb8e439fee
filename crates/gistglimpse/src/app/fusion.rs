//! Fusion of a gist manifest into a single HTML/CSS/JS preview bundle.
//!
//! Each content kind has an ordered list of rules. Rules are evaluated left to right and
//! the first rule that matches any file wins. Within a rule, files are scanned in filename
//! order, which makes the result independent of the order the API listed them in.

use crate::domain::model::{PreviewBundle, SnippetFile, SnippetManifest};

/// The three content slots of a preview document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Js,
}

/// A single selection rule for a content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Filename equals the given name, ignoring ASCII case.
    Named(&'static str),
    /// Declared language equals the given language exactly.
    Language(&'static str),
}

impl Rule {
    pub fn matches(&self, file: &SnippetFile) -> bool {
        match self {
            Rule::Named(name) => file.filename.eq_ignore_ascii_case(name),
            Rule::Language(language) => file.declared_language == *language,
        }
    }
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Html, ContentKind::Css, ContentKind::Js];

    /// Rules in priority order.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            ContentKind::Html => &[Rule::Named("index.html"), Rule::Language("HTML")],
            ContentKind::Css => &[
                Rule::Named("style.css"),
                Rule::Named("styles.css"),
                Rule::Language("CSS"),
            ],
            ContentKind::Js => &[
                Rule::Named("script.js"),
                Rule::Named("index.js"),
                Rule::Language("JavaScript"),
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Css => "css",
            ContentKind::Js => "js",
        }
    }
}

/// Result of selecting a file for one content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Found(&'a SnippetFile),
    NotFound,
}

impl<'a> Selection<'a> {
    pub fn file(&self) -> Option<&'a SnippetFile> {
        match *self {
            Selection::Found(file) => Some(file),
            Selection::NotFound => None,
        }
    }

    fn content(&self) -> String {
        self.file()
            .map(|file| file.content.clone())
            .unwrap_or_default()
    }
}

/// Select the file that fills `kind`, if any.
///
/// Kinds are independent: the same file may be selected for more than one kind.
pub fn select(manifest: &SnippetManifest, kind: ContentKind) -> Selection<'_> {
    kind.rules()
        .iter()
        .find_map(|rule| manifest.files.values().find(|file| rule.matches(file)))
        .map_or(Selection::NotFound, Selection::Found)
}

/// Per-kind selections for a manifest, kept for reporting which file filled each slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionReport<'a> {
    pub html: Selection<'a>,
    pub css: Selection<'a>,
    pub js: Selection<'a>,
}

impl<'a> FusionReport<'a> {
    pub fn new(manifest: &'a SnippetManifest) -> Self {
        Self {
            html: select(manifest, ContentKind::Html),
            css: select(manifest, ContentKind::Css),
            js: select(manifest, ContentKind::Js),
        }
    }

    pub fn get(&self, kind: ContentKind) -> Selection<'a> {
        match kind {
            ContentKind::Html => self.html,
            ContentKind::Css => self.css,
            ContentKind::Js => self.js,
        }
    }
}

/// Fuse a manifest into a [`PreviewBundle`]. Pure and deterministic.
pub fn fuse(manifest: &SnippetManifest) -> PreviewBundle {
    let report = FusionReport::new(manifest);
    PreviewBundle {
        html: report.html.content(),
        css: report.css.content(),
        js: report.js.content(),
        title: manifest.title(),
        owner: manifest.owner.clone(),
    }
}
