pub mod app;
pub mod domain;
pub mod infra;

pub use app::fetch::GistClient;
pub use app::fusion::fuse;
pub use app::resolve::resolve;
pub use domain::errors::PreviewError;
pub use domain::model::{GistId, OwnerInfo, PreviewBundle, SnippetFile, SnippetManifest};

pub fn init(verbose: bool) {
    infra::logging::init(verbose);
}
