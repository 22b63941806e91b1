use std::path::PathBuf;

/// A norad load or save error.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("font from '{}' has no style name", origin.display())]
    MissingStyleName { origin: PathBuf },
    #[error("failed to load Glyphs source '{}'", path.display())]
    LoadGlyphs {
        path: PathBuf,
        #[source]
        source: glyphs_plist::Error,
    },
    #[error("failed to load UFO '{}'", path.display())]
    LoadUfo {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },
    #[error("failed to save '{}'", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },
    #[error("invalid search pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to walk source directory")]
    Walk(#[from] glob::GlobError),
    #[error("source directory '{}' is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
}
