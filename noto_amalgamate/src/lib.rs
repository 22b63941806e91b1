//! Merge the glyphs of many per-style font sources into one amalgamated UFO
//! per style.
//!
//! Sources are `.glyphs` files, each converted into one UFO per master, and
//! `.ufo` directories. Every source is grouped by its normalized style name
//! and its glyphs are poured into the amalgamated font for that style. When
//! a glyph name is already taken, the glyph is kept under a name suffixed
//! after the source family (`.display`, `.mono`, `.serif`, `.sans`) if
//! possible, and dropped otherwise.

mod amalgamate;
mod discover;
mod error;
mod merge;
mod style;

pub use amalgamate::{output_path, run, Amalgamator, Config, DEFAULT_SOURCE_DIR};
pub use discover::{glyphs_sources, ufo_sources};
pub use error::Error;
pub use merge::{merge_glyphs, MergeReport};
pub use style::{normalize_style_name, style_key, Suffix};
