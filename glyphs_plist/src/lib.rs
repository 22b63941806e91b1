//! Lib to parse Glyphs.app source files and turn their masters into UFOs.

mod error;
mod font;
mod from_plist;
mod norad_interop;
mod plist;

pub use error::Error;
pub use font::{
    Anchor, Component, CustomParameter, Font, FontMaster, FormatVersion, Glyph, Layer, Node,
    NodeType, Path, Shape,
};
pub use from_plist::{FromPlist, FromPlistOpt};
pub use norad_interop::ToUfoOptions;
pub use crate::plist::Plist;
