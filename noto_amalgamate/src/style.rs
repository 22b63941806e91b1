//! Grouping of sources by style, and the suffixes that tell their glyphs
//! apart.

use std::fmt;
use std::path::Path;

use crate::Error;

/// The family flavour of a source, taken from its file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suffix {
    Display,
    Mono,
    Serif,
    Sans,
}

impl Suffix {
    /// Checked in this order; "NotoSerifDisplay" is a display source.
    const PRIORITY: [(&'static str, Suffix); 4] = [
        ("Display", Suffix::Display),
        ("Mono", Suffix::Mono),
        ("Serif", Suffix::Serif),
        ("Sans", Suffix::Sans),
    ];

    /// Look for the family flavour in the stem of `path`.
    pub fn from_path(path: &Path) -> Option<Suffix> {
        let stem = path.file_stem()?.to_string_lossy();
        Self::from_stem(&stem)
    }

    pub fn from_stem(stem: &str) -> Option<Suffix> {
        Self::PRIORITY
            .iter()
            .find(|(needle, _)| stem.contains(needle))
            .map(|(_, suffix)| *suffix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Suffix::Display => "display",
            Suffix::Mono => "mono",
            Suffix::Serif => "serif",
            Suffix::Sans => "sans",
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip spaces and fix the one known inconsistent spelling.
pub fn normalize_style_name(name: &str) -> String {
    let name = name.replace(' ', "");
    if name == "Semibold" {
        "SemiBold".to_string()
    } else {
        name
    }
}

/// The key under which `font` is amalgamated. `origin` is only used to
/// report fonts without a style name.
pub fn style_key(font: &norad::Font, origin: &Path) -> Result<String, Error> {
    font.font_info
        .style_name
        .as_deref()
        .map(normalize_style_name)
        .ok_or_else(|| Error::MissingStyleName {
            origin: origin.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn suffix_priority() {
        assert_eq!(Suffix::from_stem("NotoSansDisplay"), Some(Suffix::Display));
        assert_eq!(Suffix::from_stem("NotoSerifDisplay-Italic"), Some(Suffix::Display));
        assert_eq!(Suffix::from_stem("NotoSansMono"), Some(Suffix::Mono));
        assert_eq!(Suffix::from_stem("NotoSerifTibetan"), Some(Suffix::Serif));
        assert_eq!(Suffix::from_stem("NotoSansArabic"), Some(Suffix::Sans));
        assert_eq!(Suffix::from_stem("NotoNastaliqUrdu"), None);
    }

    #[test]
    fn suffix_is_case_sensitive() {
        assert_eq!(Suffix::from_stem("notosans-display"), None);
    }

    #[test]
    fn suffix_ignores_directories_and_extension() {
        let path = PathBuf::from("src/NotoSans/NotoKufiArabic-Regular.ufo");
        assert_eq!(Suffix::from_path(&path), None);
        let path = PathBuf::from("src/NotoSansMono.glyphs");
        assert_eq!(Suffix::from_path(&path), Some(Suffix::Mono));
        assert_eq!(Suffix::Mono.to_string(), "mono");
    }

    #[test]
    fn style_names_are_normalized() {
        assert_eq!(normalize_style_name("Bold Italic"), "BoldItalic");
        assert_eq!(normalize_style_name("Semibold"), "SemiBold");
        assert_eq!(normalize_style_name("Semi bold"), "SemiBold");
        assert_eq!(normalize_style_name("Semibold Italic"), "SemiboldItalic");
        assert_eq!(normalize_style_name("Condensed ExtraLight"), "CondensedExtraLight");
        assert_eq!(normalize_style_name("Regular"), "Regular");
    }

    #[test]
    fn missing_style_name_is_an_error() {
        let mut font = norad::Font::new();
        let origin = Path::new("Foo.ufo");
        assert!(matches!(
            style_key(&font, origin),
            Err(Error::MissingStyleName { .. })
        ));
        font.font_info.style_name = Some("Extra Bold".to_string());
        assert_eq!(style_key(&font, origin).unwrap(), "ExtraBold");
    }
}
