use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glyphs_plist::ToUfoOptions;

use crate::{discover, merge_glyphs, style_key, Error, MergeReport, Suffix};

/// Where the Noto sources live relative to a checkout of this repository.
pub const DEFAULT_SOURCE_DIR: &str = "../noto-source/src/";

const OUTPUT_PREFIX: &str = "NotoAmalgamated";

#[derive(Clone, Debug)]
pub struct Config {
    /// Holds `.glyphs` files at the top level and `.ufo` directories anywhere.
    pub source_dir: PathBuf,
    /// Where the amalgamated UFOs are written.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from("."),
        }
    }
}

/// The path of the amalgamated UFO for `style_key` in `output_dir`.
pub fn output_path(output_dir: &Path, style_key: &str) -> PathBuf {
    output_dir.join(format!(
        "{OUTPUT_PREFIX}-{}.ufo",
        style_key.replace(' ', "")
    ))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Accumulates one amalgamated font per style key.
#[derive(Debug, Default)]
pub struct Amalgamator {
    fonts: BTreeMap<String, norad::Font>,
    reports: BTreeMap<String, MergeReport>,
}

impl Amalgamator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `source`, which came from `origin`, into the amalgamated font
    /// for its style. The source is consumed.
    pub fn add_font(&mut self, source: norad::Font, origin: &Path) -> Result<MergeReport, Error> {
        let suffix = Suffix::from_path(origin);
        let key = style_key(&source, origin)?;
        let target = self.fonts.entry(key.clone()).or_insert_with(|| {
            log::info!("Starting amalgamated font {key}");
            let mut font = norad::Font::new();
            font.font_info.family_name = Some(OUTPUT_PREFIX.to_string());
            font.font_info.style_name = Some(key.clone());
            font
        });
        let report = merge_glyphs(source, &file_name(origin), target, &key, suffix);
        *self.reports.entry(key).or_default() += report;
        Ok(report)
    }

    /// Convert every master of a Glyphs file and merge them in master order.
    pub fn add_glyphs_file(&mut self, path: &Path) -> Result<(), Error> {
        let load_error = |source| Error::LoadGlyphs {
            path: path.to_owned(),
            source,
        };
        let font = glyphs_plist::Font::load(path).map_err(load_error)?;
        let options = ToUfoOptions {
            minimal: true,
            propagate_anchors: false,
        };
        let ufos = font.to_ufos(&options).map_err(load_error)?;
        for ufo in ufos {
            self.add_font(ufo, path)?;
        }
        Ok(())
    }

    pub fn add_ufo(&mut self, path: &Path) -> Result<(), Error> {
        let ufo = norad::Font::load(path).map_err(|e| Error::LoadUfo {
            path: path.to_owned(),
            source: e.into(),
        })?;
        self.add_font(ufo, path)?;
        Ok(())
    }

    pub fn get(&self, style_key: &str) -> Option<&norad::Font> {
        self.fonts.get(style_key)
    }

    pub fn style_keys(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    pub fn report(&self, style_key: &str) -> Option<MergeReport> {
        self.reports.get(style_key).copied()
    }

    /// Write every amalgamated font into `output_dir`, replacing whatever
    /// was there before. Returns the written paths.
    pub fn save_all(&self, output_dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut written = Vec::with_capacity(self.fonts.len());
        for (key, font) in &self.fonts {
            let path = output_path(output_dir, key);
            log::warn!(
                "Saving {} ({} glyphs)",
                path.display(),
                font.default_layer().len()
            );
            if let Some(report) = self.reports.get(key) {
                log::info!(
                    "{key}: {} inserted, {} suffixed, {} dropped",
                    report.inserted,
                    report.suffixed,
                    report.dropped
                );
            }
            font.save(&path).map_err(|e| Error::Save {
                path: path.clone(),
                source: e.into(),
            })?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Merge all sources below `config.source_dir`: first the Glyphs files, then
/// the UFOs, each in path order. Returns the paths of the written fonts.
pub fn run(config: &Config) -> Result<Vec<PathBuf>, Error> {
    let mut amalgamator = Amalgamator::new();

    for path in discover::glyphs_sources(&config.source_dir)? {
        log::warn!("Processing {}", file_name(&path));
        amalgamator.add_glyphs_file(&path)?;
        log::debug!(
            "Styles so far: {:?}",
            amalgamator.style_keys().collect::<Vec<_>>()
        );
    }

    for path in discover::ufo_sources(&config.source_dir)? {
        log::warn!("Processing {}", file_name(&path));
        amalgamator.add_ufo(&path)?;
    }

    amalgamator.save_all(&config.output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, "BoldItalic"),
            PathBuf::from("out/NotoAmalgamated-BoldItalic.ufo")
        );
        assert_eq!(
            output_path(dir, "Extra Light"),
            PathBuf::from("out/NotoAmalgamated-ExtraLight.ufo")
        );
    }

    #[test]
    fn sources_are_grouped_by_style_key() {
        let mut amalgamator = Amalgamator::new();
        let styled = |style: &str, glyph: &str| {
            let mut font = norad::Font::new();
            font.font_info.style_name = Some(style.to_string());
            font.default_layer_mut().insert_glyph(norad::Glyph::new(glyph));
            font
        };
        amalgamator
            .add_font(styled("Semibold", "a"), Path::new("NotoSans.ufo"))
            .unwrap();
        amalgamator
            .add_font(styled("Semi Bold", "a"), Path::new("NotoSerif.ufo"))
            .unwrap();
        amalgamator
            .add_font(styled("Bold", "a"), Path::new("NotoSerif.ufo"))
            .unwrap();

        assert_eq!(amalgamator.style_keys().collect::<Vec<_>>(), vec!["Bold", "SemiBold"]);
        let semibold = amalgamator.get("SemiBold").unwrap();
        assert!(semibold.default_layer().contains_glyph("a"));
        assert!(semibold.default_layer().contains_glyph("a.serif"));
        assert_eq!(semibold.font_info.style_name.as_deref(), Some("SemiBold"));
        assert_eq!(
            amalgamator.report("SemiBold"),
            Some(MergeReport {
                inserted: 1,
                suffixed: 1,
                dropped: 0
            })
        );
    }

    #[test]
    fn font_without_style_name_stops_the_run() {
        let mut amalgamator = Amalgamator::new();
        let result = amalgamator.add_font(norad::Font::new(), Path::new("Anonymous.ufo"));
        assert!(matches!(result, Err(Error::MissingStyleName { .. })));
        assert_eq!(amalgamator.style_keys().count(), 0);
    }
}
