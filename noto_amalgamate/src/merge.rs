//! Pouring the glyphs of one source into an amalgamated font.

use std::collections::HashSet;
use std::ops::AddAssign;

use crate::Suffix;

/// What happened to the glyphs of one or more sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Glyphs added under their own name.
    pub inserted: usize,
    /// Glyphs whose name was taken but could be added with a suffix.
    pub suffixed: usize,
    /// Glyphs that collided and were left out.
    pub dropped: usize,
}

impl AddAssign for MergeReport {
    fn add_assign(&mut self, other: MergeReport) {
        self.inserted += other.inserted;
        self.suffixed += other.suffixed;
        self.dropped += other.dropped;
    }
}

const GLYPH_ORDER_KEY: &str = "public.glyphOrder";

/// The glyph names of `font` in the order they are merged: the names from
/// its `public.glyphOrder` first, then any glyphs missing from it by name.
fn merge_order(font: &norad::Font) -> Vec<String> {
    let layer = font.default_layer();
    let order = font
        .lib
        .get(GLYPH_ORDER_KEY)
        .and_then(plist::Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::with_capacity(layer.len());
    for name in order.iter().filter_map(plist::Value::as_string) {
        if layer.contains_glyph(name) && seen.insert(name) {
            names.push(name.to_string());
        }
    }
    for glyph in layer.iter() {
        if !seen.contains(glyph.name().as_str()) {
            names.push(glyph.name().to_string());
        }
    }
    names
}

/// A copy of `glyph` under a different name. All fields are moved, nothing
/// is cloned.
fn renamed(glyph: norad::Glyph, name: &str) -> norad::Glyph {
    let mut new = norad::Glyph::new(name);
    new.height = glyph.height;
    new.width = glyph.width;
    new.codepoints = glyph.codepoints;
    new.note = glyph.note;
    new.guidelines = glyph.guidelines;
    new.anchors = glyph.anchors;
    new.components = glyph.components;
    new.contours = glyph.contours;
    new.image = glyph.image;
    new.lib = glyph.lib;
    new
}

/// Move every glyph of the default layer of `source` into the default layer
/// of `target`, following the source's glyph order.
///
/// A glyph whose name is free is inserted as is; the first source to bring a
/// name wins. If the name is taken and `suffix` is given, the glyph goes in
/// as `name.suffix` unless that is taken as well. Anything else is dropped
/// with a warning. Existing glyphs in `target` are never replaced.
///
/// `source_name` and `target_name` only label the log messages.
pub fn merge_glyphs(
    mut source: norad::Font,
    source_name: &str,
    target: &mut norad::Font,
    target_name: &str,
    suffix: Option<Suffix>,
) -> MergeReport {
    let mut report = MergeReport::default();
    let names = merge_order(&source);
    let source_layer = source.default_layer_mut();
    let target_layer = target.default_layer_mut();

    for name in names {
        let Some(glyph) = source_layer.remove_glyph(&name) else {
            continue;
        };
        if !target_layer.contains_glyph(&name) {
            target_layer.insert_glyph(glyph);
            report.inserted += 1;
            continue;
        }
        match suffix {
            Some(suffix) => {
                let suffixed_name = format!("{name}.{suffix}");
                if target_layer.contains_glyph(&suffixed_name) {
                    log::warn!(
                        "Glyph {name} from {source_name} already in amalgamated font {target_name}"
                    );
                    report.dropped += 1;
                } else {
                    log::debug!("{name} from {source_name} added as {suffixed_name}");
                    target_layer.insert_glyph(renamed(glyph, &suffixed_name));
                    report.suffixed += 1;
                }
            }
            None => {
                log::warn!(
                    "Glyph {name} from {source_name} already in amalgamated font {target_name}"
                );
                report.dropped += 1;
            }
        }
    }
    report
}
