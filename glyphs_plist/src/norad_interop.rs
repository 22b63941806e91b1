//! Conversion of Glyphs masters into UFO fonts.

use std::collections::HashSet;

use kurbo::{Affine, Point};

use crate::{Anchor, Component, Error, Font, FontMaster, Glyph, Layer, Node, NodeType, Path};

/// Options for [`Font::to_ufos`].
#[derive(Clone, Debug)]
pub struct ToUfoOptions {
    /// Only carry over glyphs and the names of family and style.
    pub minimal: bool,
    /// Give composite glyphs the anchors of their first component when they
    /// do not define them themselves.
    pub propagate_anchors: bool,
}

impl Default for ToUfoOptions {
    fn default() -> Self {
        Self {
            minimal: false,
            propagate_anchors: true,
        }
    }
}

impl From<&Node> for norad::ContourPoint {
    fn from(node: &Node) -> Self {
        let (typ, smooth) = match &node.node_type {
            NodeType::Curve => (norad::PointType::Curve, false),
            NodeType::CurveSmooth => (norad::PointType::Curve, true),
            NodeType::Line => (norad::PointType::Line, false),
            NodeType::LineSmooth => (norad::PointType::Line, true),
            NodeType::OffCurve => (norad::PointType::OffCurve, false),
            NodeType::QCurve => (norad::PointType::QCurve, false),
            NodeType::QCurveSmooth => (norad::PointType::QCurve, true),
        };
        Self::new(node.pt.x, node.pt.y, typ, smooth, None, None)
    }
}

impl From<&Path> for norad::Contour {
    fn from(path: &Path) -> Self {
        let mut points: Vec<norad::ContourPoint> =
            path.nodes.iter().map(|node| node.into()).collect();
        if !path.closed {
            if let Some(first) = points.first_mut() {
                first.typ = norad::PointType::Move;
                first.smooth = false;
            }
        } else {
            // In Glyphs.app, the starting node of a closed contour is
            // always stored at the end of the nodes list.
            points.rotate_right(1);
        }
        Self::new(points, None)
    }
}

fn to_norad_transform(affine: Affine) -> norad::AffineTransform {
    let c = affine.as_coeffs();
    norad::AffineTransform {
        x_scale: c[0],
        xy_scale: c[1],
        yx_scale: c[2],
        y_scale: c[3],
        x_offset: c[4],
        y_offset: c[5],
    }
}

fn to_name(name: &str) -> Result<norad::Name, Error> {
    norad::Name::new(name).map_err(|e| Error::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

impl TryFrom<&Component> for norad::Component {
    type Error = Error;

    fn try_from(component: &Component) -> Result<Self, Self::Error> {
        let name = to_name(component.base()?)?;
        Ok(Self::new(
            name,
            to_norad_transform(component.affine()),
            None,
        ))
    }
}

impl TryFrom<&Anchor> for norad::Anchor {
    type Error = Error;

    fn try_from(anchor: &Anchor) -> Result<Self, Self::Error> {
        let name = to_name(&anchor.name)?;
        let position = anchor.position();
        Ok(Self::new(position.x, position.y, Some(name), None, None))
    }
}

fn convert_layer(glyph: &Glyph, layer: &Layer, codepoints: &[char]) -> Result<norad::Glyph, Error> {
    // norad panics on invalid names, so check first.
    to_name(glyph.name())?;
    let mut ufo_glyph = norad::Glyph::new(glyph.name());
    ufo_glyph.width = layer.width.unwrap_or(0.0);
    for c in codepoints {
        ufo_glyph.codepoints.insert(*c);
    }
    ufo_glyph.contours = layer.all_paths().map(norad::Contour::from).collect();
    ufo_glyph.components = layer
        .all_components()
        .map(norad::Component::try_from)
        .collect::<Result<_, _>>()?;
    ufo_glyph.anchors = layer
        .anchors()
        .iter()
        .map(norad::Anchor::try_from)
        .collect::<Result<_, _>>()?;
    Ok(ufo_glyph)
}

/// Copy anchors from each composite's first component, one level deep.
fn propagate_anchors(ufo: &mut norad::Font) {
    let layer = ufo.default_layer();
    let mut additions: Vec<(String, Vec<norad::Anchor>)> = Vec::new();
    for glyph in layer.iter() {
        let Some(component) = glyph.components.first() else {
            continue;
        };
        let Some(base) = layer.get_glyph(component.base.as_str()) else {
            continue;
        };
        let existing: HashSet<&str> = glyph
            .anchors
            .iter()
            .filter_map(|a| a.name.as_ref().map(|n| n.as_str()))
            .collect();
        let t = component.transform;
        let affine = Affine::new([
            t.x_scale, t.xy_scale, t.yx_scale, t.y_scale, t.x_offset, t.y_offset,
        ]);
        let anchors: Vec<norad::Anchor> = base
            .anchors
            .iter()
            .filter(|a| {
                a.name
                    .as_ref()
                    .map_or(false, |n| !existing.contains(n.as_str()))
            })
            .map(|a| {
                let pt = affine * Point::new(a.x, a.y);
                norad::Anchor::new(pt.x, pt.y, a.name.clone(), None, None)
            })
            .collect();
        if !anchors.is_empty() {
            additions.push((glyph.name().to_string(), anchors));
        }
    }
    let layer = ufo.default_layer_mut();
    for (name, anchors) in additions {
        if let Some(glyph) = layer.get_glyph_mut(&name) {
            log::debug!("propagated {} anchors to {}", anchors.len(), name);
            glyph.anchors.extend(anchors);
        }
    }
}

impl Font {
    fn master_to_ufo(&self, master: &FontMaster, options: &ToUfoOptions) -> Result<norad::Font, Error> {
        let format = self.format();
        let mut ufo = norad::Font::new();
        ufo.font_info.family_name = self.family_name.clone();
        ufo.font_info.style_name = Some(master.name());
        if !options.minimal {
            if let Some(upm) = self.units_per_em {
                ufo.font_info.units_per_em = norad::fontinfo::NonNegativeIntegerOrFloat::new(upm);
            }
            ufo.font_info.ascender = master.ascender;
            ufo.font_info.descender = master.descender;
            ufo.font_info.cap_height = master.cap_height;
            ufo.font_info.x_height = master.x_height;
            ufo.font_info.italic_angle = master.italic_angle.filter(|a| *a != 0.0).map(|a| -a);
        }

        let glyph_order = self
            .glyphs
            .iter()
            .map(|glyph| ::plist::Value::String(glyph.name().to_string()))
            .collect();
        ufo.lib.insert(
            "public.glyphOrder".to_string(),
            ::plist::Value::Array(glyph_order),
        );

        let layer = ufo.default_layer_mut();
        for glyph in &self.glyphs {
            let Some(master_layer) = glyph.master_layer(&master.id) else {
                log::debug!("{} has no layer for master {}", glyph.name(), master.name());
                continue;
            };
            let codepoints = glyph
                .codepoints(format)
                .map_err(|e| e.in_key(glyph.name()))?;
            let ufo_glyph =
                convert_layer(glyph, master_layer, &codepoints).map_err(|e| e.in_key(glyph.name()))?;
            layer.insert_glyph(ufo_glyph);
        }

        if options.propagate_anchors {
            propagate_anchors(&mut ufo);
        }
        Ok(ufo)
    }

    /// Convert the font into one UFO per master, in master order.
    pub fn to_ufos(&self, options: &ToUfoOptions) -> Result<Vec<norad::Font>, Error> {
        self.font_master
            .iter()
            .map(|master| self.master_to_ufo(master, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SOURCE: &str = r#"{
familyName = "Noto Sans Mono";
unitsPerEm = 1000;
fontMaster = (
{ id = light; weight = Light; ascender = 760; },
{ id = bold; weight = Bold; }
);
glyphs = (
{
glyphname = A;
unicode = 0041;
layers = (
{ layerId = light; width = 600;
  paths = ({ closed = 1; nodes = ("0 0 LINE", "300 700 LINE", "600 0 LINE"); },
           { closed = 0; nodes = ("10 10 LINE", "20 20 LINE"); });
  anchors = ({ name = top; position = "{300, 700}"; }); },
{ layerId = bold; width = 640; }
);
},
{
glyphname = Aring;
layers = (
{ layerId = light; width = 600;
  components = ({ name = A; transform = "{1, 0, 0, 1, 0, 100}"; });
  anchors = ({ name = bottom; position = "{300, 0}"; }); }
);
}
);
}"#;

    #[test]
    fn one_ufo_per_master() {
        let font = Font::parse(SOURCE).unwrap();
        let ufos = font
            .to_ufos(&ToUfoOptions {
                minimal: true,
                propagate_anchors: false,
            })
            .unwrap();
        assert_eq!(ufos.len(), 2);
        assert_eq!(ufos[0].font_info.style_name.as_deref(), Some("Light"));
        assert_eq!(ufos[1].font_info.style_name.as_deref(), Some("Bold"));
        assert_eq!(ufos[0].font_info.family_name.as_deref(), Some("Noto Sans Mono"));
        assert_eq!(ufos[0].font_info.ascender, None);

        let light = ufos[0].default_layer();
        assert_eq!(light.len(), 2);
        let bold = ufos[1].default_layer();
        assert_eq!(bold.len(), 1);
        let order: Vec<&str> = ufos[1]
            .lib
            .get("public.glyphOrder")
            .and_then(::plist::Value::as_array)
            .unwrap()
            .iter()
            .filter_map(::plist::Value::as_string)
            .collect();
        assert_eq!(order, vec!["A", "Aring"]);
        assert_eq!(bold.get_glyph("A").unwrap().width, 640.0);
    }

    #[test]
    fn glyph_contents_are_converted() {
        let font = Font::parse(SOURCE).unwrap();
        let ufos = font
            .to_ufos(&ToUfoOptions {
                minimal: true,
                propagate_anchors: false,
            })
            .unwrap();
        let a = ufos[0].default_layer().get_glyph("A").unwrap();
        assert_eq!(a.width, 600.0);
        assert!(a.codepoints.contains('A'));
        assert_eq!(a.contours.len(), 2);
        // Closed contour starts with the node Glyphs stores last.
        assert_eq!(a.contours[0].points[0].x, 600.0);
        assert_eq!(a.contours[1].points[0].typ, norad::PointType::Move);
        assert_eq!(a.anchors[0].name.as_ref().unwrap().as_str(), "top");

        let aring = ufos[0].default_layer().get_glyph("Aring").unwrap();
        assert_eq!(aring.components[0].base.as_str(), "A");
        assert_eq!(aring.components[0].transform.y_offset, 100.0);
        assert_eq!(aring.anchors.len(), 1);
    }

    #[test]
    fn full_conversion_copies_metrics_and_anchors() {
        let font = Font::parse(SOURCE).unwrap();
        let ufos = font.to_ufos(&ToUfoOptions::default()).unwrap();
        assert_eq!(ufos[0].font_info.ascender, Some(760.0));
        assert!(ufos[0].font_info.units_per_em.is_some());

        let aring = ufos[0].default_layer().get_glyph("Aring").unwrap();
        let names: Vec<&str> = aring
            .anchors
            .iter()
            .map(|a| a.name.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(names, vec!["bottom", "top"]);
        assert_eq!((aring.anchors[1].x, aring.anchors[1].y), (300.0, 800.0));
    }

    #[test]
    fn invalid_glyph_name_is_an_error() {
        let font = Font::parse(
            "{fontMaster = ({id = m;}); glyphs = ({glyphname = \"\"; layers = ({layerId = m;});});}",
        )
        .unwrap();
        assert!(font.to_ufos(&ToUfoOptions::default()).is_err());
    }
}
