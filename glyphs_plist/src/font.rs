//! The Glyphs.app document model.
//!
//! Only the parts needed to turn masters into UFO glyph sets are typed;
//! everything else is kept as raw plist in `other_stuff`. Both the Glyphs 2
//! and the Glyphs 3 file formats are read into the same structs, with the
//! format-specific keys side by side.

use std::collections::HashMap;

use glyphs_plist_derive::FromPlist;
use kurbo::{Affine, Point, Vec2};

use crate::from_plist::FromPlist;
use crate::plist::Plist;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatVersion {
    V2,
    V3,
}

#[derive(Debug, FromPlist)]
pub struct Font {
    pub glyphs: Vec<Glyph>,
    pub font_master: Vec<FontMaster>,
    pub family_name: Option<String>,
    pub units_per_em: Option<f64>,
    #[plist(rename = ".formatVersion")]
    pub format_version: Option<i64>,
    #[rest]
    pub other_stuff: HashMap<String, Plist>,
}

#[derive(Clone, Debug, FromPlist)]
pub struct Glyph {
    pub layers: Vec<Layer>,
    pub glyphname: String,
    /// Hex values in Glyphs 2, decimal integers in Glyphs 3.
    pub unicode: Option<Plist>,
    #[rest]
    pub other_stuff: HashMap<String, Plist>,
}

#[derive(Clone, Debug, FromPlist)]
pub struct Layer {
    pub name: Option<String>,
    pub associated_master_id: Option<String>,
    pub layer_id: String,
    pub width: Option<f64>,
    pub paths: Option<Vec<Path>>,
    pub components: Option<Vec<Component>>,
    pub anchors: Option<Vec<Anchor>>,
    /// Glyphs 3 keeps paths and components together.
    pub shapes: Option<Vec<Shape>>,
    #[rest]
    pub other_stuff: HashMap<String, Plist>,
}

#[derive(Clone, Debug)]
pub enum Shape {
    Path(Path),
    Component(Component),
}

#[derive(Clone, Debug, FromPlist)]
pub struct Path {
    pub closed: bool,
    pub nodes: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub pt: Point,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Line,
    LineSmooth,
    OffCurve,
    Curve,
    CurveSmooth,
    QCurve,
    QCurveSmooth,
}

#[derive(Clone, Debug, FromPlist)]
pub struct Component {
    /// Glyphs 2 base glyph.
    pub name: Option<String>,
    /// Glyphs 3 base glyph.
    #[plist(rename = "ref")]
    pub reference: Option<String>,
    /// Glyphs 2 transform.
    pub transform: Option<Affine>,
    pub pos: Option<Point>,
    pub scale: Option<Point>,
    pub angle: Option<f64>,
    #[rest]
    pub other_stuff: HashMap<String, Plist>,
}

#[derive(Clone, Debug, FromPlist)]
pub struct Anchor {
    pub name: String,
    pub position: Option<Point>,
    pub pos: Option<Point>,
}

#[derive(Clone, Debug, FromPlist)]
pub struct CustomParameter {
    pub name: String,
    pub value: Plist,
}

#[derive(Debug, FromPlist)]
pub struct FontMaster {
    pub id: String,
    /// Only present in Glyphs 3.
    pub name: Option<String>,
    pub weight: Option<String>,
    pub width: Option<String>,
    pub custom: Option<String>,
    pub italic_angle: Option<f64>,
    pub ascender: Option<f64>,
    pub descender: Option<f64>,
    pub cap_height: Option<f64>,
    pub x_height: Option<f64>,
    pub custom_parameters: Option<Vec<CustomParameter>>,
    #[rest]
    pub other_stuff: HashMap<String, Plist>,
}

impl Font {
    pub fn load(path: &std::path::Path) -> Result<Font, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Font::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Font, Error> {
        let plist = Plist::parse(contents)?;
        FromPlist::from_plist(plist)
    }

    pub fn format(&self) -> FormatVersion {
        match self.format_version {
            Some(v) if v >= 3 => FormatVersion::V3,
            _ => FormatVersion::V2,
        }
    }

    pub fn get_glyph(&self, glyphname: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.name() == glyphname)
    }
}

impl Glyph {
    pub fn name(&self) -> &str {
        &self.glyphname
    }

    /// The layer holding the master's own outlines, as opposed to brace,
    /// bracket or backup layers that merely point at the master.
    pub fn master_layer(&self, master_id: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|l| l.layer_id == master_id && l.associated_master_id.is_none())
    }

    pub fn codepoints(&self, format: FormatVersion) -> Result<Vec<char>, Error> {
        let Some(unicode) = &self.unicode else {
            return Ok(Vec::new());
        };
        let values: Vec<u32> = match (format, unicode) {
            (FormatVersion::V3, Plist::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| item.unexpected("integer"))
                        .and_then(codepoint_value)
                })
                .collect::<Result<_, _>>()?,
            (FormatVersion::V3, other) => {
                vec![other
                    .as_i64()
                    .ok_or_else(|| other.unexpected("integer"))
                    .and_then(codepoint_value)?]
            }
            // Glyphs 2 writes hex without quotes, so "1234" comes back as an
            // integer; its decimal digits are still the hex digits.
            (_, Plist::Integer(i)) => parse_hex_list(&i.to_string())?,
            (_, Plist::String(s)) => parse_hex_list(s)?,
            (_, other) => return Err(other.unexpected("unicode value")),
        };
        values
            .into_iter()
            .map(|v| char::from_u32(v).ok_or_else(|| Error::InvalidCodepoint(format!("{v:X}"))))
            .collect()
    }
}

fn codepoint_value(i: i64) -> Result<u32, Error> {
    u32::try_from(i).map_err(|_| Error::InvalidCodepoint(i.to_string()))
}

fn parse_hex_list(s: &str) -> Result<Vec<u32>, Error> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| u32::from_str_radix(v, 16).map_err(|_| Error::InvalidCodepoint(v.to_string())))
        .collect()
}

impl Layer {
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        let shapes = self.shapes.iter().flatten().filter_map(|s| match s {
            Shape::Path(p) => Some(p),
            Shape::Component(_) => None,
        });
        self.paths.iter().flatten().chain(shapes)
    }

    pub fn all_components(&self) -> impl Iterator<Item = &Component> {
        let shapes = self.shapes.iter().flatten().filter_map(|s| match s {
            Shape::Component(c) => Some(c),
            Shape::Path(_) => None,
        });
        self.components.iter().flatten().chain(shapes)
    }

    pub fn anchors(&self) -> &[Anchor] {
        self.anchors.as_deref().unwrap_or_default()
    }
}

impl FromPlist for Shape {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        if plist.get("ref").is_some() {
            Ok(Shape::Component(FromPlist::from_plist(plist)?))
        } else {
            Ok(Shape::Path(FromPlist::from_plist(plist)?))
        }
    }
}

/// Glyphs 2 stores a node as `"x y TYPE [SMOOTH] [{userData}]"`, Glyphs 3 as
/// a tuple `(x, y, t[s], [{userData}])`.
impl FromPlist for Node {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        match plist {
            Plist::String(s) => {
                let head = s.split('{').next().unwrap_or_default();
                let mut tokens = head.split_whitespace();
                let invalid = || Error::InvalidNode(s.clone());
                let x = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(invalid)?;
                let y = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(invalid)?;
                let kind = tokens.next().ok_or_else(invalid)?;
                let smooth = tokens.next() == Some("SMOOTH");
                let node_type = NodeType::from_glyphs2(kind, smooth).ok_or_else(invalid)?;
                Ok(Node {
                    pt: Point::new(x, y),
                    node_type,
                })
            }
            Plist::Array(items) => {
                let invalid = || Error::InvalidNode(format!("{items:?}"));
                let x = items.first().and_then(Plist::as_f64).ok_or_else(invalid)?;
                let y = items.get(1).and_then(Plist::as_f64).ok_or_else(invalid)?;
                let node_type = items
                    .get(2)
                    .and_then(Plist::as_str)
                    .and_then(NodeType::from_glyphs3)
                    .ok_or_else(invalid)?;
                Ok(Node {
                    pt: Point::new(x, y),
                    node_type,
                })
            }
            other => Err(other.unexpected("node")),
        }
    }
}

impl NodeType {
    fn from_glyphs2(kind: &str, smooth: bool) -> Option<Self> {
        Some(match (kind, smooth) {
            ("LINE", false) => NodeType::Line,
            ("LINE", true) => NodeType::LineSmooth,
            ("OFFCURVE", _) => NodeType::OffCurve,
            ("CURVE", false) => NodeType::Curve,
            ("CURVE", true) => NodeType::CurveSmooth,
            ("QCURVE", false) => NodeType::QCurve,
            ("QCURVE", true) => NodeType::QCurveSmooth,
            _ => return None,
        })
    }

    fn from_glyphs3(kind: &str) -> Option<Self> {
        Some(match kind {
            "l" => NodeType::Line,
            "ls" => NodeType::LineSmooth,
            "o" => NodeType::OffCurve,
            "c" => NodeType::Curve,
            "cs" => NodeType::CurveSmooth,
            "q" => NodeType::QCurve,
            "qs" => NodeType::QCurveSmooth,
            _ => return None,
        })
    }
}

impl Component {
    pub fn base(&self) -> Result<&str, Error> {
        self.name
            .as_deref()
            .or(self.reference.as_deref())
            .ok_or_else(|| Error::MissingKey("ref".to_string()))
    }

    /// The placement of the component. Glyphs 3 splits it into position,
    /// rotation in degrees and scale, applied scale first.
    pub fn affine(&self) -> Affine {
        if let Some(transform) = self.transform {
            return transform;
        }
        let pos = self.pos.unwrap_or(Point::ORIGIN);
        let scale = self.scale.unwrap_or(Point::new(1.0, 1.0));
        let angle = self.angle.unwrap_or(0.0);
        Affine::translate(Vec2::new(pos.x, pos.y))
            * Affine::rotate(angle.to_radians())
            * Affine::scale_non_uniform(scale.x, scale.y)
    }
}

impl Anchor {
    pub fn position(&self) -> Point {
        self.position.or(self.pos).unwrap_or(Point::ORIGIN)
    }
}

impl FontMaster {
    fn custom_parameter(&self, name: &str) -> Option<&Plist> {
        self.custom_parameters
            .iter()
            .flatten()
            .find(|cp| cp.name == name)
            .map(|cp| &cp.value)
    }

    /// The style name of the master.
    ///
    /// Glyphs 3 stores it directly. Glyphs 2 either has a "Master Name"
    /// custom parameter or builds it from the width, weight and custom
    /// names, dropping redundant "Regular" parts and appending "Italic" for
    /// slanted masters.
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Some(name) = self.custom_parameter("Master Name").and_then(Plist::as_str) {
            return name.to_string();
        }
        let custom = self.custom.as_deref().unwrap_or_default();
        let mut names: Vec<&str> = [
            self.width.as_deref().unwrap_or("Regular"),
            self.weight.as_deref().unwrap_or("Regular"),
            custom,
        ]
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect();
        while names.len() > 1 {
            match names.iter().position(|n| *n == "Regular") {
                Some(idx) => {
                    names.remove(idx);
                }
                None => break,
            }
        }
        if self.italic_angle.unwrap_or(0.0) != 0.0 {
            if names == ["Regular"] {
                return "Italic".to_string();
            }
            if !custom.contains("Italic") {
                names.push("Italic");
            }
        }
        names.join(" ")
    }
}
