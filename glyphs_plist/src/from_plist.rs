//! Conversion of parsed plists into typed values.

use std::collections::HashMap;

use kurbo::{Affine, Point};

use crate::plist::Plist;
use crate::Error;

pub trait FromPlist: Sized {
    fn from_plist(plist: Plist) -> Result<Self, Error>;
}

/// Conversion of a dictionary value that may be absent. Plain types require
/// the key; `Option<T>` accepts its absence.
pub trait FromPlistOpt: Sized {
    fn from_option_plist(plist: Option<Plist>, key: &str) -> Result<Self, Error>;
}

impl<T: FromPlist> FromPlistOpt for T {
    fn from_option_plist(plist: Option<Plist>, key: &str) -> Result<Self, Error> {
        match plist {
            Some(plist) => T::from_plist(plist).map_err(|e| e.in_key(key)),
            None => Err(Error::MissingKey(key.to_string())),
        }
    }
}

impl<T: FromPlist> FromPlistOpt for Option<T> {
    fn from_option_plist(plist: Option<Plist>, key: &str) -> Result<Self, Error> {
        plist
            .map(T::from_plist)
            .transpose()
            .map_err(|e| e.in_key(key))
    }
}

impl FromPlist for Plist {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        Ok(plist)
    }
}

/// Bare words that look like numbers (glyph names such as `1`) are turned
/// back into text. The parser only makes numbers of words that print back
/// unchanged, so this is lossless.
impl FromPlist for String {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        match plist {
            Plist::String(s) => Ok(s),
            Plist::Integer(i) => Ok(i.to_string()),
            Plist::Float(f) => Ok(f.to_string()),
            other => Err(other.unexpected("string")),
        }
    }
}

impl FromPlist for f64 {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        match plist {
            Plist::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Plist::String(s).unexpected("number")),
            other => other.as_f64().ok_or_else(|| other.unexpected("number")),
        }
    }
}

impl FromPlist for i64 {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        match plist {
            Plist::Integer(i) => Ok(i),
            Plist::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Plist::String(s).unexpected("integer")),
            other => Err(other.unexpected("integer")),
        }
    }
}

impl FromPlist for bool {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        match &plist {
            Plist::String(s) if s == "true" || s == "YES" => Ok(true),
            Plist::String(s) if s == "false" || s == "NO" => Ok(false),
            other => other
                .as_i64()
                .map(|i| i != 0)
                .ok_or_else(|| other.unexpected("boolean")),
        }
    }
}

impl<T: FromPlist> FromPlist for Vec<T> {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        plist
            .into_array()?
            .into_iter()
            .enumerate()
            .map(|(i, item)| T::from_plist(item).map_err(|e| e.in_key(format!("[{i}]"))))
            .collect()
    }
}

impl FromPlist for HashMap<String, Plist> {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        plist.into_dict()
    }
}

/// Numbers from either a Glyphs 2 brace string (`"{1, 2}"`) or a Glyphs 3
/// tuple (`(1, 2)`).
fn coordinates(plist: Plist, count: usize) -> Result<Vec<f64>, Error> {
    let coords = match plist {
        Plist::String(s) => {
            let inner = s
                .trim()
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .ok_or_else(|| Error::InvalidCoordinates(s.clone()))?;
            inner
                .split(',')
                .map(|c| c.trim().parse().map_err(|_| Error::InvalidCoordinates(s.clone())))
                .collect::<Result<Vec<f64>, Error>>()?
        }
        Plist::Array(items) => items
            .iter()
            .map(|item| item.as_f64().ok_or_else(|| item.unexpected("number")))
            .collect::<Result<Vec<f64>, Error>>()?,
        other => return Err(other.unexpected("coordinates")),
    };
    if coords.len() != count {
        return Err(Error::InvalidCoordinates(format!(
            "expected {count} coordinates, found {}",
            coords.len()
        )));
    }
    Ok(coords)
}

impl FromPlist for Point {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        let coords = coordinates(plist, 2)?;
        Ok(Point::new(coords[0], coords[1]))
    }
}

impl FromPlist for Affine {
    fn from_plist(plist: Plist) -> Result<Self, Error> {
        let c = coordinates(plist, 6)?;
        Ok(Affine::new([c[0], c[1], c[2], c[3], c[4], c[5]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_from_both_formats() {
        let v2 = Point::from_plist(Plist::from("{250, -10.5}")).unwrap();
        let v3 = Point::from_plist(Plist::Array(vec![Plist::Integer(250), Plist::Float(-10.5)])).unwrap();
        assert_eq!(v2, Point::new(250.0, -10.5));
        assert_eq!(v2, v3);
    }

    #[test]
    fn affine_from_brace_string() {
        let affine = Affine::from_plist(Plist::from("{1, 0, 0, 1, 50, 0}")).unwrap();
        assert_eq!(affine.as_coeffs(), [1.0, 0.0, 0.0, 1.0, 50.0, 0.0]);
        assert!(Affine::from_plist(Plist::from("{1, 0}")).is_err());
    }

    #[test]
    fn optional_and_required_keys() {
        let missing: Result<String, _> = FromPlistOpt::from_option_plist(None, "name");
        assert!(matches!(missing, Err(Error::MissingKey(key)) if key == "name"));
        let optional: Option<String> = FromPlistOpt::from_option_plist(None, "name").unwrap();
        assert_eq!(optional, None);
        let wrong: Result<Option<f64>, _> =
            FromPlistOpt::from_option_plist(Some(Plist::Array(vec![])), "width");
        assert!(matches!(wrong, Err(Error::InKey { key, .. }) if key == "width"));
    }

    #[test]
    fn numeric_words_read_back_as_strings() {
        assert_eq!(String::from_plist(Plist::Integer(1)).unwrap(), "1");
        assert_eq!(f64::from_plist(Plist::from("12.5")).unwrap(), 12.5);
        assert!(bool::from_plist(Plist::Integer(1)).unwrap());
    }

    #[test]
    fn zero_padded_words_keep_their_text() {
        let plist = Plist::parse("{name = 007; version = 1.10; width = 0600;}").unwrap();
        let dict = plist.into_dict().unwrap();
        assert_eq!(String::from_plist(dict["name"].clone()).unwrap(), "007");
        assert_eq!(String::from_plist(dict["version"].clone()).unwrap(), "1.10");
        assert_eq!(f64::from_plist(dict["width"].clone()).unwrap(), 600.0);
        let tuple = Plist::parse("(010, 20.50)").unwrap();
        assert_eq!(Point::from_plist(tuple).unwrap(), Point::new(10.0, 20.5));
    }
}
