//! A parser for the OpenStep-style property lists used by Glyphs.app.

use std::collections::HashMap;

use crate::Error;

#[derive(Clone, Debug, PartialEq)]
pub enum Plist {
    Dictionary(HashMap<String, Plist>),
    Array(Vec<Plist>),
    String(String),
    Integer(i64),
    Float(f64),
    Data(Vec<u8>),
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Plist {
    pub fn parse(s: &str) -> Result<Plist, Error> {
        let mut parser = Parser { src: s, pos: 0 };
        let plist = parser.parse_value()?;
        parser.skip_ws()?;
        if parser.pos < s.len() {
            return Err(parser.error("trailing content after value"));
        }
        Ok(plist)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Plist::Dictionary(_) => "dictionary",
            Plist::Array(_) => "array",
            Plist::String(_) => "string",
            Plist::Integer(_) => "integer",
            Plist::Float(_) => "float",
            Plist::Data(_) => "data",
        }
    }

    pub fn get(&self, key: &str) -> Option<&Plist> {
        self.as_dict().and_then(|dict| dict.get(key))
    }

    pub fn as_dict(&self) -> Option<&HashMap<String, Plist>> {
        match self {
            Plist::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Plist]> {
        match self {
            Plist::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Plist::String(s) => Some(s),
            _ => None,
        }
    }

    /// Bare words such as `007` that only kept their text to preserve it
    /// still read as numbers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Plist::Integer(i) => Some(*i),
            Plist::String(s) if is_integer(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Integers are widened, so `width = 600;` reads as a float too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Plist::Integer(i) => Some(*i as f64),
            Plist::Float(f) => Some(*f),
            Plist::String(s) if is_integer(s) || is_decimal(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn into_dict(self) -> Result<HashMap<String, Plist>, Error> {
        match self {
            Plist::Dictionary(d) => Ok(d),
            other => Err(other.unexpected("dictionary")),
        }
    }

    pub fn into_array(self) -> Result<Vec<Plist>, Error> {
        match self {
            Plist::Array(a) => Ok(a),
            other => Err(other.unexpected("array")),
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedType {
            expected,
            found: self.kind(),
        }
    }
}

impl From<&str> for Plist {
    fn from(s: &str) -> Plist {
        Plist::String(s.to_string())
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b"{}()<>=;,\"".contains(&b)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer(s: &str) -> bool {
    all_digits(s.strip_prefix('-').unwrap_or(s))
}

fn is_decimal(s: &str) -> bool {
    s.strip_prefix('-')
        .unwrap_or(s)
        .split_once('.')
        .map_or(false, |(int, frac)| all_digits(int) && all_digits(frac))
}

/// Classify a bare word. Only plain decimal notation counts as a number, so
/// hex codepoints like `1E00` and names like `infinity` stay strings. A
/// number must also print back to the same text: `007` and `1.10` stay
/// strings so that names and ids survive unchanged.
fn parse_atom(atom: &str) -> Plist {
    if is_integer(atom) {
        if let Ok(i) = atom.parse::<i64>() {
            if i.to_string() == atom {
                return Plist::Integer(i);
            }
        }
    } else if is_decimal(atom) {
        if let Ok(f) = atom.parse::<f64>() {
            if f.to_string() == atom {
                return Plist::Float(f);
            }
        }
    }
    Plist::String(atom.to_string())
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), Error> {
        self.skip_ws()?;
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", b as char)))
        }
    }

    /// Skip whitespace and C-style comments.
    fn skip_ws(&mut self) -> Result<(), Error> {
        loop {
            let rest = &self.src[self.pos..];
            if self.peek().map_or(false, |b| b.is_ascii_whitespace()) {
                self.pos += 1;
            } else if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn parse_value(&mut self) -> Result<Plist, Error> {
        self.skip_ws()?;
        match self.peek() {
            Some(b'{') => self.parse_dict(),
            Some(b'(') => self.parse_array(),
            Some(b'"') => self.parse_quoted().map(Plist::String),
            Some(b'<') => self.parse_data(),
            Some(_) => self.parse_bare().map(parse_atom),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dict(&mut self) -> Result<Plist, Error> {
        self.pos += 1;
        let mut dict = HashMap::new();
        loop {
            self.skip_ws()?;
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Plist::Dictionary(dict));
                }
                Some(b'"') => {
                    let key = self.parse_quoted()?;
                    self.parse_entry(key, &mut dict)?;
                }
                Some(_) => {
                    let key = self.parse_bare()?.to_string();
                    self.parse_entry(key, &mut dict)?;
                }
                None => return Err(self.error("unterminated dictionary")),
            }
        }
    }

    fn parse_entry(&mut self, key: String, dict: &mut HashMap<String, Plist>) -> Result<(), Error> {
        self.expect(b'=')?;
        let value = self.parse_value()?;
        dict.insert(key, value);
        self.skip_ws()?;
        match self.peek() {
            Some(b';') => {
                self.pos += 1;
                Ok(())
            }
            // Tolerate a missing semicolon before the closing brace.
            Some(b'}') => Ok(()),
            _ => Err(self.error("expected ';'")),
        }
    }

    fn parse_array(&mut self) -> Result<Plist, Error> {
        self.pos += 1;
        let mut array = Vec::new();
        loop {
            self.skip_ws()?;
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(Plist::Array(array));
            }
            array.push(self.parse_value()?);
            self.skip_ws()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => (),
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
    }

    fn parse_bare(&mut self) -> Result<&'a str, Error> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() && !is_delimiter(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("unexpected character"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn parse_quoted(&mut self) -> Result<String, Error> {
        self.pos += 1;
        let mut result = String::new();
        loop {
            let rest = &self.src[self.pos..];
            let Some(idx) = rest.find(&['"', '\\'][..]) else {
                return Err(self.error("unterminated string"));
            };
            result.push_str(&rest[..idx]);
            self.pos += idx;
            if self.peek() == Some(b'"') {
                self.pos += 1;
                return Ok(result);
            }
            self.pos += 1;
            let c = self.parse_escape()?;
            result.push(c);
        }
    }

    fn parse_escape(&mut self) -> Result<char, Error> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        let c = match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'U' => {
                let high = self.parse_hex4()?;
                if (0xD800..0xDC00).contains(&high) && self.src[self.pos..].starts_with("\\U") {
                    self.pos += 2;
                    let low = self.parse_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error("invalid surrogate pair"));
                    }
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error("invalid surrogate pair"));
                }
                return char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"));
            }
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                return char::from_u32(value).ok_or_else(|| self.error("invalid octal escape"));
            }
            _ => {
                // Any other escaped character stands for itself.
                self.pos -= 1;
                let c = self.src[self.pos..]
                    .chars()
                    .next()
                    .ok_or_else(|| self.error("unterminated escape"))?;
                self.pos += c.len_utf8();
                return Ok(c);
            }
        };
        Ok(c)
    }

    fn parse_hex4(&mut self) -> Result<u32, Error> {
        let hex = self
            .src
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += 4;
        Ok(value)
    }

    fn parse_data(&mut self) -> Result<Plist, Error> {
        self.pos += 1;
        let rest = &self.src[self.pos..];
        let end = rest
            .find('>')
            .ok_or_else(|| self.error("unterminated data"))?;
        let hex: Vec<u8> = rest[..end]
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if hex.len() % 2 != 0 {
            return Err(self.error("odd number of hex digits in data"));
        }
        let mut data = Vec::with_capacity(hex.len() / 2);
        for pair in hex.chunks(2) {
            let digits = std::str::from_utf8(pair).map_err(|_| self.error("invalid data"))?;
            let byte = u8::from_str_radix(digits, 16).map_err(|_| self.error("invalid data"))?;
            data.push(byte);
        }
        self.pos += end + 1;
        Ok(Plist::Data(data))
    }
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_nested_structures() {
        let plist = Plist::parse(
            r#"{
                .appVersion = "1361";
                familyName = "Noto Sans";
                unitsPerEm = 1000;
                glyphs = (
                    { glyphname = A; unicode = 0041; },
                    { glyphname = "a.sc"; }
                );
            }"#,
        )
        .unwrap();
        assert_eq!(plist.get(".appVersion"), Some(&Plist::from("1361")));
        assert_eq!(plist.get("familyName"), Some(&Plist::from("Noto Sans")));
        assert_eq!(plist.get("unitsPerEm"), Some(&Plist::Integer(1000)));
        let glyphs = plist.get("glyphs").and_then(Plist::as_array).unwrap();
        assert_eq!(
            glyphs[0],
            Plist::Dictionary(hashmap! {
                "glyphname".to_string() => Plist::from("A"),
                "unicode".to_string() => Plist::from("0041"),
            })
        );
        assert_eq!(glyphs[1].get("glyphname"), Some(&Plist::from("a.sc")));
    }

    #[test]
    fn atoms_only_become_numbers_in_decimal_notation() {
        assert_eq!(parse_atom("600"), Plist::Integer(600));
        assert_eq!(parse_atom("-12"), Plist::Integer(-12));
        assert_eq!(parse_atom("0.5"), Plist::Float(0.5));
        assert_eq!(parse_atom("1E00"), Plist::from("1E00"));
        assert_eq!(parse_atom("infinity"), Plist::from("infinity"));
        assert_eq!(parse_atom("00C5"), Plist::from("00C5"));
        assert_eq!(parse_atom("-"), Plist::from("-"));
    }

    #[test]
    fn atoms_keep_their_text() {
        assert_eq!(parse_atom("007"), Plist::from("007"));
        assert_eq!(parse_atom("1.10"), Plist::from("1.10"));
        assert_eq!(parse_atom("-0"), Plist::from("-0"));
        assert_eq!(parse_atom("1.10").as_f64(), Some(1.1));
        assert_eq!(parse_atom("007").as_i64(), Some(7));
        assert_eq!(parse_atom("1E00").as_f64(), None);
        assert_eq!(parse_atom("infinity").as_f64(), None);
    }

    #[test]
    fn quoted_string_escapes() {
        let plist = Plist::parse(r#""a\"b\\c\nd\U2019\012""#).unwrap();
        assert_eq!(plist, Plist::from("a\"b\\c\nd\u{2019}\n"));
        let astral = Plist::parse(r#""\UD83D\UDE00""#).unwrap();
        assert_eq!(astral, Plist::from("\u{1F600}"));
    }

    #[test]
    fn glyphs3_tuples_and_data() {
        let plist = Plist::parse("{nodes = ((10,20,l),(30,-40.5,cs)); d = <0aFF>;}").unwrap();
        let nodes = plist.get("nodes").and_then(Plist::as_array).unwrap();
        assert_eq!(
            nodes[1],
            Plist::Array(vec![
                Plist::Integer(30),
                Plist::Float(-40.5),
                Plist::from("cs")
            ])
        );
        assert_eq!(plist.get("d"), Some(&Plist::Data(vec![0x0a, 0xff])));
    }

    #[test]
    fn empty_containers_and_trailing_commas() {
        assert_eq!(Plist::parse("{}").unwrap(), Plist::Dictionary(HashMap::new()));
        assert_eq!(
            Plist::parse("(1, 2,)").unwrap(),
            Plist::Array(vec![Plist::Integer(1), Plist::Integer(2)])
        );
    }

    #[test]
    fn syntax_errors_report_offset() {
        match Plist::parse("{a = 1 b = 2;}") {
            Err(Error::Parse { offset, .. }) => assert_eq!(offset, 7),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(Plist::parse("{a = 1;").is_err());
        assert!(Plist::parse("\"open").is_err());
        assert!(Plist::parse("(1) 2").is_err());
    }
}
