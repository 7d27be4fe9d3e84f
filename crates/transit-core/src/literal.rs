//! Parser for literal-encoded table cells.
//!
//! # Overview
//!
//! Station tables exported from dataframes serialize composite values as
//! literal strings, for example:
//!
//! ```text
//! Nearest_Stop  = ('Times Sq-42 St', 'N Q R W')
//! location      = (40.755, -73.987)
//! routes        = ['N', 'Q', 'R', 'W']
//! ```
//!
//! This module parses the subset of literal syntax those tables use:
//! single- or double-quoted strings with backslash escapes, numbers,
//! tuples, lists, sets, `None`, `True` and `False`. Trailing commas are
//! accepted. A parenthesized value without a comma is the value itself,
//! not a one-element tuple.

use crate::error::AnalysisError;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    None,
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
    Set(Vec<Literal>),
}

impl Literal {
    /// Items of a tuple, list or set.
    #[must_use]
    pub fn items(&self) -> Option<&[Self]> {
        match self {
            Self::Tuple(items) | Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parse one literal from `input`. The whole input must be consumed.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] describing the offending
/// position when the text is not a valid literal.
pub fn parse(input: &str) -> Result<Literal, AnalysisError> {
    let mut parser = Parser {
        src: input,
        chars: input.char_indices().collect(),
        pos: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("trailing characters"));
    }
    Ok(value)
}

/// Parse a collection of strings (tuple, list or set), or fall back to
/// splitting a bare string on whitespace.
///
/// Bare strings such as `N Q R W` are how route lists appear in raw
/// station exports.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] when a collection contains a
/// non-string element.
pub fn parse_string_set(input: &str) -> Result<Vec<String>, AnalysisError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let looks_literal = trimmed.starts_with(['(', '[', '{', '\'', '"']);
    if !looks_literal {
        return Ok(trimmed.split_whitespace().map(str::to_string).collect());
    }
    match parse(trimmed)? {
        Literal::Str(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        other => {
            let items = other.items().ok_or_else(|| {
                AnalysisError::malformed(format!("expected a string collection, got `{trimmed}`"))
            })?;
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        AnalysisError::malformed(format!(
                            "non-string element in collection `{trimmed}`"
                        ))
                    })
                })
                .collect()
        }
    }
}

/// Parse a `(lat, long)` pair.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] unless the input is a two-element
/// numeric tuple or list.
pub fn parse_position(input: &str) -> Result<(f64, f64), AnalysisError> {
    let value = parse(input)?;
    match value.items() {
        Some([lat, long]) => match (lat.as_f64(), long.as_f64()) {
            (Some(lat), Some(long)) => Ok((lat, long)),
            _ => Err(AnalysisError::malformed(format!(
                "position `{input}` must contain two numbers"
            ))),
        },
        _ => Err(AnalysisError::malformed(format!(
            "position `{input}` must be a (lat, long) pair"
        ))),
    }
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, what: &str) -> AnalysisError {
        AnalysisError::malformed(format!(
            "invalid literal `{}`: {what} at offset {}",
            self.src,
            self.chars
                .get(self.pos)
                .map_or(self.src.len(), |&(offset, _)| offset)
        ))
    }

    fn value(&mut self) -> Result<Literal, AnalysisError> {
        self.skip_ws();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(quote).map(Literal::Str)
            }
            Some('(') => {
                self.pos += 1;
                let (items, saw_comma) = self.sequence(')')?;
                if items.len() == 1 && !saw_comma {
                    Ok(items.into_iter().next().unwrap_or(Literal::None))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some('[') => {
                self.pos += 1;
                self.sequence(']').map(|(items, _)| Literal::List(items))
            }
            Some('{') => {
                self.pos += 1;
                self.sequence('}').map(|(items, _)| Literal::Set(items))
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Comma-separated values up to `close`. Returns whether any comma was seen.
    fn sequence(&mut self, close: char) -> Result<(Vec<Literal>, bool), AnalysisError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, saw_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => saw_comma = true,
                Some(c) if c == close => return Ok((items, saw_comma)),
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.error("expected `,` or closing bracket"));
                }
                None => return Err(self.error("unclosed bracket")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, AnalysisError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c) => out.push(c),
                    None => return Err(self.error("dangling escape")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, AnalysisError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .map(|&(_, c)| c)
            .filter(|&c| c != '_')
            .collect();
        text.parse::<f64>().map(Literal::Num).map_err(|_| {
            self.pos = start;
            self.error("invalid number")
        })
    }

    fn keyword(&mut self) -> Result<Literal, AnalysisError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().map(|&(_, c)| c).collect();
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "nan" | "inf" => Ok(Literal::Num(word.parse().unwrap_or(f64::NAN))),
            _ => {
                self.pos = start;
                Err(self.error("unknown identifier"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_station_tuple() {
        let lit = parse("('Times Sq-42 St', 'N Q R W')").expect("tuple");
        assert_eq!(
            lit,
            Literal::Tuple(vec![
                Literal::Str("Times Sq-42 St".into()),
                Literal::Str("N Q R W".into()),
            ])
        );
    }

    #[test]
    fn double_quotes_and_escapes() {
        let lit = parse(r#"("Bedford Av", 'L\'s')"#).expect("tuple");
        let items = lit.items().expect("items");
        assert_eq!(items[0].as_str(), Some("Bedford Av"));
        assert_eq!(items[1].as_str(), Some("L's"));
    }

    #[test]
    fn parenthesized_scalar_is_not_tuple() {
        assert_eq!(parse("('A')").expect("scalar"), Literal::Str("A".into()));
        assert_eq!(
            parse("('A',)").expect("tuple"),
            Literal::Tuple(vec![Literal::Str("A".into())])
        );
    }

    #[test]
    fn parses_position() {
        let (lat, long) = parse_position("(40.7527, -73.9772)").expect("position");
        assert!((lat - 40.7527).abs() < 1e-12);
        assert!((long + 73.9772).abs() < 1e-12);
    }

    #[test]
    fn position_rejects_three_elements() {
        assert!(parse_position("(1, 2, 3)").is_err());
        assert!(parse_position("('a', 2)").is_err());
    }

    #[test]
    fn string_set_accepts_collections_and_bare_words() {
        assert_eq!(
            parse_string_set("{'A', 'C', 'E'}").expect("set"),
            vec!["A", "C", "E"]
        );
        assert_eq!(parse_string_set("['7']").expect("list"), vec!["7"]);
        assert_eq!(parse_string_set("N Q R W").expect("bare"), vec!["N", "Q", "R", "W"]);
        assert!(parse_string_set("   ").expect("empty").is_empty());
    }

    #[test]
    fn string_set_rejects_numbers() {
        assert!(parse_string_set("[1, 2]").is_err());
    }

    #[test]
    fn nested_and_trailing_commas() {
        let lit = parse("[(1, 2), (3, 4),]").expect("list");
        assert_eq!(lit.items().map(<[Literal]>::len), Some(2));
    }

    #[test]
    fn keywords() {
        assert_eq!(parse("None").expect("none"), Literal::None);
        assert_eq!(parse(" True ").expect("bool"), Literal::Bool(true));
        assert!(parse("Maybe").is_err());
    }

    #[test]
    fn malformed_inputs_report_offset() {
        let err = parse("('A', 'B'").expect_err("unclosed");
        assert!(err.to_string().contains("unclosed"), "{err}");
        assert!(parse("'open").is_err());
        assert!(parse("('A' 'B')").is_err());
        assert!(parse("('A') x").is_err());
    }
}
