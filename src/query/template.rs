//! Positional query templates.
//!
//! Templates use `%s` and `%d` placeholders, optionally with an explicit
//! 1-based position (`%2$s`). `%%` is a literal percent sign and `%n` a
//! newline. A template can be rendered in two ways:
//!
//! - [`QueryTemplate::format`] splices the textual form of each argument into
//!   the query. Quotes around a placeholder are kept as written.
//! - [`QueryTemplate::bind`] replaces placeholders with bound `$p<i>`
//!   parameters. Quotes that directly wrap a placeholder (`'%s'`) are dropped.
//!
//! Both check that every argument is used exactly as the placeholders demand.

use serde_json::Value as JsonValue;

use crate::config::ParameterMode;
use crate::error::TemplateError;
use crate::graph::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    String,
    Decimal,
}

impl Conversion {
    fn symbol(self) -> char {
        match self {
            Conversion::String => 's',
            Conversion::Decimal => 'd',
        }
    }
}

/// Where a placeholder sits in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Outside any string literal.
    Bare,
    /// The whole content of a string literal, e.g. `'%s'`.
    Quoted(char),
    /// Part of a longer string literal, e.g. `'%s%%'`.
    InLiteral(char),
    /// A label, type or property key: `(n:%s)`, `n.%s` or `` `%s` ``.
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder {
        index: usize,
        conversion: Conversion,
        position: Position,
    },
}

/// A query string with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub cypher: String,
    pub params: Params,
}

/// A parsed query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl QueryTemplate {
    /// Parses a template.
    ///
    /// Fails on unknown conversions and on a trailing `%`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        let mut literal: Option<char> = None;
        // Length of `text` right after the opening quote of `literal`.
        let mut literal_start = usize::MAX;
        let mut escaped = false;
        let mut brace_depth = 0usize;
        let mut next_index = 0usize;

        while let Some(c) = chars.next() {
            if c == '%' {
                let (index, conversion) = match chars.next() {
                    None => return Err(TemplateError::DanglingPercent),
                    Some('%') => {
                        text.push('%');
                        continue;
                    }
                    Some('n') => {
                        text.push('\n');
                        continue;
                    }
                    Some(d) if d.is_ascii_digit() => {
                        let mut digits = String::from(d);
                        while let Some(&next) = chars.peek() {
                            if !next.is_ascii_digit() {
                                break;
                            }
                            digits.push(next);
                            chars.next();
                        }
                        match chars.next() {
                            Some('$') => {}
                            Some(other) => return Err(TemplateError::UnknownConversion(other)),
                            None => return Err(TemplateError::DanglingPercent),
                        }
                        let position: usize = digits
                            .parse()
                            .map_err(|_| TemplateError::UnknownConversion(d))?;
                        if position == 0 {
                            return Err(TemplateError::UnknownConversion('0'));
                        }
                        (position - 1, parse_conversion(chars.next())?)
                    }
                    Some(other) => {
                        let conversion = parse_conversion(Some(other))?;
                        let index = next_index;
                        next_index += 1;
                        (index, conversion)
                    }
                };

                let position = match literal {
                    Some('`') => Position::Identifier,
                    Some(quote) if text.len() == literal_start && chars.peek() == Some(&quote) => {
                        text.pop();
                        chars.next();
                        literal = None;
                        Position::Quoted(quote)
                    }
                    Some(quote) => Position::InLiteral(quote),
                    None if brace_depth == 0 && text.ends_with(':') => Position::Identifier,
                    None if text.ends_with('.') => Position::Identifier,
                    None => Position::Bare,
                };

                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                literal_start = usize::MAX;
                segments.push(Segment::Placeholder {
                    index,
                    conversion,
                    position,
                });
                continue;
            }

            match literal {
                Some(quote) => {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' && quote != '`' {
                        escaped = true;
                    } else if c == quote {
                        literal = None;
                    }
                }
                None => match c {
                    '\'' | '"' | '`' => {
                        literal = Some(c);
                        text.push(c);
                        literal_start = text.len();
                        continue;
                    }
                    '{' => brace_depth += 1,
                    '}' => brace_depth = brace_depth.saturating_sub(1),
                    _ => {}
                },
            }
            text.push(c);
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of arguments the template expects.
    pub fn arity(&self) -> usize {
        self.placeholders()
            .map(|(index, _, _)| index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Splices the textual form of each value into the query.
    ///
    /// Values are not escaped. Use [`bind`](Self::bind) for anything that
    /// did not come from the program itself.
    pub fn format(&self, values: &[JsonValue]) -> Result<String, TemplateError> {
        self.check_arguments(values.len())?;

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder {
                    index,
                    conversion,
                    position,
                } => {
                    let text = render_text(*index, *conversion, &values[*index])?;
                    match position {
                        Position::Quoted(quote) => {
                            out.push(*quote);
                            out.push_str(&text);
                            out.push(*quote);
                        }
                        _ => out.push_str(&text),
                    }
                }
            }
        }
        Ok(out)
    }

    /// Replaces placeholders with bound parameters.
    ///
    /// Labels, relationship types and property keys cannot be parameterized
    /// in Cypher. There the value is inlined, and only if it is a plain
    /// identifier. A quoted placeholder binds the same text `format` would
    /// splice between the quotes. Inside a longer string
    /// literal the value is inlined with the quote and backslash escaped.
    pub fn bind(&self, values: &[JsonValue]) -> Result<BoundQuery, TemplateError> {
        self.check_arguments(values.len())?;

        let mut cypher = String::with_capacity(self.source.len());
        let mut params = Params::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => cypher.push_str(text),
                Segment::Placeholder {
                    index,
                    conversion,
                    position,
                } => {
                    let value = &values[*index];
                    let text = render_text(*index, *conversion, value)?;
                    match position {
                        Position::Bare | Position::Quoted(_) => {
                            let name = format!("p{}", index);
                            let bound = match position {
                                Position::Quoted(_) => JsonValue::String(text),
                                _ => value.clone(),
                            };
                            cypher.push('$');
                            cypher.push_str(&name);
                            params.insert(name, bound);
                        }
                        Position::Identifier => {
                            if !is_identifier(&text) {
                                return Err(TemplateError::InvalidIdentifier {
                                    index: *index,
                                    value: text,
                                });
                            }
                            cypher.push_str(&text);
                        }
                        Position::InLiteral(quote) => {
                            cypher.push_str(&escape_literal(&text, *quote));
                        }
                    }
                }
            }
        }
        Ok(BoundQuery { cypher, params })
    }

    /// Renders with the configured mode.
    pub fn render(&self, mode: ParameterMode, values: &[JsonValue]) -> Result<BoundQuery, TemplateError> {
        match mode {
            ParameterMode::Bind => self.bind(values),
            ParameterMode::Inline => Ok(BoundQuery {
                cypher: self.format(values)?,
                params: Params::new(),
            }),
        }
    }

    fn placeholders(&self) -> impl Iterator<Item = (usize, Conversion, Position)> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder {
                index,
                conversion,
                position,
            } => Some((*index, *conversion, *position)),
            Segment::Text(_) => None,
        })
    }

    fn check_arguments(&self, supplied: usize) -> Result<(), TemplateError> {
        let mut used = vec![false; supplied];
        for (index, _, _) in self.placeholders() {
            match used.get_mut(index) {
                Some(slot) => *slot = true,
                None => return Err(TemplateError::MissingArgument { index, supplied }),
            }
        }
        match used.iter().position(|used| !used) {
            Some(index) => Err(TemplateError::UnusedArgument { index }),
            None => Ok(()),
        }
    }
}

fn parse_conversion(c: Option<char>) -> Result<Conversion, TemplateError> {
    match c {
        Some('s') => Ok(Conversion::String),
        Some('d') => Ok(Conversion::Decimal),
        Some(other) => Err(TemplateError::UnknownConversion(other)),
        None => Err(TemplateError::DanglingPercent),
    }
}

fn render_text(index: usize, conversion: Conversion, value: &JsonValue) -> Result<String, TemplateError> {
    match (conversion, value) {
        (Conversion::String, JsonValue::String(s)) => Ok(s.clone()),
        (Conversion::String, other) => Ok(other.to_string()),
        (Conversion::Decimal, JsonValue::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        (Conversion::Decimal, JsonValue::Null) => Ok("null".to_string()),
        (conversion, other) => Err(TemplateError::IllegalConversion {
            index,
            conversion: conversion.symbol(),
            value: other.to_string(),
        }),
    }
}

fn escape_literal(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True for names usable unquoted as a label, type or property key.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
