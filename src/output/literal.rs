//! TypeScript literal serialization
//!
//! Converts an in-memory value tree into literal source text that evaluates
//! back to an equivalent value. Nested lists and records are laid out one
//! element per line with two spaces of indentation per level.

use thiserror::Error;

const INDENT: &str = "  ";

/// Value shapes the serializer refuses to emit
///
/// Hitting one of these means a record was built with data the generated
/// module cannot represent, so callers treat it as fatal.
#[derive(Debug, Error, PartialEq)]
pub enum SerializeError {
    #[error("non-finite number {0} has no literal form")]
    NonFiniteNumber(f64),

    #[error("record label '{0}' is not a valid identifier")]
    InvalidLabel(String),
}

/// A literal value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    /// Fields are emitted in insertion order
    Record(Vec<(String, Literal)>),
}

/// Conversion of domain values into literal trees
pub trait ToLiteral {
    fn to_literal(&self) -> Literal;
}

impl ToLiteral for Literal {
    fn to_literal(&self) -> Literal {
        self.clone()
    }
}

impl ToLiteral for str {
    fn to_literal(&self) -> Literal {
        Literal::Str(self.to_string())
    }
}

impl ToLiteral for String {
    fn to_literal(&self) -> Literal {
        Literal::Str(self.clone())
    }
}

impl ToLiteral for bool {
    fn to_literal(&self) -> Literal {
        Literal::Bool(*self)
    }
}

impl ToLiteral for u32 {
    fn to_literal(&self) -> Literal {
        Literal::Int(i64::from(*self))
    }
}

impl ToLiteral for u64 {
    fn to_literal(&self) -> Literal {
        i64::try_from(*self)
            .map(Literal::Int)
            .unwrap_or(Literal::Float(*self as f64))
    }
}

impl ToLiteral for f64 {
    fn to_literal(&self) -> Literal {
        Literal::Float(*self)
    }
}

impl<T: ToLiteral> ToLiteral for [T] {
    fn to_literal(&self) -> Literal {
        Literal::List(self.iter().map(ToLiteral::to_literal).collect())
    }
}

impl<T: ToLiteral> ToLiteral for Vec<T> {
    fn to_literal(&self) -> Literal {
        self.as_slice().to_literal()
    }
}

impl<T: ToLiteral> ToLiteral for Option<T> {
    fn to_literal(&self) -> Literal {
        match self {
            Some(value) => value.to_literal(),
            None => Literal::Null,
        }
    }
}

/// Builds a `Literal::Record` field by field
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<(String, Literal)>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: ToLiteral + ?Sized>(mut self, label: &str, value: &T) -> Self {
        self.fields.push((label.to_string(), value.to_literal()));
        self
    }

    /// Adds the field only when a value is present
    pub fn optional<T: ToLiteral>(self, label: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => self,
        }
    }

    pub fn build(self) -> Literal {
        Literal::Record(self.fields)
    }
}

/// Serializes a value tree at the top level
pub fn to_literal_string(value: &Literal) -> Result<String, SerializeError> {
    render(value, 0)
}

fn render(value: &Literal, depth: usize) -> Result<String, SerializeError> {
    match value {
        Literal::Null => Ok("null".to_string()),
        Literal::Bool(b) => Ok(b.to_string()),
        Literal::Int(i) => Ok(i.to_string()),
        Literal::Float(f) => {
            if f.is_finite() {
                Ok(f.to_string())
            } else {
                Err(SerializeError::NonFiniteNumber(*f))
            }
        }
        Literal::Str(s) => Ok(quote_string(s)),
        Literal::List(items) => {
            if items.is_empty() {
                return Ok("[]".to_string());
            }
            let inner = INDENT.repeat(depth + 1);
            let lines = items
                .iter()
                .map(|item| Ok(format!("{}{}", inner, render(item, depth + 1)?)))
                .collect::<Result<Vec<_>, SerializeError>>()?;
            Ok(format!("[\n{}\n{}]", lines.join(",\n"), INDENT.repeat(depth)))
        }
        Literal::Record(fields) => {
            if fields.is_empty() {
                return Ok("{}".to_string());
            }
            let inner = INDENT.repeat(depth + 1);
            let lines = fields
                .iter()
                .map(|(label, value)| {
                    if !is_identifier(label) {
                        return Err(SerializeError::InvalidLabel(label.clone()));
                    }
                    Ok(format!("{}{}: {}", inner, label, render(value, depth + 1)?))
                })
                .collect::<Result<Vec<_>, SerializeError>>()?;
            Ok(format!("{{\n{}\n{}}}", lines.join(",\n"), INDENT.repeat(depth)))
        }
    }
}

/// Picks a quoting strategy for one string and renders it
///
/// - no line break and no quote character: double-quoted
/// - a line break or a quote character: template literal; multi-line
///   content has every line trimmed and blank lines dropped
/// - only back-ticks: double-quoted, back-ticks need no escaping there
pub fn quote_string(s: &str) -> String {
    if s.is_empty() {
        return "\"\"".to_string();
    }

    let has_newline = s.contains(['\n', '\r']);
    let has_quote = s.contains(['"', '\'']);

    if !has_newline && !has_quote {
        return double_quoted(s);
    }

    let escaped = escape_template(s);
    if has_newline {
        let body = escaped
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        format!("`{}`", body)
    } else {
        format!("`{}`", escaped)
    }
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn escape_template(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

/// True for labels that can be written unquoted as object keys
pub fn is_identifier(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Evaluates the string literal forms produced by `quote_string`
    fn evaluate(literal: &str) -> String {
        let (body, template) = if let Some(inner) = literal.strip_prefix('`') {
            (inner.strip_suffix('`').unwrap(), true)
        } else {
            let inner = literal.strip_prefix('"').unwrap();
            (inner.strip_suffix('"').unwrap(), false)
        };

        let mut out = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                let escaped = chars.next().unwrap();
                match escaped {
                    '\\' | '"' => out.push(escaped),
                    '`' | '$' if template => out.push(escaped),
                    other => panic!("unexpected escape \\{}", other),
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_simple_string_is_double_quoted() {
        assert_eq!(quote_string("Barbell Curl"), "\"Barbell Curl\"");
        assert_eq!(quote_string(""), "\"\"");
    }

    #[test]
    fn test_backtick_only_string_is_double_quoted() {
        assert_eq!(quote_string("use `grip`"), "\"use `grip`\"");
        assert_eq!(evaluate(&quote_string("use `grip`")), "use `grip`");
    }

    #[test]
    fn test_quoted_single_line_uses_template() {
        assert_eq!(quote_string("Don't lock out"), "`Don't lock out`");
        assert_eq!(quote_string(r#"the "pump""#), r#"`the "pump"`"#);
    }

    #[test]
    fn test_template_escapes_backticks_and_interpolation() {
        let literal = quote_string("it's `fast` ${x} \\ ok");
        assert_eq!(literal, "`it's \\`fast\\` \\${x} \\\\ ok`");
        assert_eq!(evaluate(&literal), "it's `fast` ${x} \\ ok");
    }

    #[test]
    fn test_multiline_round_trip_is_trimmed() {
        let original = "  Keep your \"core\" tight.  \n\n\t Breathe out on the way up.\r\n   ";
        let literal = quote_string(original);
        assert_eq!(
            evaluate(&literal),
            "Keep your \"core\" tight.\nBreathe out on the way up."
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(to_literal_string(&Literal::List(vec![])).unwrap(), "[]");
    }

    #[test]
    fn test_nested_layout() {
        let value = RecordBuilder::new()
            .field("bodyPart", "Abs")
            .field("sets", &3u32)
            .field("tips", &vec!["One".to_string(), "Two".to_string()])
            .field(
                "exercises",
                &Literal::List(vec![RecordBuilder::new().field("id", "abs-1").build()]),
            )
            .build();

        let expected = "{\n  bodyPart: \"Abs\",\n  sets: 3,\n  tips: [\n    \"One\",\n    \"Two\"\n  ],\n  exercises: [\n    {\n      id: \"abs-1\"\n    }\n  ]\n}";
        assert_eq!(to_literal_string(&value).unwrap(), expected);
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let value = RecordBuilder::new()
            .field("zeta", &1u32)
            .field("alpha", &2u32)
            .build();
        let text = to_literal_string(&value).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_optional_field_omitted() {
        let value = RecordBuilder::new()
            .optional::<u32>("sets", None)
            .optional("reps", Some(&12u32))
            .build();
        assert_eq!(to_literal_string(&value).unwrap(), "{\n  reps: 12\n}");
    }

    #[test]
    fn test_unsupported_shapes_are_errors() {
        assert_eq!(
            to_literal_string(&Literal::Float(f64::NAN)).unwrap_err().to_string(),
            "non-finite number NaN has no literal form"
        );
        let bad = Literal::Record(vec![("rest-seconds".to_string(), Literal::Int(60))]);
        assert_eq!(
            to_literal_string(&bad),
            Err(SerializeError::InvalidLabel("rest-seconds".to_string()))
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(to_literal_string(&Literal::Null).unwrap(), "null");
        assert_eq!(to_literal_string(&Literal::Bool(true)).unwrap(), "true");
        assert_eq!(to_literal_string(&Literal::Float(2.5)).unwrap(), "2.5");
        assert_eq!(to_literal_string(&1_400_000u64.to_literal()).unwrap(), "1400000");
    }
}
