//! The command grammar.
//!
//! Four input shapes are recognized:
//!
//! - `name` - a bare command
//! - `name(arg, key=value, …)` - a command with positional or keyword args
//! - `object.property` - a property query, e.g. `system.gdp`
//! - `target = value` - an assignment, e.g. `gdp = 1000`

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Command { name: String, args: Vec<Arg> },
    Property { object: String, property: String },
    Assignment { target: String, value: String },
}

#[derive(Debug)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

pub fn parse(line: &str) -> Result<Input, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }

    // Assignment: a single '=' outside any parentheses.
    if let Some(eq) = top_level_eq(line) {
        let target = line[..eq].trim();
        let value = line[eq + 1..].trim();
        if target.is_empty() || value.is_empty() {
            return Err(ParseError("malformed assignment".into()));
        }
        if !is_identifier(target) {
            return Err(ParseError(format!("invalid assignment target: {target}")));
        }
        return Ok(Input::Assignment {
            target: target.to_string(),
            value: value.to_string(),
        });
    }

    // Command with arguments.
    if let Some(open) = line.find('(') {
        let name = line[..open].trim();
        if !is_identifier(name) {
            return Err(ParseError(format!("invalid command name: {name}")));
        }
        let rest = line[open + 1..].trim_end();
        let Some(body) = rest.strip_suffix(')') else {
            return Err(ParseError("missing closing parenthesis".into()));
        };
        let args = parse_args(body)?;
        return Ok(Input::Command {
            name: name.to_string(),
            args,
        });
    }

    // Property access.
    if let Some(dot) = line.find('.') {
        let object = line[..dot].trim();
        let property = line[dot + 1..].trim();
        if !is_identifier(object) || !is_identifier(property) {
            return Err(ParseError(format!("invalid property access: {line}")));
        }
        return Ok(Input::Property {
            object: object.to_string(),
            property: property.to_string(),
        });
    }

    if !is_identifier(line) {
        return Err(ParseError(format!("unrecognized input: {line}")));
    }
    Ok(Input::Command {
        name: line.to_string(),
        args: Vec::new(),
    })
}

fn parse_args(body: &str) -> Result<Vec<Arg>, ParseError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(ParseError("empty argument".into()));
            }
            match piece.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim();
                    if !is_identifier(key) {
                        return Err(ParseError(format!("invalid keyword: {key}")));
                    }
                    Ok(Arg {
                        key: Some(key.to_string()),
                        value: value.trim().to_string(),
                    })
                }
                None => Ok(Arg {
                    key: None,
                    value: piece.to_string(),
                }),
            }
        })
        .collect()
}

/// Position of an '=' that is outside parentheses, marking an assignment.
fn top_level_eq(line: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in line.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command() {
        assert_eq!(
            parse("status").unwrap(),
            Input::Command {
                name: "status".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn positional_and_keyword_args() {
        let parsed = parse("add_consumer(Karim, age=30)").unwrap();
        let Input::Command { name, args } = parsed else {
            panic!("expected command");
        };
        assert_eq!(name, "add_consumer");
        assert_eq!(args[0], Arg { key: None, value: "Karim".into() });
        assert_eq!(
            args[1],
            Arg {
                key: Some("age".into()),
                value: "30".into()
            }
        );
    }

    #[test]
    fn property_access() {
        assert_eq!(
            parse("system.gdp").unwrap(),
            Input::Property {
                object: "system".into(),
                property: "gdp".into()
            }
        );
    }

    #[test]
    fn assignment() {
        assert_eq!(
            parse("gdp = 5000").unwrap(),
            Input::Assignment {
                target: "gdp".into(),
                value: "5000".into()
            }
        );
    }

    #[test]
    fn keyword_equals_stays_inside_parens() {
        // The '=' inside the argument list must not read as an assignment.
        assert!(matches!(
            parse("farmer_tax(rate=0.1)").unwrap(),
            Input::Command { .. }
        ));
    }

    #[test]
    fn malformed_inputs_error() {
        assert!(parse("add_consumer(Karim").is_err());
        assert!(parse("= 5").is_err());
        assert!(parse("what is this").is_err());
    }

    #[test]
    fn empty_line_is_empty() {
        assert_eq!(parse("   ").unwrap(), Input::Empty);
    }
}
