//! Text serialization of parsed CSS, normalizing whitespace, quoting and number formatting

use super::*;
use std::fmt::{self, Display, Formatter, Write};

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Simple(s) => write!(f, "{}", s),
            Selector::Compound(parts) => parts.iter().try_for_each(|s| write!(f, "{}", s)),
            Selector::Combinator(l, c, r) => write!(f, "{}{}{}", l, c, r),
        }
    }
}

impl Display for Combinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
        })
    }
}

impl Display for SimpleSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Type(t) => f.write_str(t),
            SimpleSelector::Universal => f.write_char('*'),
            SimpleSelector::Attribute(a) => write!(f, "{}", a),
            SimpleSelector::Class(c) => write!(f, ".{}", c),
            SimpleSelector::PseudoClass(p) => write!(f, ":{}", p),
            SimpleSelector::PseudoElement(p) => write!(f, "::{}", p),
            SimpleSelector::ID(id) => write!(f, "#{}", id),
        }
    }
}

impl Display for AttributeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttributeSelector::Has(name) => write!(f, "[{}]", name),
            AttributeSelector::Matches(name, op, value) => {
                write!(f, "[{}{}\"{}\"]", name, op, escape_quotes(value))
            }
        }
    }
}

impl Display for AttributeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeOperator::Equals => "=",
            AttributeOperator::Includes => "~=",
            AttributeOperator::DashMatch => "|=",
            AttributeOperator::Prefix => "^=",
            AttributeOperator::Suffix => "$=",
            AttributeOperator::Substring => "*=",
        })
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Keyword(k) => f.write_str(k),
            Value::String(s) => write!(f, "\"{}\"", escape_quotes(s)),
            Value::Url(u) => {
                if u.chars().any(|c| c.is_whitespace() || "\"'()".contains(c)) {
                    write!(f, "url(\"{}\")", escape_quotes(u))
                } else {
                    write!(f, "url({})", u)
                }
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::Percentage(n) => write!(f, "{}%", n),
            Value::Dimension(n, unit) => write!(f, "{}{}", n, unit),
            Value::Color(c) => write!(f, "{}", c),
            Value::Function(func) => write!(f, "{}({})", func.name, func.args),
            Value::Multiple(m) => write!(f, "{}", m),
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for HexColor {
    /// `#aabbcc` is shortened to `#abc`; case is kept
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let digits: Vec<char> = self.0.chars().collect();
        if digits.len() == 6 && digits.chunks(2).all(|pair| pair[0] == pair[1]) {
            let short: String = digits.iter().step_by(2).collect();
            write!(f, "#{}", short)
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl Display for MultiValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, (op, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(match op.unwrap_or(Operator::Space) {
                    Operator::Space => " ",
                    Operator::Comma => ", ",
                    Operator::Slash => "/",
                    Operator::Equals => "=",
                    Operator::Plus => " + ",
                    Operator::Minus => " - ",
                    Operator::Times => " * ",
                })?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

/// Escape double quotes not already escaped, so the string can be wrapped in `"`
fn escape_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if c == '"' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

#[cfg(test)]
#[test]
fn test_escape_quotes() {
    assert_eq!(escape_quotes(r#"say "hi""#), r#"say \"hi\""#);
    assert_eq!(escape_quotes(r#"already \"done\""#), r#"already \"done\""#);
}

#[cfg(test)]
#[test]
fn test_hex_color() {
    assert_eq!(HexColor("53F072".to_string()).to_string(), "#53F072");
    assert_eq!(HexColor("aabbcc".to_string()).to_string(), "#abc");
    assert_eq!(HexColor("AAbbcc".to_string()).to_string(), "#Abc");
    assert_eq!(HexColor("aAbbcc".to_string()).to_string(), "#aAbbcc");
    assert_eq!(HexColor("fff".to_string()).to_string(), "#fff");
}
