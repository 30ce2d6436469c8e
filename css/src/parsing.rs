//! Loosely follows the CSS 2.1 core grammar, recovering from errors the way browsers do:
//! a bad declaration is dropped up to the next `;`, a bad rule up to the end of its block.

use super::*;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, tag_no_case, take_until, take_while1};
use nom::character::complete::{
    alpha1, alphanumeric1, anychar, char, digit0, digit1, multispace1, one_of,
};
use nom::combinator::{eof, map, map_opt, map_res, opt, peek, recognize, value, verify};
use nom::error::{Error, ErrorKind};
use nom::multi::{many0, many1, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;

/// Parse every rule of a stylesheet. Input that could not be parsed is pushed to `skipped`.
pub(crate) fn rules<'a>(mut input: &'a str, skipped: &mut Vec<&'a str>) -> Vec<Rule> {
    let mut rules = Vec::new();
    loop {
        if let Ok((rest, _)) = sheet_ws(input) {
            input = rest;
        }
        if input.is_empty() {
            break;
        }
        match rule(input) {
            Ok((rest, (rule, invalid))) => {
                rules.push(rule);
                skipped.extend(invalid);
                input = rest;
            }
            Err(_) => {
                let (rest, invalid) = skip_rule(input);
                skipped.push(invalid);
                input = rest;
            }
        }
    }
    rules
}

fn rule(input: &str) -> IResult<&str, (Rule, Vec<&str>)> {
    alt((
        map(import, |r| (Rule::Import(r), vec![])),
        map(at_rule, |r| (Rule::Other(r), vec![])),
        map(style_rule, |(r, invalid)| (Rule::Style(r), invalid)),
    ))(input)
}

/// Parse an 'import' statement
fn import(input: &str) -> IResult<&str, ImportRule> {
    let (input, (_, _, href, _, media, _)) = tuple((
        tag_no_case("@import"),
        ws,
        alt((uri, string)),
        ws,
        opt(is_not(";")),
        char(';'),
    ))(input)?;
    let media = media
        .map(|m| {
            m.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Ok((input, ImportRule { href, media }))
}
#[cfg(test)]
#[test]
fn test_import() {
    let target = ImportRule {
        href: "navigation.css".to_string(),
        media: vec![],
    };
    assert_eq!(import(r#"@import "navigation.css";"#), Ok(("", target.clone())));
    assert_eq!(import(r#"@import url("navigation.css");"#), Ok(("", target.clone())));
    assert_eq!(import(r#"@import url(navigation.css);"#), Ok(("", target)));

    let i = "@import url('https://fonts.googleapis.com/css?family=Reddit+Mono&display=swap') screen, print;";
    let target = ImportRule {
        href: "https://fonts.googleapis.com/css?family=Reddit+Mono&display=swap".to_string(),
        media: vec!["screen".to_string(), "print".to_string()],
    };
    assert_eq!(import(i), Ok(("", target)));
}

/// Any other at-rule, with or without a block
fn at_rule(input: &str) -> IResult<&str, OtherRule> {
    let (after, keyword) = preceded(char('@'), ident)(input)?;
    let (rest, _) = skip_rule(after);
    let text = input[..input.len() - rest.len()].trim().to_string();
    Ok((
        rest,
        OtherRule {
            keyword: keyword.to_ascii_lowercase(),
            text,
        },
    ))
}
#[cfg(test)]
#[test]
fn test_at_rule() {
    let (rest, r) = at_rule("@media screen { h1 { color: red } } p {}").unwrap();
    assert_eq!(rest, " p {}");
    assert_eq!(r.keyword, "media");
    let (rest, r) = at_rule(r#"@charset "utf-8";h1{}"#).unwrap();
    assert_eq!(rest, "h1{}");
    assert_eq!(r.keyword, "charset");
}

/// Parse ruleset
fn style_rule(input: &str) -> IResult<&str, (StyleRule, Vec<&str>)> {
    let (input, selectors) = terminated(selector_group, ws)(input)?;
    let (input, (declarations, invalid)) = declaration_block(input)?;
    Ok((
        input,
        (
            StyleRule {
                selectors,
                declarations,
            },
            invalid,
        ),
    ))
}
#[cfg(test)]
#[test]
fn test_style_rule() {
    let i = r#"html {
    box-sizing: border-box
}"#;
    let target = StyleRule {
        selectors: vec![Selector::Simple(simple_selector!(html))],
        declarations: vec![Declaration::new(
            "box-sizing",
            Value::Keyword("border-box".to_string()),
        )],
    };
    assert_eq!(style_rule(i), Ok(("", (target, vec![]))));
}

/// `{ decl; decl; ... }`. Declarations that fail to parse are returned alongside the good ones.
/// A missing closing brace at the end of input is tolerated.
fn declaration_block(input: &str) -> IResult<&str, (Vec<Declaration>, Vec<&str>)> {
    let (mut input, _) = char('{')(input)?;
    let mut declarations = Vec::new();
    let mut invalid = Vec::new();
    loop {
        let (rest, _) = ws(input)?;
        input = rest;
        if input.is_empty() {
            break;
        }
        if let Some(rest) = input.strip_prefix('}') {
            input = rest;
            break;
        }
        if let Some(rest) = input.strip_prefix(';') {
            input = rest;
            continue;
        }
        let end = alt((value((), peek(one_of(";}"))), value((), eof)));
        match terminated(declaration, pair(ws, end))(input) {
            Ok((rest, decl)) => {
                declarations.push(decl);
                input = rest;
            }
            Err(_) => {
                let (rest, skipped) = skip_declaration(input);
                invalid.push(skipped);
                input = rest;
            }
        }
    }
    Ok((input, (declarations, invalid)))
}
#[cfg(test)]
#[test]
fn test_declaration_block() {
    let i = r#"{
    BLAHBLAH;
    color: black;;
    width: calc(100% - 2 * 10px);
    margin: ) 0;
    padding: 0
}rest"#;
    let (rest, (decls, invalid)) = declaration_block(i).unwrap();
    assert_eq!(rest, "rest");
    let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["color", "width", "padding"]);
    assert_eq!(invalid, ["BLAHBLAH", "margin: ) 0"]);
}

/// Parse single declaration
fn declaration(input: &str) -> IResult<&str, Declaration> {
    let (input, (name, _, _, _, value, important)) =
        tuple((property, ws, char(':'), ws, expr, opt(priority)))(input)?;
    let name = if name.starts_with("--") {
        name
    } else {
        name.to_ascii_lowercase()
    };
    Ok((
        input,
        Declaration {
            name,
            value,
            important: important.is_some(),
        },
    ))
}
#[cfg(test)]
#[test]
fn test_declaration() {
    let (_, decl) = declaration("Font-Size: 12px !important").unwrap();
    assert_eq!(decl.name, "font-size");
    assert_eq!(decl.value, Value::Dimension(12.0, Unit::Px));
    assert!(decl.important);
}

/// Parse property
fn property(input: &str) -> IResult<&str, String> {
    alt((variable, ident))(input)
}

/// Parse priority
fn priority(input: &str) -> IResult<&str, ()> {
    value((), tuple((char('!'), ws, tag_no_case("important"), ws)))(input)
}

/// Parse expression
fn expr(input: &str) -> IResult<&str, Value> {
    let (input, (first, others)) = pair(term, many0(pair(opt(operator), term)))(input)?;
    if others.is_empty() {
        Ok((input, first))
    } else {
        let all = [(None, first)].into_iter().chain(others).collect();
        Ok((input, Value::Multiple(MultiValue(all))))
    }
}

/// Parse a term
fn term(input: &str) -> IResult<&str, Value> {
    terminated(
        alt((
            map(uri, Value::Url),
            function,
            percentage,
            dimension,
            map(numeric, Value::Number),
            map(string, Value::String),
            hexcolor,
            map(variable, Value::Keyword),
            map(ident, Value::Keyword),
        )),
        ws,
    )(input)
}
#[cfg(test)]
#[test]
fn test_term() {
    assert_eq!(term("0.2px "), Ok(("", Value::Dimension(0.2, Unit::Px))));
    assert_eq!(term(".5EM"), Ok(("", Value::Dimension(0.5, Unit::Em))));
    assert_eq!(term("25%"), Ok(("", Value::Percentage(25.0))));
    assert_eq!(term("-3"), Ok(("", Value::Number(-3.0))));
    assert_eq!(term("#E2F3DF"), Ok(("", Value::Color(HexColor("E2F3DF".to_string())))));
    assert_eq!(term("sans-serif"), Ok(("", Value::Keyword("sans-serif".to_string()))));
    assert_eq!(term("'Reddit Mono'"), Ok(("", Value::String("Reddit Mono".to_string()))));
}

/// `1.5`, `-2`, `.25`
fn numeric(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(
            opt(one_of("+-")),
            alt((recognize(tuple((digit0, char('.'), digit1))), digit1)),
        )),
        |n: &str| n.parse::<f64>(),
    )(input)
}

fn percentage(input: &str) -> IResult<&str, Value> {
    map(terminated(numeric, char('%')), Value::Percentage)(input)
}

fn dimension(input: &str) -> IResult<&str, Value> {
    let (input, (n, unit)) = pair(numeric, map_opt(alpha1, Unit::from_name))(input)?;
    Ok((input, Value::Dimension(n, unit)))
}

fn hexcolor(input: &str) -> IResult<&str, Value> {
    let digits = verify(take_while1(|c: char| c.is_ascii_hexdigit()), |h: &str| {
        matches!(h.len(), 3 | 4 | 6 | 8)
    });
    map(preceded(char('#'), digits), |h: &str| {
        Value::Color(HexColor(h.to_string()))
    })(input)
}

fn function(input: &str) -> IResult<&str, Value> {
    let (input, (name, _, _, args, _)) =
        tuple((ident, char('('), ws, opt(expr), char(')')))(input)?;
    let args = match args {
        Some(Value::Multiple(m)) => m,
        Some(v) => MultiValue(vec![(None, v)]),
        None => MultiValue::default(),
    };
    Ok((input, Value::Function(FunctionValue { name, args })))
}
#[cfg(test)]
#[test]
fn test_function() {
    let (_, v) = function("rgb(197, 93,161)").unwrap();
    assert_eq!(v.to_string(), "rgb(197, 93, 161)");
    let (_, v) = function("calc(100% - 2 * 10px)").unwrap();
    assert_eq!(v.to_string(), "calc(100% - 2 * 10px)");
}

fn operator(input: &str) -> IResult<&str, Operator> {
    terminated(
        alt((
            value(Operator::Slash, char('/')),
            value(Operator::Comma, char(',')),
            value(Operator::Equals, char('=')),
            value(Operator::Times, char('*')),
            // A sign directly followed by a digit belongs to the number
            value(Operator::Plus, terminated(char('+'), multispace1)),
            value(Operator::Minus, terminated(char('-'), multispace1)),
        )),
        ws,
    )(input)
}

/// Parse comma seperated groups of selectors
fn selector_group(input: &str) -> IResult<&str, Vec<Selector>> {
    separated_list1(tuple((ws, char(','), ws)), selector)(input)
}

/// Parse selector
fn selector(input: &str) -> IResult<&str, Selector> {
    let (input, first) = compound(input)?;
    let (input, rest) = many0(pair(combinator, compound))(input)?;
    Ok((
        input,
        rest.into_iter().fold(first, |l, (c, r)| {
            Selector::Combinator(Box::new(l), c, Box::new(r))
        }),
    ))
}
#[cfg(test)]
#[test]
fn test_selector() {
    assert_eq!(selector("*"), Ok(("", Selector::Simple(simple_selector!(*)))));
    assert_eq!(selector("#titulo"), Ok(("", Selector::Simple(simple_selector!(#titulo)))));
    assert_eq!(selector(".imagen"), Ok(("", Selector::Simple(simple_selector!(.imagen)))));
    assert_eq!(
        selector("nav ul>li"),
        Ok((
            "",
            combinator_selector!(
                combinator_selector!(
                    Selector::Simple(simple_selector!(nav)),
                    Combinator::Descendant,
                    Selector::Simple(simple_selector!(ul))
                ),
                Combinator::Child,
                Selector::Simple(simple_selector!(li))
            )
        ))
    );
    assert_eq!(
        selector("a:hover {"),
        Ok((" {", compound_selector!(simple_selector!(a), simple_selector!(:hover))))
    );
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        delimited(
            ws,
            alt((
                value(Combinator::Child, char('>')),
                value(Combinator::NextSibling, char('+')),
                value(Combinator::SubsequentSibling, char('~')),
            )),
            ws,
        ),
        value(Combinator::Descendant, ws1),
    ))(input)
}

/// A run of simple selectors with nothing between them, e.g. `a.link:hover`
fn compound(input: &str) -> IResult<&str, Selector> {
    let head = opt(alt((
        value(SimpleSelector::Universal, char('*')),
        map(ident, SimpleSelector::Type),
    )));
    let tail = many0(alt((id_selector, class_selector, attribute_selector, pseudo_selector)));
    let (rest, (head, tail)) = pair(head, tail)(input)?;
    let mut parts: Vec<SimpleSelector> = head.into_iter().chain(tail).collect();
    match parts.len() {
        0 => Err(nom::Err::Error(Error::new(input, ErrorKind::Verify))),
        1 => Ok((rest, Selector::Simple(parts.remove(0)))),
        _ => Ok((rest, Selector::Compound(parts))),
    }
}

fn id_selector(input: &str) -> IResult<&str, SimpleSelector> {
    map(preceded(char('#'), name), SimpleSelector::ID)(input)
}

fn class_selector(input: &str) -> IResult<&str, SimpleSelector> {
    map(preceded(char('.'), ident), SimpleSelector::Class)(input)
}

/// `:hover`, `::before`, `:nth-child(2n + 1)`
fn pseudo_selector(input: &str) -> IResult<&str, SimpleSelector> {
    let (input, (colons, pseudo, args)) = tuple((
        alt((tag("::"), tag(":"))),
        ident,
        opt(delimited(char('('), is_not(")"), char(')'))),
    ))(input)?;
    let name = match args {
        Some(args) => format!("{}({})", pseudo, args.trim()),
        None => pseudo,
    };
    if colons == "::" {
        Ok((input, SimpleSelector::PseudoElement(name)))
    } else {
        Ok((input, SimpleSelector::PseudoClass(name)))
    }
}

/// `[att]`, `[att=val]`, `[att~="val"]`, ...
fn attribute_selector(input: &str) -> IResult<&str, SimpleSelector> {
    let matcher_op = alt((
        value(AttributeOperator::Equals, tag("=")),
        value(AttributeOperator::Includes, tag("~=")),
        value(AttributeOperator::DashMatch, tag("|=")),
        value(AttributeOperator::Prefix, tag("^=")),
        value(AttributeOperator::Suffix, tag("$=")),
        value(AttributeOperator::Substring, tag("*=")),
    ));
    let (input, (_, _, name, _, matcher, _)) = tuple((
        char('['),
        ws,
        ident,
        ws,
        opt(tuple((matcher_op, ws, alt((string, ident)), ws))),
        char(']'),
    ))(input)?;
    let selector = match matcher {
        Some((op, _, value, _)) => AttributeSelector::Matches(name, op, value),
        None => AttributeSelector::Has(name),
    };
    Ok((input, SimpleSelector::Attribute(selector)))
}
#[cfg(test)]
#[test]
fn test_attribute_selector() {
    let (_, sel) = selector("a[href^='https']").unwrap();
    assert_eq!(sel.to_string(), r#"a[href^="https"]"#);
    let (_, sel) = selector("input[ disabled ]").unwrap();
    assert_eq!(sel.to_string(), "input[disabled]");
}

/// Parse quoted string
fn string(input: &str) -> IResult<&str, String> {
    /// Parse double-quoted string
    fn string1(input: &str) -> IResult<&str, String> {
        let (input, content) = delimited(
            char('"'),
            many0(alt((is_not("\n\r\\\""), recognize(pair(char('\\'), anychar))))),
            char('"'),
        )(input)?;
        Ok((input, content.concat()))
    }
    /// Parse single-quoted string
    fn string2(input: &str) -> IResult<&str, String> {
        let (input, content) = delimited(
            char('\''),
            many0(alt((is_not("\n\r\\'"), recognize(pair(char('\\'), anychar))))),
            char('\''),
        )(input)?;
        Ok((input, content.concat()))
    }
    alt((string1, string2))(input)
}
#[cfg(test)]
#[test]
fn test_string() {
    let i = r#""Hello, world""#;
    let target = ("", "Hello, world".to_string());
    assert_eq!(string(i).unwrap(), target);

    let i = "'Hello, world'";
    let target = ("", "Hello, world".to_string());
    assert_eq!(string(i).unwrap(), target);

    let i = r#""Hello\"world""#;
    let target = ("", "Hello\\\"world".to_string());
    assert_eq!(string(i).unwrap(), target);
}

/// Parse URI, quoted or bare
fn uri(input: &str) -> IResult<&str, String> {
    delimited(
        tag_no_case("url("),
        delimited(
            ws,
            alt((string, map(is_not(")\"' \t\r\n"), String::from))),
            ws,
        ),
        char(')'),
    )(input)
}

/// Parse name
fn name(input: &str) -> IResult<&str, String> {
    map(
        recognize(many1(alt((alphanumeric1, tag("_"), tag("-"))))),
        String::from,
    )(input)
}
#[cfg(test)]
#[test]
fn test_name() {
    let i = "hello";
    let target = ("", "hello".to_string());
    assert_eq!(name(i).unwrap(), target);

    let i = "~hello";
    assert!(name(i).is_err());
}

/// Parse ident
fn ident(input: &str) -> IResult<&str, String> {
    map(
        recognize(tuple((
            opt(char('-')),
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_"), tag("-")))),
        ))),
        String::from,
    )(input)
}
#[cfg(test)]
#[test]
fn test_ident() {
    assert!(ident("test").is_ok());
    assert!(ident("_test").is_ok());
    assert!(ident("-webkit-box").is_ok());
    assert!(ident("--test").is_err());
    assert!(ident("1st").is_err());
}

/// Parse variable
fn variable(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(tag("--"), many1(alt((alphanumeric1, tag("_"), tag("-")))))),
        String::from,
    )(input)
}

/// `/* ... */`
fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("/*"), take_until("*/"), tag("*/"))(input)
}

/// Whitespace and comments
fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((comment, multispace1))))(input)
}

/// At least one whitespace character or comment
fn ws1(input: &str) -> IResult<&str, ()> {
    value((), many1(alt((comment, multispace1))))(input)
}

/// Whitespace between rules, where the CDO and CDC tokens are also ignored
fn sheet_ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((comment, multispace1, tag("<!--"), tag("-->")))),
    )(input)
}

/// Consume a rule that failed to parse: everything up to a `;` outside any block, or up to the
/// end of the first block. Always consumes at least one character of non-empty input.
fn skip_rule(input: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' if depth <= 1 => {
                let end = i + c.len_utf8();
                return (&input[end..], &input[..end]);
            }
            '}' => depth -= 1,
            ';' if depth == 0 => {
                let end = i + c.len_utf8();
                return (&input[end..], &input[..end]);
            }
            _ => {}
        }
    }
    ("", input)
}
#[cfg(test)]
#[test]
fn test_skip_rule() {
    assert_eq!(skip_rule("h1 + { a { b } } p {}"), (" p {}", "h1 + { a { b } }"));
    assert_eq!(skip_rule("@bad \"};\" x; p {}"), (" p {}", "@bad \"};\" x;"));
    assert_eq!(skip_rule("} p {}"), (" p {}", "}"));
    assert_eq!(skip_rule("never ends {"), ("", "never ends {"));
}

/// Consume a declaration that failed to parse, stopping before the `;` or `}` that ends it
fn skip_declaration(input: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            '}' if depth > 0 => depth -= 1,
            ';' | '}' if depth == 0 => return (&input[i..], input[..i].trim_end()),
            _ => {}
        }
    }
    ("", input.trim_end())
}
