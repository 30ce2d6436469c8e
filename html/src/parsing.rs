use super::*;
use std::collections::HashMap;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, tag_no_case, take_till, take_until, take_while};
use nom::character::complete::{char, multispace0, multispace1, satisfy};
use nom::combinator::{map, opt, recognize, rest, value};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::IResult;
use tracing::{debug, span, Level};

/// Elements which never have contents
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Deepest an element can be nested; anything opened below this becomes a sibling of the
/// innermost element instead
const MAX_DEPTH: usize = 512;

/// Elements whose contents are not markup
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Doctype,
    Comment,
    Open {
        name: String,
        attributes: HashMap<String, String>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

/// Parse a whole document. Malformed markup is recovered from rather than rejected, so this
/// never fails; the returned element is named [`DOCUMENT`] and holds the top-level nodes.
pub fn document(input: &str) -> DOMElement {
    let span = span!(Level::DEBUG, "Parsing document");
    let _enter = span.enter();
    let tokens = tokenize(input);
    debug!(tokens = tokens.len(), "Tokenized document");
    build_tree(tokens)
}

fn tokenize(mut input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    while !input.is_empty() {
        let (rest, tok) = match token(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = rest;
        let raw = match &tok {
            Token::Open {
                name,
                self_closing: false,
                ..
            } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };
        tokens.push(tok);
        if let Some(name) = raw {
            let (rest, text) = raw_text(input, &name);
            if !text.is_empty() {
                tokens.push(Token::Text(text.to_string()));
            }
            input = rest;
        }
    }
    tokens
}

/// Assemble tokens into a tree, closing whatever the markup leaves open
fn build_tree(tokens: Vec<Token>) -> DOMElement {
    let mut stack = vec![DOMElement::new(DOCUMENT, None, vec![])];
    for tok in tokens {
        match tok {
            Token::Doctype | Token::Comment => {}
            Token::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    push_text(parent, text);
                }
            }
            Token::Open {
                name,
                attributes,
                self_closing,
            } => {
                let element = DOMElement::new(name, Some(DOMAttributes(attributes)), vec![]);
                if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
                    if let Some(parent) = stack.last_mut() {
                        parent.contents.push(element.into());
                    }
                } else {
                    if stack.len() > MAX_DEPTH {
                        close_top(&mut stack);
                    }
                    stack.push(element);
                }
            }
            Token::Close(name) => match stack.iter().rposition(|e| e.name == name) {
                Some(pos) => {
                    while stack.len() > pos {
                        close_top(&mut stack);
                    }
                }
                None => debug!(%name, "Ignoring unmatched close tag"),
            },
        }
    }
    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack
        .pop()
        .unwrap_or_else(|| DOMElement::new(DOCUMENT, None, vec![]))
}

fn close_top(stack: &mut Vec<DOMElement>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(element) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.contents.push(element.into());
        }
    }
}

/// Append text, merging with a preceding text node
fn push_text(parent: &mut DOMElement, text: String) {
    if let Some(DOMContent::Text(prev)) = parent.contents.last_mut() {
        prev.push_str(&text);
    } else {
        parent.contents.push(DOMContent::Text(text));
    }
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        doctype,
        comment,
        bogus_comment,
        close_tag,
        open_tag,
        text,
        value(Token::Text("<".to_string()), char('<')),
    ))(input)
}

/// `<!DOCTYPE html>`
fn doctype(input: &str) -> IResult<&str, Token> {
    value(
        Token::Doctype,
        tuple((tag_no_case("<!doctype"), take_until(">"), char('>'))),
    )(input)
}

/// `<!-- ... -->`, an unterminated comment runs to the end of input
fn comment(input: &str) -> IResult<&str, Token> {
    value(
        Token::Comment,
        preceded(
            tag("<!--"),
            alt((terminated(take_until("-->"), tag("-->")), rest)),
        ),
    )(input)
}

/// `<![CDATA[...]]>`, `<?xml ...?>` and the like are dropped
fn bogus_comment(input: &str) -> IResult<&str, Token> {
    value(
        Token::Comment,
        tuple((alt((tag("<!"), tag("<?"))), take_until(">"), char('>'))),
    )(input)
}

fn tag_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'),
        )),
        str::to_ascii_lowercase,
    )(input)
}

/// Parse a tag in the form `</name>`
fn close_tag(input: &str) -> IResult<&str, Token> {
    let (input, (_, name, _, _)) = tuple((tag("</"), tag_name, take_until(">"), char('>')))(input)?;
    Ok((input, Token::Close(name)))
}

/// Parse a tag in the form `<name attr=value ...>` or `<name ... />`
fn open_tag(input: &str) -> IResult<&str, Token> {
    let (input, (_, name, attrs, _, slash, _)) = tuple((
        char('<'),
        tag_name,
        attributes,
        multispace0,
        opt(char('/')),
        char('>'),
    ))(input)?;
    let mut attributes = HashMap::new();
    for (k, v) in attrs {
        // The first occurrence of an attribute wins
        attributes.entry(k).or_insert(v);
    }
    Ok((
        input,
        Token::Open {
            name,
            attributes,
            self_closing: slash.is_some(),
        },
    ))
}

fn text(input: &str) -> IResult<&str, Token> {
    map(is_not("<"), |t: &str| Token::Text(htmlize::unescape(t).into_owned()))(input)
}

/// Everything up to the close tag of a raw text element
fn raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let close = format!("</{}", name);
    match input.to_ascii_lowercase().find(&close) {
        Some(pos) => (&input[pos..], &input[..pos]),
        None => ("", input),
    }
}

// Attribute parsing below

/// Whitespace separates attributes, except that a quoted value may be followed directly by the
/// next name: `<meta name="author"content="x">`
fn attributes(mut input: &str) -> IResult<&str, Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut after_quote = false;
    loop {
        let sep: IResult<&str, &str> = if after_quote {
            multispace0(input)
        } else {
            multispace1(input)
        };
        let Ok((rest, _)) = sep else {
            break;
        };
        match attribute(rest) {
            Ok((rest, (attr, quoted))) => {
                attrs.push(attr);
                after_quote = quoted;
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, attrs))
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

/// The value and whether it was quoted
fn attribute_value(input: &str) -> IResult<&str, (&str, bool)> {
    alt((
        map(delimited(char('"'), take_till(|c: char| c == '"'), char('"')), |v| (v, true)),
        map(delimited(char('\''), take_till(|c: char| c == '\''), char('\'')), |v| (v, true)),
        map(is_not(" \t\r\n\"'=<>`"), |v| (v, false)),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, ((String, String), bool)> {
    let (input, name) = attribute_name(input)?;
    let (input, val) = opt(preceded(
        tuple((multispace0, char('='), multispace0)),
        attribute_value,
    ))(input)?;
    let (val, quoted) = val.unwrap_or(("", false));
    Ok((
        input,
        (
            (name.to_ascii_lowercase(), htmlize::unescape_attribute(val).into_owned()),
            quoted,
        ),
    ))
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let data = r#"<div>"#;
    let target = Token::Open {
        name: "div".to_string(),
        attributes: HashMap::new(),
        self_closing: false,
    };
    assert_eq!(open_tag(data).unwrap(), ("", target));

    let data = r#"<DIV attr1 attr2=two attr3='three' attr4="number four">"#;
    let target = Token::Open {
        name: "div".to_string(),
        attributes: HashMap::from([
            ("attr1".to_string(), "".to_string()),
            ("attr2".to_string(), "two".to_string()),
            ("attr3".to_string(), "three".to_string()),
            ("attr4".to_string(), "number four".to_string()),
        ]),
        self_closing: false,
    };
    assert_eq!(open_tag(data).unwrap(), ("", target));

    let data = r#"<img src="a.png" />"#;
    let target = Token::Open {
        name: "img".to_string(),
        attributes: HashMap::from([("src".to_string(), "a.png".to_string())]),
        self_closing: true,
    };
    assert_eq!(open_tag(data).unwrap(), ("", target));
}

#[cfg(test)]
#[test]
fn test_close_tag() {
    assert_eq!(close_tag("</Section >"), Ok(("", Token::Close("section".to_string()))));
    assert!(close_tag("</>").is_err());
}

#[cfg(test)]
#[test]
fn test_comments() {
    assert_eq!(comment("<!-- hi -->rest"), Ok(("rest", Token::Comment)));
    assert_eq!(comment("<!-- never closed"), Ok(("", Token::Comment)));
    assert_eq!(doctype("<!DOCTYPE html>"), Ok(("", Token::Doctype)));
}

#[cfg(test)]
#[test]
fn test_attributes_without_separator() {
    let data = r#"<meta name="author"content='Ana'lang=es>"#;
    let target = Token::Open {
        name: "meta".to_string(),
        attributes: HashMap::from([
            ("name".to_string(), "author".to_string()),
            ("content".to_string(), "Ana".to_string()),
            ("lang".to_string(), "es".to_string()),
        ]),
        self_closing: false,
    };
    assert_eq!(open_tag(data).unwrap(), ("", target));

    // An unquoted value swallows whatever follows it up to whitespace
    let (_, tok) = open_tag("<a href=x.html/>").unwrap();
    assert_eq!(
        tok,
        Token::Open {
            name: "a".to_string(),
            attributes: HashMap::from([("href".to_string(), "x.html/".to_string())]),
            self_closing: false,
        }
    );
}

#[cfg(test)]
#[test]
fn test_character_references() {
    assert_eq!(
        text("How to Grow &#39;Bosc&#x27; &amp; &lt;Pears&gt;"),
        Ok(("", Token::Text("How to Grow 'Bosc' & <Pears>".to_string())))
    );
    assert_eq!(
        text("Ram&iacute;rez Nu&ntilde;ez &copy 2024 &hellip;"),
        Ok(("", Token::Text("Ramírez Nuñez © 2024 …".to_string())))
    );
    assert_eq!(text("AT&T &bogus; &"), Ok(("", Token::Text("AT&T &bogus; &".to_string()))));

    // Inside attributes a legacy reference followed by `=` is left alone
    let (_, ((_, href), _)) = attribute(r#"href="/?a=1&times=3&amp;b=&aacute;""#).unwrap();
    assert_eq!(href, "/?a=1&times=3&b=á");
}

#[cfg(test)]
#[test]
fn test_nesting_is_bounded() {
    let doc = build_tree(tokenize(&"<div>".repeat(MAX_DEPTH * 3)));
    let mut depth = 0;
    let mut current = &doc;
    while let Some(child) = current.children().last() {
        depth += 1;
        current = child;
    }
    assert_eq!(depth, MAX_DEPTH);
    assert_eq!(doc.descendants().count(), MAX_DEPTH * 3);
}

#[cfg(test)]
#[test]
fn test_raw_text() {
    let tokens = tokenize("<script>if (a < b) { x = '</div>'; }</SCRIPT>");
    assert_eq!(
        tokens[1],
        Token::Text("if (a < b) { x = '</div>'; }".to_string())
    );
    assert_eq!(tokens[2], Token::Close("script".to_string()));
}
