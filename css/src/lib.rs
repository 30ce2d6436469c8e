use tracing::{debug, span, warn, Level};

#[derive(PartialEq, Clone, Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Rule {
    Import(ImportRule),
    Style(StyleRule),
    Other(OtherRule),
}

/// `@import url(...) media;`
#[derive(PartialEq, Clone, Debug)]
pub struct ImportRule {
    pub href: String,
    pub media: Vec<String>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// Any at-rule other than `@import`, kept only so rule order is preserved
#[derive(PartialEq, Clone, Debug)]
pub struct OtherRule {
    /// Lowercased at-keyword without the `@`
    pub keyword: String,
    pub text: String,
}

impl Stylesheet {
    pub fn imports(&self) -> impl Iterator<Item = &ImportRule> {
        self.rules.iter().filter_map(|r| match r {
            Rule::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|r| match r {
            Rule::Style(s) => Some(s),
            _ => None,
        })
    }

    /// First style rule whose serialized selector text is exactly `selector_text`
    pub fn find_style_rule(&self, selector_text: &str) -> Option<&StyleRule> {
        self.style_rules()
            .find(|r| r.selector_text() == selector_text)
    }
}

impl StyleRule {
    /// The selector group, normalized (`h1,h2>p` is `h1, h2 > p`)
    pub fn selector_text(&self) -> String {
        self.selectors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The declaration block serialized as `name: value` pairs separated by `;\n`
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";\n")
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum Selector {
    Simple(SimpleSelector),
    Compound(Vec<SimpleSelector>),
    Combinator(Box<Selector>, Combinator, Box<Selector>),
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Combinator {
    // ( )
    Descendant,
    // (>)
    Child,
    // (+)
    NextSibling,
    // (~)
    SubsequentSibling,
}

#[derive(PartialEq, Clone, Debug)]
pub enum SimpleSelector {
    Type(String),
    Universal,
    Attribute(AttributeSelector),
    Class(String),
    PseudoClass(String),
    PseudoElement(String),
    ID(String),
}

#[macro_export]
macro_rules! simple_selector {
    (#$x:ident) => {
        $crate::SimpleSelector::ID(stringify!($x).to_string())
    };
    (.$x:ident) => {
        $crate::SimpleSelector::Class(stringify!($x).to_string())
    };
    (:$x:ident) => {
        $crate::SimpleSelector::PseudoClass(stringify!($x).to_string())
    };
    (*) => {
        $crate::SimpleSelector::Universal
    };
    ($x:ident) => {
        $crate::SimpleSelector::Type(stringify!($x).to_string())
    };
}

#[macro_export]
macro_rules! compound_selector {
    ($($sel:expr),*) => {$crate::Selector::Compound(vec![$($sel),*])}
}

#[macro_export]
macro_rules! combinator_selector {
    ($l:expr,$c:expr,$r:expr) => {
        $crate::Selector::Combinator(Box::new($l), $c, Box::new($r))
    };
}

#[derive(PartialEq, Clone, Debug)]
pub enum AttributeSelector {
    // [att]
    Has(String),
    // [att=val], [att~=val], ...
    Matches(String, AttributeOperator, String),
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum AttributeOperator {
    // =
    Equals,
    // ~=
    Includes,
    // |=
    DashMatch,
    // ^=
    Prefix,
    // $=
    Suffix,
    // *=
    Substring,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Declaration {
    pub name: String,
    pub value: Value,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            important: false,
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Keyword(String),
    String(String),
    Url(String),
    Number(f64),
    Percentage(f64),
    Dimension(f64, Unit),
    Color(HexColor),
    Function(FunctionValue),
    Multiple(MultiValue),
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Unit {
    Cm,
    Mm,
    Q,
    In,
    Pc,
    Pt,
    Px,
    Em,
    Ex,
    Ch,
    Rem,
    Lh,
    Vw,
    Vh,
    Vmin,
    Vmax,
    Fr,
    Ms,
    S,
    Hz,
    Khz,
    Dpi,
    Dpcm,
    Dppx,
    Deg,
    Rad,
    Grad,
    Turn,
}

impl Unit {
    const ALL: [(&'static str, Unit); 28] = [
        ("cm", Unit::Cm),
        ("mm", Unit::Mm),
        ("q", Unit::Q),
        ("in", Unit::In),
        ("pc", Unit::Pc),
        ("pt", Unit::Pt),
        ("px", Unit::Px),
        ("em", Unit::Em),
        ("ex", Unit::Ex),
        ("ch", Unit::Ch),
        ("rem", Unit::Rem),
        ("lh", Unit::Lh),
        ("vw", Unit::Vw),
        ("vh", Unit::Vh),
        ("vmin", Unit::Vmin),
        ("vmax", Unit::Vmax),
        ("fr", Unit::Fr),
        ("ms", Unit::Ms),
        ("s", Unit::S),
        ("hz", Unit::Hz),
        ("khz", Unit::Khz),
        ("dpi", Unit::Dpi),
        ("dpcm", Unit::Dpcm),
        ("dppx", Unit::Dppx),
        ("deg", Unit::Deg),
        ("rad", Unit::Rad),
        ("grad", Unit::Grad),
        ("turn", Unit::Turn),
    ];

    /// Case-insensitive lookup of a unit by its CSS name
    pub fn from_name(name: &str) -> Option<Unit> {
        Self::ALL
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, u)| *u)
    }

    pub fn as_str(&self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, u)| u == self)
            .map(|(n, _)| *n)
            .unwrap_or("")
    }
}

/// A `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` color, digits kept as written
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct HexColor(pub String);

#[derive(PartialEq, Clone, Debug, Default)]
pub struct MultiValue(pub Vec<(Option<Operator>, Value)>);

#[derive(PartialEq, Clone, Copy, Debug)]
#[repr(u8)]
pub enum Operator {
    Slash = b'/',
    Comma = b',',
    Space = b' ',
    Equals = b'=',
    Plus = b'+',
    Minus = b'-',
    Times = b'*',
}

#[derive(PartialEq, Clone, Debug)]
pub struct FunctionValue {
    pub name: String,
    pub args: MultiValue,
}

#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Emit a `tracing` warning for every rule or declaration that had to be skipped
    pub report_errors: bool,
}

impl ParseOptions {
    pub const fn quiet() -> Self {
        Self {
            report_errors: false,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            report_errors: true,
        }
    }
}

/// Lenient stylesheet parser. Invalid rules and declarations are dropped, never reported as errors
#[derive(Clone, Copy, Debug, Default)]
pub struct StylesheetParser {
    options: ParseOptions,
}

impl StylesheetParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, input: &str) -> Stylesheet {
        let span = span!(Level::DEBUG, "Parsing stylesheet");
        let _enter = span.enter();
        let mut skipped = Vec::new();
        let rules = parsing::rules(input, &mut skipped);
        if self.options.report_errors {
            for s in &skipped {
                warn!(skipped = %s.trim(), "Ignoring invalid CSS");
            }
        }
        debug!(rules = rules.len(), skipped = skipped.len(), "Parsed stylesheet");
        Stylesheet { rules }
    }
}

/// Parse with the default options
pub fn stylesheet(input: &str) -> Stylesheet {
    StylesheetParser::default().parse(input)
}

mod parsing;
mod serialize;
