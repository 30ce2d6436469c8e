use crate::grade::{evaluate, Evaluation, Outcome, RubricItem};
use css::{StyleRule, Stylesheet};
use tracing::{span, Level};

const FONT_IMPORT: &str = "https://fonts.googleapis.com/css?family=Reddit+Mono";
const UNIVERSAL_FONT: &str = r#"font-family: "Reddit Mono""#;
const TITLE_DECLARATIONS: [&str; 3] = [
    r#"font-family: "Segoe UI", sans-serif"#,
    "font-size: 1.1rem",
    "color: #53F072",
];
const IMAGE_DECLARATIONS: [&str; 4] = [
    "margin: 0.2px 1.2rem",
    "padding: 0 25%",
    "border: 1px blue double",
    "background-color: #E2F3DF",
];

pub fn rubric() -> [RubricItem<Stylesheet>; 4] {
    [
        RubricItem {
            name: "font-import",
            points: 5,
            partial: 0,
            check: font_import,
        },
        RubricItem {
            name: "universal-font",
            points: 9,
            partial: 0,
            check: universal_font,
        },
        RubricItem {
            name: "title-id",
            points: 15,
            partial: 10,
            check: title_id,
        },
        RubricItem {
            name: "image-class",
            points: 15,
            partial: 10,
            check: image_class,
        },
    ]
}

pub fn evaluate_css(sheet: &Stylesheet) -> Evaluation {
    let span = span!(Level::DEBUG, "Grading CSS");
    let _enter = span.enter();
    evaluate(&rubric(), sheet)
}

/// Matches are made against the serialized declaration block, so they are exact: property
/// order inside each declaration, spacing and case all matter.
fn declares_all(rule: &StyleRule, required: &[&str]) -> bool {
    let text = rule.css_text();
    required.iter().all(|d| text.contains(d))
}

fn font_import(sheet: &Stylesheet) -> Outcome {
    if sheet.imports().any(|i| i.href.contains(FONT_IMPORT)) {
        Outcome::Met
    } else {
        Outcome::Unmet("Falta importar la fuente Reddit Mono")
    }
}

fn universal_font(sheet: &Stylesheet) -> Outcome {
    let found = sheet
        .style_rules()
        .any(|r| r.selector_text() == "*" && declares_all(r, &[UNIVERSAL_FONT]));
    if found {
        Outcome::Met
    } else {
        Outcome::Unmet("Falta el selector universal con la propiedad de fuente")
    }
}

fn title_id(sheet: &Stylesheet) -> Outcome {
    match sheet.find_style_rule("#titulo") {
        Some(rule) if declares_all(rule, &TITLE_DECLARATIONS) => Outcome::Met,
        Some(_) => Outcome::Partial("Estilos del #titulo incompletos"),
        None => Outcome::Unmet("Falta el selector de identificación para #titulo"),
    }
}

fn image_class(sheet: &Stylesheet) -> Outcome {
    match sheet.find_style_rule(".imagen") {
        Some(rule) if declares_all(rule, &IMAGE_DECLARATIONS) => Outcome::Met,
        Some(_) => Outcome::Partial("Propiedades de la imagen incompletas"),
        None => Outcome::Unmet("Falta el selector de clase para .imagen"),
    }
}
