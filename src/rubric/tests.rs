use super::markup::{self, Page};
use super::styles;
use super::*;
use crate::grade::Evaluation;
use css::{ParseOptions, StylesheetParser};
use html::document;

const NAME: &str = "Ramirez Ramirez Jair Alexandre";

const FULL_PAGE: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="author" content="Ramirez Ramirez Jair Alexandre">
    <title>Ramirez Ramirez Jair Alexandre</title>
    <link rel="stylesheet" href="stylesheets/estilo.css">
</head>
<body>
    <h1 id="titulo">Ramirez Ramirez Jair Alexandre</h1>
    <nav>
        <ul>
            <li><a href="#T01">T01</a></li>
            <li><a href="#T02">T02</a></li>
            <li><a href="#T03">T03</a></li>
            <li><a href="#T04">T04</a></li>
        </ul>
    </nav>
    <section id="T01">
        <h2>T01</h2>
        <div>
            <img class="imagen" src="pera.jpg" alt="How to Grow and Care for &#39;Bosc&#39; Pears">
        </div>
    </section>
    <section id="T02"><h2>T02</h2></section>
    <section id="T03"><h2>T03</h2></section>
    <section id="T04"><h2>T04</h2></section>
    <footer><p>P02 - PAO I 2024</p></footer>
</body>
</html>"##;

const FULL_SHEET: &str = r#"@import url('https://fonts.googleapis.com/css?family=Reddit+Mono');

* {
    font-family: "Reddit Mono";
}

#titulo {
    font-family: "Segoe UI", sans-serif;
    font-size: 1.1rem;
    color: #53F072;
}

.imagen {
    margin: 0.2px 1.2rem;
    padding: 0 25%;
    border: 1px blue double;
    background-color: #E2F3DF;
}
"#;

fn grade_page(source: &str) -> Evaluation {
    evaluate_html(&document(source), NAME)
}

fn grade_sheet(source: &str) -> Evaluation {
    evaluate_css(&StylesheetParser::new(ParseOptions::quiet()).parse(source))
}

fn awarded(eval: &Evaluation, item: &str) -> u32 {
    eval.result(item).map(|r| r.awarded).unwrap_or_default()
}

#[test]
fn test_full_page() {
    let eval = grade_page(FULL_PAGE);
    assert_eq!(eval.score(), 56);
    assert_eq!(eval.out_of(), 56);
    assert!(eval.feedback().is_empty());
}

#[test]
fn test_full_sheet() {
    let eval = grade_sheet(FULL_SHEET);
    assert_eq!(eval.score(), 44);
    assert_eq!(eval.out_of(), 44);
    assert!(eval.feedback().is_empty());
}

#[test]
fn test_missing_title() {
    let page = FULL_PAGE.replace("    <title>Ramirez Ramirez Jair Alexandre</title>\n", "");
    let eval = grade_page(&page);
    assert_eq!(eval.score(), 49);
    assert_eq!(eval.feedback(), ["Falta el título de página"]);
}

#[test]
fn test_wrong_title_and_author_get_partial_credit() {
    let page = FULL_PAGE
        .replace("<title>Ramirez Ramirez Jair Alexandre</title>", "<title>Mi página</title>")
        .replace(r#"content="Ramirez Ramirez Jair Alexandre""#, r#"content="ramirez""#);
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "title"), 5);
    assert_eq!(awarded(&eval, "author"), 5);
    assert_eq!(
        eval.feedback(),
        ["Título de página incorrecto", "Etiqueta de autor incorrecta"]
    );

    let page = FULL_PAGE.replace(
        r#"<meta name="author" content="Ramirez Ramirez Jair Alexandre">"#,
        "",
    );
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "author"), 0);
    assert_eq!(eval.feedback(), ["Falta la etiqueta de autor"]);
}

#[test]
fn test_stylesheet_link_and_heading() {
    let page = FULL_PAGE
        .replace("stylesheets/estilo.css", "estilo.css")
        .replace(r#"<h1 id="titulo">Ramirez Ramirez Jair Alexandre</h1>"#, "<h1> Ramirez </h1>");
    let eval = grade_page(&page);
    assert_eq!(eval.score(), 56 - 6 - 3);
    assert_eq!(
        eval.feedback(),
        [
            "Falta la referencia al archivo CSS",
            "Falta o es incorrecto el título de primer nivel"
        ]
    );
}

#[test]
fn test_css_partial() {
    let sheet = r#"@import url("https://fonts.googleapis.com/css?family=Reddit+Mono");
* { font-family: "Reddit Mono" }
#titulo { font-family: "Segoe UI", sans-serif; font-size: 1.1rem }
"#;
    let eval = grade_sheet(sheet);
    assert_eq!(eval.score(), 5 + 9 + 10);
    assert_eq!(
        eval.feedback(),
        ["Estilos del #titulo incompletos", "Falta el selector de clase para .imagen"]
    );
}

#[test]
fn test_navigation() {
    let page = FULL_PAGE.replace(r##"<li><a href="#T04">T04</a></li>"##, "");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "navigation"), 8);
    assert_eq!(eval.feedback(), ["Panel de navegación incompleto"]);

    // Exactly four links, not at least four
    let page = FULL_PAGE.replace("</ul>", r##"<li><a href="#">extra</a></li></ul>"##);
    assert_eq!(awarded(&grade_page(&page), "navigation"), 8);

    let page = FULL_PAGE.replace("<ul>", "<ol>").replace("</ul>", "</ol>");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "navigation"), 0);
    assert_eq!(
        eval.feedback(),
        ["Falta el panel de navegación o está mal estructurado"]
    );
}

#[test]
fn test_sections() {
    let page = FULL_PAGE.replace("<h2>T03</h2>", "<h2>T05</h2>");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "sections"), 7);
    assert_eq!(eval.feedback(), ["Secciones presentes pero con subtítulos incorrectos"]);

    // Repeated subtitles are allowed
    let page = FULL_PAGE.replace("<h2>T03</h2>", "<h2>T02</h2>");
    assert_eq!(awarded(&grade_page(&page), "sections"), 10);

    let page = FULL_PAGE.replace(r#"<section id="T04"><h2>T04</h2></section>"#, "");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "sections"), 0);
    assert_eq!(eval.feedback(), ["Faltan secciones o están mal estructuradas"]);

    let page = FULL_PAGE.replace("<h2>T02</h2>", "");
    assert_eq!(awarded(&grade_page(&page), "sections"), 7);
}

#[test]
fn test_footer() {
    let page = FULL_PAGE.replace("P02 - PAO I 2024", "P02 - PAO II 2024");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "footer"), 0);
    assert_eq!(eval.feedback(), ["Falta el pie de página o es incorrecto"]);

    let page = FULL_PAGE.replace(
        "<p>P02 - PAO I 2024</p>",
        "<p>Proyecto P02 - PAO I 2024 &amp; más</p>",
    );
    assert_eq!(awarded(&grade_page(&page), "footer"), 3);
}

#[test]
fn test_image() {
    let page = FULL_PAGE.replace("<div>", "<figure>").replace("</div>", "</figure>");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "image"), 7);
    assert_eq!(eval.feedback(), ["Imagen presente pero no dentro de un contenedor"]);

    let page = FULL_PAGE.replace("&#39;Bosc&#39;", "Bosc");
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "image"), 0);
    assert_eq!(
        eval.feedback(),
        ["Falta la imagen en la sección T01 o tiene un texto alternativo incorrecto"]
    );

    let page = FULL_PAGE.replace(r#"<section id="T01">"#, r#"<section id="t01">"#);
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "image"), 0);
    assert_eq!(eval.feedback(), ["Falta la sección T01"]);
}

#[test]
fn test_image_container_may_enclose_section() {
    let page = FULL_PAGE
        .replace("<div>", "")
        .replace("</div>", "")
        .replace("<body>", "<body><div>")
        .replace("</body>", "</div></body>");
    assert_eq!(awarded(&grade_page(&page), "image"), 10);
}

#[test]
fn test_css_selectors_and_import() {
    let sheet = FULL_SHEET.replace("Reddit+Mono", "Roboto");
    let eval = grade_sheet(&sheet);
    assert_eq!(awarded(&eval, "font-import"), 0);
    assert_eq!(eval.feedback(), ["Falta importar la fuente Reddit Mono"]);

    // The universal rule must be on its own, not part of a group
    let sheet = FULL_SHEET.replace("* {", "*, body {");
    let eval = grade_sheet(&sheet);
    assert_eq!(awarded(&eval, "universal-font"), 0);
    assert_eq!(
        eval.feedback(),
        ["Falta el selector universal con la propiedad de fuente"]
    );

    let sheet = FULL_SHEET.replace("#titulo {", "h1#titulo {");
    let eval = grade_sheet(&sheet);
    assert_eq!(awarded(&eval, "title-id"), 0);
    assert_eq!(eval.feedback(), ["Falta el selector de identificación para #titulo"]);

    let sheet = FULL_SHEET.replace("border: 1px blue double", "border: 1px double blue");
    let eval = grade_sheet(&sheet);
    assert_eq!(awarded(&eval, "image-class"), 10);
    assert_eq!(eval.feedback(), ["Propiedades de la imagen incompletas"]);
}

#[test]
fn test_css_matching_is_on_serialized_text() {
    // Quoting and spacing are normalized by the parser before matching
    let sheet = FULL_SHEET
        .replace(r#""Reddit Mono""#, "'Reddit Mono'")
        .replace("font-size: 1.1rem", "font-size:1.1rem")
        .replace("margin: 0.2px 1.2rem", "margin: .2px   1.2rem");
    assert_eq!(grade_sheet(&sheet).score(), 44);

    // Hex colors keep their case
    let sheet = FULL_SHEET.replace("#53F072", "#53f072");
    assert_eq!(awarded(&grade_sheet(&sheet), "title-id"), 10);

    // Only the first #titulo rule counts
    let sheet = format!("#titulo {{ color: red }}\n{}", FULL_SHEET);
    assert_eq!(awarded(&grade_sheet(&sheet), "title-id"), 10);
}

#[test]
fn test_scores_stay_in_range() {
    let pages = [
        String::new(),
        "<html><body><p>nada</p></body></html>".to_string(),
        FULL_PAGE.to_string(),
        FULL_PAGE.replace("<div>", "<span>").replace("<ul>", ""),
        FULL_PAGE.replace("section", "article"),
        "<<<>>></section><section id=T01><img alt='x'>".to_string(),
    ];
    let sheets = [
        String::new(),
        "this is { not css".to_string(),
        FULL_SHEET.to_string(),
        FULL_SHEET.replace(';', ""),
        FULL_SHEET.replace(".imagen", ".image"),
    ];
    let html_items = markup::rubric();
    let css_items = styles::rubric();
    for page in &pages {
        let eval = grade_page(page);
        assert!(eval.score() <= 56);
        for (item, result) in html_items.iter().zip(&eval.results) {
            assert!([0, item.partial, item.points].contains(&result.awarded));
            assert_eq!(result.feedback.is_none(), result.awarded == item.points);
        }
        assert_eq!(eval, grade_page(page));
    }
    for sheet in &sheets {
        let eval = grade_sheet(sheet);
        assert!(eval.score() <= 44);
        for (item, result) in css_items.iter().zip(&eval.results) {
            assert!([0, item.partial, item.points].contains(&result.awarded));
            assert_eq!(result.feedback.is_none(), result.awarded == item.points);
        }
        assert_eq!(eval, grade_sheet(sheet));
    }
}

#[test]
fn test_page_is_only_read() {
    let doc = document(FULL_PAGE);
    let before = doc.clone();
    let page = Page {
        document: &doc,
        student_name: NAME,
    };
    for item in markup::rubric() {
        (item.check)(&page);
    }
    assert_eq!(doc, before);
}

#[test]
fn test_names_written_with_character_references() {
    let page = FULL_PAGE.replace(NAME, "Ram&iacute;rez Ram&iacute;rez Jair Alexandre");
    let eval = evaluate_html(&document(&page), "Ramírez Ramírez Jair Alexandre");
    assert_eq!(eval.score(), 56);
    assert!(eval.feedback().is_empty());
}

#[test]
fn test_attributes_written_without_spaces() {
    let page = FULL_PAGE
        .replace(r#"name="author" content="#, r#"name="author"content="#)
        .replace(r#"rel="stylesheet" href="#, r#"rel="stylesheet"href="#);
    let eval = grade_page(&page);
    assert_eq!(awarded(&eval, "author"), 7);
    assert_eq!(awarded(&eval, "stylesheet-link"), 6);
    assert_eq!(eval.score(), 56);
}

#[test]
fn test_deeply_nested_page_is_graded() {
    let page = format!("{}{}", "<div>".repeat(200_000), FULL_PAGE);
    let eval = grade_page(&page);
    assert!(eval.score() <= 56);
    assert_eq!(eval, grade_page(&page));
}
