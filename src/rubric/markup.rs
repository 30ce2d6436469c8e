use crate::grade::{evaluate, Evaluation, Outcome, RubricItem};
use html::DOMElement;
use tracing::{span, Level};

const STYLESHEET_PATH: &str = "stylesheets/estilo.css";
const SECTION_COUNT: usize = 4;
const SUBTITLES: [&str; 4] = ["T01", "T02", "T03", "T04"];
const NAV_LINK_COUNT: usize = 4;
const FOOTER_TEXT: &str = "P02 - PAO I 2024";
const IMAGE_SECTION: &str = "T01";
const IMAGE_ALT: &str = "How to Grow and Care for 'Bosc' Pears";

/// A parsed page together with the name of the student who should have written it
pub struct Page<'a> {
    pub document: &'a DOMElement,
    pub student_name: &'a str,
}

pub fn rubric<'a>() -> [RubricItem<Page<'a>>; 8] {
    [
        RubricItem {
            name: "title",
            points: 7,
            partial: 5,
            check: title,
        },
        RubricItem {
            name: "author",
            points: 7,
            partial: 5,
            check: author,
        },
        RubricItem {
            name: "stylesheet-link",
            points: 6,
            partial: 0,
            check: stylesheet_link,
        },
        RubricItem {
            name: "heading",
            points: 3,
            partial: 0,
            check: heading,
        },
        RubricItem {
            name: "sections",
            points: 10,
            partial: 7,
            check: sections,
        },
        RubricItem {
            name: "navigation",
            points: 10,
            partial: 8,
            check: navigation,
        },
        RubricItem {
            name: "footer",
            points: 3,
            partial: 0,
            check: footer,
        },
        RubricItem {
            name: "image",
            points: 10,
            partial: 7,
            check: image,
        },
    ]
}

pub fn evaluate_html(document: &DOMElement, student_name: &str) -> Evaluation {
    let span = span!(Level::DEBUG, "Grading HTML");
    let _enter = span.enter();
    evaluate(
        &rubric(),
        &Page {
            document,
            student_name,
        },
    )
}

fn title(page: &Page) -> Outcome {
    match page.document.find_element("title", &[]) {
        Some(t) if t.text() == page.student_name => Outcome::Met,
        Some(_) => Outcome::Partial("Título de página incorrecto"),
        None => Outcome::Unmet("Falta el título de página"),
    }
}

fn author(page: &Page) -> Outcome {
    let meta = page.document.find_element("meta", &[("name", "author")]);
    match meta.map(|m| m.get_attribute("content").map(String::as_str)) {
        Some(content) if content == Some(page.student_name) => Outcome::Met,
        Some(_) => Outcome::Partial("Etiqueta de autor incorrecta"),
        None => Outcome::Unmet("Falta la etiqueta de autor"),
    }
}

fn stylesheet_link(page: &Page) -> Outcome {
    match page.document.find_element("link", &[("href", STYLESHEET_PATH)]) {
        Some(_) => Outcome::Met,
        None => Outcome::Unmet("Falta la referencia al archivo CSS"),
    }
}

fn heading(page: &Page) -> Outcome {
    match page.document.find_element("h1", &[]) {
        Some(h1) if h1.text() == page.student_name => Outcome::Met,
        _ => Outcome::Unmet("Falta o es incorrecto el título de primer nivel"),
    }
}

fn sections(page: &Page) -> Outcome {
    let sections = page.document.find_elements("section", &[]);
    if sections.len() != SECTION_COUNT {
        return Outcome::Unmet("Faltan secciones o están mal estructuradas");
    }
    // Only membership is checked, two sections may share a subtitle
    let titled = sections.iter().all(|s| {
        s.find_element("h2", &[])
            .map_or(false, |h2| SUBTITLES.contains(&h2.text().as_str()))
    });
    if titled {
        Outcome::Met
    } else {
        Outcome::Partial("Secciones presentes pero con subtítulos incorrectos")
    }
}

fn navigation(page: &Page) -> Outcome {
    let nav = page.document.find_element("nav", &[]);
    match nav {
        Some(nav) if nav.find_element("ul", &[]).is_some() => {
            if nav.find_elements("a", &[]).len() == NAV_LINK_COUNT {
                Outcome::Met
            } else {
                Outcome::Partial("Panel de navegación incompleto")
            }
        }
        _ => Outcome::Unmet("Falta el panel de navegación o está mal estructurado"),
    }
}

fn footer(page: &Page) -> Outcome {
    match page.document.find_element("footer", &[]) {
        Some(f) if f.text().contains(FOOTER_TEXT) => Outcome::Met,
        _ => Outcome::Unmet("Falta el pie de página o es incorrecto"),
    }
}

fn image(page: &Page) -> Outcome {
    let Some(section) = page.document.find_element("section", &[("id", IMAGE_SECTION)]) else {
        return Outcome::Unmet("Falta la sección T01");
    };
    let Some(img) = section.find_element("img", &[("alt", IMAGE_ALT)]) else {
        return Outcome::Unmet(
            "Falta la imagen en la sección T01 o tiene un texto alternativo incorrecto",
        );
    };
    // The container may enclose the section itself
    if page.document.find_ancestor(img, "div").is_some() {
        Outcome::Met
    } else {
        Outcome::Partial("Imagen presente pero no dentro de un contenedor")
    }
}
