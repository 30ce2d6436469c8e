use std::fmt::{self, Display, Formatter};

use crate::grade::Evaluation;

/// The combined result of grading a page and its stylesheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub html: Evaluation,
    pub css: Evaluation,
}

impl Report {
    pub fn total(&self) -> u32 {
        self.html.score() + self.css.score()
    }

    pub fn out_of(&self) -> u32 {
        self.html.out_of() + self.css.out_of()
    }
}

fn write_feedback(f: &mut Formatter<'_>, heading: &str, eval: &Evaluation) -> fmt::Result {
    writeln!(f, "Retroalimentación {}:", heading)?;
    for line in eval.feedback() {
        writeln!(f, "- {}", line)?;
    }
    Ok(())
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Puntuación total: {}/{}", self.total(), self.out_of())?;
        writeln!(f)?;
        write_feedback(f, "HTML", &self.html)?;
        writeln!(f)?;
        write_feedback(f, "CSS", &self.css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::ItemResult;

    fn item(
        name: &'static str,
        awarded: u32,
        out_of: u32,
        feedback: Option<&'static str>,
    ) -> ItemResult {
        ItemResult {
            name,
            awarded,
            out_of,
            feedback,
        }
    }

    #[test]
    fn test_display() {
        let report = Report {
            html: Evaluation {
                results: vec![
                    item("title", 0, 7, Some("Falta el título de página")),
                    item("footer", 3, 3, None),
                ],
            },
            css: Evaluation {
                results: vec![
                    item("font-import", 5, 5, None),
                    item("title-id", 10, 15, Some("Estilos del #titulo incompletos")),
                    item("image-class", 0, 15, Some("Falta el selector de clase para .imagen")),
                ],
            },
        };
        assert_eq!(report.total(), 18);
        assert_eq!(report.out_of(), 45);
        assert_eq!(
            report.to_string(),
            "Puntuación total: 18/45\n\
             \n\
             Retroalimentación HTML:\n\
             - Falta el título de página\n\
             \n\
             Retroalimentación CSS:\n\
             - Estilos del #titulo incompletos\n\
             - Falta el selector de clase para .imagen\n"
        );
    }

    #[test]
    fn test_display_without_feedback() {
        let report = Report {
            html: Evaluation {
                results: vec![item("title", 7, 7, None)],
            },
            css: Evaluation::default(),
        };
        assert_eq!(
            report.to_string(),
            "Puntuación total: 7/7\n\nRetroalimentación HTML:\n\nRetroalimentación CSS:\n"
        );
    }
}
