use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, span, Level};

use crate::report::Report;
use crate::rubric::{evaluate_css, evaluate_html};
use css::{ParseOptions, StylesheetParser};

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("could not read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The two files a student hands in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub html: String,
    pub css: String,
}

impl Submission {
    pub fn load(html: &Path, css: &Path) -> Result<Self, GradeError> {
        Ok(Self {
            html: read_text(html)?,
            css: read_text(css)?,
        })
    }

    /// Parses both files and runs them through the rubric. Parse problems never fail grading,
    /// they only cost points.
    pub fn grade(&self, student_name: &str) -> Report {
        let span = span!(Level::DEBUG, "Grading submission", student = student_name);
        let _enter = span.enter();
        let document = html::document(&self.html);
        let sheet = StylesheetParser::new(ParseOptions::quiet()).parse(&self.css);
        debug!(rules = sheet.rules.len(), "Parsed stylesheet");
        Report {
            html: evaluate_html(&document, student_name),
            css: evaluate_css(&sheet),
        }
    }
}

fn read_text(path: &Path) -> Result<String, GradeError> {
    let span = span!(Level::DEBUG, "Loading file", path = %path.display());
    let _enter = span.enter();
    std::fs::read_to_string(path).map_err(|source| GradeError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::fs;
    use tempfile::TempDir;

    fn write_pair(dir: &TempDir, html: &str, css: &str) -> (PathBuf, PathBuf) {
        let html_path = dir.path().join("index.html");
        let css_path = dir.path().join("estilo.css");
        fs::write(&html_path, html).unwrap();
        fs::write(&css_path, css).unwrap();
        (html_path, css_path)
    }

    #[test]
    fn test_load() {
        let dir = TempDir::new().unwrap();
        let (html_path, css_path) = write_pair(&dir, "<title>Ana</title>", "* { color: red }");
        let submission = Submission::load(&html_path, &css_path).unwrap();
        assert_eq!(submission.html, "<title>Ana</title>");
        assert_eq!(submission.css, "* { color: red }");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let (html_path, _) = write_pair(&dir, "", "");
        let missing = dir.path().join("nope.css");
        let err = Submission::load(&html_path, &missing).unwrap_err();
        let GradeError::Read { path, .. } = &err;
        assert_eq!(path, &missing);
        assert!(err.to_string().starts_with("could not read "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_empty_submission() {
        let report = Submission {
            html: String::new(),
            css: String::new(),
        }
        .grade("Ana");
        assert_eq!(report.total(), 0);
        assert_eq!(report.out_of(), 100);
        assert_eq!(report.html.feedback().len(), 8);
        assert_eq!(report.css.feedback().len(), 4);
    }

    #[test]
    fn test_grading_is_repeatable() {
        let submission = Submission {
            html: "<html><head><title>Ana</title></head><footer>P02 - PAO I 2024</footer></html>"
                .to_string(),
            css: "* { font-family: \"Reddit Mono\" }".to_string(),
        };
        let first = submission.grade("Ana");
        assert_eq!(first.html.score(), 7 + 3);
        assert_eq!(first.css.score(), 9);
        assert_eq!(first, submission.grade("Ana"));
    }
}
