//! Grades a student's HTML page and stylesheet against a fixed 100 point rubric.

/// Rubric items and their evaluation
pub mod grade;
/// The printed report
pub mod report;
/// The page and stylesheet checks
pub mod rubric;
/// Loading and grading of the handed in files
pub mod submission;

pub use report::Report;
pub use submission::{GradeError, Submission};
