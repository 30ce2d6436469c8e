//! The fixed rubric: 56 points for the page structure and 44 for its stylesheet.

mod markup;
mod styles;
#[cfg(test)]
mod tests;

pub use markup::evaluate_html;
pub use styles::evaluate_css;
