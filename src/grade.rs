use tracing::debug;

/// What a single rubric check found
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Full credit, no feedback
    Met,
    /// The item's partial credit, with the reason it is not full
    Partial(&'static str),
    /// No credit
    Unmet(&'static str),
}

/// One row of a rubric: the points at stake and the check that decides them
pub struct RubricItem<T: ?Sized> {
    pub name: &'static str,
    pub points: u32,
    /// Awarded on [`Outcome::Partial`]; zero for items without a partial tier
    pub partial: u32,
    pub check: fn(&T) -> Outcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemResult {
    pub name: &'static str,
    pub awarded: u32,
    pub out_of: u32,
    pub feedback: Option<&'static str>,
}

impl<T: ?Sized> RubricItem<T> {
    pub fn grade(&self, input: &T) -> ItemResult {
        let (awarded, feedback) = match (self.check)(input) {
            Outcome::Met => (self.points, None),
            Outcome::Partial(reason) => (self.partial.min(self.points), Some(reason)),
            Outcome::Unmet(reason) => (0, Some(reason)),
        };
        debug!(item = self.name, awarded, out_of = self.points, "Graded rubric item");
        ItemResult {
            name: self.name,
            awarded,
            out_of: self.points,
            feedback,
        }
    }
}

/// Results of every item of a rubric, in rubric order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub results: Vec<ItemResult>,
}

impl Evaluation {
    pub fn score(&self) -> u32 {
        self.results.iter().map(|r| r.awarded).sum()
    }

    pub fn out_of(&self) -> u32 {
        self.results.iter().map(|r| r.out_of).sum()
    }

    /// One line per item that did not get full credit
    pub fn feedback(&self) -> Vec<&'static str> {
        self.results.iter().filter_map(|r| r.feedback).collect()
    }

    pub fn result(&self, name: &str) -> Option<&ItemResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Run every item of `rubric` against `input`
pub fn evaluate<T: ?Sized>(rubric: &[RubricItem<T>], input: &T) -> Evaluation {
    Evaluation {
        results: rubric.iter().map(|item| item.grade(input)).collect(),
    }
}
