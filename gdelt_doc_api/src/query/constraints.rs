//! Proximity (`near`) and repetition (`repeat`) constraints.

use crate::Error;

use super::common::BoolOp;

/// Requires the given terms to appear within `distance` words of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Near {
    pub distance: u32,
    pub terms: Vec<String>,
}

impl Near {
    pub fn new<I, S>(distance: u32, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            distance,
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Renders as `near<distance>:"term1,term2"`.
    pub(crate) fn render(&self) -> Result<String, Error> {
        if self.distance == 0 {
            return Err(Error::validation("near distance must be at least 1"));
        }
        if self.terms.len() < 2 {
            return Err(Error::validation("At least two words must be provided to near"));
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let term = term.trim();
            if term.is_empty() || term.contains(['"', ',']) {
                return Err(Error::validation(format!("invalid near term '{}'", term)));
            }
            terms.push(term);
        }
        Ok(format!("near{}:\"{}\"", self.distance, terms.join(",")))
    }
}

/// Requires `term` to appear at least `count` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub count: u32,
    pub term: String,
}

impl Repeat {
    pub fn new(count: u32, term: impl Into<String>) -> Self {
        Self {
            count,
            term: term.into(),
        }
    }

    /// Renders as `repeat<count>:"term"`.
    pub(crate) fn render(&self) -> Result<String, Error> {
        if self.count == 0 {
            return Err(Error::validation("repeat count must be at least 1"));
        }
        let term = self.term.trim();
        if term.is_empty() {
            return Err(Error::validation("repeat term is empty"));
        }
        if term.contains(char::is_whitespace) {
            return Err(Error::validation("Only single words can be repeated"));
        }
        if term.contains('"') {
            return Err(Error::validation(format!("invalid repeat term '{}'", term)));
        }
        Ok(format!("repeat{}:\"{}\"", self.count, term))
    }
}

/// One constraint, or several joined by a caller-chosen operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combined<T> {
    One(T),
    Many(BoolOp, Vec<T>),
}

impl<T> Combined<T> {
    pub(crate) fn render(&self, render_one: impl Fn(&T) -> Result<String, Error>) -> Result<String, Error> {
        match self {
            Combined::One(item) => render_one(item),
            Combined::Many(op, items) => match items.as_slice() {
                [] => Err(Error::validation("no constraints supplied")),
                [only] => render_one(only),
                many => {
                    let clauses = many
                        .iter()
                        .map(render_one)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(format!("({})", clauses.join(&format!(" {} ", op))))
                }
            },
        }
    }
}
