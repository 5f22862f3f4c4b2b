//! Shared query building blocks: [`FilterValue`], [`BoolOp`], and [`SortBy`].

use std::str::FromStr;

use crate::Error;

/// A filter given either as one value or as a list of values that are OR-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Renders the value as `field:"value"`, or `(field:"a" OR field:"b")` for lists.
    pub(crate) fn render(&self, field: &str) -> Result<String, Error> {
        match self {
            FilterValue::Single(value) => render_term(field, value),
            FilterValue::Many(values) => match values.as_slice() {
                [] => Err(Error::validation(format!("{} filter has no values", field))),
                [only] => render_term(field, only),
                many => {
                    let clauses = many
                        .iter()
                        .map(|v| render_term(field, v))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(format!("({})", clauses.join(" OR ")))
                }
            },
        }
    }

    /// Iterates over the values regardless of shape.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            FilterValue::Single(value) => std::slice::from_ref(value),
            FilterValue::Many(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

fn render_term(field: &str, value: &str) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} filter value is empty", field)));
    }
    if value.contains('"') {
        return Err(Error::validation(format!(
            "{} filter value {} cannot contain a double quote",
            field, value
        )));
    }
    Ok(format!("{}:\"{}\"", field, value))
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Single(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FilterValue {
    fn from(values: &[&str]) -> Self {
        FilterValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(values: [&str; N]) -> Self {
        FilterValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Boolean operator used to combine several near or repeat constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl std::fmt::Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BoolOp::And => "AND",
                BoolOp::Or => "OR",
            }
        )
    }
}

impl FromStr for BoolOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(BoolOp::And),
            "OR" => Ok(BoolOp::Or),
            _ => Err(Error::validation(format!(
                "method must be one of AND or OR, not {}",
                s
            ))),
        }
    }
}

/// Result ordering for article list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    DateDesc,
    DateAsc,
    ToneDesc,
    ToneAsc,
    /// Relevance mixed with outlet popularity. The API default for recent content.
    HybridRel,
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortBy::DateDesc => "DateDesc",
                SortBy::DateAsc => "DateAsc",
                SortBy::ToneDesc => "ToneDesc",
                SortBy::ToneAsc => "ToneAsc",
                SortBy::HybridRel => "HybridRel",
            }
        )
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "datedesc" => Ok(SortBy::DateDesc),
            "dateasc" => Ok(SortBy::DateAsc),
            "tonedesc" => Ok(SortBy::ToneDesc),
            "toneasc" => Ok(SortBy::ToneAsc),
            "hybridrel" => Ok(SortBy::HybridRel),
            _ => Err(Error::validation(format!(
                "Sort type {} is invalid. Must be one of DateDesc, DateAsc, ToneDesc, ToneAsc, HybridRel",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_renders_without_group() {
        let value = FilterValue::from("cnn.com");
        assert_eq!(value.render("domain").unwrap(), "domain:\"cnn.com\"");
    }

    #[test]
    fn one_element_list_renders_like_single() {
        let value = FilterValue::from(vec!["cnn.com"]);
        assert_eq!(value.render("domain").unwrap(), "domain:\"cnn.com\"");
    }

    #[test]
    fn list_renders_or_group_in_order() {
        let value = FilterValue::from(["b.com", "a.com", "c.com"]);
        assert_eq!(
            value.render("domain").unwrap(),
            "(domain:\"b.com\" OR domain:\"a.com\" OR domain:\"c.com\")"
        );
    }

    #[test]
    fn empty_values_are_rejected() {
        assert!(matches!(
            FilterValue::Many(vec![]).render("theme"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            FilterValue::from("  ").render("theme"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn quoted_values_are_rejected() {
        assert!(FilterValue::from("say \"hi\"").render("keyword").is_err());
    }

    #[test]
    fn bool_op_parsing() {
        assert_eq!("and".parse::<BoolOp>().unwrap(), BoolOp::And);
        assert_eq!(" OR ".parse::<BoolOp>().unwrap(), BoolOp::Or);
        let err = "NOT_A_METHOD".parse::<BoolOp>().unwrap_err();
        assert!(err.to_string().contains("method must be one of AND or OR"));
    }

    #[test]
    fn sort_by_round_trips_through_display() {
        for sort in [
            SortBy::DateDesc,
            SortBy::DateAsc,
            SortBy::ToneDesc,
            SortBy::ToneAsc,
            SortBy::HybridRel,
        ] {
            assert_eq!(sort.to_string().parse::<SortBy>().unwrap(), sort);
        }
        assert!("Newest".parse::<SortBy>().is_err());
    }
}
