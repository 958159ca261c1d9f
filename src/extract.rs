use rustc_hash::FxHashMap;

use crate::ast::Segment;
use crate::error::{Error, Result};
use crate::parser::RangeParser;

/// Result of scanning an argument string for range expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The argument string with every range occurrence replaced by the
    /// `${vN}` placeholder of its dimension.
    pub substituted: String,
    /// Raw range specs needing expansion, in definition order.
    pub specs: Vec<String>,
}

/// Scan an argument string left to right, replacing every range expression
/// with a placeholder keyed by its dimension's position index.
///
/// A non-empty body defines the next dimension; an empty body is a
/// back-reference and reuses the dimension its group id was registered
/// with. The group registry is local to one call, nothing persists
/// between invocations.
pub fn extract(argstr: &str) -> Result<Extraction> {
    let segments = RangeParser::parse_command(argstr)?;

    let mut groups: FxHashMap<&str, usize> = FxHashMap::default();
    let mut specs = Vec::new();
    let mut substituted = String::with_capacity(argstr.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => substituted.push_str(text),
            Segment::Range { group, body } => {
                let index = if body.is_empty() {
                    let id = group.unwrap_or_default();
                    *groups
                        .get(id)
                        .ok_or_else(|| Error::UndefinedGroup(id.to_string()))?
                } else {
                    let index = specs.len();
                    if let Some(id) = group {
                        if groups.contains_key(id) {
                            return Err(Error::DuplicateGroup(id.to_string()));
                        }
                        groups.insert(id, index);
                    }
                    specs.push(body.to_string());
                    index
                };
                substituted.push_str(&format!("${{v{index}}}"));
            }
        }
    }

    Ok(Extraction { substituted, specs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_placeholders_in_definition_order() {
        let extraction = extract("./app --x [1-10] -y [3-5] -z 1").unwrap();
        assert_eq!(extraction.substituted, "./app --x ${v0} -y ${v1} -z 1");
        assert_eq!(extraction.specs, vec!["1-10", "3-5"]);
    }

    #[test]
    fn test_no_ranges_passes_through() {
        let extraction = extract("./app -x 1").unwrap();
        assert_eq!(extraction.substituted, "./app -x 1");
        assert!(extraction.specs.is_empty());
    }

    #[test]
    fn test_back_reference_reuses_the_dimension() {
        let extraction = extract("./app --x [0=1-3] --y [0=]").unwrap();
        assert_eq!(extraction.substituted, "./app --x ${v0} --y ${v0}");
        // the shared dimension is counted exactly once
        assert_eq!(extraction.specs, vec!["1-3"]);
    }

    #[test]
    fn test_named_definition_after_anonymous_one() {
        let extraction = extract("[a,b] [g=1-2] [g=]").unwrap();
        assert_eq!(extraction.substituted, "${v0} ${v1} ${v1}");
        assert_eq!(extraction.specs, vec!["a,b", "1-2"]);
    }

    #[test]
    fn test_duplicate_group_is_an_error() {
        let err = extract("[g=1-3] [g=4-6]").unwrap_err();
        assert!(matches!(err, Error::DuplicateGroup(id) if id == "g"));
    }

    #[test]
    fn test_undefined_group_is_an_error() {
        let err = extract("./app [g=]").unwrap_err();
        assert!(matches!(err, Error::UndefinedGroup(id) if id == "g"));
    }

    #[test]
    fn test_forward_reference_is_an_error() {
        let err = extract("[g=] [g=1-3]").unwrap_err();
        assert!(matches!(err, Error::UndefinedGroup(id) if id == "g"));
    }

    #[test]
    fn test_empty_brackets_without_group_are_an_error() {
        assert!(matches!(extract("[]"), Err(Error::UndefinedGroup(_))));
    }

    #[test]
    fn test_unmatched_bracket_stays_literal() {
        let extraction = extract("./app [1-5").unwrap();
        assert_eq!(extraction.substituted, "./app [1-5");
        assert!(extraction.specs.is_empty());
    }
}
