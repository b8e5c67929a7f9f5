//! Name matching shared by the suggestion re-filter and the exact resolver.
//!
//! The store matches per field, so a query spanning both names ("john sm")
//! has to be re-checked against the assembled names here.

use lookup_types::Member;

/// How the query is compared with a member's assembled names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Query is contained in "first last" or "last first"
    Substring,
    /// Query equals "first last" or "last first"
    Exact,
}

/// Case-insensitive match of `query` against both name orders.
///
/// The query is trimmed in `Exact` mode; `Substring` callers pass an already
/// normalized query.
pub fn matches(member: &Member, query: &str, mode: MatchMode) -> bool {
    let full = member.display_name().to_lowercase();
    let reversed = member.reversed_name().to_lowercase();

    match mode {
        MatchMode::Substring => {
            let needle = query.to_lowercase();
            full.contains(&needle) || reversed.contains(&needle)
        }
        MatchMode::Exact => {
            let needle = query.trim().to_lowercase();
            full == needle || reversed == needle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smith() -> Member {
        Member::new(1, "Smith", "John", "john.pdf")
    }

    #[test]
    fn test_substring_spans_both_fields() {
        let m = smith();
        assert!(matches(&m, "john sm", MatchMode::Substring));
        assert!(matches(&m, "SMITH J", MatchMode::Substring));
        assert!(matches(&m, "ohn", MatchMode::Substring));
        assert!(!matches(&m, "jane", MatchMode::Substring));
    }

    #[test]
    fn test_exact_either_order() {
        let m = smith();
        assert!(matches(&m, "John Smith", MatchMode::Exact));
        assert!(matches(&m, "smith john", MatchMode::Exact));
        assert!(matches(&m, "  JOHN SMITH  ", MatchMode::Exact));
    }

    #[test]
    fn test_exact_rejects_partials() {
        let m = smith();
        assert!(!matches(&m, "John Smit", MatchMode::Exact));
        assert!(!matches(&m, "John", MatchMode::Exact));
        assert!(!matches(&m, "John  Smith", MatchMode::Exact));
    }
}
