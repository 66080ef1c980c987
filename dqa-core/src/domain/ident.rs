// dqa-core/src/domain/ident.rs
//
// Identifier handling shared by the rule parser, the rank engine and the codec.

/// Canonical form used for every case-insensitive comparison: trimmed, lowercase.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive, whitespace-tolerant equality.
pub fn same(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Header column key: normalized, inner spaces folded to underscores.
/// "Model Version" and " model_version" both become "model_version".
pub fn column_key(value: &str) -> String {
    normalize(value).replace(' ', "_")
}

/// A bare identifier as accepted by the rule language: `[A-Za-z0-9_]+`.
pub fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Person_ID "), "person_id");
        assert!(same("G4-001", " g4-001"));
        assert!(!same("g4-001", "g4-002"));
    }

    #[test]
    fn test_column_key() {
        assert_eq!(column_key(" Model Version"), "model_version");
        assert_eq!(column_key("Github ID"), "github_id");
    }

    #[test]
    fn test_identifier() {
        assert!(is_identifier("visit_occurrence_id"));
        assert!(is_identifier("G4"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("in (a, b)"));
        assert!(!is_identifier("g4-001"));
    }
}
