//! Team-name normalisation shared by store filters and match search.

/// Lowercase, strip common Latin accents and punctuation, collapse whitespace.
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' | 'ś' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        other => other,
    }
}

/// Exact or near-exact team match: equal once normalised, or one name is a
/// whole-word prefix or suffix of the other ("Inter" / "Inter Milan", "Milan" / "AC Milan").
pub fn same_team(candidate: &str, wanted: &str) -> bool {
    let candidate = normalize(candidate);
    let wanted = normalize(wanted);
    if candidate.is_empty() || wanted.is_empty() {
        return false;
    }
    let word_affix = |long: &str, short: &str| {
        long.starts_with(&format!("{} ", short)) || long.ends_with(&format!(" {}", short))
    };
    candidate == wanted || word_affix(&candidate, &wanted) || word_affix(&wanted, &candidate)
}

/// Case-insensitive partial match used by fuzzy search
pub fn contains(candidate: &str, fragment: &str) -> bool {
    let fragment = normalize(fragment);
    !fragment.is_empty() && normalize(candidate).contains(&fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Atlético   Madrid "), "atletico madrid");
        assert_eq!(normalize("St. Pauli"), "st pauli");
        assert_eq!(normalize("Bayern München"), "bayern munchen");
    }

    #[test]
    fn test_same_team() {
        assert!(same_team("Inter", "inter"));
        assert!(same_team("Inter Milan", "Inter"));
        assert!(same_team("Atletico Madrid", "Atlético Madrid"));
        assert!(!same_team("Internacional", "Inter"));
        assert!(same_team("AC Milan", "Milan"));
        assert!(!same_team("AC Milan", "Inter"));
        assert!(!same_team("Milano City", "Lan"));
        assert!(!same_team("", ""));
    }

    #[test]
    fn test_contains() {
        assert!(contains("Internazionale", "INTER"));
        assert!(contains("Paris Saint-Germain", "saint germain"));
        assert!(!contains("Lazio", "roma"));
        assert!(!contains("Lazio", "  "));
    }
}
