use std::collections::HashSet;

use log::info;

use crate::extractor::Candidate;

pub const PRIMARY_MIN_SIMILARITY: f64 = 0.2;
pub const RELAXED_MIN_SIMILARITY: f64 = 0.1;
/// Below this many survivors the filter re-runs once at the relaxed
/// threshold, guarding against title vocabularies that starve the set.
const RELAX_BELOW: usize = 10;

const OR_SEPARATOR: &str = " OR ";

// Seniority vocabulary: canonical level keyed to its variations. Matching
// is substring-per-word, so a word like "sr." still hits "senior".
const SENIORITY_LEVELS: &[(&str, &[&str])] = &[
    ("chief", &["c-level", "cxo", "chief"]),
    ("vp", &["vice president", "vp", "vice-president", "vice pres"]),
    ("head", &["head", "head of", "leader"]),
    ("director", &["director", "dir"]),
    ("president", &["president", "pres"]),
    ("lead", &["lead", "leader", "leading"]),
    ("senior", &["senior", "sr", "sr."]),
    ("principal", &["principal", "prin"]),
    ("manager", &["manager", "mgr", "management"]),
    ("executive", &["executive", "exec"]),
];

fn normalize(title: &str) -> String {
    title.to_lowercase().replace(['-', '_'], " ")
}

/// Split a normalized title into its seniority level (empty when none
/// matched) and the remaining role words.
fn extract_components(title: &str) -> (String, Vec<String>) {
    let mut seniority = String::new();
    let mut role = Vec::new();
    for word in title.split_whitespace() {
        let mut found = false;
        for (level, variations) in SENIORITY_LEVELS {
            if variations.iter().any(|v| word.contains(v)) {
                seniority = (*level).to_string();
                found = true;
                break;
            }
        }
        if !found {
            role.push(word.to_string());
        }
    }
    (seniority, role)
}

/// Similarity between two job titles in [0, 1]: role-word overlap weighted
/// 0.7, seniority agreement weighted 0.3 (half credit when levels differ).
pub fn title_similarity(title1: &str, title2: &str) -> f64 {
    let t1 = normalize(title1);
    let t2 = normalize(title2);

    let (seniority1, role1) = extract_components(&t1);
    let (seniority2, role2) = extract_components(&t2);

    let words1: HashSet<&str> = role1.iter().map(String::as_str).collect();
    let words2: HashSet<&str> = role2.iter().map(String::as_str).collect();
    let denom = words1.len().max(words2.len());
    let role_similarity = if denom == 0 {
        0.0
    } else {
        words1.intersection(&words2).count() as f64 / denom as f64
    };

    let seniority_similarity = if seniority1 == seniority2 { 1.0 } else { 0.5 };

    role_similarity * 0.7 + seniority_similarity * 0.3
}

/// Best similarity of a candidate's headline against any OR-alternative of
/// the query.
fn best_similarity(candidate: &Candidate, terms: &[&str]) -> f64 {
    terms
        .iter()
        .map(|term| title_similarity(term, &candidate.headline))
        .fold(0.0_f64, f64::max)
}

/// Keep candidates whose headline scores at least `min_similarity` against
/// some query alternative. Two attempts only: when fewer than ten survive
/// the given threshold, the relaxed threshold decides instead.
pub fn filter_by_title(
    candidates: &[Candidate],
    search_query: &str,
    min_similarity: f64,
) -> Vec<Candidate> {
    let terms: Vec<&str> = search_query.split(OR_SEPARATOR).collect();

    let retained: Vec<Candidate> = candidates
        .iter()
        .filter(|c| best_similarity(c, &terms) >= min_similarity)
        .cloned()
        .collect();

    if retained.len() < RELAX_BELOW && min_similarity > RELAXED_MIN_SIMILARITY {
        info!(
            "Only {} candidates passed at {:.1}; retrying once at {:.1}",
            retained.len(),
            min_similarity,
            RELAXED_MIN_SIMILARITY
        );
        return candidates
            .iter()
            .filter(|c| best_similarity(c, &terms) >= RELAXED_MIN_SIMILARITY)
            .cloned()
            .collect();
    }

    retained
}
