use std::cmp::Reverse;

use log::{debug, info};
use rand::Rng;

use crate::extractor::{Candidate, ConnectionDegree, MutualConnection};
use crate::trusted_network::TrustedContact;

/// At most this many mutual connections are attached per candidate.
const MAX_MUTUALS: usize = 3;

/// Merge duplicates, attach trust-network context and order the list.
/// Production entry point; randomness comes from the thread generator.
pub fn rank(candidates: Vec<Candidate>, trusted_network: &[TrustedContact]) -> Vec<Candidate> {
    rank_with_rng(candidates, trusted_network, &mut rand::thread_rng())
}

/// Same as [`rank`] with an injected random source, so callers (and tests)
/// can make the mutual-connection simulation reproducible.
pub fn rank_with_rng<R: Rng>(
    candidates: Vec<Candidate>,
    trusted_network: &[TrustedContact],
    rng: &mut R,
) -> Vec<Candidate> {
    let before = candidates.len();
    let mut merged = merge_by_name(candidates);
    if merged.len() < before {
        info!("Merged {} duplicate candidates by name", before - merged.len());
    }

    for candidate in &mut merged {
        attach_mutual_connections(candidate, trusted_network, rng);
    }

    sort_candidates(&mut merged);
    merged
}

/// Group by exact name; of duplicates keep the closest connection
/// (lowest degree number). First-seen order is preserved.
fn merge_by_name(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        match merged.iter_mut().find(|c| c.name == candidate.name) {
            Some(existing) => {
                if candidate.connection_degree.numeric() < existing.connection_degree.numeric() {
                    *existing = candidate;
                }
            }
            None => merged.push(candidate),
        }
    }
    merged
}

/// Simulate mutual connections for 2nd-degree candidates: 1..=3 distinct
/// trusted contacts, each carrying its trust score. 1st-degree candidates
/// get none; their degree already signals the direct relationship.
fn attach_mutual_connections<R: Rng>(
    candidate: &mut Candidate,
    trusted_network: &[TrustedContact],
    rng: &mut R,
) {
    candidate.mutual_connections.clear();
    candidate.network_linked = false;

    if candidate.connection_degree != ConnectionDegree::Second || trusted_network.is_empty() {
        return;
    }

    let take = rng.gen_range(1..=trusted_network.len().min(MAX_MUTUALS));
    for idx in rand::seq::index::sample(rng, trusted_network.len(), take) {
        let contact = &trusted_network[idx];
        candidate.mutual_connections.push(MutualConnection {
            name: contact.name.clone(),
            in_network: true,
            trust_score: contact.trust_score,
        });
    }

    candidate.network_linked = !candidate.mutual_connections.is_empty();
    debug!(
        "Attached {} mutual connections to {}",
        candidate.mutual_connections.len(),
        candidate.name
    );
}

/// Stable composite ordering: trust-network-linked first, closer degree
/// first, more mutual connections first.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| {
        (
            !c.network_linked,
            c.connection_degree.numeric(),
            Reverse(c.mutual_connections.len()),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(name: &str, degree: ConnectionDegree) -> Candidate {
        Candidate {
            name: name.to_string(),
            headline: "Sales Manager".to_string(),
            location: "United States".to_string(),
            connection_degree: degree,
            profile_url: String::new(),
            profile_image: String::new(),
            mutual_connections: Vec::new(),
            network_linked: false,
        }
    }

    fn contact(name: &str, score: i64) -> TrustedContact {
        TrustedContact {
            name: name.to_string(),
            trust_score: score,
            notes: String::new(),
        }
    }

    #[test]
    fn merge_leaves_no_duplicate_names() {
        let candidates = vec![
            candidate("Jane Doe", ConnectionDegree::Second),
            candidate("John Roe", ConnectionDegree::ThirdPlus),
            candidate("Jane Doe", ConnectionDegree::First),
            candidate("Jane Doe", ConnectionDegree::ThirdPlus),
        ];
        let merged = merge_by_name(candidates);
        assert_eq!(merged.len(), 2);
        let jane = merged.iter().find(|c| c.name == "Jane Doe").unwrap();
        // Of {2nd, 1st, 3rd+} the 1st-degree record wins.
        assert_eq!(jane.connection_degree, ConnectionDegree::First);
    }

    #[test]
    fn ranked_output_has_unique_names() {
        let candidates = vec![
            candidate("A", ConnectionDegree::Second),
            candidate("B", ConnectionDegree::Second),
            candidate("A", ConnectionDegree::Second),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = rank_with_rng(candidates, &[contact("T", 5)], &mut rng);
        let mut names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ranked.len());
    }

    #[test]
    fn composite_ordering() {
        let mut a = candidate("A", ConnectionDegree::Second);
        a.mutual_connections = vec![
            MutualConnection {
                name: "M1".to_string(),
                in_network: true,
                trust_score: 5,
            },
            MutualConnection {
                name: "M2".to_string(),
                in_network: true,
                trust_score: 5,
            },
        ];
        a.network_linked = false;

        let mut b = candidate("B", ConnectionDegree::Second);
        b.mutual_connections = vec![MutualConnection {
            name: "M3".to_string(),
            in_network: true,
            trust_score: 5,
        }];
        b.network_linked = true;

        let mut c = candidate("C", ConnectionDegree::First);
        c.network_linked = true;

        let mut list = vec![a, b, c];
        sort_candidates(&mut list);
        let order: Vec<&str> = list.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(order, ["C", "B", "A"]);
    }

    #[test]
    fn first_degree_gets_no_mutual_connections() {
        let network = vec![contact("T1", 8), contact("T2", 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let ranked = rank_with_rng(
            vec![candidate("First Person", ConnectionDegree::First)],
            &network,
            &mut rng,
        );
        assert!(ranked[0].mutual_connections.is_empty());
        assert!(!ranked[0].network_linked);
    }

    #[test]
    fn second_degree_gets_one_to_three_distinct_mutuals() {
        let network = vec![
            contact("T1", 8),
            contact("T2", 3),
            contact("T3", 6),
            contact("T4", 9),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ranked = rank_with_rng(
                vec![candidate("Second Person", ConnectionDegree::Second)],
                &network,
                &mut rng,
            );
            let mutuals = &ranked[0].mutual_connections;
            assert!((1..=3).contains(&mutuals.len()));
            assert!(ranked[0].network_linked);
            let mut names: Vec<&str> = mutuals.iter().map(|m| m.name.as_str()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), mutuals.len());
            // Scores come straight from the trusted contacts.
            for m in mutuals {
                let original = network.iter().find(|t| t.name == m.name).unwrap();
                assert_eq!(m.trust_score, original.trust_score);
                assert!(m.in_network);
            }
        }
    }

    #[test]
    fn empty_network_attaches_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = rank_with_rng(
            vec![candidate("Second Person", ConnectionDegree::Second)],
            &[],
            &mut rng,
        );
        assert!(ranked[0].mutual_connections.is_empty());
        assert!(!ranked[0].network_linked);
    }

    #[test]
    fn seeded_ranking_is_reproducible() {
        let network = vec![contact("T1", 8), contact("T2", 3), contact("T3", 6)];
        let candidates = vec![
            candidate("A", ConnectionDegree::Second),
            candidate("B", ConnectionDegree::Second),
        ];
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let first = rank_with_rng(candidates.clone(), &network, &mut rng1);
        let second = rank_with_rng(candidates, &network, &mut rng2);
        let summary = |list: &[Candidate]| {
            list.iter()
                .map(|c| {
                    (
                        c.name.clone(),
                        c.mutual_connections
                            .iter()
                            .map(|m| m.name.clone())
                            .collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&first), summary(&second));
    }
}
