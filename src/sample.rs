use log::warn;

use crate::extractor::{placeholder_avatar, Candidate, ConnectionDegree};

// Fixed pools; candidates cycle through them by position.
const COMPANIES: &[&str] = &[
    "Salesforce", "Microsoft", "Oracle", "HubSpot", "Adobe", "IBM", "SAP", "Zoom", "Slack",
    "Dell", "Google", "Amazon",
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Boston, MA",
    "Chicago, IL",
    "London, England, United Kingdom",
    "Austin, TX",
    "Toronto, ON, Canada",
    "Seattle, WA",
    "Denver, CO",
    "Atlanta, GA",
    "Los Angeles, CA",
    "Dallas, TX",
];

const FIRST_NAMES: &[&str] = &[
    "John", "Michael", "Sarah", "David", "Jennifer", "Robert", "Lisa", "William", "Emma",
    "James", "Jessica", "Chris", "Amanda", "Daniel",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson", "Taylor",
    "Anderson", "Thomas", "Jackson", "White", "Harris",
];

const JOB_TITLES: &[&str] = &[
    "Sales Representative",
    "Account Executive",
    "BDR",
    "Business Development Representative",
    "Senior Account Executive",
    "Enterprise Account Executive",
    "Sales Manager",
    "Account Manager",
];

/// Deterministic synthetic candidates for when live extraction is
/// unavailable. Degree is 2nd except every third candidate, and every
/// fourth is pre-marked as trust-network linked.
pub fn sample_candidates(count: usize) -> Vec<Candidate> {
    warn!("Generating {} sample candidates in place of live results", count);
    (0..count)
        .map(|i| {
            let first_name = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last_name = LAST_NAMES[i % LAST_NAMES.len()];
            let job_title = JOB_TITLES[i % JOB_TITLES.len()];
            let company = COMPANIES[i % COMPANIES.len()];

            let connection_degree = if i % 3 == 0 {
                ConnectionDegree::First
            } else {
                ConnectionDegree::Second
            };

            Candidate {
                name: format!("{} {}", first_name, last_name),
                headline: format!("{} at {}", job_title, company),
                location: LOCATIONS[i % LOCATIONS.len()].to_string(),
                connection_degree,
                profile_url: format!(
                    "https://www.linkedin.com/in/{}-{}/",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                profile_image: placeholder_avatar(i),
                mutual_connections: Vec::new(),
                network_linked: i % 4 == 0,
            }
        })
        .collect()
}
