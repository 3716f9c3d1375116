use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use reqwest::blocking::{Client, Response};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, SET_COOKIE, USER_AGENT};
use thiserror::Error;
use url::Url;

use crate::config::ScraperConfig;
use crate::delay_manager;
use crate::extractor::{Candidate, Extractor};
use crate::filter;
use crate::pagination::Paginator;
use crate::ranker;
use crate::sample;
use crate::session_store::{SessionStore, StoredCookie};
use crate::trusted_network::TrustedContact;

const HOST_ROOT: &str = "https://www.linkedin.com";
const SALES_HOME_URL: &str = "https://www.linkedin.com/sales/home";
const SALES_SEARCH_URL: &str = "https://www.linkedin.com/sales/search/people";
const LOGIN_URL: &str = "https://www.linkedin.com/sales/login";
const LOGIN_SUBMIT_URL: &str = "https://www.linkedin.com/uas/login-submit";
const PEOPLE_SEARCH_URL: &str = "https://www.linkedin.com/search/results/people/";

// URL markers of the authentication boundary.
const AUTH_MARKERS: &[&str] = &["login", "checkpoint", "signup"];

// Company-headcount buckets mapped onto the search surface's facet codes.
const COMPANY_SIZE_CODES: &[(&str, &str)] = &[
    ("self-employed", "A"),
    ("1-10", "B"),
    ("11-50", "C"),
    ("51-200", "D"),
    ("201-500", "E"),
    ("501-1000", "F"),
];

/// Ephemeral parameters for one search pass.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub quota: usize,
    pub location: Option<String>,
    pub company_size: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("authentication rejected, landed on {0}")]
    AuthRejected(String),
}

#[derive(Debug, Error)]
pub enum FacetError {
    #[error("empty location value")]
    EmptyLocation,
    #[error("unrecognized company-size bucket '{0}'")]
    UnknownBucket(String),
}

pub struct Scraper {
    client: Client,
    jar: Arc<Jar>,
    extractor: Extractor,
    paginator: Paginator,
    session: SessionStore,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .build()
            .expect("Failed to build HTTP client");

        let session = SessionStore::new(&config.data_dir, &config.session_file);

        Scraper {
            client,
            jar,
            extractor: Extractor::new(),
            paginator: Paginator::new(),
            session,
            config,
        }
    }

    /// Run one full search pass. Never fails: on unrecoverable trouble the
    /// result degrades to ranked sample candidates, so the caller always
    /// has something to review.
    pub fn search(
        &self,
        request: &SearchRequest,
        trusted_network: &[TrustedContact],
    ) -> Vec<Candidate> {
        info!(
            "Starting lead search for '{}' (quota {})",
            request.query, request.quota
        );

        let restored = self.restore_session();
        info!("Persisted session restored: {}", restored);

        if let Err(e) = self.ensure_authenticated() {
            error!("Authentication failed: {}", e);
            warn!("Falling back to sample candidates");
            return self.finalize(sample::sample_candidates(self.config.sample_size), request, trusted_network);
        }

        // Primary surface first; the general surface only runs when the
        // advanced search contributed nothing at all.
        let mut collected = self.run_primary_search(request);
        if collected.is_empty() {
            warn!("Advanced search yielded no candidates. Trying the general surface...");
            collected = self.run_secondary_search(request);
        }

        let filtered = filter::filter_by_title(
            &collected,
            &request.query,
            filter::PRIMARY_MIN_SIMILARITY,
        );
        info!(
            "{} of {} candidates survived title filtering",
            filtered.len(),
            collected.len()
        );

        let pool = if filtered.is_empty() {
            warn!("No candidates with matching titles; falling back to sample candidates");
            sample::sample_candidates(self.config.sample_size)
        } else {
            filtered
        };

        self.finalize(pool, request, trusted_network)
    }

    /// Dedup and rank, truncate to the quota, persist the terminal set.
    fn finalize(
        &self,
        pool: Vec<Candidate>,
        request: &SearchRequest,
        trusted_network: &[TrustedContact],
    ) -> Vec<Candidate> {
        let mut ranked = ranker::rank(pool, trusted_network);
        ranked.truncate(request.quota);
        self.persist_results(&ranked);
        info!("Search finished with {} ranked candidates", ranked.len());
        ranked
    }

    /// Seed the cookie jar from the persisted session, if any.
    fn restore_session(&self) -> bool {
        let cookies = match self.session.load() {
            Some(cookies) if !cookies.is_empty() => cookies,
            _ => return false,
        };
        let host = match Url::parse(HOST_ROOT) {
            Ok(u) => u,
            Err(_) => return false,
        };
        for cookie in &cookies {
            let header = format!(
                "{}={}; Domain={}; Path=/",
                cookie.name, cookie.value, cookie.domain
            );
            self.jar.add_cookie_str(&header, &host);
        }
        true
    }

    /// Land on the home surface; when it bounces to the authentication
    /// boundary, log in and overwrite the persisted session wholesale.
    fn ensure_authenticated(&self) -> Result<(), SessionError> {
        let (_, landing_url) = self.visit_page(SALES_HOME_URL)?;
        if !on_auth_boundary(&landing_url) {
            return Ok(());
        }
        info!("Authentication boundary detected, attempting to login");

        let captured = self.perform_login()?;
        self.session.save(&captured);

        let (_, home_url) = self.visit_page(SALES_HOME_URL)?;
        if on_auth_boundary(&home_url) {
            return Err(SessionError::AuthRejected(home_url));
        }
        info!("Login successful");
        Ok(())
    }

    /// Submit credentials; success is the absence of authentication-boundary
    /// markers in the post-submission URL. Returns the captured cookie set.
    fn perform_login(&self) -> Result<Vec<StoredCookie>, SessionError> {
        let mut captured = Vec::new();

        let landing = self
            .client
            .get(LOGIN_URL)
            .header(USER_AGENT, self.random_user_agent())
            .send()?;
        capture_cookies(&landing, &mut captured);
        let _ = landing.text();

        let form = [
            ("session_key", self.config.email.as_str()),
            ("session_password", self.config.password.as_str()),
        ];
        let response = self
            .client
            .post(LOGIN_SUBMIT_URL)
            .header(USER_AGENT, self.random_user_agent())
            .form(&form)
            .send()?;
        capture_cookies(&response, &mut captured);

        let final_url = response.url().to_string();
        if on_auth_boundary(&final_url) {
            return Err(SessionError::AuthRejected(final_url));
        }
        Ok(captured)
    }

    /// Advanced surface: faceted search URL, then the extract/advance loop
    /// up to the page ceiling.
    fn run_primary_search(&self, request: &SearchRequest) -> Vec<Candidate> {
        let mut url = self.build_primary_url(request);
        let mut collected: Vec<Candidate> = Vec::new();

        for page_num in 1..=self.config.max_pages {
            info!("Processing advanced-search page {}", page_num);
            if page_num > 1 {
                delay_manager::random_page_delay();
            }
            delay_manager::settle(
                self.config.primary_settle_passes,
                self.config.settle_pass_secs,
            );

            let (html, final_url) = match self.visit_page(&url) {
                Ok(page) => page,
                Err(e) => {
                    // One failed page contributes nothing; keep paging.
                    warn!("Failed to fetch page {}: {}", page_num, e);
                    match self.paginator.next_url(&url, "") {
                        Some(next) => {
                            url = next;
                            continue;
                        }
                        None => break,
                    }
                }
            };
            if on_auth_boundary(&final_url) {
                warn!("Session expired mid-search at {}", final_url);
                break;
            }

            let page_candidates = self.extractor.extract(&html, request.quota);
            info!(
                "Found {} candidates on page {}",
                page_candidates.len(),
                page_num
            );
            collected.extend(page_candidates);

            if collected.len() >= request.quota {
                info!(
                    "Collected {} candidates, which is enough (target: {})",
                    collected.len(),
                    request.quota
                );
                break;
            }
            match self.paginator.next_url(&final_url, &html) {
                Some(next) => url = next,
                None => {
                    info!("No further result pages, stopping pagination");
                    break;
                }
            }
        }
        collected
    }

    /// General surface: keyword search driven purely by URL page numbers.
    fn run_secondary_search(&self, request: &SearchRequest) -> Vec<Candidate> {
        let encoded = urlencoding::encode(&request.query).into_owned();
        let mut collected: Vec<Candidate> = Vec::new();

        for page_num in 1..=self.config.max_pages {
            let url = format!("{}?keywords={}&page={}", PEOPLE_SEARCH_URL, encoded, page_num);
            if page_num > 1 {
                delay_manager::random_page_delay();
            }
            delay_manager::settle(
                self.config.secondary_settle_passes,
                self.config.settle_pass_secs,
            );

            let (html, final_url) = match self.visit_page(&url) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to fetch general page {}: {}", page_num, e);
                    continue;
                }
            };
            if on_auth_boundary(&final_url) {
                warn!("Session expired mid-search at {}", final_url);
                break;
            }

            let page_candidates = self.extractor.extract(&html, request.quota);
            if page_candidates.is_empty() {
                info!("No profile cards on general page {}, trying next", page_num);
                continue;
            }
            collected.extend(page_candidates);
            if collected.len() >= request.quota {
                break;
            }
        }
        collected
    }

    /// Query URL for the advanced surface with best-effort facets: a facet
    /// that cannot be applied is logged and skipped, never fatal.
    fn build_primary_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}?keywords={}",
            SALES_SEARCH_URL,
            urlencoding::encode(&request.query)
        );

        if let Some(location) = &request.location {
            match apply_geography_facet(&mut url, location) {
                Ok(()) => info!("Applied geography facet for {}", location),
                Err(e) => warn!("Geography facet skipped: {}", e),
            }
        }
        if let Some(company_size) = &request.company_size {
            match apply_company_size_facet(&mut url, company_size) {
                Ok(()) => info!("Applied company size facet: {}", company_size),
                Err(e) => warn!("Company size facet skipped: {}", e),
            }
        }
        url
    }

    fn visit_page(&self, url: &str) -> Result<(String, String), SessionError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.random_user_agent())
            .send()?;
        let final_url = response.url().to_string();
        let text = response.text()?;
        Ok((text, final_url))
    }

    fn random_user_agent(&self) -> &'static str {
        let agents = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:122.0) Gecko/20100101 Firefox/122.0",
        ];
        use rand::Rng;
        let mut rng = rand::thread_rng();
        agents[rng.gen_range(0..agents.len())]
    }

    /// Persist the terminal ranked set; failures are logged, never raised.
    fn persist_results(&self, ranked: &[Candidate]) {
        if let Err(e) = std::fs::create_dir_all(&self.config.data_dir) {
            error!("Failed to create data directory: {}", e);
            return;
        }
        let path = self.config.data_dir.join("profiles.json");
        match serde_json::to_string_pretty(ranked) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    error!("Failed to write {:?}: {}", path, e);
                }
            }
            Err(e) => error!("Failed to serialize ranked candidates: {}", e),
        }
    }
}

fn on_auth_boundary(url: &str) -> bool {
    let lowered = url.to_lowercase();
    AUTH_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn capture_cookies(response: &Response, sink: &mut Vec<StoredCookie>) {
    for value in response.headers().get_all(SET_COOKIE) {
        let raw = match value.to_str() {
            Ok(r) => r,
            Err(_) => continue,
        };
        let pair = match raw.split(';').next() {
            Some(p) => p,
            None => continue,
        };
        let (name, cookie_value) = match pair.split_once('=') {
            Some(parts) => parts,
            None => continue,
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        sink.retain(|c| c.name != name);
        sink.push(StoredCookie {
            name: name.to_string(),
            value: cookie_value.trim().trim_matches('"').to_string(),
            domain: ".linkedin.com".to_string(),
        });
    }
}

fn apply_geography_facet(url: &mut String, location: &str) -> Result<(), FacetError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(FacetError::EmptyLocation);
    }
    url.push_str("&geography=");
    url.push_str(&urlencoding::encode(trimmed));
    Ok(())
}

fn apply_company_size_facet(url: &mut String, bucket: &str) -> Result<(), FacetError> {
    let wanted = bucket.trim().to_lowercase();
    match COMPANY_SIZE_CODES.iter().find(|(label, _)| *label == wanted) {
        Some((_, code)) => {
            url.push_str("&companySize=");
            url.push_str(code);
            Ok(())
        }
        None => Err(FacetError::UnknownBucket(bucket.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_boundary_markers() {
        assert!(on_auth_boundary("https://www.linkedin.com/sales/LOGIN?x=1"));
        assert!(on_auth_boundary("https://www.linkedin.com/checkpoint/challenge"));
        assert!(on_auth_boundary("https://www.linkedin.com/signup"));
        assert!(!on_auth_boundary("https://www.linkedin.com/sales/search/people?keywords=vp"));
    }

    #[test]
    fn geography_facet_appends_encoded_location() {
        let mut url = "https://example.com/search?keywords=vp".to_string();
        apply_geography_facet(&mut url, "New York").unwrap();
        assert!(url.ends_with("&geography=New%20York"));
    }

    #[test]
    fn blank_geography_is_an_error() {
        let mut url = String::from("base");
        assert!(matches!(
            apply_geography_facet(&mut url, "  "),
            Err(FacetError::EmptyLocation)
        ));
        assert_eq!(url, "base");
    }

    #[test]
    fn company_size_maps_to_facet_codes() {
        let mut url = String::new();
        apply_company_size_facet(&mut url, "51-200").unwrap();
        assert_eq!(url, "&companySize=D");

        let mut url = String::new();
        apply_company_size_facet(&mut url, "Self-Employed").unwrap();
        assert_eq!(url, "&companySize=A");
    }

    #[test]
    fn unknown_company_size_is_an_error() {
        let mut url = String::new();
        assert!(matches!(
            apply_company_size_facet(&mut url, "10000+"),
            Err(FacetError::UnknownBucket(_))
        ));
    }

    #[test]
    fn primary_url_carries_query_and_facets() {
        let scraper = Scraper::new(ScraperConfig::default());
        let request = SearchRequest {
            query: "VP Sales OR Head of Sales".to_string(),
            quota: 25,
            location: Some("Texas".to_string()),
            company_size: Some("11-50".to_string()),
        };
        let url = scraper.build_primary_url(&request);
        assert!(url.starts_with(SALES_SEARCH_URL));
        assert!(url.contains("keywords=VP%20Sales%20OR%20Head%20of%20Sales"));
        assert!(url.contains("&geography=Texas"));
        assert!(url.contains("&companySize=C"));
    }
}
