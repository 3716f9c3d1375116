use std::fmt;

use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADLINE: &str = "Sales Professional";
pub const DEFAULT_LOCATION: &str = "United States";
pub const FALLBACK_PROFILE_URL: &str = "https://www.linkedin.com/sales/";
const HOST_ROOT: &str = "https://www.linkedin.com";

// Card container alternatives across layout versions of both search
// surfaces. First selector that matches anything wins.
const CARD_SELECTORS: &[&str] = &[
    r#"div[data-x-search-result="LEAD"]"#,
    "ol.search-results__result-list > li",
    "li.search-results__result-item",
    "div.search-results__result-container",
    "li.reusable-search__result-container",
    "div.entity-result__item",
    "div.artdeco-list__item",
];

const NAME_SELECTORS: &[&str] = &[
    r#"a[data-anonymize="person-name"]"#,
    ".artdeco-entity-lockup__title a",
    ".artdeco-entity-lockup__title span",
    r#"a[data-control-name="view_lead_panel_via_search_lead_name"]"#,
    r#"span[data-anonymize="person-name"]"#,
    r#".entity-result__title-text a span[aria-hidden="true"]"#,
];

const HEADLINE_SELECTORS: &[&str] = &[
    r#"span[data-anonymize="title"]"#,
    ".artdeco-entity-lockup__subtitle",
    ".artdeco-entity-lockup__content .artdeco-entity-lockup__subtitle",
    ".search-result__info-container .result-lockup__highlight-keyword",
    ".entity-result__primary-subtitle",
];

const LOCATION_SELECTORS: &[&str] = &[
    r#"span[data-anonymize="location"]"#,
    ".artdeco-entity-lockup__caption",
    ".artdeco-entity-lockup__content .artdeco-entity-lockup__caption",
    ".search-result__info-container .result-lockup__position-location",
    ".entity-result__secondary-subtitle",
];

const DEGREE_SELECTORS: &[&str] = &[
    ".artdeco-entity-lockup__degree",
    ".artdeco-entity-lockup__badge",
    ".search-result__social-proof-status",
    ".search-result__connection-level",
    ".result-lockup__badge-text",
    ".entity-result__badge-text span",
];

const PROFILE_LINK_SELECTORS: &[&str] = &[
    r#"a[data-anonymize="person-name"]"#,
    r#"a[data-lead-search-result^="profile-link"]"#,
    ".artdeco-entity-lockup__title a",
    r#"a[data-control-name="view_lead_panel_via_search_lead_name"]"#,
    ".entity-result__title-text a",
];

const IMAGE_SELECTORS: &[&str] = &[
    "img.artdeco-entity-lockup__image",
    ".artdeco-entity-lockup__image img",
    "img.presence-entity__image",
    ".search-result__image-wrapper img",
    ".result-lockup__icon-link img",
    r#"img[data-anonymize="person-photo"]"#,
    ".entity-result__universal-image img",
    ".ivm-image-view-model img",
];

/// Network distance between the user and a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionDegree {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd+")]
    ThirdPlus,
}

impl ConnectionDegree {
    /// 1st = 1, 2nd = 2, 3rd+ = 3. Lower is closer.
    pub fn numeric(self) -> u8 {
        match self {
            ConnectionDegree::First => 1,
            ConnectionDegree::Second => 2,
            ConnectionDegree::ThirdPlus => 3,
        }
    }

    /// Parse free badge text. Unrecognized markers normalize to 3rd+.
    pub fn parse_badge(text: &str) -> Self {
        if text.contains("1st") {
            ConnectionDegree::First
        } else if text.contains("2nd") {
            ConnectionDegree::Second
        } else {
            ConnectionDegree::ThirdPlus
        }
    }
}

impl fmt::Display for ConnectionDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionDegree::First => "1st",
            ConnectionDegree::Second => "2nd",
            ConnectionDegree::ThirdPlus => "3rd+",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualConnection {
    pub name: String,
    pub in_network: bool,
    pub trust_score: i64,
}

/// A discovered profile. `name` is the dedup identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub headline: String,
    pub location: String,
    pub connection_degree: ConnectionDegree,
    pub profile_url: String,
    pub profile_image: String,
    pub mutual_connections: Vec<MutualConnection>,
    pub network_linked: bool,
}

/// Placeholder avatar keyed by index parity (odd = women, even = men).
pub fn placeholder_avatar(index: usize) -> String {
    let gender = if index % 2 == 1 { "women" } else { "men" };
    format!(
        "https://randomuser.me/api/portraits/{}/{}.jpg",
        gender,
        (index % 10) + 20
    )
}

pub struct Extractor {
    name_pattern: Regex,
    headline_pattern: Regex,
    location_pattern: Regex,
    image_pattern: Regex,
    lead_id_pattern: Regex,
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            // Attribute markers survive layout reshuffles that break the
            // structural selectors, so the fallback tier keys on them.
            name_pattern: Regex::new(r#"<a [^>]*data-anonymize="person-name"[^>]*>([^<]+)</a>"#)
                .unwrap(),
            headline_pattern: Regex::new(r#"<span [^>]*data-anonymize="title"[^>]*>([^<]+)</span>"#)
                .unwrap(),
            location_pattern: Regex::new(
                r#"<span [^>]*data-anonymize="location"[^>]*>([^<]+)</span>"#,
            )
            .unwrap(),
            image_pattern: Regex::new(
                r#"<img [^>]*src="([^"]+)"[^>]*data-anonymize="person-photo"[^>]*>"#,
            )
            .unwrap(),
            lead_id_pattern: Regex::new(r"lead/([^,?]+)").unwrap(),
        }
    }

    /// Extract candidates from a rendered result page. Tries the card
    /// selector cascade first, then falls back to pattern extraction over
    /// the raw markup.
    pub fn extract(&self, html: &str, quota: usize) -> Vec<Candidate> {
        let document = Html::parse_document(html);

        let mut cards = Vec::new();
        let mut used_selector = None;
        for sel_str in CARD_SELECTORS {
            let selector = match Selector::parse(sel_str) {
                Ok(s) => s,
                Err(_) => continue,
            };
            let matched: Vec<ElementRef> = document.select(&selector).collect();
            if !matched.is_empty() {
                cards = matched;
                used_selector = Some(*sel_str);
                break;
            }
        }

        if cards.is_empty() {
            debug!("No card selector matched, falling back to pattern extraction");
            return self.extract_from_markup(html, quota);
        }
        info!(
            "Found {} potential lead cards using selector: {}",
            cards.len(),
            used_selector.unwrap_or_default()
        );

        let mut candidates = Vec::new();
        for (i, card) in cards.iter().take(quota).enumerate() {
            let name = first_text(*card, NAME_SELECTORS)
                .unwrap_or_else(|| format!("Profile #{}", i + 1));
            let headline = first_text(*card, HEADLINE_SELECTORS)
                .unwrap_or_else(|| DEFAULT_HEADLINE.to_string());
            let location = first_text(*card, LOCATION_SELECTORS)
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

            // Missing badge element defaults to 2nd; present-but-foreign
            // badge text normalizes to 3rd+.
            let connection_degree = match first_text(*card, DEGREE_SELECTORS) {
                Some(badge) => ConnectionDegree::parse_badge(&badge),
                None => ConnectionDegree::Second,
            };

            let profile_url = self.resolve_profile_url(*card);
            let profile_image = resolve_profile_image(*card, i);

            debug!("Extracted profile: {} ({})", name, connection_degree);
            candidates.push(Candidate {
                name,
                headline,
                location,
                connection_degree,
                profile_url,
                profile_image,
                mutual_connections: Vec::new(),
                network_linked: false,
            });
        }
        candidates
    }

    /// Pattern tier: one candidate per matched name, capped at the quota.
    fn extract_from_markup(&self, html: &str, quota: usize) -> Vec<Candidate> {
        let names: Vec<String> = self
            .name_pattern
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect();
        let headlines: Vec<String> = self
            .headline_pattern
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect();
        let locations: Vec<String> = self
            .location_pattern
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect();
        let images: Vec<String> = self
            .image_pattern
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        if names.is_empty() {
            warn!("Pattern extraction found no names in page markup");
            return Vec::new();
        }
        info!(
            "Pattern extraction found {} names, {} headlines, {} locations, {} images",
            names.len(),
            headlines.len(),
            locations.len(),
            images.len()
        );

        let count = names.len().min(quota);
        (0..count)
            .map(|i| Candidate {
                name: names[i].clone(),
                headline: headlines
                    .get(i)
                    .cloned()
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| DEFAULT_HEADLINE.to_string()),
                location: locations
                    .get(i)
                    .cloned()
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
                connection_degree: ConnectionDegree::Second,
                profile_url: FALLBACK_PROFILE_URL.to_string(),
                profile_image: images
                    .get(i)
                    .cloned()
                    .filter(|src| !src.is_empty())
                    .unwrap_or_else(|| placeholder_avatar(i)),
                mutual_connections: Vec::new(),
                network_linked: false,
            })
            .collect()
    }

    /// Profile URL cascade: direct host link, lead-id construction, any
    /// recognized profile-path link, then the generic fallback.
    fn resolve_profile_url(&self, card: ElementRef) -> String {
        for sel_str in PROFILE_LINK_SELECTORS {
            let selector = match Selector::parse(sel_str) {
                Ok(s) => s,
                Err(_) => continue,
            };
            if let Some(link) = card.select(&selector).next() {
                if let Some(href) = link.value().attr("href") {
                    if href.contains("linkedin.com") {
                        return normalize_url(href);
                    }
                }
            }
        }

        let anchor_selector = Selector::parse("a").unwrap();

        // Lead id from a data attribute or a link path segment.
        let mut lead_id: Option<String> = None;
        if let Ok(selector) = Selector::parse("[data-lead-id]") {
            if let Some(el) = card.select(&selector).next() {
                lead_id = el
                    .value()
                    .attr("data-lead-id")
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
            }
        }
        if lead_id.is_none() {
            for link in card.select(&anchor_selector) {
                if let Some(href) = link.value().attr("href") {
                    if let Some(caps) = self.lead_id_pattern.captures(href) {
                        lead_id = Some(caps[1].to_string());
                        break;
                    }
                }
            }
        }
        if let Some(id) = lead_id {
            debug!("Constructed profile URL from lead id: {}", id);
            return format!("{}/sales/lead/{}", HOST_ROOT, id);
        }

        // Any link in the card with a recognized profile path.
        for link in card.select(&anchor_selector) {
            if let Some(href) = link.value().attr("href") {
                if href.contains("linkedin.com/in/") || href.contains("linkedin.com/sales/lead/") {
                    return normalize_url(href);
                }
            }
        }

        FALLBACK_PROFILE_URL.to_string()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new()
    }
}

fn normalize_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", HOST_ROOT, href)
    }
}

fn resolve_profile_image(card: ElementRef, index: usize) -> String {
    for sel_str in IMAGE_SELECTORS {
        let selector = match Selector::parse(sel_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(img) = card.select(&selector).next() {
            if let Some(src) = img.value().attr("src") {
                let src = src.trim();
                if !src.is_empty() && !src.ends_with("ghost_person.png") {
                    return src.to_string();
                }
            }
        }
    }
    placeholder_avatar(index)
}

/// First field-selector alternative yielding non-empty text.
fn first_text(card: ElementRef, selectors: &[&str]) -> Option<String> {
    for sel_str in selectors {
        let selector = match Selector::parse(sel_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = card.select(&selector).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}
