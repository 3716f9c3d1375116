use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};

// Next-button alternatives across pagination layout versions.
const NEXT_BUTTON_SELECTORS: &[&str] = &[
    "button.artdeco-pagination__button--next",
    "li.artdeco-pagination__button--next button",
    r#"button[aria-label="Next"]"#,
    ".search-results__pagination-next-button",
    ".artdeco-pagination__button--next",
];

const INDICATOR_SELECTOR: &str = "li.artdeco-pagination__indicator";
const ACTIVE_INDICATOR_SELECTOR: &str = ".artdeco-pagination__indicator--number.active, .selected";

/// Resolves the URL of the next result page from the current URL and the
/// fetched markup. Page advancement itself happens through URL page
/// parameters; the markup is consulted only to decide whether a further
/// page exists.
pub struct Paginator {
    page_pattern: Regex,
}

impl Paginator {
    pub fn new() -> Self {
        Paginator {
            page_pattern: Regex::new(r"page=(\d+)").unwrap(),
        }
    }

    /// Returns the next page URL, or None when the current page is the
    /// last one.
    pub fn next_url(&self, current_url: &str, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        // A disabled next button means the last page was reached.
        for sel_str in NEXT_BUTTON_SELECTORS {
            let selector = match Selector::parse(sel_str) {
                Ok(s) => s,
                Err(_) => continue,
            };
            if let Some(button) = document.select(&selector).next() {
                if button.value().attr("disabled").is_some() {
                    info!("Next page button is disabled, reached last page");
                    return None;
                }
                break;
            }
        }

        // Pagination indicators: when the active page is the highest one
        // listed, there is nowhere further to go.
        if let (Ok(indicator_sel), Ok(active_sel)) = (
            Selector::parse(INDICATOR_SELECTOR),
            Selector::parse(ACTIVE_INDICATOR_SELECTOR),
        ) {
            let mut current_page = None;
            let mut highest_listed = 0usize;
            for indicator in document.select(&indicator_sel) {
                let text = indicator.text().collect::<String>();
                let number = match text.trim().parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => continue,
                };
                highest_listed = highest_listed.max(number);
                if indicator.select(&active_sel).next().is_some() {
                    current_page = Some(number);
                }
            }
            if let Some(current) = current_page {
                if current >= highest_listed {
                    info!("Page {} is the last listed page", current);
                    return None;
                }
            }
        }

        // Advance via the page parameter, adding one when absent.
        let next = if let Some(caps) = self.page_pattern.captures(current_url) {
            let current: usize = caps[1].parse().ok()?;
            self.page_pattern
                .replace(current_url, format!("page={}", current + 1).as_str())
                .into_owned()
        } else if current_url.contains('?') {
            format!("{}&page=2", current_url)
        } else {
            format!("{}?page=2", current_url)
        };
        debug!("Next page URL: {}", next);
        Some(next)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Paginator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_page_parameter() {
        let paginator = Paginator::new();
        let next = paginator
            .next_url("https://example.com/search?keywords=vp&page=3", "<html></html>")
            .unwrap();
        assert_eq!(next, "https://example.com/search?keywords=vp&page=4");
    }

    #[test]
    fn appends_page_parameter_when_absent() {
        let paginator = Paginator::new();
        assert_eq!(
            paginator
                .next_url("https://example.com/search?keywords=vp", "<html></html>")
                .unwrap(),
            "https://example.com/search?keywords=vp&page=2"
        );
        assert_eq!(
            paginator
                .next_url("https://example.com/search", "<html></html>")
                .unwrap(),
            "https://example.com/search?page=2"
        );
    }

    #[test]
    fn disabled_next_button_ends_pagination() {
        let html = r#"<button class="artdeco-pagination__button--next" disabled>Next</button>"#;
        let paginator = Paginator::new();
        assert!(paginator
            .next_url("https://example.com/search?page=2", html)
            .is_none());
    }

    #[test]
    fn enabled_next_button_keeps_paging() {
        let html = r#"<button class="artdeco-pagination__button--next">Next</button>"#;
        let paginator = Paginator::new();
        assert_eq!(
            paginator
                .next_url("https://example.com/search?page=2", html)
                .unwrap(),
            "https://example.com/search?page=3"
        );
    }

    #[test]
    fn last_listed_indicator_ends_pagination() {
        let html = r#"
            <ul>
                <li class="artdeco-pagination__indicator"><a><span>1</span></a></li>
                <li class="artdeco-pagination__indicator">
                    <a><span class="artdeco-pagination__indicator--number active">2</span></a>
                </li>
            </ul>
        "#;
        let paginator = Paginator::new();
        assert!(paginator
            .next_url("https://example.com/search?page=2", html)
            .is_none());
    }

    #[test]
    fn mid_list_indicator_keeps_paging() {
        let html = r#"
            <ul>
                <li class="artdeco-pagination__indicator">
                    <a><span class="artdeco-pagination__indicator--number active">2</span></a>
                </li>
                <li class="artdeco-pagination__indicator"><a><span>3</span></a></li>
            </ul>
        "#;
        let paginator = Paginator::new();
        assert_eq!(
            paginator
                .next_url("https://example.com/search?page=2", html)
                .unwrap(),
            "https://example.com/search?page=3"
        );
    }
}
