use std::path::PathBuf;

/// Explicit configuration for one scraper instance. Credentials and paths
/// are injected by the caller; core logic never reads the environment.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub email: String,
    pub password: String,
    pub data_dir: PathBuf,
    pub session_file: String,
    /// Hard ceiling on result pages per search surface.
    pub max_pages: usize,
    /// Settle passes before snapshotting an advanced-search page.
    pub primary_settle_passes: u32,
    /// Settle passes before snapshotting a general-search page.
    pub secondary_settle_passes: u32,
    pub settle_pass_secs: u64,
    pub request_timeout_secs: u64,
    /// Number of synthetic candidates produced by the fallback generator.
    pub sample_size: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            email: String::new(),
            password: String::new(),
            data_dir: PathBuf::from("data"),
            session_file: "cookies.json".to_string(),
            max_pages: 10,
            primary_settle_passes: 5,
            secondary_settle_passes: 3,
            settle_pass_secs: 2,
            request_timeout_secs: 30,
            sample_size: 12,
        }
    }
}
