pub mod config;
pub mod delay_manager;
pub mod extractor;
pub mod filter;
pub mod logger;
pub mod pagination;
pub mod ranker;
pub mod sample;
pub mod scraper;
pub mod session_store;
pub mod trusted_network;

// Exporting types for convenience
pub use config::ScraperConfig;
pub use extractor::{Candidate, ConnectionDegree, Extractor, MutualConnection};
pub use scraper::{Scraper, SearchRequest};
pub use trusted_network::{ImportError, TrustedContact, TrustedNetworkStore};
