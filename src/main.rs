use lead_scraper_lib::{logger, trusted_network};
use lead_scraper_lib::{Scraper, ScraperConfig, SearchRequest, TrustedNetworkStore};

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use chrono::Local;
use log::{error, info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting Lead Scraper...");

    let mut args = env::args().skip(1);
    let query = match args.next() {
        Some(q) => q,
        None => {
            error!("Usage: lead_scraper <query> [quota] [location] [company-size]");
            return Ok(());
        }
    };
    let quota = args.next().and_then(|v| v.parse::<usize>().ok()).unwrap_or(50);
    let location = args.next().filter(|v| !v.trim().is_empty());
    let company_size = args.next().filter(|v| !v.trim().is_empty());

    // Credentials and paths come from the environment here, never from
    // inside the core modules.
    let config = ScraperConfig {
        email: env::var("LINKEDIN_EMAIL").unwrap_or_default(),
        password: env::var("LINKEDIN_PASSWORD").unwrap_or_default(),
        data_dir: env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data")),
        ..ScraperConfig::default()
    };
    if config.email.is_empty() || config.password.is_empty() {
        warn!("LINKEDIN_EMAIL / LINKEDIN_PASSWORD not set; login will degrade to sample data");
    }

    let network_store = TrustedNetworkStore::new(&config.data_dir);
    if let Ok(import_path) = env::var("TRUSTED_NETWORK_FILE") {
        match trusted_network::import_contacts(Path::new(&import_path)) {
            Ok(contacts) => {
                info!("Imported {} trusted contacts from {}", contacts.len(), import_path);
                network_store.save(&contacts);
            }
            Err(e) => error!("Trusted network import failed: {}", e),
        }
    }
    let trusted = network_store.load();
    info!("Trusted network holds {} contacts", trusted.len());

    let request = SearchRequest {
        query,
        quota,
        location,
        company_size,
    };
    let scraper = Scraper::new(config.clone());
    let ranked = scraper.search(&request, &trusted);

    // Ranked leads as CSV next to the JSON the scraper persisted.
    let output_csv = config.data_dir.join("leads.csv");
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&output_csv)?;
    let mut csv_writer = csv::WriterBuilder::new().from_writer(file);
    csv_writer.write_record([
        "name",
        "headline",
        "location",
        "degree",
        "network_linked",
        "mutual_connections",
        "profile_url",
        "timestamp",
    ])?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    for candidate in &ranked {
        let mutuals = candidate
            .mutual_connections
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let row = vec![
            candidate.name.clone(),
            candidate.headline.clone(),
            candidate.location.clone(),
            candidate.connection_degree.to_string(),
            (if candidate.network_linked { "yes" } else { "no" }).to_string(),
            mutuals,
            candidate.profile_url.clone(),
            timestamp.clone(),
        ];
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;

    info!("Wrote {} ranked leads to {:?}", ranked.len(), output_csv);
    Ok(())
}
