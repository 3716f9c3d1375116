use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const NETWORK_FILE: &str = "trusted_network.json";
const DEFAULT_TRUST_SCORE: i64 = 5;

fn default_trust_score() -> i64 {
    DEFAULT_TRUST_SCORE
}

/// An entry in the user's trust network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedContact {
    pub name: String,
    #[serde(default = "default_trust_score")]
    pub trust_score: i64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("file must contain a column with names (e.g. 'name', 'contact', 'full name')")]
    MissingNameColumn,
    #[error("unable to determine the delimiter; use comma, semicolon or tab separated values")]
    UnknownFormat,
    #[error("no valid contacts found in the file")]
    NoContacts,
    #[error("could not read workbook: {0}")]
    Workbook(String),
}

/// Reads and replaces the trust network wholesale; there is no
/// incremental merge.
pub struct TrustedNetworkStore {
    path: PathBuf,
}

impl TrustedNetworkStore {
    pub fn new(data_dir: &Path) -> Self {
        TrustedNetworkStore {
            path: data_dir.join(NETWORK_FILE),
        }
    }

    pub fn load(&self) -> Vec<TrustedContact> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<Vec<TrustedContact>>(&content) {
            Ok(contacts) => contacts,
            Err(e) => {
                error!("Failed to parse trusted network file: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, contacts: &[TrustedContact]) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Failed to create data directory: {}", e);
                return;
            }
        }
        let json = match serde_json::to_string_pretty(&contacts) {
            Ok(j) => j,
            Err(e) => {
                error!("Failed to serialize trusted network: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            error!("Failed to write trusted network file: {}", e);
        }
    }

    pub fn clear(&self) {
        self.save(&[]);
    }
}

struct ColumnLayout {
    name: usize,
    trust: Option<usize>,
    notes: Option<usize>,
}

fn detect_columns<'a, I>(headers: I) -> Option<ColumnLayout>
where
    I: Iterator<Item = &'a str>,
{
    let lowered: Vec<String> = headers.map(|h| h.trim().to_lowercase()).collect();

    let name = lowered.iter().position(|h| {
        matches!(h.as_str(), "name" | "contact" | "contact name" | "full name")
    })?;
    let trust = lowered
        .iter()
        .position(|h| h.contains("trust") || h.contains("score") || h.contains("rating"));
    let notes = lowered
        .iter()
        .position(|h| h.contains("note") || h.contains("comment") || h.contains("description"));

    Some(ColumnLayout { name, trust, notes })
}

/// Coerce a raw score cell into 1..=10, defaulting when unparseable.
fn coerce_trust_score(raw: &str) -> i64 {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return DEFAULT_TRUST_SCORE;
    }
    match cleaned.parse::<f64>() {
        Ok(value) => (value as i64).clamp(1, 10),
        Err(_) => DEFAULT_TRUST_SCORE,
    }
}

fn contact_from_row(row: &[String], layout: &ColumnLayout) -> Option<TrustedContact> {
    let name = row.get(layout.name)?.trim();
    if name.is_empty() {
        return None;
    }
    let trust_score = layout
        .trust
        .and_then(|i| row.get(i))
        .map(|v| coerce_trust_score(v))
        .unwrap_or(DEFAULT_TRUST_SCORE);
    let notes = layout
        .notes
        .and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    Some(TrustedContact {
        name: name.to_string(),
        trust_score,
        notes,
    })
}

/// Import trusted contacts from a CSV or Excel file. The name column is
/// required; trust-score and notes columns are matched loosely.
pub fn import_contacts(path: &Path) -> Result<Vec<TrustedContact>, ImportError> {
    let is_excel = path
        .extension()
        .map_or(false, |ext| ext == "xlsx" || ext == "xls");
    if is_excel {
        import_excel(path)
    } else {
        import_csv(path)
    }
}

fn import_csv(path: &Path) -> Result<Vec<TrustedContact>, ImportError> {
    const DELIMITERS: &[u8] = &[b',', b';', b'\t'];

    let mut headers_seen = false;
    for &delimiter in DELIMITERS {
        let file = File::open(path).map_err(|e| ImportError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);

        let headers = match reader.headers() {
            Ok(h) => h.clone(),
            Err(_) => continue,
        };
        headers_seen = true;

        let layout = match detect_columns(headers.iter()) {
            Some(layout) => layout,
            None => continue,
        };

        let mut contacts = Vec::new();
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    error!("Skipping malformed row: {}", e);
                    continue;
                }
            };
            let row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            if let Some(contact) = contact_from_row(&row, &layout) {
                contacts.push(contact);
            }
        }

        if contacts.is_empty() {
            return Err(ImportError::NoContacts);
        }
        info!("Imported {} trusted contacts from {:?}", contacts.len(), path);
        return Ok(contacts);
    }

    if headers_seen {
        Err(ImportError::MissingNameColumn)
    } else {
        Err(ImportError::UnknownFormat)
    }
}

fn import_excel(path: &Path) -> Result<Vec<TrustedContact>, ImportError> {
    let mut workbook: Xlsx<std::io::BufReader<File>> =
        open_workbook(path).map_err(|e: calamine::XlsxError| ImportError::Workbook(e.to_string()))?;

    let worksheets = workbook.worksheets();
    let (_name, range) = worksheets
        .first()
        .ok_or_else(|| ImportError::Workbook("workbook has no sheets".to_string()))?;

    let mut layout: Option<ColumnLayout> = None;
    let mut contacts = Vec::new();
    for (row_idx, row) in range.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        if row_idx == 0 {
            layout = detect_columns(cells.iter().map(String::as_str));
            if layout.is_none() {
                return Err(ImportError::MissingNameColumn);
            }
            continue;
        }
        if let Some(layout) = &layout {
            if let Some(contact) = contact_from_row(&cells, layout) {
                contacts.push(contact);
            }
        }
    }

    if contacts.is_empty() {
        return Err(ImportError::NoContacts);
    }
    info!("Imported {} trusted contacts from {:?}", contacts.len(), path);
    Ok(contacts)
}
