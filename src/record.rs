use tracing::info;

use crate::exclude::ExclusionSet;
use crate::fofa::RawResultRow;
use crate::host;

/// One search result after scheme prefixing and exclusion classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub host: String,
    pub ip: String,
    pub port: String,
    pub title: String,
    pub domain: String,
    pub country: String,
    pub protocol: String,
    pub excluded: bool,
    pub remark: String,
}

impl NormalizedRecord {
    pub fn from_row(row: &RawResultRow, exclusions: Option<&ExclusionSet>) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();

        let protocol = text(&row.protocol);
        let host = host::with_scheme(&text(&row.host), &protocol);
        let (excluded, remark) = match exclusions {
            Some(set) => set.classify(&host),
            None => (false, String::new()),
        };

        Self {
            host,
            ip: text(&row.ip),
            port: text(&row.port),
            title: text(&row.title),
            domain: text(&row.domain),
            country: text(&row.country),
            protocol,
            excluded,
            remark,
        }
    }

    /// Cell values in output column order.
    pub fn columns(&self) -> [&str; 9] {
        [
            &self.host,
            &self.ip,
            &self.port,
            &self.title,
            &self.domain,
            &self.country,
            &self.protocol,
            if self.excluded { "yes" } else { "no" },
            &self.remark,
        ]
    }
}

pub const COLUMNS: [&str; 9] = [
    "host", "ip", "port", "title", "domain", "country", "protocol", "excluded", "remark",
];

/// Converts raw rows in input order. With no exclusion set every record is
/// marked as not excluded.
pub fn transform(rows: &[RawResultRow], exclusions: Option<&ExclusionSet>) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = rows
        .iter()
        .map(|row| NormalizedRecord::from_row(row, exclusions))
        .collect();

    info!(
        action = "complete",
        component = "transform",
        record_count = records.len(),
        excluded_count = records.iter().filter(|r| r.excluded).count(),
        "Transformed search results"
    );
    records
}
