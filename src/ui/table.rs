use tabled::{Table, Tabled, settings::Style};

use crate::record::UrlRecord;
use crate::view::format_added;

#[derive(Tabled)]
pub struct UrlRow {
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "Added")]
    pub added: String,
}

impl From<&UrlRecord> for UrlRow {
    fn from(record: &UrlRecord) -> Self {
        Self {
            id: record.id.to_string(),
            url: record.url.clone(),
            added: format_added(&record.created_at)
                .trim_start_matches("Added ")
                .to_string(),
        }
    }
}

/// Render records as a rounded table, newest first as given
pub fn url_table(records: &[UrlRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let rows: Vec<UrlRow> = records.iter().map(UrlRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UrlId;
    use chrono::DateTime;

    #[test]
    fn test_table_rows() {
        let record = UrlRecord {
            id: UrlId::generate(),
            url: "https://example.com".to_string(),
            summary: None,
            created_at: DateTime::from_timestamp_millis(1_705_276_800_000).unwrap(),
        };

        let table = url_table(std::slice::from_ref(&record));
        assert!(table.contains("https://example.com"));
        assert!(table.contains(&record.id.to_string()));
        assert!(table.contains("1/15/2024"));
        assert!(url_table(&[]).is_empty());
    }
}
