use std::sync::Arc;

use csv::ReaderBuilder;

use crate::domain::model::{Dataset, Row, Schema};
use crate::domain::ports::TabularParser;
use crate::utils::error::Result;

/// `csv`-crate backed parser. Ragged lines are accepted as-is: short lines
/// yield rows with missing cells, long lines lose their surplus cells.
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl TabularParser for CsvParser {
    fn parse(&self, bytes: &[u8], has_headers: bool) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(bytes);

        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        let columns: Vec<String> = if has_headers {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
            (1..=width).map(|n| n.to_string()).collect()
        };
        let schema = Arc::new(Schema::new(columns)?);

        let mut ragged = 0usize;
        let rows = records
            .into_iter()
            .map(|record| {
                if record.len() != schema.len() {
                    ragged += 1;
                }
                Row::new(schema.clone(), record.iter().map(str::to_string).collect())
            })
            .collect::<Vec<_>>();

        if ragged > 0 {
            tracing::warn!(
                "{} of {} lines do not have {} fields; passed through as-is",
                ragged,
                rows.len(),
                schema.len()
            );
        }
        tracing::debug!("Parsed {} rows with columns {:?}", rows.len(), schema.columns());

        Ok(Dataset::new(schema, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let dataset = CsvParser::default()
            .parse(b"id,name\n1,Alice\n2,Bob\n", true)
            .unwrap();

        assert_eq!(dataset.schema().columns(), &["id", "name"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1].get("name"), Some("Bob"));
    }

    #[test]
    fn test_quoted_fields_and_blank_lines() {
        let input = b"id,body\n1,\"hello, world\"\n\n2,\"say \"\"hi\"\"\"\n";
        let dataset = CsvParser::default().parse(input, true).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].get("body"), Some("hello, world"));
        assert_eq!(dataset.rows()[1].get("body"), Some("say \"hi\""));
    }

    #[test]
    fn test_ragged_lines_pass_through() {
        let dataset = CsvParser::default()
            .parse(b"id,name,email\n1,Alice\n2,Bob,bob@x.io,extra\n", true)
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].get("email"), None);
        assert_eq!(dataset.rows()[1].get("email"), Some("bob@x.io"));
        assert_eq!(dataset.rows()[1].cells().len(), 3);
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = CsvParser::default().parse(b"id,name\n", true).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.schema().len(), 2);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(CsvParser::default().parse(b"", true).is_err());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(CsvParser::default().parse(&[0xff, 0xfe, b'\n', b'1'], true).is_err());
    }

    #[test]
    fn test_without_header_numbers_columns() {
        let dataset = CsvParser::default().parse(b"a,b\nc\n", false).unwrap();
        assert_eq!(dataset.schema().columns(), &["1", "2"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1].get("2"), None);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let dataset = CsvParser::with_delimiter(b';')
            .parse(b"id;name\n1;Alice\n", true)
            .unwrap();
        assert_eq!(dataset.rows()[0].get("name"), Some("Alice"));
    }
}
