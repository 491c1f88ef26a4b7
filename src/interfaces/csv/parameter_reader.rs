use crate::domain::parameters::ParameterSet;
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ParameterRow {
    name: String,
    value: String,
}

/// Reads gateway parameters from a `name,value` CSV source.
///
/// Rows are kept in file order since the digest depends on it. Only headers
/// are trimmed, values are signed byte for byte.
pub struct ParameterReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ParameterReader<R> {
    /// Creates a new `ParameterReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads parameter rows.
    pub fn rows(self) -> impl Iterator<Item = Result<(String, String)>> {
        self.reader
            .into_deserialize::<ParameterRow>()
            .map(|result| result.map(|row| (row.name, row.value)).map_err(GatewayError::from))
    }

    /// Collects every row into a parameter set.
    pub fn parameters(self) -> Result<ParameterSet> {
        let pairs = self.rows().collect::<Result<Vec<_>>>()?;
        Ok(ParameterSet::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_keeps_file_order() {
        let data = "name, value\nversion,2\nmid,MID1\nbillAddress, Ring 1\n";
        let params = ParameterReader::new(data.as_bytes()).parameters().unwrap();
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["version", "mid", "billAddress"]);
        assert_eq!(params.get("billAddress"), Some(" Ring 1"));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "name,value\nversion";
        let results: Vec<Result<(String, String)>> =
            ParameterReader::new(data.as_bytes()).rows().collect();
        assert!(results[0].is_err());
    }
}
