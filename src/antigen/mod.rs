pub mod converter;

pub use converter::{build_antigen_string, convert_allele};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_CONVERSION_TABLE: &str = "antigen_conversion_table_with_rules.csv";

#[derive(Deserialize, Debug)]
struct ConversionRow {
    #[serde(rename = "IMGT_HLA_Allele")]
    allele: String,
    #[serde(rename = "Antigen")]
    antigen: String,
}

/// Two-field allele code → serologic antigen label.
#[derive(Debug, Clone, Default)]
pub struct ConversionMap {
    antigens: HashMap<String, String>,
}

impl ConversionMap {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Antigen conversion file '{}' not found.", path.display());
        }
        let file = std::fs::File::open(path).with_context(|| {
            format!("Error reading antigen conversion file '{}'", path.display())
        })?;
        Self::from_reader(file).with_context(|| {
            format!("Error reading antigen conversion file '{}'", path.display())
        })
    }

    /// Reads a headed CSV table. Later rows win when two alleles collapse to
    /// the same two-field code.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut antigens = HashMap::new();
        for row in csv_reader.deserialize() {
            let row: ConversionRow = row?;
            antigens.insert(two_field_allele(&row.allele), row.antigen);
        }
        Ok(Self { antigens })
    }

    pub fn get(&self, allele: &str) -> Option<&str> {
        self.antigens.get(allele).map(String::as_str)
    }

    /// Unmapped codes stand for themselves.
    pub fn antigen_for<'a>(&'a self, allele: &'a str) -> &'a str {
        self.get(allele).unwrap_or(allele)
    }

    pub fn len(&self) -> usize {
        self.antigens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.antigens.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConversionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            antigens: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Truncates an allele name to its first two colon-delimited fields,
/// e.g. `A*02:01:01:02L` → `A*02:01`.
pub fn two_field_allele(allele: &str) -> String {
    allele.split(':').take(2).collect::<Vec<_>>().join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_field_allele() {
        assert_eq!(two_field_allele("A*02:01:01:02L"), "A*02:01");
        assert_eq!(two_field_allele("DQB1*02:01"), "DQB1*02:01");
        assert_eq!(two_field_allele("B*07"), "B*07");
        assert_eq!(two_field_allele(""), "");
    }

    #[test]
    fn test_loads_normalized_keys_last_row_wins() {
        let table = "\
IMGT_HLA_Allele,Antigen,Rule
A*01:01:01:01,A1,expert
A*02:01:01,A2,expert
A*02:01:02,A203,expert
DQB1*02:01,DQ2,
";
        let map = ConversionMap::from_reader(table.as_bytes()).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("A*01:01"), Some("A1"));
        assert_eq!(map.get("A*02:01"), Some("A203"));
        assert_eq!(map.get("DQB1*02:01"), Some("DQ2"));
        assert_eq!(map.antigen_for("B*08:01"), "B*08:01");
    }

    #[test]
    fn test_missing_columns_fail() {
        let table = "Allele,Antigen\nA*01:01,A1\n";
        assert!(ConversionMap::from_reader(table.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionMap::load(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
