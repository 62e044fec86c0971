//! Coordinate -> base name mapping used to annotate fleets
//!
//! The side file holds one `coordinate name` pair per line, separated by
//! whitespace or a comma. Blank lines and `#` comments are ignored.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::constants;

#[derive(Debug, Clone, Default)]
pub struct BaseNames {
    names: HashMap<String, String>,
}

impl BaseNames {
    /// Load the mapping from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read base names file: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parse mapping text. Lines without a name are skipped.
    pub fn parse(content: &str) -> Self {
        let mut names = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(split) = line.find(|c: char| c == ',' || c.is_whitespace()) else {
                continue;
            };
            let coordinate = line[..split].trim();
            let name = line[split..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());

            if coordinate.is_empty() || name.is_empty() {
                continue;
            }
            names.insert(coordinate.to_string(), name.trim_end().to_string());
        }

        Self { names }
    }

    /// Name for a coordinate key, or "Unknown"
    pub fn resolve(&self, coordinate: &str) -> &str {
        self.names
            .get(coordinate.trim())
            .map(String::as_str)
            .unwrap_or(constants::UNKNOWN_BASE)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_whitespace_and_comma_delimited() {
        let bases = BaseNames::parse("40:30 MRZ-1 Outpost\n-10:5,Ustur CSS\n\n  12:12 ,  Hub  \n");
        assert_eq!(bases.len(), 3);
        assert_eq!(bases.resolve("40:30"), "MRZ-1 Outpost");
        assert_eq!(bases.resolve("-10:5"), "Ustur CSS");
        assert_eq!(bases.resolve("12:12"), "Hub");
    }

    #[test]
    fn test_unmapped_coordinate_is_unknown() {
        let bases = BaseNames::parse("1:1 Home");
        assert_eq!(bases.resolve("2:2"), "Unknown");
        assert_eq!(BaseNames::default().resolve("1:1"), "Unknown");
    }

    #[test]
    fn test_lines_without_name_and_comments_are_skipped() {
        let bases = BaseNames::parse("# coordinate name\n5:5\n6:6,\n7:7 Seven");
        assert_eq!(bases.len(), 1);
        assert_eq!(bases.resolve("5:5"), "Unknown");
        assert_eq!(bases.resolve("7:7"), "Seven");
    }

    #[test]
    fn test_resolve_trims_query() {
        let bases = BaseNames::parse("3:4 Base");
        assert_eq!(bases.resolve(" 3:4 "), "Base");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0:0 Origin").unwrap();
        writeln!(file, "9:9, Far Away").unwrap();

        let bases = BaseNames::load(file.path()).unwrap();
        assert_eq!(bases.resolve("9:9"), "Far Away");
        assert!(BaseNames::load(Path::new("/nonexistent/bases.txt")).is_err());
    }
}
