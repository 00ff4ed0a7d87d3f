use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mention::BrandRecord;
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl BrandConfig {
    /// Alias list with blanks removed and duplicates (case-insensitive) dropped.
    #[must_use]
    pub fn normalized_aliases(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.aliases
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .filter(|a| seen.insert(a.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

impl From<&BrandConfig> for BrandRecord {
    fn from(config: &BrandConfig) -> Self {
        BrandRecord {
            name: config.name.trim().to_string(),
            aliases: config.normalized_aliases(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
}

impl BrandsFile {
    #[must_use]
    pub fn records(&self) -> Vec<BrandRecord> {
        self.brands.iter().map(BrandRecord::from).collect()
    }
}

/// Load and validate the brand registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

/// Parse and validate brand registry YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for brand in &brands_file.brands {
        let name = brand.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
    }

    Ok(())
}
