use crate::adapters::http_uploader::{DEFAULT_CHUNK_SIZE, DEFAULT_UPLOAD_ENDPOINT};
use crate::core::view::{PageCountMode, ViewOptions, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_FIELDS};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub chunk_size: Option<usize>,
}

fn default_endpoint() -> String {
    DEFAULT_UPLOAD_ENDPOINT.to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: None,
            chunk_size: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    pub page_size: Option<usize>,
    pub search_fields: Option<Vec<String>>,
    pub page_count_mode: Option<PageCountMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    pub delimiter: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables
    /// are left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("upload.endpoint", &self.upload.endpoint)?;

        if let Some(timeout) = self.upload.timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "upload.timeout_seconds",
                timeout as usize,
                1,
            )?;
        }
        if let Some(chunk_size) = self.upload.chunk_size {
            crate::utils::validation::validate_positive_number("upload.chunk_size", chunk_size, 1)?;
        }
        if let Some(page_size) = self.view.page_size {
            crate::utils::validation::validate_positive_number("view.page_size", page_size, 1)?;
        }
        if let Some(fields) = &self.view.search_fields {
            crate::utils::validation::validate_non_empty_list("view.search_fields", fields)?;
        }
        if let Some(delimiter) = &self.parser.delimiter {
            if delimiter.len() != 1 {
                return Err(AppError::InvalidConfigValueError {
                    field: "parser.delimiter".to_string(),
                    value: delimiter.clone(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        &self.upload.endpoint
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.upload.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn chunk_size(&self) -> usize {
        self.upload.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    pub fn delimiter(&self) -> u8 {
        self.parser
            .delimiter
            .as_deref()
            .and_then(|d| d.bytes().next())
            .unwrap_or(b',')
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            page_size: self.view.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            search_fields: self
                .view
                .search_fields
                .clone()
                .unwrap_or_else(|| DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect()),
            page_count_mode: self.view.page_count_mode.unwrap_or_default(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[upload]
endpoint = "https://uploads.example.com/post"
timeout_seconds = 10
chunk_size = 1024

[view]
page_size = 10
search_fields = ["title", "author"]
page_count_mode = "legacy"

[parser]
delimiter = ";"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.endpoint(), "https://uploads.example.com/post");
        assert_eq!(config.timeout_seconds(), 10);
        assert_eq!(config.chunk_size(), 1024);
        assert_eq!(config.delimiter(), b';');
        let options = config.view_options();
        assert_eq!(options.page_size, 10);
        assert_eq!(options.search_fields, vec!["title", "author"]);
        assert_eq!(options.page_count_mode, PageCountMode::Legacy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.endpoint(), DEFAULT_UPLOAD_ENDPOINT);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.view_options(), ViewOptions::default());
        assert_eq!(config.delimiter(), b',');
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("READ_CSV_TEST_ENDPOINT", "https://test.api.com/post");

        let toml_content = r#"
[upload]
endpoint = "${READ_CSV_TEST_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoint(), "https://test.api.com/post");

        std::env::remove_var("READ_CSV_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = TomlConfig::from_toml_str("[upload]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_page = TomlConfig::from_toml_str("[view]\npage_size = 0\n").unwrap();
        assert!(zero_page.validate().is_err());

        let bad_delimiter = TomlConfig::from_toml_str("[parser]\ndelimiter = \"::\"\n").unwrap();
        assert!(bad_delimiter.validate().is_err());
    }

    #[test]
    fn test_unknown_page_count_mode_is_rejected() {
        assert!(TomlConfig::from_toml_str("[view]\npage_count_mode = \"fuzzy\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[upload]\nendpoint = \"https://api.example.com/post\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoint(), "https://api.example.com/post");
    }
}
