pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod args {
    use crate::core::view::PageCountMode;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    use super::toml_config::TomlConfig;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "read-csv")]
    #[command(about = "Parse a CSV file, upload it and browse it as a searchable, paginated table")]
    pub struct CliConfig {
        /// CSV file to select
        pub file: Option<String>,

        /// TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Upload endpoint (overrides the config file)
        #[arg(long)]
        pub endpoint: Option<String>,

        /// Declared media type of the file instead of guessing it from the extension
        #[arg(long)]
        pub media_type: Option<String>,

        /// Search term applied after the upload completes
        #[arg(short, long)]
        pub search: Option<String>,

        /// Page to show, starting at 1
        #[arg(short, long, default_value = "1")]
        pub page: usize,

        /// Rows per page (overrides the config file)
        #[arg(long)]
        pub page_size: Option<usize>,

        /// Count pages the way older exports did (one page fewer past the first)
        #[arg(long)]
        pub legacy_page_count: bool,

        /// Skip the upload and show the table right after parsing
        #[arg(long)]
        pub no_upload: bool,

        /// Read commands (search, page, next, prev, select, upload, show, quit) from stdin
        #[arg(short, long)]
        pub interactive: bool,

        /// Print the view as JSON instead of a text table
        #[arg(long)]
        pub json: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,
    }

    impl CliConfig {
        /// Config file (if any) with command-line overrides applied.
        pub fn load_settings(&self) -> Result<TomlConfig> {
            let mut settings = match &self.config {
                Some(path) => TomlConfig::from_file(path)?,
                None => TomlConfig::default(),
            };

            if let Some(endpoint) = &self.endpoint {
                settings.upload.endpoint = endpoint.clone();
            }
            if let Some(page_size) = self.page_size {
                settings.view.page_size = Some(page_size);
            }
            if self.legacy_page_count {
                settings.view.page_count_mode = Some(PageCountMode::Legacy);
            }

            settings.validate()?;
            Ok(settings)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_positive_number("page", self.page, 1)?;
            if let Some(page_size) = self.page_size {
                validation::validate_positive_number("page_size", page_size, 1)?;
            }
            if let Some(endpoint) = &self.endpoint {
                validation::validate_url("endpoint", endpoint)?;
            }
            if self.file.is_none() && !self.interactive {
                return Err(crate::utils::error::AppError::MissingConfigError {
                    field: "file".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::view::PageCountMode;
    use crate::utils::validation::Validate;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_config_defaults() {
        let cli = CliConfig::parse_from([
            "read-csv",
            "people.csv",
            "--endpoint",
            "https://example.com/upload",
            "--page-size",
            "10",
            "--legacy-page-count",
        ]);
        assert!(cli.validate().is_ok());

        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.endpoint(), "https://example.com/upload");
        let options = settings.view_options();
        assert_eq!(options.page_size, 10);
        assert_eq!(options.page_count_mode, PageCountMode::Legacy);
    }

    #[test]
    fn test_cli_validation() {
        let no_file = CliConfig::parse_from(["read-csv"]);
        assert!(no_file.validate().is_err());

        let interactive = CliConfig::parse_from(["read-csv", "--interactive"]);
        assert!(interactive.validate().is_ok());

        let page_zero = CliConfig::parse_from(["read-csv", "a.csv", "--page", "0"]);
        assert!(page_zero.validate().is_err());

        let bad_endpoint = CliConfig::parse_from(["read-csv", "a.csv", "--endpoint", "nope"]);
        assert!(bad_endpoint.validate().is_err());
    }
}
