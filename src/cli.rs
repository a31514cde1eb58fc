//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Every setting here is optional and only
//! overrides `.macros.toml` when given.

use clap::Parser;
use std::path::PathBuf;

/// macros-webhook - nutrition fulfillment for a voice assistant
///
/// Serves the Dialogflow fulfillment endpoint: tell it what you ate and it
/// answers with the total calories, fat, carbohydrates, protein, fiber,
/// sugar and cholesterol.
///
/// Examples:
///   macros-webhook --app-id $ID --app-key $KEY
///   macros-webhook --config ./macros.toml --port 3000
///   macros-webhook --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .macros.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "ADDR", env = "MACROS_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Route receiving fulfillment requests
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Nutritionix application id
    #[arg(long, value_name = "ID", env = "NUTRITIONIX_APP_ID", hide_env_values = true)]
    pub app_id: Option<String>,

    /// Nutritionix application key
    #[arg(long, value_name = "KEY", env = "NUTRITIONIX_APP_KEY", hide_env_values = true)]
    pub app_key: Option<String>,

    /// Natural-language nutrients endpoint URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Locale tag sent with each query (e.g. en_US)
    #[arg(long, value_name = "TAG")]
    pub locale: Option<String>,

    /// Nutrient lookup timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .macros.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref path) = self.path {
            if !path.starts_with('/') {
                return Err("Path must start with '/'".to_string());
            }
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            bind: None,
            port: None,
            path: None,
            app_id: Some("id".to_string()),
            app_key: Some("key".to_string()),
            endpoint: None,
            locale: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "macros-webhook",
            "--port",
            "3000",
            "--path",
            "/hook",
            "--timeout",
            "3",
            "-v",
        ]);
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.path.as_deref(), Some("/hook"));
        assert_eq!(args.timeout, Some(3));
        assert!(args.verbose);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_values() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.endpoint = Some("trackapi.nutritionix.com".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.path = Some("hook".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.config = Some(PathBuf::from("/definitely/not/here.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.timeout = Some(0);
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
