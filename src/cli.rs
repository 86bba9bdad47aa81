use clap::Parser;
use std::path::PathBuf;

/// Themis - multi-agent HR assistant server
#[derive(Parser, Debug, Clone)]
#[command(name = "themis", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "THEMIS_CONFIG", default_value = "themis.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "THEMIS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "THEMIS_PORT")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["themis"]);
        assert_eq!(cli.config, PathBuf::from("themis.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from(["themis", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
    }
}
