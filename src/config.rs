use clap::Parser;
use std::path::PathBuf;

/// Number of bases per sequence chunk row in the pre-built genome tables.
pub const DEFAULT_CHUNK_LENGTH: u64 = 1000;

/// Largest sequence span a single request may ask for (1 Mb).
pub const DEFAULT_MAX_SEQUENCE_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, Parser)]
#[command(name = "genoserve")]
#[command(about = "genomic sequence and expression data server")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "GENOSERVE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "GENOSERVE_PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database file holding the pre-built datasets
    #[arg(long, env = "GENOSERVE_DATABASE", default_value = "./data/genoserve.db")]
    pub database: PathBuf,

    /// Bases per sequence chunk row (must match the build of the database)
    #[arg(long, env = "GENOSERVE_CHUNK_LENGTH", default_value_t = DEFAULT_CHUNK_LENGTH)]
    pub chunk_length: u64,

    /// Maximum sequence span per request, in bases
    #[arg(long, env = "GENOSERVE_MAX_SPAN", default_value_t = DEFAULT_MAX_SEQUENCE_SPAN)]
    pub max_sequence_span: u64,

    /// Enable CORS for all origins
    #[arg(long, env = "GENOSERVE_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["genoserve"]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.chunk_length, 1000);
        assert_eq!(config.max_sequence_span, 1_000_000);
        assert!(config.cors);
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse_from([
            "genoserve",
            "--port",
            "3000",
            "--chunk-length",
            "500",
            "--max-sequence-span",
            "2000000",
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.chunk_length, 500);
        assert_eq!(config.max_sequence_span, 2_000_000);
    }
}
