//! Command line [`Args`].

use clap::Parser;

/// HTTP API server of the real estate agency back-office.
///
/// Settings missing in the configuration file are taken from `CONF.*`
/// environment variables, falling back to defaults.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Apply pending database migrations and exit without serving.
    #[arg(long)]
    pub migrate_only: bool,
}

impl Args {
    /// Parses [`Args`] of the current process.
    ///
    /// # Errors
    ///
    /// If the arguments are malformed, or `--help`/`--version` is requested.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_to_serving_with_local_config() {
        let args = Args::try_parse_from(["server"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(!args.migrate_only);
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "server",
            "-c",
            "/etc/agency.toml",
            "--migrate-only",
        ])
        .unwrap();

        assert_eq!(args.config, "/etc/agency.toml");
        assert!(args.migrate_only);
    }
}
