//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lifeos_domain::HttpMethod;

/// Parsed command line.
#[derive(Parser, Debug)]
#[command(name = "lifeos")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Life OS API client")]
pub struct Cli {
    /// Credential file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the token pair
    Login {
        /// Account username
        username: String,
        /// Account password
        password: String,
    },
    /// Create an account
    Register {
        /// Account username
        username: String,
        /// Contact email
        email: String,
        /// Account password
        password: String,
    },
    /// Discard the stored tokens
    Logout,
    /// Show whether a session is stored
    Status,
    /// Send an authenticated request and print the response
    Request {
        /// GET, POST, PUT, PATCH or DELETE
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        /// Path relative to the API base URL, or an absolute URL
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
        /// Query parameter as NAME=VALUE, repeatable
        #[arg(short, long = "query", value_name = "NAME=VALUE", value_parser = parse_query)]
        query: Vec<(String, String)>,
    },
}

impl Cli {
    /// Parses `std::env::args`, exiting with usage on error.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_method(raw: &str) -> Result<HttpMethod, String> {
    raw.parse().map_err(|e: lifeos_domain::DomainError| e.to_string())
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_arguments() {
        let cli = Cli::try_parse_from([
            "lifeos",
            "--credentials",
            "/tmp/creds.json",
            "request",
            "patch",
            "/tasks/3/",
            "--data",
            r#"{"done": true}"#,
            "-q",
            "fields=title",
        ])
        .unwrap();

        assert_eq!(cli.credentials, Some(PathBuf::from("/tmp/creds.json")));
        match cli.command {
            Command::Request {
                method,
                path,
                data,
                query,
            } => {
                assert_eq!(method, HttpMethod::Patch);
                assert_eq!(path, "/tasks/3/");
                assert_eq!(data.as_deref(), Some(r#"{"done": true}"#));
                assert_eq!(query, vec![("fields".to_string(), "title".to_string())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(Cli::try_parse_from(["lifeos", "request", "TRACE", "/"]).is_err());
    }

    #[test]
    fn test_malformed_query_is_rejected() {
        assert!(Cli::try_parse_from(["lifeos", "request", "GET", "/", "-q", "novalue"]).is_err());
    }

    #[test]
    fn test_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["lifeos", "status", "--credentials", "c.json"]).unwrap();
        assert_eq!(cli.credentials, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Command::Status));
    }
}
