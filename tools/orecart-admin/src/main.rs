use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orecart_core::api::{AdaFilter, AlertFilter, FileTokenStore};
use orecart_core::config::{DOMAIN_VAR, SECURE_VAR};
use orecart_core::{ClientConfig, OreCartClient};

mod commands;
mod output;

#[derive(Parser, Debug)]
#[command(
    name = "orecart-admin",
    author,
    version,
    about = "Manage and inspect the OreCart shuttle backend",
    long_about = "Reads and edits routes, stops, alerts, vans and ADA pickups over the REST \
                  API, and follows the live arrival and van location feeds.\n\n\
                  Mutating commands need a session: run `orecart-admin login` first. The \
                  token is kept in --token-file between runs."
)]
struct Args {
    /// Backend domain, optionally with a port
    #[arg(long, env = DOMAIN_VAR)]
    api_domain: String,

    /// Use https/wss
    #[arg(long, env = SECURE_VAR, value_parser = parse_flag)]
    secure: bool,

    /// Where the session token is stored
    #[arg(long, default_value = ".orecart-token")]
    token_file: PathBuf,

    /// Print raw JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// `ORECART_API_SECURE` is `"1"` for TLS; accept the usual spellings on the command line too.
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(format!("expected 1/0 or true/false, got {other:?}")),
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        username: String,
        #[arg(long, env = "ORECART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Check whether the stored session token is still accepted
    Whoami,

    /// List routes, or show one
    Routes { id: Option<u32> },
    /// Stops along a route, in order
    RouteStops { id: u32 },
    /// Download the KML export of every route
    Kml {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete every route, stop and waypoint
    ClearRoutes {
        /// Required, this cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// List stops, or show one
    Stops { id: Option<u32> },
    /// The active stop closest to a coordinate
    Nearest { latitude: f64, longitude: f64 },

    #[command(subcommand)]
    Alerts(AlertCommand),

    #[command(subcommand)]
    Vans(VanCommand),

    #[command(subcommand)]
    Ada(AdaCommand),

    /// Ridership samples reported by vans
    Ridership,

    #[command(subcommand)]
    Watch(WatchCommand),
}

#[derive(Subcommand, Debug)]
enum AlertCommand {
    List {
        #[arg(long, default_value = "active")]
        filter: AlertFilter,
    },
    Show { id: u32 },
    /// Times are RFC 3339, e.g. 2024-03-01T08:00:00-07:00
    Create { text: String, start: String, end: String },
    Update { id: u32, text: String, start: String, end: String },
    Delete { id: u32 },
}

#[derive(Subcommand, Debug)]
enum VanCommand {
    List,
    Show { id: u32 },
    Create {
        route_id: u32,
        #[arg(long)]
        wheelchair: bool,
    },
    Update {
        id: u32,
        route_id: u32,
        #[arg(long)]
        wheelchair: bool,
    },
    Delete { id: u32 },
}

#[derive(Subcommand, Debug)]
enum AdaCommand {
    /// List pickup spots
    Spots,
    AddSpot { name: String, latitude: f64, longitude: f64 },
    UpdateSpot { id: u32, name: String, latitude: f64, longitude: f64 },
    DeleteSpot { id: u32 },
    /// List pickup requests
    Requests {
        #[arg(long, default_value = "today")]
        filter: AdaFilter,
    },
    /// Request a pickup; the time is RFC 3339 and must be in the future
    Request {
        spot_id: u32,
        time: String,
        #[arg(long)]
        wheelchair: bool,
    },
}

#[derive(Subcommand, Debug)]
enum WatchCommand {
    /// Follow the arrival estimate for a route at a stop
    Arrivals {
        stop_id: u32,
        route_id: u32,
        /// Stop after this many updates
        #[arg(long)]
        count: Option<usize>,
    },
    /// Follow live van positions, optionally on some routes only
    Vans {
        route_ids: Vec<u32>,
        #[arg(long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let config = ClientConfig::from_domain(&args.api_domain, args.secure)
        .with_context(|| format!("Invalid api domain {:?}", args.api_domain))?;
    log::debug!("Using {} and {}", config.api_url, config.ws_api_url);

    let tokens = Arc::new(FileTokenStore::new(&args.token_file));
    let client = OreCartClient::new(&config, tokens);
    let out = output::Printer::new(args.json);

    commands::run(&client, &out, args.command).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_command() {
        let args = Args::try_parse_from([
            "orecart-admin",
            "--api-domain",
            "localhost:8000",
            "alerts",
            "list",
            "--filter",
            "future",
        ])
        .unwrap();

        assert!(!args.secure);
        assert!(matches!(
            args.command,
            Command::Alerts(AlertCommand::List {
                filter: AlertFilter::Future
            })
        ));
    }

    #[test]
    fn test_secure_flag_spellings() {
        assert_eq!(parse_flag("1"), Ok(true));
        assert_eq!(parse_flag("TRUE"), Ok(true));
        assert_eq!(parse_flag("0"), Ok(false));
        assert!(parse_flag("maybe").is_err());
    }
}
