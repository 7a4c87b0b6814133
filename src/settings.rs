use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use config::{Config, Environment};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use url::Url;

/// prefix of environment variables, `ADN_WEBHOOK` sets `webhook`
const ENV_PREFIX: &str = "ADN";

/// Process wide settings. Loaded once at startup and never modified afterwards.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// discord webhook all alerts are relayed to
    pub webhook: Url,
    /// address of the alertmanager webhook receiver
    pub listen: SocketAddr,
    /// log raw request bodies
    pub debug: bool,
    /// upper bound of a single webhook request
    #[serde_as(as = "DurationSeconds<f64>")]
    pub timeout: Duration,
    /// address of the telemetry endpoint, disabled if unset
    pub metrics_listen: Option<SocketAddr>,
    pub log_level: String,
}

impl Settings {
    /// parse command line arguments and exit on `--help` or invalid arguments
    pub fn load() -> Result<Self> {
        Self::from_matches(&command().get_matches(), environment())
    }

    /// merge defaults, config file, environment and command line arguments, in increasing priority
    fn from_matches(opts: &ArgMatches, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("listen", "0.0.0.0:9094")?
            .set_default("debug", false)?
            .set_default("timeout", 10.0)?
            .set_default("log_level", "info")?;

        if let Some(config_path) = opts.value_of("config") {
            builder = builder.add_source(config::File::with_name(config_path));
        }

        let conf = builder
            .add_source(env)
            .set_override_option("webhook", opts.value_of("webhook"))?
            .set_override_option("listen", opts.value_of("listen"))?
            .set_override_option("debug", opts.is_present("debug").then(|| true))?
            .set_override_option("timeout", opts.value_of("timeout"))?
            .set_override_option("metrics_listen", opts.value_of("metrics-listen"))?
            .set_override_option("log_level", opts.value_of("level"))?
            .build()
            .context("can't load config")?;

        if conf.get_string("webhook").is_err() {
            bail!("webhook url is not defined");
        }

        let settings: Settings = conf.try_deserialize().context("can't load config")?;

        if settings.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }

        Ok(settings)
    }
}

/// `ADN_*` variables of the process environment
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

fn command() -> Command<'static> {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .author(clap::crate_authors!())
        .args([
            Arg::new("config")
                .help("path of config file")
                .takes_value(true)
                .short('c')
                .long("config"),
            Arg::new("webhook")
                .help("Discord webhook URL")
                .takes_value(true)
                .short('w')
                .long("webhook"),
            Arg::new("listen")
                .help("<address>:<port> to listen on")
                .takes_value(true)
                .short('l')
                .long("listen"),
            Arg::new("debug")
                .help("enable debug logging")
                .short('d')
                .long("debug"),
            Arg::new("timeout")
                .help("timeout of webhook requests in seconds")
                .takes_value(true)
                .short('t')
                .long("timeout"),
            Arg::new("metrics-listen")
                .help("<address>:<port> to serve prometheus metrics on")
                .takes_value(true)
                .long("metrics-listen"),
            Arg::new("level")
                .help("log level")
                .possible_values(["error", "warn", "info", "debug", "trace"])
                .ignore_case(true)
                .takes_value(true)
                .long("log"),
        ])
}
