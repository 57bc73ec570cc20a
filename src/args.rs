use crate::config::{MaintenanceConfig, DEFAULT_URL, ONE_GB_IN_BYTES};
use std::env;
use std::time::Duration;
use structopt::StructOpt;

/// Cleanup large indices within an Elasticsearch instance.
///
/// Data stream backing indices larger than --max-size-bytes are rolled over
/// and deleted, then unassigned shards are rerouted.
#[derive(StructOpt, Debug)]
#[structopt(name = "elasticsearch-cleanup")]
pub struct Opt {
    /// Activate debug mode
    #[structopt(long)]
    pub debug: bool,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Elasticsearch URL, or use ELASTICSEARCH_URL env
    #[structopt(short = "U", long)]
    pub url: Option<String>,

    /// Elasticsearch username
    #[structopt(short, long, default_value = "elastic")]
    pub username: String,

    /// Elasticsearch password, or use ELASTICSEARCH_PASSWORD env
    #[structopt(short, long)]
    pub password: Option<String>,

    /// Whether to disable ssl verification
    #[structopt(short, long, default_value = "true", parse(try_from_str))]
    pub disable_ssl: bool,

    /// Max size of index in bytes
    #[structopt(short, long, default_value = "1073741824")]
    pub max_size_bytes: usize,

    /// Give up on the whole pass after this many seconds
    #[structopt(short, long, default_value = "600")]
    pub timeout_secs: u64,
}

impl Opt {
    /// Resolve env fallbacks and validate into a [`MaintenanceConfig`].
    pub fn into_config(self) -> anyhow::Result<MaintenanceConfig> {
        let url = value_or_env("ELASTICSEARCH_URL", self.url)
            .unwrap_or_else(|_| DEFAULT_URL.to_string());
        let password = value_or_env("ELASTICSEARCH_PASSWORD", self.password)?;
        let config = MaintenanceConfig::new(
            &url,
            &self.username,
            &password,
            self.disable_ssl,
            self.max_size_bytes,
        )?
        .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(config)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match (self.debug, self.verbose) {
            (_, v) if v >= 2 => log::LevelFilter::Trace,
            (true, _) | (_, 1) => log::LevelFilter::Debug,
            _ => log::LevelFilter::Info,
        }
    }
}

pub fn value_or_env(
    key: &str, other: Option<String>,
) -> anyhow::Result<String> {
    match other {
        Some(v) => Ok(v),
        None => match env::var(key) {
            Ok(v) => Ok(v),
            Err(e) => {
                let context = format!("{} must be set", key);
                Err(anyhow::Error::new(e).context(context))
            }
        },
    }
}
