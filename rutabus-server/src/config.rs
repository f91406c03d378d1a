//! Server configuration: a TOML file overridden by command-line flags.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//! request_timeout_secs = 30
//! concurrency_limit = 64
//!
//! [data]
//! dir = "data/lima"
//!
//! [planner]
//! walk_penalty = 1.5
//! transfer_penalty = 500.0
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use rutabus_core::{Error, PlannerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "rutabus-server", version, about = "Walk + bus journey planner over HTTP")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the CSV network export
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub data: DataConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: SocketAddr,
    pub request_timeout_secs: u64,
    /// Requests served at once; the rest wait
    pub concurrency_limit: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            request_timeout_secs: 30,
            concurrency_limit: 64,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// [`Error::InvalidData`] if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)
            .map_err(|e| Error::InvalidData(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Configuration file named by `--config` (or the defaults), with the
    /// remaining flags applied on top.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or the result does not validate.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(dir) = &args.data_dir {
            config.data.dir.clone_from(dir);
        }
        if let Some(bind) = args.bind {
            config.server.bind = bind;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.server.concurrency_limit == 0 {
            return Err(Error::InvalidData(
                "server.concurrency_limit must be at least 1".into(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(Error::InvalidData(
                "server.request_timeout_secs must be at least 1".into(),
            ));
        }
        self.planner.validate()
    }
}
