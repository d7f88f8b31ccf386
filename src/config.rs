//! Configuration manager for identity-hub.

use std::fs::File;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const SECRET_ENV: &str = "TOKEN_SECRET";

/// Reasons a configuration file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid `url`: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Domain name of current instance, used as token issuer.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// REST and GraphQL listener.
    #[serde(default = "Listener::http")]
    pub http: Listener,
    /// gRPC listener.
    #[serde(default = "Listener::rpc")]
    pub rpc: Listener,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing, default)]
    pub argon2: Argon2,
    /// Related to JsonWebToken configuration.
    #[serde(skip_serializing, default)]
    pub token: Token,
    /// Related to logs, traces and metrics.
    #[serde(default)]
    pub telemetry: Telemetry,
}

/// Socket a server binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listener {
    pub address: IpAddr,
    pub port: u16,
}

impl Listener {
    fn http() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }

    fn rpc() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 50051,
        }
    }

    pub fn socket(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: String::default(),
            url: String::default(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            http: Listener::http(),
            rpc: Listener::rpc(),
            postgres: None,
            argon2: Argon2::default(),
            token: Token::default(),
            telemetry: Telemetry::default(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing, in KiB.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Json Web Token configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    /// HMAC secret. Falls back to `TOKEN_SECRET` environment variable.
    pub secret: Option<String>,
    /// Update token audience.
    /// Default is `identity-hub`.
    pub audience: Option<String>,
    /// Lifetime in seconds.
    pub expiration: Option<u64>,
}

impl Token {
    /// Signing secret, read once at startup.
    pub fn secret(&self) -> Option<String> {
        self.secret
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var(SECRET_ENV).ok().filter(|s| !s.is_empty()))
    }
}

/// Telemetry configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    /// OTLP collector endpoint for logs and traces.
    pub otlp_endpoint: Option<String>,
    /// Install Prometheus recorder and expose `/metrics`.
    #[serde(default)]
    pub metrics: bool,
}

impl Configuration {
    /// Read configuration from `CONFIG_PATH`, or `config.yaml`.
    pub fn load() -> Result<Arc<Self>, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::default().path(path).read()
    }

    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    ///
    /// Callers decide whether to fall back on [`Configuration::default`].
    pub fn read(self) -> Result<Arc<Self>, ConfigError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let file = File::open(&file_path).map_err(|source| ConfigError::Io {
            path: file_path.clone(),
            source,
        })?;
        let mut config: Configuration = serde_yaml::from_reader(file)?;

        config.version = VERSION.to_owned();
        config.path = file_path;
        if !config.url.is_empty() {
            config.url = self.normalize_url(&config.url)?;
        }

        Ok(Arc::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
name: identity
url: id.example.com
rpc:
  address: 127.0.0.1
  port: 6000
argon2:
  memory_cost: 1024
  iterations: 1
  parallelism: 1
  hash_length: 32
token:
  secret: s3cr3t
telemetry:
  metrics: true
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.http, Listener::http());
        assert_eq!(config.rpc.socket(), "127.0.0.1:6000".parse().unwrap());
        assert_eq!(config.argon2.memory_cost, 1024);
        assert_eq!(config.token.secret().as_deref(), Some("s3cr3t"));
        assert!(config.telemetry.metrics);
        assert!(config.postgres.is_none());
    }

    #[test]
    fn test_read_file() {
        let path = std::env::temp_dir().join(format!("identity-hub-ok-{}.yaml", std::process::id()));
        std::fs::write(&path, "name: test\nurl: id.example.com\n").unwrap();

        let result = Configuration::default().path(path.clone()).read();
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.url, "https://id.example.com/");
        assert_eq!(config.path, path);
        assert_eq!(config.version, VERSION);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let path = std::env::temp_dir().join(format!("identity-hub-{}.yaml", std::process::id()));
        std::fs::write(&path, "http: [not, a, listener]\n").unwrap();

        let result = Configuration::default().path(path.clone()).read();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::default();

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.rpc.port, 50051);
        assert_eq!(config.argon2, Argon2::default());
    }

    #[test]
    fn test_normalize_url() {
        let config = Configuration::default();
        assert_eq!(
            config.normalize_url("id.example.com").unwrap(),
            "https://id.example.com/"
        );
        assert_eq!(
            config.normalize_url("http://localhost:8080").unwrap(),
            "http://localhost:8080/"
        );
    }
}
