use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Server settings; every flag can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetjump")]
#[command(author, version, about = "Attach cell-to-cell jump links to a spreadsheet in the browser")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "SHEETJUMP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SHEETJUMP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Idle time after which a page session is discarded
    #[arg(long, env = "SHEETJUMP_SESSION_TTL_SECS", default_value_t = 24 * 60 * 60)]
    pub session_ttl_secs: u64,

    /// Largest accepted upload
    #[arg(long, env = "SHEETJUMP_MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_ttl_secs: 24 * 60 * 60,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
