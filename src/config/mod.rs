use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::DocError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3999;
pub const DEFAULT_LEGACY_PREFIX: &str = "/minimega.git";
pub const DEFAULT_REDIRECT_BASE: &str = "https://github.com/sandia-minimega";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose contents are served
    pub root: PathBuf,
    /// Directory holding action.tmpl, slides.tmpl, article.tmpl, layout.tmpl and dir.tmpl
    pub template_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Mark `.play` snippets with a `.go` extension as runnable
    pub play_enabled: bool,
    /// Request paths starting with this prefix are redirected to `redirect_base`
    pub legacy_prefix: String,
    pub redirect_base: String,
}

impl Config {
    /// Create a configuration with default network and redirect settings
    pub fn new(root: PathBuf, template_dir: PathBuf) -> Self {
        Self {
            root,
            template_dir,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            play_enabled: false,
            legacy_prefix: DEFAULT_LEGACY_PREFIX.to_string(),
            redirect_base: DEFAULT_REDIRECT_BASE.to_string(),
        }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, DocError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DocError::Serve(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from("."), PathBuf::from("templates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_loopback() {
        let config = Config::default();
        assert_eq!(config.socket_addr().unwrap(), SocketAddr::from(([127, 0, 0, 1], 3999)));
        assert_eq!(config.legacy_prefix, "/minimega.git");
    }

    #[test]
    fn rejects_bad_host() {
        let config = Config { host: "not a host".into(), ..Config::default() };
        assert!(config.socket_addr().is_err());
    }
}
