use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub media: Media,
    pub http: HttpConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

/// Where uploaded media lands on disk. Public paths like `/audio/x.mp3` and
/// `/cover_art/y.jpg` resolve relative to `root`.
#[derive(Debug, Deserialize)]
pub struct Media {
    pub root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = true

[media]
root = "./public"

[http]
bind_addr = "127.0.0.1"
port = 8080
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert_eq!(cfg.version, 1);
        assert!(cfg.database.in_memory);
        assert_eq!(cfg.media.root, PathBuf::from("./public"));
        assert_eq!(cfg.http.bind_addr, "127.0.0.1");
        assert_eq!(cfg.http.port, 8080);

        Ok(())
    }

    #[test]
    fn test_parse_file_database_config() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = false
path = "/var/lib/playdeck/catalog.db"

[media]
root = "/var/lib/playdeck/public"

[http]
bind_addr = "0.0.0.0"
port = 8000
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert!(!cfg.database.in_memory);
        assert_eq!(
            cfg.database.path,
            Some(PathBuf::from("/var/lib/playdeck/catalog.db"))
        );

        Ok(())
    }
}
