use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug)]
pub struct Config {
    pub db_dir: PathBuf,
    pub listen: String,
    pub registration_enabled: bool,
}

const DEFAULT_DB_DIR: &str = "db";
const DEFAULT_LISTEN: &str = "0.0.0.0:8383";

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_dir = var("KOSYNC_DB_DIR").unwrap_or(DEFAULT_DB_DIR.into());
        let listen = var("KOSYNC_LISTEN").unwrap_or(DEFAULT_LISTEN.into());
        let registration_enabled = match var("KOSYNC_REGISTRATION") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("Invalid KOSYNC_REGISTRATION: {}", raw))?,
            None => true,
        };
        Ok(Config {
            db_dir: db_dir.into(),
            listen,
            registration_enabled,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.db_dir.as_os_str().is_empty() {
            return Err("KOSYNC_DB_DIR is empty".into());
        }
        if self.listen.is_empty() {
            return Err("KOSYNC_LISTEN is empty".into());
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db_dir, PathBuf::from("db"));
        assert_eq!(config.listen, "0.0.0.0:8383");
        assert!(config.registration_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("KOSYNC_DB_DIR", "/var/lib/kosync"),
            ("KOSYNC_LISTEN", "127.0.0.1:9000"),
            ("KOSYNC_REGISTRATION", "off"),
        ])
        .unwrap();
        assert_eq!(config.db_dir, PathBuf::from("/var/lib/kosync"));
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert!(!config.registration_enabled);
    }

    #[test]
    fn bad_registration_flag_fails() {
        assert!(load(&[("KOSYNC_REGISTRATION", "maybe")]).is_err());
    }

    #[test]
    fn empty_listen_is_invalid() {
        let config = load(&[("KOSYNC_LISTEN", "")]).unwrap();
        assert!(config.validate().is_err());
    }
}
