use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Absent means the service runs on the in-memory store.
    #[serde(default)]
    pub database: Option<DbConfig>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub meter: MeterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}

fn default_api_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterConfig {
    /// First year the meter has data for; date lookups before it are rejected.
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    /// Offset of the meter's local time, e.g. "+01:00". Day and week
    /// boundaries are computed in this zone.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            utc_offset: default_utc_offset(),
        }
    }
}

fn default_start_year() -> i32 {
    2015
}

fn default_utc_offset() -> String {
    "+00:00".into()
}

impl MeterConfig {
    pub fn offset(&self) -> Result<FixedOffset, anyhow::Error> {
        parse_utc_offset(&self.utc_offset)
    }
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        let mut cfg: Self = serde_yaml::from_str(&expanded)?;

        // Optional: allow DATABASE_URL env to override whatever YAML had
        if let Ok(url) = std::env::var("DATABASE_URL") {
            match cfg.database {
                Some(ref mut db) => db.url = url,
                None => {
                    cfg.database = Some(DbConfig {
                        url,
                        max_connections: default_max_connections(),
                    })
                }
            }
        }

        // Fail at startup rather than on the first date query
        cfg.meter.offset()?;

        Ok(cfg)
    }
}

/// Parse "+HH:MM", "-HH:MM" or "Z" into a fixed offset.
fn parse_utc_offset(input: &str) -> Result<FixedOffset, anyhow::Error> {
    use anyhow::Context;

    let s = input.trim();
    if s == "Z" || s == "z" {
        return FixedOffset::east_opt(0).context("invalid utc offset");
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => anyhow::bail!("utc offset must start with '+' or '-': {}", input),
    };

    let (hours, minutes) = rest
        .split_once(':')
        .with_context(|| format!("utc offset must look like +HH:MM: {}", input))?;
    let hours: i32 = hours
        .parse()
        .with_context(|| format!("invalid hours in utc offset: {}", input))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("invalid minutes in utc offset: {}", input))?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("utc offset out of range: {}", input))
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c == '$' {
            match it.peek().copied() {
                Some('$') => {
                    // Escape "$$" -> "$"
                    it.next();
                    out.push('$');
                }
                Some('(') => {
                    it.next();
                    let var = read_until(&mut it, ')')
                        .context("unterminated env placeholder: missing ')'")?;
                    let val = std::env::var(&var)
                        .with_context(|| format!("missing environment variable: {}", var))?;
                    out.push_str(&val);
                }
                Some('{') => {
                    it.next();
                    let var = read_until(&mut it, '}')
                        .context("unterminated env placeholder: missing '}'")?;
                    let val = std::env::var(&var)
                        .with_context(|| format!("missing environment variable: {}", var))?;
                    out.push_str(&val);
                }
                _ => out.push('$'),
            }
        } else {
            out.push(c);
        }
    }

    Ok(out)
}

fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("01:00").is_err());
        assert!(parse_utc_offset("+1").is_err());
    }

    #[test]
    fn test_expand_env_placeholders() {
        std::env::set_var("POWERMETER_TEST_HOST", "db.local");
        let out = expand_env_placeholders("url: postgres://${POWERMETER_TEST_HOST}/x $$5").unwrap();
        assert_eq!(out, "url: postgres://db.local/x $5");

        let out = expand_env_placeholders("host: $(POWERMETER_TEST_HOST)").unwrap();
        assert_eq!(out, "host: db.local");

        assert!(expand_env_placeholders("${POWERMETER_TEST_UNSET_VAR}").is_err());
        assert!(expand_env_placeholders("${UNTERMINATED").is_err());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let cfg: Config = serde_yaml::from_str("api:\n  port: 8081\n").unwrap();
        assert!(cfg.database.is_none());
        assert_eq!(cfg.api.host, "0.0.0.0");
        assert_eq!(cfg.api.port, 8081);
        assert_eq!(cfg.meter.start_year, 2015);
        assert_eq!(cfg.meter.offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_meter_section() {
        let cfg: Config = serde_yaml::from_str(
            "database:\n  url: postgres://localhost/power\nmeter:\n  start_year: 2013\n  utc_offset: \"+02:00\"\n",
        )
        .unwrap();
        let db = cfg.database.unwrap();
        assert_eq!(db.url, "postgres://localhost/power");
        assert_eq!(db.max_connections, 10);
        assert_eq!(cfg.meter.start_year, 2013);
        assert_eq!(cfg.meter.offset().unwrap().local_minus_utc(), 7200);
    }
}
