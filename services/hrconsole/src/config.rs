use anyhow::{Context, Result, bail};
use perfdesk_common::User;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// Console configuration sourced from environment variables, optionally
// overlaid by a YAML file named in PERFDESK_CONFIG.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub token: TokenConfig,
    pub anonymous_feedback_enabled: bool,
    pub seed_users_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ConsoleConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    token_secret: Option<String>,
    token_issuer: Option<String>,
    token_audience: Option<String>,
    token_leeway_secs: Option<u64>,
    anonymous_feedback_enabled: Option<bool>,
    seed_users_path: Option<PathBuf>,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self> {
        Self::env_layer()?.validated()
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::env_layer()?;
        if let Ok(path) = std::env::var("PERFDESK_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read PERFDESK_CONFIG: {path}"))?;
            let override_cfg: ConsoleConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse console config yaml")?;
            config.apply(override_cfg)?;
        }
        config.validated()
    }

    fn env_layer() -> Result<Self> {
        let bind_addr = std::env::var("PERFDESK_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8443".to_string())
            .parse()
            .with_context(|| "parse PERFDESK_BIND")?;
        let metrics_bind = std::env::var("PERFDESK_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse PERFDESK_METRICS_BIND")?;
        let leeway_secs = match std::env::var("PERFDESK_TOKEN_LEEWAY_SECS") {
            Ok(value) => value
                .parse()
                .with_context(|| "parse PERFDESK_TOKEN_LEEWAY_SECS")?,
            Err(_) => 30,
        };
        let anonymous_feedback_enabled = match std::env::var("PERFDESK_ANONYMOUS_FEEDBACK") {
            Ok(value) => parse_flag(&value).with_context(|| "parse PERFDESK_ANONYMOUS_FEEDBACK")?,
            Err(_) => true,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            token: TokenConfig {
                secret: std::env::var("PERFDESK_TOKEN_SECRET").unwrap_or_default(),
                issuer: std::env::var("PERFDESK_TOKEN_ISSUER")
                    .unwrap_or_else(|_| "perfdesk-identity".to_string()),
                audience: std::env::var("PERFDESK_TOKEN_AUDIENCE")
                    .unwrap_or_else(|_| "perfdesk-console".to_string()),
                leeway_secs,
            },
            anonymous_feedback_enabled,
            seed_users_path: std::env::var("PERFDESK_SEED_USERS").ok().map(PathBuf::from),
        })
    }

    fn apply(&mut self, override_cfg: ConsoleConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.token_secret {
            self.token.secret = value;
        }
        if let Some(value) = override_cfg.token_issuer {
            self.token.issuer = value;
        }
        if let Some(value) = override_cfg.token_audience {
            self.token.audience = value;
        }
        if let Some(value) = override_cfg.token_leeway_secs {
            self.token.leeway_secs = value;
        }
        if let Some(value) = override_cfg.anonymous_feedback_enabled {
            self.anonymous_feedback_enabled = value;
        }
        if let Some(value) = override_cfg.seed_users_path {
            self.seed_users_path = Some(value);
        }
        Ok(())
    }

    fn validated(self) -> Result<Self> {
        if self.token.secret.trim().is_empty() {
            bail!("PERFDESK_TOKEN_SECRET (or token_secret) is required");
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

/// Read the directory seed file: a YAML list of users.
pub fn load_seed_users(path: &Path) -> Result<Vec<User>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read seed users: {}", path.display()))?;
    let users: Vec<User> =
        serde_yaml::from_str(&contents).with_context(|| "parse seed users yaml")?;
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdesk_common::{Role, UserId};
    use serial_test::serial;
    use std::io::Write;

    const KEYS: [&str; 9] = [
        "PERFDESK_BIND",
        "PERFDESK_METRICS_BIND",
        "PERFDESK_TOKEN_SECRET",
        "PERFDESK_TOKEN_ISSUER",
        "PERFDESK_TOKEN_AUDIENCE",
        "PERFDESK_TOKEN_LEEWAY_SECS",
        "PERFDESK_ANONYMOUS_FEEDBACK",
        "PERFDESK_SEED_USERS",
        "PERFDESK_CONFIG",
    ];

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    fn clean_env() -> Vec<EnvGuard> {
        KEYS.iter().map(|key| EnvGuard::unset(key)).collect()
    }

    #[test]
    #[serial]
    fn defaults_apply_when_only_secret_is_set() {
        let _clean = clean_env();
        let _secret = EnvGuard::set("PERFDESK_TOKEN_SECRET", "s3cret");

        let config = ConsoleConfig::from_env().expect("config");
        assert_eq!(config.bind_addr, "0.0.0.0:8443".parse().expect("addr"));
        assert_eq!(config.metrics_bind, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(config.token.issuer, "perfdesk-identity");
        assert_eq!(config.token.audience, "perfdesk-console");
        assert_eq!(config.token.leeway_secs, 30);
        assert!(config.anonymous_feedback_enabled);
        assert!(config.seed_users_path.is_none());
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    #[serial]
    fn missing_secret_is_rejected() {
        let _clean = clean_env();
        let err = ConsoleConfig::from_env().expect_err("secret required");
        assert!(err.to_string().contains("PERFDESK_TOKEN_SECRET"));
    }

    #[test]
    #[serial]
    fn bad_values_name_the_variable() {
        let _clean = clean_env();
        let _secret = EnvGuard::set("PERFDESK_TOKEN_SECRET", "s3cret");
        let _flag = EnvGuard::set("PERFDESK_ANONYMOUS_FEEDBACK", "sometimes");
        let err = ConsoleConfig::from_env().expect_err("bad flag");
        assert!(format!("{err:#}").contains("PERFDESK_ANONYMOUS_FEEDBACK"));

        let _flag = EnvGuard::set("PERFDESK_ANONYMOUS_FEEDBACK", "off");
        let _bind = EnvGuard::set("PERFDESK_BIND", "not-an-addr");
        let err = ConsoleConfig::from_env().expect_err("bad bind");
        assert!(format!("{err:#}").contains("PERFDESK_BIND"));
    }

    #[test]
    #[serial]
    fn yaml_overlay_overrides_env() {
        let _clean = clean_env();
        let _secret = EnvGuard::set("PERFDESK_TOKEN_SECRET", "from-env");
        let _flag = EnvGuard::set("PERFDESK_ANONYMOUS_FEEDBACK", "true");

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "bind_addr: 127.0.0.1:9000\ntoken_secret: from-yaml\ntoken_leeway_secs: 5\nanonymous_feedback_enabled: false\nseed_users_path: /etc/perfdesk/users.yaml"
        )
        .expect("write yaml");
        let path = file.path().to_string_lossy().to_string();
        let _config = EnvGuard::set("PERFDESK_CONFIG", &path);

        let config = ConsoleConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(config.token.secret, "from-yaml");
        assert_eq!(config.token.leeway_secs, 5);
        assert!(!config.anonymous_feedback_enabled);
        assert_eq!(
            config.seed_users_path,
            Some(PathBuf::from("/etc/perfdesk/users.yaml"))
        );
    }

    #[test]
    fn seed_users_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "- id: m1\n  name: Mia\n  role: MANAGER\n  department: IT\n- id: a1\n  name: Ada\n  email: ada@example.com\n  role: ADMIN"
        )
        .expect("write yaml");

        let users = load_seed_users(file.path()).expect("users");
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, UserId::new("m1"));
        assert_eq!(users[0].role, Role::Manager);
        assert_eq!(users[0].department.as_ref().map(|d| d.as_str()), Some("IT"));
        assert!(users[1].department.is_none());
    }
}
