use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret. Token operations fail while this is unset.
    pub secret: Option<String>,
    /// Token lifetime. `None` issues tokens without an `exp` claim.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match non_empty(var("DATABASE_URL")) {
            Some(url) => url,
            None => {
                let user = non_empty(var("DB_USER"))
                    .context("DATABASE_URL or DB_USER must be set")?;
                let pass = non_empty(var("DB_PASS"))
                    .context("DATABASE_URL or DB_PASS must be set")?;
                let host = non_empty(var("DB_HOST")).unwrap_or_else(|| "localhost:5432".into());
                let name = non_empty(var("DB_NAME")).unwrap_or_else(|| "users".into());
                format!("postgres://{user}:{pass}@{host}/{name}")
            }
        };

        let jwt = JwtConfig {
            secret: non_empty(var("SECRET")).or_else(|| non_empty(var("JWT_SECRET"))),
            ttl_minutes: match non_empty(var("JWT_TTL_MINUTES")) {
                Some(v) => Some(
                    v.parse::<i64>()
                        .context("JWT_TTL_MINUTES must be a whole number of minutes")?,
                )
                .filter(|m| *m > 0),
                None => None,
            },
        };

        let port = match var("APP_PORT") {
            Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 3000,
        };

        Ok(Self {
            database_url,
            jwt,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn database_url_wins_over_parts() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://a:b@db/x"),
            ("DB_USER", "ignored"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://a:b@db/x");
    }

    #[test]
    fn database_url_built_from_credentials() {
        let cfg = load(&[("DB_USER", "app"), ("DB_PASS", "pw")]).unwrap();
        assert_eq!(cfg.database_url, "postgres://app:pw@localhost:5432/users");
    }

    #[test]
    fn missing_store_credentials_is_an_error() {
        let err = load(&[("DB_USER", "app")]).unwrap_err();
        assert!(err.to_string().contains("DB_PASS"));
    }

    #[test]
    fn secret_and_ttl_are_optional() {
        let cfg = load(&[("DATABASE_URL", "postgres://x")]).unwrap();
        assert!(cfg.jwt.secret.is_none());
        assert!(cfg.jwt.ttl_minutes.is_none());
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
    }

    #[test]
    fn secret_falls_back_to_jwt_secret() {
        let cfg = load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s3")]).unwrap();
        assert_eq!(cfg.jwt.secret.as_deref(), Some("s3"));

        let cfg = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("SECRET", "primary"),
            ("JWT_SECRET", "s3"),
        ])
        .unwrap();
        assert_eq!(cfg.jwt.secret.as_deref(), Some("primary"));
    }

    #[test]
    fn non_positive_ttl_means_no_expiry() {
        let cfg = load(&[("DATABASE_URL", "postgres://x"), ("JWT_TTL_MINUTES", "0")]).unwrap();
        assert!(cfg.jwt.ttl_minutes.is_none());

        let cfg = load(&[("DATABASE_URL", "postgres://x"), ("JWT_TTL_MINUTES", "15")]).unwrap();
        assert_eq!(cfg.jwt.ttl_minutes, Some(15));
    }

    #[test]
    fn unparsable_ttl_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("JWT_TTL_MINUTES", "15m")]).unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_MINUTES"));

        let cfg = load(&[("DATABASE_URL", "postgres://x"), ("JWT_TTL_MINUTES", "")]).unwrap();
        assert!(cfg.jwt.ttl_minutes.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(load(&[("DATABASE_URL", "postgres://x"), ("APP_PORT", "http")]).is_err());
    }
}
