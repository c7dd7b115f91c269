use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

use crate::rules::employee::{EmployeePolicy, normalize_email};
use crate::rules::{ANNUAL_PAID_ALLOWANCE, LeavePolicy};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Bootstrap HR account and leave rules
    pub hr_email: String,
    pub hr_password: String,
    pub email_domain: String,
    pub annual_paid_allowance: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed(&lookup, "ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed(&lookup, "REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parsed(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parsed(&lookup, "RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: or_default("API_PREFIX", "/api"),

            hr_email: normalize_email(&or_default("HR_EMAIL", "hr@pal.tech")),
            hr_password: required("HR_PASSWORD")?,
            email_domain: or_default("EMAIL_DOMAIN", "@pal.tech").to_lowercase(),
            annual_paid_allowance: parsed(&lookup, "ANNUAL_PAID_ALLOWANCE", ANNUAL_PAID_ALLOWANCE)?,

            log_dir: or_default("LOG_DIR", "logs"),
            log_level: parsed(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }

    pub fn leave_policy(&self) -> LeavePolicy {
        LeavePolicy::new(self.annual_paid_allowance)
    }

    pub fn employee_policy(&self) -> EmployeePolicy {
        EmployeePolicy {
            email_domain: self.email_domain.clone(),
            hr_email: self.hr_email.clone(),
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
    }
}
