use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub question_bank_path: PathBuf,
    pub results_dir: PathBuf,
    pub quiz_duration_seconds: u64,
    pub question_count: usize,
    pub expiry_policy: ExpiryPolicy,
    pub expiry_sweep_seconds: u64,
}

/// What happens to an active session once its countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// The countdown is informational; the candidate may keep answering.
    #[default]
    AllowContinue,
    /// The session is submitted as soon as it is observed past its deadline.
    AutoSubmit,
}

impl FromStr for ExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow_continue" => Ok(ExpiryPolicy::AllowContinue),
            "auto_submit" => Ok(ExpiryPolicy::AutoSubmit),
            other => Err(format!(
                "unknown policy '{}', expected 'allow_continue' or 'auto_submit'",
                other
            )),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            question_bank_path: PathBuf::from(get_env("QUESTION_BANK_PATH")?),
            results_dir: PathBuf::from(
                env::var("RESULTS_DIR").unwrap_or_else(|_| "TechnicalResults".to_string()),
            ),
            quiz_duration_seconds: get_env_parse_or("QUIZ_DURATION_SECONDS", 60 * 60)?,
            question_count: get_env_parse_or("QUESTION_COUNT", 15)?,
            expiry_policy: get_env_parse_or("EXPIRY_POLICY", ExpiryPolicy::AllowContinue)?,
            expiry_sweep_seconds: get_env_parse_or("EXPIRY_SWEEP_SECONDS", 30)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_policy_parses_known_values() {
        assert_eq!("allow_continue".parse::<ExpiryPolicy>(), Ok(ExpiryPolicy::AllowContinue));
        assert_eq!(" AUTO_SUBMIT ".parse::<ExpiryPolicy>(), Ok(ExpiryPolicy::AutoSubmit));
        assert!("sometimes".parse::<ExpiryPolicy>().is_err());
    }
}
