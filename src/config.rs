// Copyright 2020 Cognite AS

//! Convenient configuration glue.
//!
//! This module grabs configuration settings from the environment in an
//! easy-to-hand-off fashion. It is loosely coupled so that apps using
//! different configuration mechanisms are not required to use it or even
//! implement a trait.

use std::env;

#[derive(Debug, Default)]
pub struct EnvironmentConfig {
    pub api_url: String,
    pub routes: Vec<(String, String)>,
    pub user_agent: Option<String>,
}

impl EnvironmentConfig {
    /// Retrieve a configuration from environment variables.
    ///
    /// TRANSPORTER_API_URL: <http://host.example.com:1234/api>
    /// TRANSPORTER_ROUTES: unset | User=users,Order=users/%@/orders
    /// TRANSPORTER_USER_AGENT: unset | my-app/1.0
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut result = EnvironmentConfig::default();
        if let Ok(api_url) = env::var("TRANSPORTER_API_URL") {
            result.api_url = api_url;
        } else {
            return Err(anyhow::anyhow!("TRANSPORTER_API_URL not set").into());
        };
        if let Ok(routes) = env::var("TRANSPORTER_ROUTES") {
            result.routes = parse_routes(&routes)?;
        }
        result.user_agent = env::var("TRANSPORTER_USER_AGENT").ok();
        Ok(result)
    }
}

type ConfigError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn parse_routes(routes: &str) -> Result<Vec<(String, String)>, ConfigError> {
    routes
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, String), ConfigError> {
            match entry.split_once('=') {
                Some((name, template)) if !name.trim().is_empty() => {
                    Ok((name.trim().to_string(), template.trim().to_string()))
                }
                _ => Err(anyhow::anyhow!("TRANSPORTER_ROUTES: malformed entry {entry:?}").into()),
            }
        })
        .collect()
}
