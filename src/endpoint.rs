// Copyright 2022 Cognite AS
//! Where requests go: the base API URL and the model → segment mapping.
use std::collections::HashMap;

use url::Url;

use crate::config::EnvironmentConfig;
use crate::error::Error;

/// The routing capability a [`crate::Client`] is built with.
///
/// The client owns its endpoint for its whole life and never mutates it, so
/// implementations only need to be safe for concurrent reads.
pub trait Endpoint: Send + Sync {
    fn api_url(&self) -> &Url;

    /// The segment template for a model. When `controller` is given it takes
    /// precedence over `type_name`. Templates may contain `%@` placeholders.
    fn segment_for(&self, type_name: &str, controller: Option<&str>) -> String;
}

/// Fallback rule for names with no explicit route.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Naming {
    /// `OrderItem` → `order_items`. Names already ending in `s` are taken
    /// as plural and left alone, so `Status` → `status`; route such types
    /// explicitly.
    #[default]
    Plural,
    /// `OrderItem` → `order_item`
    Snake,
    /// `OrderItem` → `OrderItem`
    Verbatim,
}

impl Naming {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Naming::Plural => {
                let mut segment = snake_case(name);
                if !segment.ends_with('s') {
                    segment.push('s');
                }
                segment
            }
            Naming::Snake => snake_case(name),
            Naming::Verbatim => name.into(),
        }
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// An explicit table from model (or controller) name to segment template.
#[derive(Clone, Debug)]
pub struct RouteTable {
    api_url: Url,
    routes: HashMap<String, String>,
    naming: Naming,
}

impl RouteTable {
    pub fn new(api_url: &str) -> Result<Self, Error> {
        let api_url = Url::parse(api_url).map_err(|source| Error::InvalidUrl {
            url: api_url.into(),
            source,
        })?;
        Ok(Self {
            api_url,
            routes: HashMap::new(),
            naming: Naming::default(),
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, Error> {
        let mut table = Self::new(&config.api_url)?;
        for (name, template) in &config.routes {
            table.routes.insert(name.clone(), template.clone());
        }
        Ok(table)
    }

    pub fn route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.routes.insert(name.into(), template.into());
        self
    }

    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }
}

impl Endpoint for RouteTable {
    fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn segment_for(&self, type_name: &str, controller: Option<&str>) -> String {
        let key = controller.unwrap_or(type_name);
        match self.routes.get(key) {
            Some(template) => template.clone(),
            None => self.naming.apply(key),
        }
    }
}
