use crate::domain::ports::UrlResolver;
use crate::utils::error::{Result, TableError};
use crate::utils::validation::validate_route_name;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoutePattern {
    pattern: String,
    params: Vec<String>,
}

/// Named URL patterns such as `dcim:rack` -> `/dcim/racks/{pk}/`.
///
/// Placeholders are filled positionally, in the order they appear in the
/// pattern.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base: String,
    routes: HashMap<String, RoutePattern>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix prepended to every reversed URL, e.g. `https://netbox.example.com`.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn route(mut self, name: &str, pattern: &str) -> Result<Self> {
        self.insert(name, pattern)?;
        Ok(self)
    }

    pub fn insert(&mut self, name: &str, pattern: &str) -> Result<()> {
        validate_route_name("routes", name)?;

        let re = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            TableError::ConfigValidationError {
                field: "routes".to_string(),
                message: e.to_string(),
            }
        })?;
        let params: Vec<String> = re
            .captures_iter(pattern)
            .map(|caps| caps[1].to_string())
            .collect();

        let stripped = re.replace_all(pattern, "");
        if stripped.contains('{') || stripped.contains('}') {
            return Err(TableError::InvalidConfigValueError {
                field: format!("routes.{}", name),
                value: pattern.to_string(),
                reason: "Malformed placeholder".to_string(),
            });
        }

        tracing::debug!("Registered route {} -> {} ({} params)", name, pattern, params.len());
        self.routes.insert(
            name.to_string(),
            RoutePattern {
                pattern: pattern.to_string(),
                params,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl UrlResolver for RouteTable {
    fn reverse(&self, route: &str, args: &[String]) -> Result<String> {
        let pattern = self.routes.get(route).ok_or_else(|| TableError::UnknownRoute {
            route: route.to_string(),
        })?;

        if pattern.params.len() != args.len() {
            return Err(TableError::RouteArity {
                route: route.to_string(),
                expected: pattern.params.len(),
                actual: args.len(),
            });
        }

        let mut url = pattern.pattern.clone();
        for (param, value) in pattern.params.iter().zip(args) {
            url = url.replacen(&format!("{{{}}}", param), &encode_segment(value), 1);
        }

        Ok(format!("{}{}", self.base, url))
    }

    fn arity(&self, route: &str) -> Option<usize> {
        self.routes.get(route).map(|p| p.params.len())
    }
}

/// Percent-encodes characters that cannot appear in a path segment.
fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
