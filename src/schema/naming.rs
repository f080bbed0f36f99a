use serde::{Deserialize, Serialize};

/// How model property and type names become table and column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Use names as declared.
    #[default]
    Default,
    /// `firstName` becomes `first_name`, `OrderItem` becomes `order_item`.
    SnakeCase,
}

impl NamingStrategy {
    #[must_use]
    pub fn table_name(self, name: &str) -> String {
        self.apply(name)
    }

    #[must_use]
    pub fn column_name(self, name: &str) -> String {
        self.apply(name)
    }

    fn apply(self, name: &str) -> String {
        match self {
            NamingStrategy::Default => name.to_string(),
            NamingStrategy::SnakeCase => to_snake_case(name),
        }
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// SQL flavor the schema collaborator generates text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
}

/// Settings handed to a connection's schema collaborator when it is built.
///
/// ```rust
/// use sqlbind::prelude::*;
///
/// let config: SchemaConfig =
///     serde_json::from_str(r#"{ "dialect": "sqlite", "naming": "snake_case" }"#).unwrap();
/// assert_eq!(config.naming, NamingStrategy::SnakeCase);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub naming: NamingStrategy,
}

impl SchemaConfig {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            naming: NamingStrategy::Default,
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_names() {
        let naming = NamingStrategy::SnakeCase;
        assert_eq!(naming.column_name("firstName"), "first_name");
        assert_eq!(naming.table_name("OrderItem"), "order_item");
        assert_eq!(naming.column_name("id"), "id");
        assert_eq!(naming.column_name("address2Line"), "address2_line");
    }

    #[test]
    fn default_keeps_names() {
        assert_eq!(NamingStrategy::Default.column_name("firstName"), "firstName");
    }
}
