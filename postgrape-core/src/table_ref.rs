use std::borrow::Cow;

pub const DEFAULT_SCHEMA: &str = "public";

/// Schema qualified table, fixed for the lifetime of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: Cow<'static, str>,
    pub schema: Cow<'static, str>,
}

impl TableRef {
    pub fn new(schema: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
        }
    }

    /// Resolve the schema: explicit one, then the configured default, then `public`.
    pub fn resolve(options: RepositoryOptions, config: &RepositoryConfig) -> Self {
        let schema = options
            .schema
            .filter(|v| !v.is_empty())
            .or_else(|| config.default_schema.clone().filter(|v| !v.is_empty()))
            .unwrap_or(Cow::Borrowed(DEFAULT_SCHEMA));
        Self {
            name: options.table,
            schema,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Table a repository is bound to, converts from the bare table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub table: Cow<'static, str>,
    pub schema: Option<Cow<'static, str>>,
}

impl RepositoryOptions {
    pub fn new(table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: table.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<Cow<'static, str>>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl From<&'static str> for RepositoryOptions {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RepositoryOptions {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub default_schema: Option<Cow<'static, str>>,
}
