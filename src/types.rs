/// Core data structures for account resolution and report dispatch
///
/// These values are built fresh on every invocation and never persisted.
use crate::error::ToolError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Static table of `environment -> category -> account number`.
///
/// Loaded once per run (see `config::load_account_mapping`) and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AccountMapping {
    environments: BTreeMap<String, BTreeMap<String, AccountNumber>>,
}

impl AccountMapping {
    /// Look up the account number for one category of one environment.
    ///
    /// Returns `Err` with the configuration message when either level is missing.
    pub fn account_for(&self, environment: &str, category: &str) -> Result<String, ToolError> {
        let categories = self
            .environments
            .get(environment)
            .ok_or_else(|| ToolError::Config(format!("Unknown environment '{}'", environment)))?;

        categories.get(category).map(|a| a.to_string()).ok_or_else(|| {
            ToolError::Config(format!("Unknown account type '{}' for environment '{}'", category, environment))
        })
    }

    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.contains_key(environment)
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(|k| k.as_str())
    }
}

/// An account number as written in YAML.
///
/// Quoted values keep leading zeros; bare integers are accepted too and
/// rendered in decimal (so a leading zero is lost unless quoted).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AccountNumber {
    Text(String),
    Number(u64),
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountNumber::Text(s) => f.write_str(s),
            AccountNumber::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Distinct top-level directories of a changed-file list, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFileSet {
    directories: Vec<String>,
}

impl ChangedFileSet {
    /// Insert a directory; duplicates are ignored.
    pub fn insert(&mut self, directory: &str) -> bool {
        if self.contains(directory) {
            return false;
        }
        self.directories.push(directory.to_string());
        true
    }

    pub fn contains(&self, directory: &str) -> bool {
        self.directories.iter().any(|d| d == directory)
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(|d| d.as_str())
    }
}

impl fmt::Display for ChangedFileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.directories.join(", "))
    }
}

/// Outcome of resolving changed files against the account mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// One account number per recognized category, in category order.
    Accounts(Vec<String>),
    /// No recognized directory among the changed files; dependent steps should be skipped.
    NoMapping { directories: ChangedFileSet },
}

/// Sentinel emitted as `account_number` when nothing maps.
pub const SKIP_SENTINEL: &str = "SKIP";

impl Resolution {
    /// Comma-joined account list, or the skip sentinel.
    pub fn account_number(&self) -> String {
        match self {
            Resolution::Accounts(numbers) => numbers.join(","),
            Resolution::NoMapping { .. } => SKIP_SENTINEL.to_string(),
        }
    }

    pub fn mapping_found(&self) -> bool {
        matches!(self, Resolution::Accounts(_))
    }

    /// The `key=value` lines consumed by the calling workflow.
    pub fn output_lines(&self) -> [String; 2] {
        [format!("account_number={}", self.account_number()), format!("mapping_found={}", self.mapping_found())]
    }
}

/// Declared type of the report payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Json,
    Markdown,
}

impl DataType {
    /// Output file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DataType::Json => "pdf",
            DataType::Markdown => "html",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Json => "json",
            DataType::Markdown => "markdown",
        }
    }
}

impl FromStr for DataType {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DataType::Json),
            "markdown" => Ok(DataType::Markdown),
            other => Err(ToolError::Config(format!("Unsupported data type: {}", other))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_file_set_dedupes_in_order() {
        let mut set = ChangedFileSet::default();
        assert!(set.insert("tests"));
        assert!(set.insert("src"));
        assert!(!set.insert("tests"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["tests", "src"]);
        assert_eq!(set.to_string(), "{tests, src}");
    }

    #[test]
    fn test_resolution_output_lines() {
        let found = Resolution::Accounts(vec!["123".to_string(), "987".to_string()]);
        assert_eq!(found.output_lines(), ["account_number=123,987".to_string(), "mapping_found=true".to_string()]);

        let skipped = Resolution::NoMapping { directories: ChangedFileSet::default() };
        assert_eq!(skipped.output_lines(), ["account_number=SKIP".to_string(), "mapping_found=false".to_string()]);
    }

    #[test]
    fn test_data_type_parsing() {
        assert_eq!("json".parse::<DataType>().unwrap(), DataType::Json);
        assert_eq!("Markdown".parse::<DataType>().unwrap(), DataType::Markdown);
        assert_eq!(DataType::Json.extension(), "pdf");
        assert_eq!(DataType::Markdown.extension(), "html");

        let err = "xml".parse::<DataType>().unwrap_err();
        assert!(matches!(err, ToolError::Config(_)));
        assert!(err.to_string().contains("Unsupported data type: xml"));
    }

    #[test]
    fn test_account_lookup_errors_are_distinct() {
        let mapping: AccountMapping = serde_yaml::from_str("dev:\n  src: \"123\"\n").unwrap();
        assert_eq!(mapping.account_for("dev", "src").unwrap(), "123");

        let env_err = mapping.account_for("prod", "src").unwrap_err().to_string();
        assert!(env_err.contains("Unknown environment 'prod'"));

        let cat_err = mapping.account_for("dev", "tests").unwrap_err().to_string();
        assert!(cat_err.contains("Unknown account type 'tests'"));
    }
}
