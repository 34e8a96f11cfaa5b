/// Account resolution module
///
/// This module handles:
/// - Extracting top-level directories from a changed-file list
/// - Filtering them down to the recognized categories
/// - Resolving each category to an account number for the target environment
use crate::error::ToolError;
use crate::types::{AccountMapping, ChangedFileSet, Resolution};
use log::{debug, info};

/// Directories that map to an account category. The category name equals the directory name.
pub const RECOGNIZED_DIRECTORIES: [&str; 2] = ["src", "tests"];

/// Extract the first path segment of every changed file.
///
/// Tokens are separated by any whitespace. Files at the repository root
/// (no `/` in the token) carry no directory and are ignored.
pub fn extract_directories(changed_files: &str) -> ChangedFileSet {
    let mut directories = ChangedFileSet::default();

    for file_path in changed_files.split_whitespace() {
        if let Some((first, _rest)) = file_path.split_once('/') {
            if !first.is_empty() {
                directories.insert(first);
            }
        }
    }

    directories
}

/// Keep only the directories that name a known category, in first-seen order.
pub fn recognized_categories(directories: &ChangedFileSet) -> Vec<&'static str> {
    directories
        .iter()
        .filter_map(|dir| RECOGNIZED_DIRECTORIES.iter().find(|known| **known == dir).copied())
        .collect()
}

/// Resolve changed files to account numbers for `environment`.
///
/// "Nothing recognized" is checked first and is not an error, even for an
/// unknown environment. Once at least one category is present, a missing
/// environment or category is a configuration error.
pub fn resolve_accounts(
    mapping: &AccountMapping,
    environment: &str,
    changed_files: &str,
) -> Result<Resolution, ToolError> {
    let directories = extract_directories(changed_files);
    let categories = recognized_categories(&directories);

    if directories.is_empty() {
        debug!("Changed file list is empty or has only top-level files");
    }
    debug!("Directories found ({}): {}", directories.len(), directories);
    debug!("Account types: {:?}", categories);

    if categories.is_empty() {
        info!("No matching directory found in changed files. Found directories: {}", directories);
        return Ok(Resolution::NoMapping { directories });
    }

    if !mapping.has_environment(environment) {
        let known: Vec<&str> = mapping.environments().collect();
        debug!("Known environments: {:?}", known);
    }

    let numbers = categories
        .iter()
        .map(|category| mapping.account_for(environment, category))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Environment: {}", environment);
    info!("Account numbers: {:?}", numbers);

    Ok(Resolution::Accounts(numbers))
}

#[cfg(test)]
#[path = "accounts_test.rs"]
mod accounts_test;
