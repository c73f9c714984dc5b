//! Name validation for schema and column names.
//!
//! Column names are NUL-terminated inside composite keys, so a NUL inside a
//! name would make the key undecodable and break the within-row ordering.

use crate::{Error, Result};

/// Fails with [`Error::InvalidColumnName`] when `name` is empty or contains NUL.
pub fn assert_valid_column_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidColumnName("column name must not be empty".to_string()));
    }
    if name.as_bytes().contains(&0) {
        return Err(Error::InvalidColumnName(format!(
            "column name must not contain NUL: {:?}",
            name
        )));
    }
    Ok(())
}

/// Fails with [`Error::InvalidArgument`] when a schema name is empty or contains NUL.
pub fn assert_valid_schema_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("schema name must not be empty"));
    }
    if name.as_bytes().contains(&0) {
        return Err(Error::invalid_argument(format!(
            "schema name must not contain NUL: {:?}",
            name
        )));
    }
    Ok(())
}
