//! Schema: the identity of a logical row.
//!
//! A schema names a namespace inside the index and declares which column holds
//! the primary key and how that key is encoded.

use serde::{Deserialize, Serialize};

use crate::name::{assert_valid_column_name, assert_valid_schema_name};
use crate::{Error, Result};

/// The closed set of primary-key types.
///
/// Each type has an order-preserving binary encoding; see [`crate::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// 32-bit signed integer, 4 bytes.
    Integer,
    /// 64-bit signed integer, 8 bytes.
    Long,
    /// 32-bit float, 4 bytes.
    Float,
    /// 64-bit float, 8 bytes.
    Double,
    /// Milliseconds since the Unix epoch, 8 bytes.
    Date,
    /// Unicode text ordered by code point, variable length.
    UnicodeText,
    /// ASCII-only text, variable length.
    AsciiText,
}

impl KeyType {
    /// Returns the encoded width for fixed-width types, `None` for text.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            KeyType::Integer | KeyType::Float => Some(4),
            KeyType::Long | KeyType::Double | KeyType::Date => Some(8),
            KeyType::UnicodeText | KeyType::AsciiText => None,
        }
    }

    /// Returns true for the variable-length text types.
    pub fn is_text(self) -> bool {
        self.fixed_width().is_none()
    }
}

/// Declares the namespace, primary-key column and primary-key type of a row store.
///
/// # Example
///
/// ```
/// use sparsedb::{KeyType, Schema};
///
/// let schema = Schema::new("employee", "id", KeyType::Integer).unwrap();
/// assert_eq!(schema.schema_bytes(), b"employee\0".to_vec());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    primary_key: String,
    primary_key_type: KeyType,
}

impl Schema {
    /// Creates a schema, validating the schema and primary-key column names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either name is empty or contains NUL.
    pub fn new(
        name: impl Into<String>,
        primary_key: impl Into<String>,
        primary_key_type: KeyType,
    ) -> Result<Self> {
        let schema =
            Self { name: name.into(), primary_key: primary_key.into(), primary_key_type };
        schema.validate()?;
        Ok(schema)
    }

    /// Loads a schema from its JSON definition.
    ///
    /// ```
    /// use sparsedb::{KeyType, Schema};
    ///
    /// let schema = Schema::from_json(
    ///     r#"{"name":"employee","primary_key":"id","primary_key_type":"Long"}"#,
    /// ).unwrap();
    /// assert_eq!(schema.primary_key_type(), KeyType::Long);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serializes the schema definition to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        assert_valid_schema_name(&self.name)?;
        assert_valid_column_name(&self.primary_key).map_err(|e| {
            Error::invalid_argument(format!("invalid primary key column: {}", e))
        })
    }

    /// Returns the schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the primary-key column.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the primary-key type.
    pub fn primary_key_type(&self) -> KeyType {
        self.primary_key_type
    }

    /// Returns the encoded namespace prefix: `utf8(name) ‖ 0x00`.
    pub fn schema_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.name.len() + 1);
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(0);
        buf
    }

    /// Returns the first key after every key in this schema's namespace.
    pub(crate) fn namespace_end(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.name.len() + 1);
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(1);
        buf
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}: {:?})", self.name, self.primary_key, self.primary_key_type)
    }
}
