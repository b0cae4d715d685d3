#[macro_use]
extern crate serde;
extern crate log;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
pub mod testutil;

/// Custom error type.
#[derive(Debug, Clone, PartialEq)]
pub enum SymqlError {
    /// IO Errors.
    IOError(String),
    /// Table could not be created (bad arguments, schema problems).
    SetupError(String),
    /// Allocation failure. Recoverable by the host.
    OutOfMemory,
    /// Validation errors.
    ValidationError(String),
    /// Execution errors.
    ExecutionError(String),
    /// A remote record could not be decoded.
    DecodeError(String),
    /// The remote stream failed or ended before its terminal message.
    TransportError(String),
}

impl fmt::Display for SymqlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SymqlError::ValidationError(s) => format!("Validation Error: {}", s),
                SymqlError::ExecutionError(s) => format!("Execution Error: {}", s),
                SymqlError::SetupError(s) => format!("Setup Error: {}", s),
                SymqlError::DecodeError(s) => format!("Decode Error: {}", s),
                SymqlError::TransportError(s) => format!("Transport Error: {}", s),
                SymqlError::IOError(s) => s.to_string(),
                SymqlError::OutOfMemory => String::from("Out of memory"),
            }
        )
    }
}

// Implement std::convert::From for AppError; from io::Error
impl From<io::Error> for SymqlError {
    fn from(error: io::Error) -> Self {
        SymqlError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for SymqlError {
    fn from(error: serde_json::Error) -> Self {
        SymqlError::DecodeError(error.to_string())
    }
}

impl Error for SymqlError {}

/// Handle schemas.
#[derive(PartialEq, Clone, Debug)]
pub struct TableSchema {
    /// Attributes of the schema.
    attributes: Vec<Attribute>,
    /// Mapping from attribute name to order in the schema.
    name_map: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a new schema.
    ///
    /// # Arguments
    ///
    /// * `attributes` - Attributes of the schema in the order that they are in the schema.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut name_map = HashMap::new();
        for (i, attr) in attributes.iter().enumerate() {
            name_map.insert(attr.name().to_lowercase(), i);
        }
        Self {
            attributes,
            name_map,
        }
    }

    /// Create a new schema with the given names and dtypes.
    ///
    /// # Arguments
    ///
    /// * `names` - Names of the new schema.
    /// * `dtypes` - Dypes of the new schema.
    pub fn from_vecs(names: Vec<&str>, dtypes: Vec<DataType>) -> Self {
        let mut attrs = Vec::new();
        for (name, dtype) in names.iter().zip(dtypes.iter()) {
            attrs.push(Attribute::new(name.to_string(), dtype.clone()));
        }
        TableSchema::new(attrs)
    }

    /// Get the attribute from the given index.
    ///
    /// # Arguments
    ///
    /// * `i` - Index of the attribute to look for.
    pub fn get_attribute(&self, i: usize) -> Option<&Attribute> {
        self.attributes.get(i)
    }

    /// Get the index of the attribute. Column names are matched case-insensitively.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the attribute to get the index for.
    pub fn get_field_index(&self, name: &str) -> Option<&usize> {
        self.name_map.get(&name.to_lowercase())
    }

    /// Check if the attribute name is in the schema.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the attribute to look for.
    pub fn contains(&self, name: &str) -> bool {
        self.name_map.contains_key(&name.to_lowercase())
    }

    /// Get an iterator of the attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Returns the length of the schema.
    pub fn size(&self) -> usize {
        self.attributes.len()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<String> = self
            .attributes
            .iter()
            .map(|a| format!("{} {}", a.name(), a.dtype()))
            .collect();
        write!(f, "({})", cols.join(", "))
    }
}

/// Handle attributes. Pairs the name with the dtype.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute dtype.
    pub dtype: DataType,
}

impl Attribute {
    /// Create a new attribute with the given name and dtype.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the attribute.
    /// * `dtype` - Dtype of the attribute.
    pub fn new(name: String, dtype: DataType) -> Self {
        Self { name, dtype }
    }

    /// Returns the name of the attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dtype of the attribute.
    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }
}

/// Enumerate the supported dtypes.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub enum DataType {
    Int,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

/// For each of the dtypes, make sure that there is a corresponding field type.
/// Any column may also be null.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Hash)]
pub enum Field {
    Null,
    IntField(i64),
    TextField(String),
}

impl Field {
    /// Boolean columns are stored as 0/1 integers; an unknown value is null.
    pub fn from_bool(value: Option<bool>) -> Self {
        match value {
            Some(b) => Field::IntField(b as i64),
            None => Field::Null,
        }
    }

    /// Returns true for the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns the integer value. Text that parses as an integer is accepted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::IntField(i) => Some(*i),
            Field::TextField(s) => s.trim().parse::<i64>().ok(),
            Field::Null => None,
        }
    }

    /// Returns the text value, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::TextField(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values the way SQL does: anything compared with null is unknown,
    /// and integers sort before text.
    ///
    /// # Arguments
    ///
    /// * `other` - Value to compare against.
    pub fn sql_cmp(&self, other: &Field) -> Option<Ordering> {
        match (self, other) {
            (Field::Null, _) | (_, Field::Null) => None,
            (Field::IntField(a), Field::IntField(b)) => Some(a.cmp(b)),
            (Field::TextField(a), Field::TextField(b)) => Some(a.cmp(b)),
            (Field::IntField(_), Field::TextField(_)) => Some(Ordering::Less),
            (Field::TextField(_), Field::IntField(_)) => Some(Ordering::Greater),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Null => write!(f, "NULL"),
            Field::IntField(x) => write!(f, "{}", x),
            Field::TextField(x) => write!(f, "{}", x),
        }
    }
}

/// Row type. One row is produced per decoded remote record.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Row {
    /// Row data.
    pub field_vals: Vec<Field>,
    /// Synthesized row identity.
    pub row_id: i64,
}

impl Row {
    /// Create a new row with the given data.
    ///
    /// # Arguments
    ///
    /// * `field_vals` - Field values of the row.
    /// * `row_id` - Identity of the row.
    pub fn new(field_vals: Vec<Field>, row_id: i64) -> Self {
        Self { field_vals, row_id }
    }

    /// Get the field at index.
    ///
    /// # Arguments
    ///
    /// * `i` - Index of the field.
    pub fn get_field(&self, i: usize) -> Option<&Field> {
        self.field_vals.get(i)
    }

    /// Returns an iterator over the field values.
    pub fn field_vals(&self) -> impl Iterator<Item = &Field> {
        self.field_vals.iter()
    }

    /// Return the length of the row.
    pub fn size(&self) -> usize {
        self.field_vals.len()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut res = String::new();
        for field in &self.field_vals {
            res.push_str(&field.to_string());
            res.push('\t');
        }
        write!(f, "{}", res)
    }
}
