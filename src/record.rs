//! Record representation consumed by the TCP writer.
//!
//! The host hands the writer a schema of [`Field`]s once at initialisation and
//! then one slice of [`FieldValue`]s per record. Values are positional: the
//! value at index `n` belongs to the field at index `n`.

use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

/// One column of the log stream schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Column name used as the key in formatted output.
    pub name: String,
}

impl Field {
    /// Construct a field with the given column name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Build a schema from a list of column names.
pub fn schema<I, S>(names: I) -> Vec<Field>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Field::new).collect()
}

/// A typed value for a single field of a record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// The field carries no value for this record.
    Unset,
    Bool(bool),
    Int(i64),
    Count(u64),
    Double(f64),
    /// Absolute point in time.
    Time(SystemTime),
    /// Signed duration in seconds.
    Interval(f64),
    String(String),
    /// Enumeration label.
    Enum(String),
    Addr(IpAddr),
    Subnet {
        prefix: IpAddr,
        width: u8,
    },
    /// Transport port number; the protocol is not carried on the wire.
    Port(u16),
    Set(Vec<FieldValue>),
    Vector(Vec<FieldValue>),
}

impl FieldValue {
    /// Return `true` when the value should be omitted from output.
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Count(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<IpAddr> for FieldValue {
    fn from(value: IpAddr) -> Self {
        FieldValue::Addr(value)
    }
}

impl From<SystemTime> for FieldValue {
    fn from(value: SystemTime) -> Self {
        FieldValue::Time(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Unset, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unset => f.write_str("-"),
            FieldValue::Bool(v) => write!(f, "{}", if *v { "T" } else { "F" }),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Count(v) => write!(f, "{v}"),
            FieldValue::Double(v) | FieldValue::Interval(v) => write!(f, "{v:.6}"),
            FieldValue::Time(t) => {
                let secs = t
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or_default();
                write!(f, "{secs:.6}")
            }
            FieldValue::String(v) | FieldValue::Enum(v) => f.write_str(v),
            FieldValue::Addr(addr) => write!(f, "{addr}"),
            FieldValue::Subnet { prefix, width } => write!(f, "{prefix}/{width}"),
            FieldValue::Port(port) => write!(f, "{port}"),
            FieldValue::Set(items) | FieldValue::Vector(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
