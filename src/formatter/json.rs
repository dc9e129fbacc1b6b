//! JSON line formatter.
//!
//! Each record becomes one JSON object whose keys follow the schema order.
//! Unset values are omitted entirely rather than written as `null`.

use std::{
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use super::{FormatError, RecordFormatter, check_arity};
use crate::record::{Field, FieldValue};

/// How [`FieldValue::Time`] values are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Seconds since the Unix epoch as a floating point number.
    #[default]
    Epoch,
    /// Whole milliseconds since the Unix epoch.
    Millis,
    /// ISO-8601 UTC string with microsecond precision.
    Iso8601,
}

impl FromStr for TimestampFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epoch" => Ok(Self::Epoch),
            "millis" => Ok(Self::Millis),
            "iso8601" => Ok(Self::Iso8601),
            _ => Err(()),
        }
    }
}

/// Formatter producing one JSON object per record.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormatter {
    timestamps: TimestampFormat,
}

impl JsonFormatter {
    /// Construct a formatter using the given timestamp style.
    pub fn new(timestamps: TimestampFormat) -> Self {
        Self { timestamps }
    }

    fn time_value(&self, time: &SystemTime) -> Value {
        match self.timestamps {
            TimestampFormat::Epoch => float_value(epoch_seconds(time)),
            TimestampFormat::Millis => {
                let millis = match time.duration_since(UNIX_EPOCH) {
                    Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
                    Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
                };
                Value::from(millis)
            }
            TimestampFormat::Iso8601 => {
                let dt: DateTime<Utc> = (*time).into();
                Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
            }
        }
    }

    fn to_json(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Unset => Value::Null,
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Int(v) => Value::from(*v),
            FieldValue::Count(v) => Value::from(*v),
            FieldValue::Double(v) | FieldValue::Interval(v) => float_value(*v),
            FieldValue::Time(t) => self.time_value(t),
            FieldValue::String(v) | FieldValue::Enum(v) => Value::String(v.clone()),
            FieldValue::Addr(addr) => Value::String(addr.to_string()),
            FieldValue::Subnet { prefix, width } => Value::String(format!("{prefix}/{width}")),
            FieldValue::Port(port) => Value::from(*port),
            FieldValue::Set(items) | FieldValue::Vector(items) => {
                Value::Array(items.iter().map(|item| self.to_json(item)).collect())
            }
        }
    }
}

fn epoch_seconds(time: &SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

impl RecordFormatter for JsonFormatter {
    fn describe(
        &self,
        fields: &[Field],
        values: &[FieldValue],
        out: &mut Vec<u8>,
    ) -> Result<(), FormatError> {
        check_arity(fields, values)?;
        out.push(b'{');
        let mut first = true;
        for (field, value) in fields.iter().zip(values) {
            if value.is_unset() {
                continue;
            }
            if !first {
                out.push(b',');
            }
            first = false;
            serde_json::to_writer(&mut *out, &field.name)?;
            out.push(b':');
            serde_json::to_writer(&mut *out, &self.to_json(value))?;
        }
        out.push(b'}');
        Ok(())
    }
}
