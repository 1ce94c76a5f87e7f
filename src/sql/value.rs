use std::fmt::{self, Debug, Display, Write as _};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::{Number, Value};

/// Every value that can cross into a SQL fragment, either bound as an
/// argument or written inline.
///
/// Caller values are converted into a `SqlValue` once, when they enter the
/// builder (see [`Scalar`]). From there on the escaping decision is a match
/// on this enum and nothing else, see [`SqlValue::needs_binding()`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Values that must never be written into SQL text.
    ///
    /// Text, byte blobs and timestamps are always bound as a placeholder by
    /// the mapper, no matter how the caller wrapped them. So are `NaN` and
    /// the infinities, which have no SQL literal.
    pub fn needs_binding(&self) -> bool {
        match self {
            SqlValue::Text(_) | SqlValue::Bytes(_) | SqlValue::Timestamp(_) => true,
            SqlValue::Float(f) => !f.is_finite(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::UInt(_) => "uint",
            SqlValue::Float(_) => "float",
            SqlValue::Decimal(_) => "decimal",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    /// Quoted SQL literal, used only by [`Expression::preview()`] to show what
    /// the database would see once arguments are substituted.
    ///
    /// [`Expression::preview()`]: crate::sql::Expression::preview
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Timestamp(_) => format!("'{}'", self),
            _ => self.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::Int(i) => Value::Number((*i).into()),
            SqlValue::UInt(u) => Value::Number((*u).into()),
            SqlValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            SqlValue::Decimal(d) => Value::String(d.to_string()),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Bytes(b) => Value::Array(b.iter().map(|x| Value::Number((*x).into())).collect()),
            SqlValue::Timestamp(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// Inline text form. Text is written verbatim, so only use this for values
/// that are already trusted.
impl Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(true) => f.write_str("TRUE"),
            SqlValue::Bool(false) => f.write_str("FALSE"),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::UInt(u) => write!(f, "{}", u),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Decimal(d) => write!(f, "{}", d),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Bytes(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_char('\'')
            }
            SqlValue::Timestamp(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    SqlValue::UInt(u)
                } else {
                    n.as_f64().map_or(SqlValue::Null, SqlValue::Float)
                }
            }
            Value::String(s) => SqlValue::Text(s),
            Value::Array(items) => match bytes_from_json(&items) {
                Some(bytes) => SqlValue::Bytes(bytes),
                None => SqlValue::Text(Value::Array(items).to_string()),
            },
            object @ Value::Object(_) => SqlValue::Text(object.to_string()),
        }
    }
}

// A JSON array of small integers is how bytes are packed by `to_json`.
// An empty array is an empty blob.
fn bytes_from_json(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

/// Anything that can be dereferenced down to a concrete [`SqlValue`].
///
/// Implemented once per supported scalar kind, plus blanket implementations
/// for the usual layers of indirection (`&T`, `&mut T`, `Box`, `Rc`, `Arc`,
/// `Option`), so a field read by reference converts exactly like the same
/// field read by value. `None` becomes [`SqlValue::Null`].
pub trait Scalar: Debug {
    fn to_value(&self) -> SqlValue;
}

/// Strip every layer of indirection from `value`.
pub fn dereference<S: Scalar + ?Sized>(value: &S) -> SqlValue {
    value.to_value()
}

macro_rules! scalar_int {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            fn to_value(&self) -> SqlValue {
                SqlValue::Int(i64::from(*self))
            }
        }
    )*};
}
scalar_int!(i8, i16, i32, i64, u8, u16, u32);

impl Scalar for isize {
    fn to_value(&self) -> SqlValue {
        SqlValue::Int(*self as i64)
    }
}

impl Scalar for u64 {
    fn to_value(&self) -> SqlValue {
        SqlValue::UInt(*self)
    }
}

impl Scalar for usize {
    fn to_value(&self) -> SqlValue {
        SqlValue::UInt(*self as u64)
    }
}

impl Scalar for f32 {
    fn to_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl Scalar for f64 {
    fn to_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl Scalar for bool {
    fn to_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

impl Scalar for Decimal {
    fn to_value(&self) -> SqlValue {
        SqlValue::Decimal(*self)
    }
}

impl Scalar for str {
    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.to_owned())
    }
}

impl Scalar for String {
    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl Scalar for [u8] {
    fn to_value(&self) -> SqlValue {
        SqlValue::Bytes(self.to_vec())
    }
}

impl Scalar for Vec<u8> {
    fn to_value(&self) -> SqlValue {
        SqlValue::Bytes(self.clone())
    }
}

impl Scalar for DateTime<Utc> {
    fn to_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl Scalar for NaiveDateTime {
    fn to_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.and_utc())
    }
}

impl Scalar for SqlValue {
    fn to_value(&self) -> SqlValue {
        self.clone()
    }
}

impl Scalar for Value {
    fn to_value(&self) -> SqlValue {
        SqlValue::from(self.clone())
    }
}

impl<T: Scalar + ?Sized> Scalar for &T {
    fn to_value(&self) -> SqlValue {
        (**self).to_value()
    }
}

impl<T: Scalar + ?Sized> Scalar for &mut T {
    fn to_value(&self) -> SqlValue {
        (**self).to_value()
    }
}

impl<T: Scalar + ?Sized> Scalar for Box<T> {
    fn to_value(&self) -> SqlValue {
        (**self).to_value()
    }
}

impl<T: Scalar + ?Sized> Scalar for Rc<T> {
    fn to_value(&self) -> SqlValue {
        (**self).to_value()
    }
}

impl<T: Scalar + ?Sized> Scalar for Arc<T> {
    fn to_value(&self) -> SqlValue {
        (**self).to_value()
    }
}

impl<T: Scalar> Scalar for Option<T> {
    fn to_value(&self) -> SqlValue {
        match self {
            Some(inner) => inner.to_value(),
            None => SqlValue::Null,
        }
    }
}

/// A field slot that a dereferenced [`SqlValue`] can be written into.
///
/// Numeric kinds convert into any numeric slot as long as the value fits.
/// Text parses into timestamp and decimal slots. Every other combination is
/// an error, as is `NULL` into a slot that is not an `Option`.
pub trait Assignable: Debug {
    fn assign(&mut self, value: SqlValue) -> Result<()>;
}

/// Write the dereferenced `value` into `slot`.
pub fn assign(slot: &mut dyn Assignable, value: &dyn Scalar) -> Result<()> {
    slot.assign(value.to_value())
}

fn mismatch(value: &SqlValue, target: &str) -> anyhow::Error {
    anyhow!("cannot assign {} value to {} slot", value.kind(), target)
}

macro_rules! assignable_int {
    ($($t:ty),*) => {$(
        impl Assignable for $t {
            fn assign(&mut self, value: SqlValue) -> Result<()> {
                *self = match value {
                    SqlValue::Int(i) => <$t>::try_from(i)
                        .map_err(|_| anyhow!("{} is out of range for {}", i, stringify!($t)))?,
                    SqlValue::UInt(u) => <$t>::try_from(u)
                        .map_err(|_| anyhow!("{} is out of range for {}", u, stringify!($t)))?,
                    other => return Err(mismatch(&other, stringify!($t))),
                };
                Ok(())
            }
        }
    )*};
}
assignable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Assignable for f64 {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        *self = match value {
            SqlValue::Float(f) => f,
            SqlValue::Int(i) => i as f64,
            SqlValue::UInt(u) => u as f64,
            other => return Err(mismatch(&other, "f64")),
        };
        Ok(())
    }
}

impl Assignable for f32 {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        let mut wide = f64::from(*self);
        wide.assign(value)?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(anyhow!("{} is out of range for f32", wide));
        }
        *self = narrow;
        Ok(())
    }
}

impl Assignable for bool {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Bool(b) => *self = b,
            other => return Err(mismatch(&other, "bool")),
        }
        Ok(())
    }
}

impl Assignable for String {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Text(s) => *self = s,
            other => return Err(mismatch(&other, "text")),
        }
        Ok(())
    }
}

impl Assignable for Vec<u8> {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        match value {
            SqlValue::Bytes(b) => *self = b,
            other => return Err(mismatch(&other, "bytes")),
        }
        Ok(())
    }
}

impl Assignable for Decimal {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        *self = match value {
            SqlValue::Decimal(d) => d,
            SqlValue::Int(i) => Decimal::from(i),
            SqlValue::UInt(u) => Decimal::from(u),
            SqlValue::Float(f) => Decimal::try_from(f)
                .with_context(|| format!("{} does not fit a decimal", f))?,
            SqlValue::Text(s) => s
                .parse::<Decimal>()
                .with_context(|| format!("`{}` is not a decimal", s))?,
            other => return Err(mismatch(&other, "decimal")),
        };
        Ok(())
    }
}

impl Assignable for DateTime<Utc> {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        *self = match value {
            SqlValue::Timestamp(t) => t,
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(&s)
                .with_context(|| format!("`{}` is not an RFC 3339 timestamp", s))?
                .with_timezone(&Utc),
            other => return Err(mismatch(&other, "timestamp")),
        };
        Ok(())
    }
}

impl Assignable for NaiveDateTime {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        let mut utc = self.and_utc();
        utc.assign(value)?;
        *self = utc.naive_utc();
        Ok(())
    }
}

impl Assignable for SqlValue {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        *self = value;
        Ok(())
    }
}

impl<T: Assignable + Default> Assignable for Option<T> {
    fn assign(&mut self, value: SqlValue) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}
