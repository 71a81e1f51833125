//! Bind values for positional placeholders.
//!
//! [`Param`] keeps bind values inspectable (they can be compared and printed),
//! which a `Box<dyn ToSql>` cannot. Encoding follows the parameter type the
//! server inferred for the placeholder, so an integer filter can be compared
//! against a `smallint` column and a decimal price against an `integer` one.

use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A single positional bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Int(i64),
    Decimal(Decimal),
}

/// A bind value that cannot be represented in the placeholder's inferred type.
#[derive(Debug, Error)]
#[error("cannot bind {value} as {ty}")]
pub struct ParamConversionError {
    value: String,
    ty: Type,
}

impl ParamConversionError {
    fn new(value: &Param, ty: &Type) -> Self {
        Self {
            value: format!("{:?}", value),
            ty: ty.clone(),
        }
    }
}

fn encode_int(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::NUMERIC => Decimal::from(value).to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        _ => Err(Box::new(ParamConversionError::new(&Param::Int(value), ty))),
    }
}

fn encode_decimal(value: Decimal, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let unrepresentable = || ParamConversionError::new(&Param::Decimal(value), ty);

    match *ty {
        Type::NUMERIC => value.to_sql(ty, out),
        Type::FLOAT4 => value.to_f32().ok_or_else(unrepresentable)?.to_sql(ty, out),
        Type::FLOAT8 => value.to_f64().ok_or_else(unrepresentable)?.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => {
            if !value.fract().is_zero() {
                return Err(unrepresentable().into());
            }
            let whole = value.to_i64().ok_or_else(unrepresentable)?;
            encode_int(whole, ty, out)
        }
        _ => Err(unrepresentable().into()),
    }
}

impl ToSql for Param {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Param::Text(s) => {
                if !<&str as ToSql>::accepts(ty) {
                    return Err(Box::new(ParamConversionError::new(self, ty)));
                }
                s.as_str().to_sql(ty, out)
            }
            Param::Int(v) => encode_int(*v, ty, out),
            Param::Decimal(d) => encode_decimal(*d, ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2 | Type::INT4 | Type::INT8 | Type::NUMERIC | Type::FLOAT4 | Type::FLOAT8
        ) || <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(i64::from(value))
    }
}

impl From<i16> for Param {
    fn from(value: i16) -> Self {
        Param::Int(i64::from(value))
    }
}

impl From<Decimal> for Param {
    fn from(value: Decimal) -> Self {
        Param::Decimal(value)
    }
}
