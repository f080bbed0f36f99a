use std::error::Error;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow `RowValues` as Postgres parameters.
    #[must_use]
    pub fn convert(params: Option<&'a [RowValues]>) -> Params<'a> {
        let references = params
            .unwrap_or_default()
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

fn variant_name(value: &RowValues) -> &'static str {
    match value {
        RowValues::Int(_) => "Int",
        RowValues::Float(_) => "Float",
        RowValues::Text(_) => "Text",
        RowValues::Bool(_) => "Bool",
        RowValues::Timestamp(_) => "Timestamp",
        RowValues::Null => "Null",
        RowValues::JSON(_) => "JSON",
        RowValues::Blob(_) => "Blob",
    }
}

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME)
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match (self, ty) {
            (RowValues::Null, _) => Ok(IsNull::Yes),
            // The server infers each placeholder's width; encode to match it.
            (RowValues::Int(i), &Type::INT2) => i16::try_from(*i)?.to_sql(ty, out),
            (RowValues::Int(i), &Type::INT4) => i32::try_from(*i)?.to_sql(ty, out),
            (RowValues::Int(i), &Type::INT8) => i.to_sql(ty, out),
            #[allow(clippy::cast_precision_loss)]
            (RowValues::Int(i), &Type::FLOAT4 | &Type::FLOAT8) => {
                RowValues::Float(*i as f64).to_sql(ty, out)
            }
            (RowValues::Int(i), _) if is_text(ty) => i.to_string().to_sql(ty, out),
            #[allow(clippy::cast_possible_truncation)]
            (RowValues::Float(f), &Type::FLOAT4) => (*f as f32).to_sql(ty, out),
            (RowValues::Float(f), &Type::FLOAT8) => f.to_sql(ty, out),
            (RowValues::Float(f), _) if is_text(ty) => f.to_string().to_sql(ty, out),
            (RowValues::Text(s), _) if is_text(ty) => s.to_sql(ty, out),
            (RowValues::Bool(b), &Type::BOOL) => b.to_sql(ty, out),
            (RowValues::Timestamp(dt), &Type::TIMESTAMP) => dt.to_sql(ty, out),
            // Naive timestamps are taken as UTC; the wire format is the same.
            (RowValues::Timestamp(dt), &Type::TIMESTAMPTZ) => dt.to_sql(&Type::TIMESTAMP, out),
            (RowValues::Timestamp(dt), &Type::DATE) => dt.date().to_sql(ty, out),
            (RowValues::JSON(jsval), &Type::JSON | &Type::JSONB) => jsval.to_sql(ty, out),
            (RowValues::Blob(bytes), &Type::BYTEA) => bytes.to_sql(ty, out),
            (value, _) => Err(format!(
                "cannot bind a {} value to a parameter of type {ty}",
                variant_name(value)
            )
            .into()),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &RowValues, ty: &Type) -> bytes::BytesMut {
        let mut out = bytes::BytesMut::new();
        value.to_sql(ty, &mut out).unwrap();
        out
    }

    #[test]
    fn ints_follow_inferred_width() {
        assert_eq!(encode(&RowValues::Int(7), &Type::INT2).len(), 2);
        assert_eq!(encode(&RowValues::Int(7), &Type::INT4).len(), 4);
        assert_eq!(encode(&RowValues::Int(7), &Type::INT8).len(), 8);
        assert_eq!(&encode(&RowValues::Int(7), &Type::TEXT)[..], b"7");
    }

    #[test]
    fn int_out_of_range_for_int2_is_error() {
        let mut out = bytes::BytesMut::new();
        assert!(RowValues::Int(70_000).to_sql(&Type::INT2, &mut out).is_err());
    }

    #[test]
    fn mismatched_variant_is_encoding_error() {
        let mut out = bytes::BytesMut::new();
        let err = RowValues::Text("12".into())
            .to_sql(&Type::INT8, &mut out)
            .err()
            .expect("expected an encoding error");
        assert!(err.to_string().contains("Text"));
        assert!(out.is_empty());
        assert!(
            RowValues::Text("2024-01-01".into())
                .to_sql(&Type::TIMESTAMP, &mut out)
                .is_err()
        );
        assert!(RowValues::Bool(true).to_sql(&Type::INT4, &mut out).is_err());
    }

    #[test]
    fn matching_variants_encode() {
        assert_eq!(&encode(&RowValues::Text("ab".into()), &Type::VARCHAR)[..], b"ab");
        assert_eq!(encode(&RowValues::Float(1.5), &Type::FLOAT4).len(), 4);
        assert_eq!(&encode(&RowValues::Bool(true), &Type::BOOL)[..], &[1]);
    }

    #[test]
    fn null_binds_as_null() {
        let mut out = bytes::BytesMut::new();
        assert!(matches!(
            RowValues::Null.to_sql(&Type::INT4, &mut out).unwrap(),
            IsNull::Yes
        ));
    }
}
