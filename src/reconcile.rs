use crate::error::SqlBindError;
use crate::rewrite::QueryDescriptor;
use crate::types::{CallArgs, RowValues};

/// Resolve the call-time argument into the positional values sent to the engine.
///
/// `None` means the statement is executed without bound values.
///
/// Unlike [`crate::rewrite`], a named bag missing one of the statement's names is not an
/// error here: the slot is bound to `NULL`.
///
/// # Errors
/// Returns `SqlBindError::InvalidParameters` when the statement declares more than one
/// slot and the argument is neither positional nor a bag matching named placeholders.
pub fn resolve(
    query: &QueryDescriptor,
    args: CallArgs,
) -> Result<Option<Vec<RowValues>>, SqlBindError> {
    match (args, query.param_names.as_deref()) {
        (CallArgs::Named(bag), Some(names)) if !names.is_empty() => Ok(Some(
            names
                .iter()
                .map(|name| bag.get(name).cloned().unwrap_or(RowValues::Null))
                .collect(),
        )),
        (CallArgs::Positional(values), _) => Ok(Some(values)),
        (_, _) if query.values.is_empty() => Ok(None),
        (CallArgs::Scalar(value), _) if query.values.len() == 1 => Ok(Some(vec![value])),
        (CallArgs::Empty, _) if query.values.len() == 1 => Ok(None),
        (other, _) => Err(SqlBindError::InvalidParameters {
            supplied: other.kind(),
            sql: query.sql.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::rewrite::rewrite;
    use crate::types::NamedParams;

    #[test]
    fn named_bag_missing_key_binds_null() {
        let query = rewrite("SELECT $a, $b", &NamedParams::new()).unwrap();
        let values = resolve(&query, CallArgs::Named(params! { "a" => 1 })).unwrap();
        assert_eq!(values, Some(vec![RowValues::Int(1), RowValues::Null]));
    }

    #[test]
    fn original_bag_reproduces_recorded_values() {
        let bag = params! { "x" => 1, "y" => "two" };
        let query = rewrite("WHERE a IN ($x,$y) OR b = $x", &bag).unwrap();
        let values = resolve(&query, CallArgs::Named(bag)).unwrap();
        assert_eq!(values, Some(query.values.clone()));
    }

    #[test]
    fn positional_passes_through() {
        let query = QueryDescriptor::positional("SELECT $1, $2", vec![RowValues::Null; 2]);
        let args = vec![RowValues::Int(3), RowValues::Int(4)];
        assert_eq!(
            resolve(&query, CallArgs::Positional(args.clone())).unwrap(),
            Some(args)
        );
    }

    #[test]
    fn zero_slots_resolve_to_none() {
        let query = QueryDescriptor::positional("SELECT 1", Vec::new());
        assert_eq!(resolve(&query, CallArgs::Empty).unwrap(), None);
        assert_eq!(
            resolve(&query, CallArgs::Scalar(RowValues::Int(1))).unwrap(),
            None
        );
        assert_eq!(
            resolve(&query, CallArgs::Named(params! { "a" => 1 })).unwrap(),
            None
        );
    }

    #[test]
    fn single_slot_wraps_scalar() {
        let query = QueryDescriptor::positional("SELECT $1", vec![RowValues::Int(0)]);
        assert_eq!(
            resolve(&query, CallArgs::Scalar(RowValues::Text("a".into()))).unwrap(),
            Some(vec![RowValues::Text("a".into())])
        );
        assert_eq!(resolve(&query, CallArgs::Empty).unwrap(), None);
    }

    #[test]
    fn scalar_for_many_slots_is_rejected() {
        let query = QueryDescriptor::positional("SELECT $1, $2", vec![RowValues::Null; 2]);
        let err = resolve(&query, CallArgs::Scalar(RowValues::Int(1))).unwrap_err();
        assert!(matches!(
            err,
            SqlBindError::InvalidParameters { supplied: "scalar", ref sql } if sql == "SELECT $1, $2"
        ));
    }

    #[test]
    fn named_bag_against_positional_sql_is_rejected() {
        let query = QueryDescriptor::positional("SELECT $1, $2", vec![RowValues::Null; 2]);
        let err = resolve(&query, CallArgs::Named(params! { "a" => 1 })).unwrap_err();
        assert!(matches!(err, SqlBindError::InvalidParameters { supplied: "named", .. }));
    }
}
