//! Field-type inference from Sea-ORM entity metadata.
//!
//! Lets an application declare only the allowlist and derive the casting rules
//! from the entity it already has:
//!
//! ```rust,ignore
//! let options = SearchOptions::builder(["name", "age", "created_at"])
//!     .infer_from_entity::<person::Entity>()
//!     .build()?;
//! ```

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ColumnType, EntityTrait, IdenStatic, Iterable};

use crate::options::FieldType;

/// The [`FieldType`] used to cast values for a column of this type, if the
/// column type is one the caster understands.
#[must_use]
pub fn field_type_for(column_type: &ColumnType) -> Option<FieldType> {
    match column_type {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => Some(FieldType::String),
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned => Some(FieldType::Int),
        ColumnType::BigInteger | ColumnType::BigUnsigned => Some(FieldType::Int64),
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) | ColumnType::Money(_) => {
            Some(FieldType::Float64)
        }
        ColumnType::Boolean => Some(FieldType::Bool),
        ColumnType::Date => Some(FieldType::Date),
        ColumnType::DateTime | ColumnType::Timestamp => Some(FieldType::DateTime),
        ColumnType::TimestampWithTimeZone => Some(FieldType::Time),
        // UUIDs, JSON, enums, binary and the rest are compared as opaque values
        _ => None,
    }
}

/// Map the allowlisted columns of `E` to field types.
///
/// Columns outside `allowed`, and columns whose type has no [`FieldType`], are
/// left out.
#[must_use]
pub fn infer_field_types<E: EntityTrait>(allowed: &HashSet<String>) -> HashMap<String, FieldType> {
    E::Column::iter()
        .filter(|column| allowed.contains(column.as_str()))
        .filter_map(|column| {
            field_type_for(column.def().get_column_type())
                .map(|ty| (column.as_str().to_string(), ty))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::StringLen;

    #[test]
    fn test_text_types() {
        assert_eq!(field_type_for(&ColumnType::Text), Some(FieldType::String));
        assert_eq!(field_type_for(&ColumnType::String(StringLen::None)), Some(FieldType::String));
        assert_eq!(field_type_for(&ColumnType::Char(Some(3))), Some(FieldType::String));
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(field_type_for(&ColumnType::Integer), Some(FieldType::Int));
        assert_eq!(field_type_for(&ColumnType::SmallUnsigned), Some(FieldType::Int));
        assert_eq!(field_type_for(&ColumnType::BigInteger), Some(FieldType::Int64));
        assert_eq!(field_type_for(&ColumnType::Double), Some(FieldType::Float64));
        assert_eq!(field_type_for(&ColumnType::Decimal(None)), Some(FieldType::Float64));
    }

    #[test]
    fn test_temporal_and_bool_types() {
        assert_eq!(field_type_for(&ColumnType::Boolean), Some(FieldType::Bool));
        assert_eq!(field_type_for(&ColumnType::Date), Some(FieldType::Date));
        assert_eq!(field_type_for(&ColumnType::DateTime), Some(FieldType::DateTime));
        assert_eq!(field_type_for(&ColumnType::Timestamp), Some(FieldType::DateTime));
        assert_eq!(
            field_type_for(&ColumnType::TimestampWithTimeZone),
            Some(FieldType::Time)
        );
    }

    #[test]
    fn test_opaque_types() {
        assert_eq!(field_type_for(&ColumnType::Uuid), None);
        assert_eq!(field_type_for(&ColumnType::Json), None);
        assert_eq!(field_type_for(&ColumnType::Blob), None);
    }
}
