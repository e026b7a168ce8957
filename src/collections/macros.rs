//! Macros for reducing boilerplate when declaring collections
//!
//! These macros generate the repetitive trait implementations needed for
//! each record type and its closed set of sortable fields.

/// Declare the closed set of fields a collection can be sorted by
///
/// Generates a plain enum plus its [`SortField`](crate::core::sort::SortField)
/// implementation. Callers can only ever name one of the listed columns.
///
/// # Example
/// ```rust,ignore
/// sort_fields! {
///     pub enum TaskSort {
///         CreatedAt => "created_at",
///         DueDate => "due_date",
///         Title => "title",
///     }
///     default CreatedAt
/// }
/// ```
#[macro_export]
macro_rules! sort_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $column:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::core::sort::SortField for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn column(self) -> &'static str {
                match self {
                    $($name::$variant => $column),+
                }
            }

            fn default_field() -> Self {
                $name::$default
            }
        }
    };
}

/// Implement [`Record`](crate::core::record::Record) for a struct
///
/// Each listed field is exposed under the given name through
/// `FieldValue::from`, so `Option<T>` fields surface as null when unset.
///
/// # Example
/// ```rust,ignore
/// impl_record!(Task, id, {
///     "title" => title,
///     "status" => status,
///     "due_date" => due_date,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($type:ty, $id:ident, { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::core::record::Record for $type {
            fn id(&self) -> ::uuid::Uuid {
                self.$id
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    "id" => Some($crate::core::field::FieldValue::Uuid(self.$id)),
                    $($name => Some($crate::core::field::FieldValue::from(self.$field.clone())),)*
                    _ => None,
                }
            }
        }
    };
}
