use crate::sql::{Assignable, Scalar};

/// Resolves a column name to a field on an entity.
///
/// `field()` is used to read a value for SQL generation, `field_mut()` to
/// write a loaded value back. Return `None` for a column the entity does
/// not have; the [`Mapper`] reports it as an error naming the column.
///
/// Most entities can use [`impl_fielder!`] instead of writing this by hand:
///
/// ```
/// struct User { id: i64, name: String, email: Option<String> }
///
/// impl_fielder!(User { "id" => id, "name" => name, "email" => email });
/// ```
///
/// [`Mapper`]: crate::mapper::Mapper
/// [`impl_fielder!`]: crate::impl_fielder
pub trait Fielder {
    fn field(&self, name: &str) -> Option<&dyn Scalar>;
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Assignable>;
}

impl<F: Fielder + ?Sized> Fielder for Box<F> {
    fn field(&self, name: &str) -> Option<&dyn Scalar> {
        (**self).field(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Assignable> {
        (**self).field_mut(name)
    }
}

impl<F: Fielder + ?Sized> Fielder for &mut F {
    fn field(&self, name: &str) -> Option<&dyn Scalar> {
        (**self).field(name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Assignable> {
        (**self).field_mut(name)
    }
}

/// Implements [`Fielder`] for a struct by mapping column names to fields.
///
/// [`Fielder`]: crate::mapper::Fielder
#[macro_export]
macro_rules! impl_fielder {
    ($ty:ty { $($column:literal => $field:ident),* $(,)? }) => {
        impl $crate::mapper::Fielder for $ty {
            fn field(&self, name: &str) -> Option<&dyn $crate::sql::Scalar> {
                match name {
                    $( $column => Some(&self.$field), )*
                    _ => None,
                }
            }

            fn field_mut(&mut self, name: &str) -> Option<&mut dyn $crate::sql::Assignable> {
                match name {
                    $( $column => Some(&mut self.$field), )*
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sql::SqlValue;

    #[derive(Debug, Default)]
    struct Product {
        name: String,
        price: i64,
    }

    impl_fielder!(Product { "name" => name, "price" => price });

    #[test]
    fn test_impl_fielder() {
        let mut product = Product {
            name: "Flux Capacitor".into(),
            price: 88,
        };

        assert_eq!(product.field("price").map(|f| f.to_value()), Some(SqlValue::Int(88)));
        assert!(product.field("colour").is_none());

        product
            .field_mut("name")
            .unwrap()
            .assign(SqlValue::Text("DeLorean".into()))
            .unwrap();
        assert_eq!(product.name, "DeLorean");
    }

    #[test]
    fn test_boxed_fielder() {
        let boxed: Box<dyn Fielder> = Box::new(Product::default());
        assert_eq!(boxed.field("name").map(|f| f.to_value()), Some(SqlValue::Text("".into())));
    }
}
