use std::sync::Arc;

use crate::sql::{Chunk, Component, Expression, Joiner, Scalar};

/// A column name, rendered verbatim.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Column {
        Column { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Chunk for Column {
    fn render_chunk(&self) -> Expression {
        Expression::new(self.name.clone(), vec![])
    }
}

impl From<Column> for Component {
    fn from(column: Column) -> Self {
        Component::Chunk(Arc::new(column))
    }
}

/// Operations trait provides some common SQL comparisons for a [`Column`]
/// or any [`Joiner`]. The right-hand value is always bound as a placeholder:
///
/// ```
/// let expr = Column::new("age").gt(18);            // "age > ?", [18]
/// let expr = Column::new("name").eq("O'Reilly");   // "name = ?", ["O'Reilly"]
/// ```
/// Use [`Operations::eq_expr()`] to compare against another chunk instead.
pub trait Operations: Chunk {
    fn compare(&self, operator: &str, value: impl Scalar) -> Expression {
        Expression::from_vec(
            vec![
                self.render_chunk(),
                Expression::new(operator.to_string(), vec![]),
                Expression::placeholder(value.to_value()),
            ],
            " ",
        )
    }

    fn eq(&self, value: impl Scalar) -> Expression {
        self.compare("=", value)
    }

    fn ne(&self, value: impl Scalar) -> Expression {
        self.compare("!=", value)
    }

    fn gt(&self, value: impl Scalar) -> Expression {
        self.compare(">", value)
    }

    fn gte(&self, value: impl Scalar) -> Expression {
        self.compare(">=", value)
    }

    fn lt(&self, value: impl Scalar) -> Expression {
        self.compare("<", value)
    }

    fn lte(&self, value: impl Scalar) -> Expression {
        self.compare("<=", value)
    }

    fn eq_expr(&self, other: &impl Chunk) -> Expression {
        Expression::from_vec(vec![self.render_chunk(), other.render_chunk()], " = ")
    }

    /// `col IN (?, ?, ...)`. An empty list can never match and renders `FALSE`.
    fn in_list<S: Scalar>(&self, values: impl IntoIterator<Item = S>) -> Expression {
        let placeholders: Vec<Expression> = values
            .into_iter()
            .map(|v| Expression::placeholder(v.to_value()))
            .collect();
        if placeholders.is_empty() {
            return Expression::new("FALSE".to_string(), vec![]);
        }
        let list = Expression::from_vec(placeholders, ", ").wrap("IN (", ")");
        Expression::from_vec(vec![self.render_chunk(), list], " ")
    }

    fn is_null(&self) -> Expression {
        self.render_chunk().wrap("", " IS NULL")
    }

    fn is_not_null(&self) -> Expression {
        self.render_chunk().wrap("", " IS NOT NULL")
    }
}

impl Operations for Column {}
impl Operations for Joiner {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sql::SqlValue;
    use crate::{and, exp};

    #[test]
    fn test_compare_binds_value() {
        let (sql, params) = Column::new("name").eq("O'Reilly").split();

        assert_eq!(sql, "name = ?");
        assert_eq!(params, vec![SqlValue::Text("O'Reilly".into())]);
    }

    #[test]
    fn test_in_list() {
        let (sql, params) = Column::new("id").in_list([1, 2, 3]).split();
        assert_eq!(sql, "id IN (?, ?, ?)");
        assert_eq!(params.len(), 3);

        let empty: Vec<i32> = vec![];
        assert_eq!(Column::new("id").in_list(empty).sql(), "FALSE");
    }

    #[test]
    fn test_operations_in_combinators() {
        let price = Column::new("price");
        let (sql, params) = and!(
            price.gte(10),
            exp!("price", "-", "discount").lt(100),
            Column::new("deleted_at").is_null(),
            Column::new("owner").eq_expr(&Column::new("author")),
        )
        .render_chunk()
        .split();

        assert_eq!(
            sql,
            "(price >= ? AND price - discount < ? AND deleted_at IS NULL AND owner = author)"
        );
        assert_eq!(params, vec![SqlValue::Int(10), SqlValue::Int(100)]);
    }
}
