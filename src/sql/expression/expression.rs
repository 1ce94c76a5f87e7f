use tokio_postgres::types::ToSql;

use crate::config::{PlaceholderStyle, RenderConfig};
use crate::sql::{Chunk, Scalar, SqlValue};

/// Placeholder token used inside every expression tree.
pub const PLACEHOLDER: &str = "?";

/// Builds a raw [`Expression`] from SQL text and the arguments for its
/// placeholders. Arguments may be anything implementing [`Scalar`].
///
/// ```
/// let e = expr!("name = ? AND age > ?", "John", 18);
/// ```
#[macro_export]
macro_rules! expr {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {{
        $crate::sql::Expression::new(
            $fmt.to_string(),
            vec![
                $( $crate::sql::Scalar::to_value(&$arg), )*
            ]
        )
    }}
}

/// Literal SQL text plus the arguments bound by its placeholders.
///
/// This is the leaf of every expression tree and also the result of
/// rendering any [`Chunk`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    expression: String,
    parameters: Vec<SqlValue>,
}

impl Chunk for Expression {
    fn render_chunk(&self) -> Expression {
        self.clone()
    }
}

impl Expression {
    pub fn new(expression: String, parameters: Vec<SqlValue>) -> Self {
        Self {
            expression,
            parameters,
        }
    }

    pub fn empty() -> Self {
        Self {
            expression: "".to_owned(),
            parameters: vec![],
        }
    }

    /// A single placeholder bound to `value`.
    pub fn placeholder(value: SqlValue) -> Self {
        Self::new(PLACEHOLDER.to_owned(), vec![value])
    }

    /// `value` written into the SQL text with no arguments.
    pub fn inline(value: &dyn Scalar) -> Self {
        Self::new(value.to_value().to_string(), vec![])
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty() && self.parameters.is_empty()
    }

    pub fn sql(&self) -> &String {
        &self.expression
    }

    pub fn params(&self) -> &Vec<SqlValue> {
        &self.parameters
    }

    /// SQL text ready for the driver, using the default `?` placeholders.
    pub fn sql_final(&self) -> String {
        self.sql_final_with(&RenderConfig::default())
    }

    /// SQL text ready for the driver, with placeholders in the configured style.
    ///
    /// Every `?` in the text is treated as a placeholder, including one that
    /// came from raw SQL.
    pub fn sql_final_with(&self, config: &RenderConfig) -> String {
        match config.placeholder {
            PlaceholderStyle::Question => self.expression.clone(),
            PlaceholderStyle::Dollar => {
                let mut sql_final = String::with_capacity(self.expression.len() + 8);
                let mut num = 0;
                for (i, part) in self.expression.split(PLACEHOLDER).enumerate() {
                    if i > 0 {
                        num += 1;
                        sql_final.push_str(&format!("${}", num));
                    }
                    sql_final.push_str(part);
                }
                sql_final
            }
        }
    }

    /// Joins expressions with `delimiter`, keeping their arguments in order.
    pub fn from_vec(vec: Vec<Expression>, delimiter: &str) -> Self {
        let expression = vec
            .iter()
            .map(|pre| pre.expression.clone())
            .collect::<Vec<String>>()
            .join(delimiter);

        let parameters = vec
            .into_iter()
            .flat_map(|pre| pre.parameters)
            .collect::<Vec<SqlValue>>();

        Self {
            expression,
            parameters,
        }
    }

    pub fn wrap(self, prefix: &str, suffix: &str) -> Self {
        if prefix.is_empty() && suffix.is_empty() {
            return self;
        }
        Self {
            expression: format!("{}{}{}", prefix, self.expression, suffix),
            parameters: self.parameters,
        }
    }

    pub fn split(self) -> (String, Vec<SqlValue>) {
        (self.expression, self.parameters)
    }

    /// Arguments in the shape `tokio_postgres` expects for a query call.
    pub fn params_as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.parameters
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// SQL with every placeholder replaced by its quoted argument. Meant for
    /// logs and tests, never for execution.
    pub fn preview(&self) -> String {
        let mut preview = String::with_capacity(self.expression.len());
        let mut params = self.parameters.iter();
        for (i, part) in self.expression.split(PLACEHOLDER).enumerate() {
            if i > 0 {
                match params.next() {
                    Some(param) => preview.push_str(&param.to_literal()),
                    None => preview.push_str(PLACEHOLDER),
                }
            }
            preview.push_str(part);
        }
        preview
    }
}
