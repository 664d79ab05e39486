use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, Postgres};

/// A typed value bound to a positional placeholder.
///
/// Each variant carries an `Option` so that a NULL still binds with the type
/// of the column it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    Int(Option<i32>),
    Float(Option<f64>),
    Bool(Option<bool>),
}

impl SqlParam {
    pub fn text(v: impl Into<String>) -> Self {
        SqlParam::Text(Some(v.into()))
    }
}

/// Bind one parameter onto a typed query.
pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match p {
        SqlParam::Text(v) => q.bind(v.as_deref()),
        SqlParam::Int(v) => q.bind(*v),
        SqlParam::Float(v) => q.bind(*v),
        SqlParam::Bool(v) => q.bind(*v),
    }
}
