pub mod company;
pub mod job;
pub mod user;

pub use company::CompanyRepository;
pub use job::JobRepository;
pub use user::UserRepository;

use crate::clause::{build_filter_clause, FieldMap, FieldTranslations, OperatorTable};

use super::manager::DatabaseError;
use super::params::SqlParam;

/// Render an optional `WHERE …` for a list query along with its bound values.
///
/// No criteria means no WHERE at all; listing never fails for lack of filters.
pub(crate) fn where_clause(
    filters: &FieldMap<SqlParam>,
    translations: &FieldTranslations,
    operators: &OperatorTable,
) -> Result<(String, Vec<SqlParam>), DatabaseError> {
    if filters.is_empty() {
        return Ok((String::new(), vec![]));
    }

    let clause = build_filter_clause(Some(filters), Some(translations), operators)?;
    Ok((format!("WHERE {}", clause.to_sql()), clause.into_values()))
}

/// Wrap free text so ILIKE matches it anywhere in the column.
pub(crate) fn contains_pattern(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}
