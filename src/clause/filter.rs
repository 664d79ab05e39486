use super::error::ClauseError;
use super::operators::OperatorTable;
use super::types::{quote_column, FieldMap, FieldTranslations, SqlClause, WHERE_SEPARATOR};

/// Build the WHERE predicate for a filtered select.
///
/// Unlike updates, every filter field must have exactly one translation entry:
/// filter names come from a small fixed set per entity, so any mismatch between
/// the two tables is a defect in the caller. The operator for each fragment is
/// looked up by logical name in `operators`.
///
/// ```text
/// filters      = {name: "Bobo", minEmployees: 3, maxEmployees: 10}
/// translations = {name: "name", minEmployees: "num_employees", maxEmployees: "num_employees"}
/// sql          = "name" ILIKE $1 AND "num_employees">$2 AND "num_employees"<$3
/// ```
pub fn build_filter_clause<V: Clone>(
    filters: Option<&FieldMap<V>>,
    translations: Option<&FieldTranslations>,
    operators: &OperatorTable,
) -> Result<SqlClause<V>, ClauseError> {
    let filters = match filters {
        Some(f) if !f.is_empty() => f,
        _ => return Err(ClauseError::MissingData),
    };

    let translations = translations.ok_or(ClauseError::InvalidTranslations("translation table missing"))?;
    if translations.is_empty() {
        return Err(ClauseError::InvalidTranslations("translation table empty"));
    }
    if translations.len() != filters.len() {
        return Err(ClauseError::InvalidTranslations("translation table does not match filter fields"));
    }

    let fragments = filters
        .keys()
        .enumerate()
        .map(|(idx, field)| {
            let column = translations.get(field).map(String::as_str).unwrap_or(field);
            let operator = operators.operator_for(field);
            format!("{}{}${}", quote_column(column), operator.to_sql(), idx + 1)
        })
        .collect();

    Ok(SqlClause::new(fragments, filters.values().cloned().collect(), WHERE_SEPARATOR))
}
