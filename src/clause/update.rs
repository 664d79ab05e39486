use super::error::ClauseError;
use super::types::{quote_column, FieldMap, FieldTranslations, SqlClause, SET_SEPARATOR};

/// Build the SET portion of a partial UPDATE.
///
/// Each field becomes `"<column>"=$<n>` in input order, where the column is the
/// translated name if one exists and the logical name otherwise. An empty
/// translation table is valid and leaves every name as-is.
///
/// ```text
/// updates      = {firstName: "Bilbo", age: 25, isAdmin: false}
/// translations = {firstName: "first_name", isAdmin: "is_admin"}
/// sql          = "first_name"=$1, "age"=$2, "is_admin"=$3
/// values       = ["Bilbo", 25, false]
/// ```
pub fn build_update_clause<V: Clone>(
    updates: Option<&FieldMap<V>>,
    translations: Option<&FieldTranslations>,
) -> Result<SqlClause<V>, ClauseError> {
    let updates = match updates {
        Some(u) if !u.is_empty() => u,
        _ => return Err(ClauseError::MissingData),
    };

    // The table always comes from trusted code, so its absence is our bug.
    let translations = translations.ok_or(ClauseError::InvalidTranslations("translation table missing"))?;

    let fragments = updates
        .keys()
        .enumerate()
        .map(|(idx, field)| {
            let column = translations.get(field).map(String::as_str).unwrap_or(field);
            format!("{}=${}", quote_column(column), idx + 1)
        })
        .collect();

    Ok(SqlClause::new(fragments, updates.values().cloned().collect(), SET_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::types::translations;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn fields(pairs: &[(&str, Value)]) -> FieldMap<Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn translates_known_fields_and_keeps_the_rest() {
        let data = fields(&[("firstName", json!("Bilbo")), ("age", json!(25)), ("isAdmin", json!(false))]);
        let table = translations([("firstName", "first_name"), ("isAdmin", "is_admin")]);

        let clause = build_update_clause(Some(&data), Some(&table)).unwrap();

        assert_eq!(clause.to_sql(), r#""first_name"=$1, "age"=$2, "is_admin"=$3"#);
        assert_eq!(clause.values, vec![json!("Bilbo"), json!(25), json!(false)]);
        assert_eq!(clause.next_param_index(), 4);
    }

    #[test]
    fn complete_translations_follow_input_order_not_table_order() {
        let data = fields(&[
            ("firstName", json!("Bobo")),
            ("lastName", json!("Monkey")),
            ("age", json!(52)),
            ("numEmployees", json!(3)),
            ("logoUrl", json!("google.com")),
        ]);
        let table = translations([
            ("firstName", "first_name"),
            ("age", "age"),
            ("lastName", "last_name"),
            ("numEmployees", "num_employees"),
            ("logoUrl", "logo_url"),
        ]);

        let clause = build_update_clause(Some(&data), Some(&table)).unwrap();

        assert_eq!(
            clause.to_sql(),
            r#""first_name"=$1, "last_name"=$2, "age"=$3, "num_employees"=$4, "logo_url"=$5"#
        );
        assert_eq!(
            clause.values,
            vec![json!("Bobo"), json!("Monkey"), json!(52), json!(3), json!("google.com")]
        );
    }

    #[test]
    fn empty_translations_use_logical_names() {
        let data = fields(&[("firstName", json!("Bobo")), ("numEmployees", json!(3))]);

        let clause = build_update_clause(Some(&data), Some(&FieldTranslations::new())).unwrap();

        assert_eq!(clause.to_sql(), r#""firstName"=$1, "numEmployees"=$2"#);
    }

    #[test]
    fn missing_translations_is_internal() {
        let data = fields(&[("firstName", json!("Bobo"))]);

        let err = build_update_clause(Some(&data), None).unwrap_err();

        assert!(err.is_internal());
    }

    #[test]
    fn empty_or_absent_updates_are_missing_data() {
        let empty = FieldMap::<Value>::new();
        let table = FieldTranslations::new();

        assert_eq!(build_update_clause(Some(&empty), Some(&table)), Err(ClauseError::MissingData));
        assert_eq!(build_update_clause::<Value>(None, None), Err(ClauseError::MissingData));
        assert_eq!(build_update_clause(Some(&empty), None), Err(ClauseError::MissingData));
    }

    proptest! {
        #[test]
        fn placeholders_are_one_to_n_in_input_order(
            keys in proptest::collection::vec("[a-z][a-zA-Z]{0,8}", 1..12),
            translate in any::<bool>(),
        ) {
            let data: FieldMap<i64> = keys.iter().enumerate().map(|(i, k)| (k.clone(), i as i64)).collect();
            let table: FieldTranslations = if translate {
                data.keys().map(|k| (k.clone(), format!("{}_col", k))).collect()
            } else {
                FieldTranslations::new()
            };

            let first = build_update_clause(Some(&data), Some(&table)).unwrap();
            let second = build_update_clause(Some(&data), Some(&table)).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.fragments.len(), data.len());
            prop_assert_eq!(&first.values, &data.values().copied().collect::<Vec<_>>());
            for (idx, (fragment, key)) in first.fragments.iter().zip(data.keys()).enumerate() {
                let column = table.get(key).unwrap_or(key);
                prop_assert_eq!(fragment, &format!("\"{}\"=${}", column, idx + 1));
            }
        }
    }
}
