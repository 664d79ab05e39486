use indexmap::IndexMap;

/// Logical field name → value, in the order the caller inserted them.
pub type FieldMap<V> = IndexMap<String, V>;

/// Logical field name → persisted column name.
pub type FieldTranslations = IndexMap<String, String>;

pub(crate) const SET_SEPARATOR: &str = ", ";
pub(crate) const WHERE_SEPARATOR: &str = " AND ";

/// Parameterized SQL fragments plus the values bound to `$1..$N`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlClause<V> {
    pub fragments: Vec<String>,
    pub values: Vec<V>,
    separator: &'static str,
}

impl<V> SqlClause<V> {
    pub(crate) fn new(fragments: Vec<String>, values: Vec<V>, separator: &'static str) -> Self {
        Self { fragments, values, separator }
    }

    /// Fragments joined into a single SET list or WHERE predicate.
    pub fn to_sql(&self) -> String {
        self.fragments.join(self.separator)
    }

    /// Position of the first placeholder free for the caller, e.g. a trailing key.
    pub fn next_param_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }
}

/// Build a translation table from `(logical, column)` pairs.
pub fn translations<I, K, C>(pairs: I) -> FieldTranslations
where
    I: IntoIterator<Item = (K, C)>,
    K: Into<String>,
    C: Into<String>,
{
    pairs.into_iter().map(|(k, c)| (k.into(), c.into())).collect()
}

pub(crate) fn quote_column(column: &str) -> String {
    format!("\"{}\"", column)
}
