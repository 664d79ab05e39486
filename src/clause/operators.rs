use std::collections::HashMap;

/// Comparison used by a single filter fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    /// Case-insensitive pattern match.
    ILike,
}

impl Operator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::ILike => " ILIKE ",
        }
    }
}

/// Fixed mapping from logical filter names to comparison operators.
///
/// Lookups are exact and case-sensitive on the logical name, never on the
/// column it translates to. Unmapped names compare with equality.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    operators: HashMap<&'static str, Operator>,
}

impl OperatorTable {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, Operator)>) -> Self {
        Self {
            operators: entries.into_iter().collect(),
        }
    }

    /// The table used by the company and job search endpoints.
    pub fn jobly() -> Self {
        Self::new([
            ("minEmployees", Operator::Gt),
            ("minSalary", Operator::Gt),
            ("hasEquity", Operator::Gt),
            ("maxEmployees", Operator::Lt),
            ("name", Operator::ILike),
            ("title", Operator::ILike),
        ])
    }

    pub fn operator_for(&self, field: &str) -> Operator {
        self.operators.get(field).copied().unwrap_or(Operator::Eq)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
