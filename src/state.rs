use sqlx::PgPool;
use std::sync::Arc;

use crate::clause::OperatorTable;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub operators: Arc<OperatorTable>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            operators: Arc::new(OperatorTable::jobly()),
            bcrypt_cost,
        }
    }
}
