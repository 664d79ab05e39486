use sqlx::PgPool;
use tracing::debug;

use crate::clause::{build_update_clause, translations, FieldMap, FieldTranslations, OperatorTable};
use crate::database::manager::DatabaseError;
use crate::database::models::{Company, CompanyDetail, CompanyFilter, CompanyJob, NewCompany};
use crate::database::params::{bind_param_query_as, SqlParam};

use super::job::JobRepository;
use super::{contains_pattern, where_clause};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

pub struct CompanyRepository<'a> {
    pool: &'a PgPool,
    operators: &'a OperatorTable,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(pool: &'a PgPool, operators: &'a OperatorTable) -> Self {
        Self { pool, operators }
    }

    /// Logical → column names accepted by `update`.
    pub fn update_translations() -> FieldTranslations {
        translations([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
    }

    /// Criteria in canonical order, with a translation entry for each one present.
    ///
    /// Both employee bounds collapse onto `num_employees`.
    pub fn filter_fields(filter: &CompanyFilter) -> (FieldMap<SqlParam>, FieldTranslations) {
        let mut fields = FieldMap::new();
        let mut columns = FieldTranslations::new();

        if let Some(name) = &filter.name {
            fields.insert("name".to_string(), SqlParam::text(contains_pattern(name)));
            columns.insert("name".to_string(), "name".to_string());
        }
        if let Some(min) = filter.min_employees {
            fields.insert("minEmployees".to_string(), SqlParam::Int(Some(min)));
            columns.insert("minEmployees".to_string(), "num_employees".to_string());
        }
        if let Some(max) = filter.max_employees {
            fields.insert("maxEmployees".to_string(), SqlParam::Int(Some(max)));
            columns.insert("maxEmployees".to_string(), "num_employees".to_string());
        }

        (fields, columns)
    }

    /// Insert a company; an existing handle is a conflict.
    pub async fn create(&self, data: &NewCompany) -> Result<Company, DatabaseError> {
        let duplicate: Option<(String,)> = sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(self.pool)
            .await?;

        if duplicate.is_some() {
            return Err(DatabaseError::Conflict(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(self.pool)
            .await?;

        debug!("Created company {}", company.handle);
        Ok(company)
    }

    /// All companies matching `filter`, ordered by name. No match is an empty list.
    pub async fn find_all(&self, filter: &CompanyFilter) -> Result<Vec<Company>, DatabaseError> {
        let (fields, columns) = Self::filter_fields(filter);
        let (where_sql, values) = where_clause(&fields, &columns, self.operators)?;

        let sql = format!("SELECT {} FROM companies {} ORDER BY name", COMPANY_COLUMNS, where_sql);
        let mut q = sqlx::query_as::<_, Company>(&sql);
        for p in values.iter() {
            q = bind_param_query_as(q, p);
        }

        Ok(q.fetch_all(self.pool).await?)
    }

    /// A company with its jobs, ordered by id.
    pub async fn get(&self, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let company = self.find(handle).await?;

        let jobs = JobRepository::new(self.pool, self.operators)
            .find_by_company(handle)
            .await?
            .into_iter()
            .map(CompanyJob::from)
            .collect();

        Ok(CompanyDetail { company, jobs })
    }

    /// The bare company row.
    pub async fn find(&self, handle: &str) -> Result<Company, DatabaseError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
        sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    /// Partial update; only the supplied fields change.
    pub async fn update(&self, handle: &str, data: &FieldMap<SqlParam>) -> Result<Company, DatabaseError> {
        let clause = build_update_clause(Some(data), Some(&Self::update_translations()))?;

        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            clause.to_sql(),
            clause.next_param_index(),
            COMPANY_COLUMNS
        );
        let mut q = sqlx::query_as::<_, Company>(&sql);
        for p in clause.values.iter() {
            q = bind_param_query_as(q, p);
        }

        q.bind(handle)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    pub async fn remove(&self, handle: &str) -> Result<(), DatabaseError> {
        let deleted: Option<(String,)> = sqlx::query_as("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(self.pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound(format!("No company: {}", handle))),
        }
    }
}
