use sqlx::PgPool;
use tracing::debug;

use crate::clause::{build_update_clause, FieldMap, FieldTranslations, OperatorTable};
use crate::database::manager::DatabaseError;
use crate::database::models::{Job, JobDetail, JobFilter, NewJob};
use crate::database::params::{bind_param_query_as, SqlParam};

use super::company::CompanyRepository;
use super::{contains_pattern, where_clause};

const JOB_COLUMNS: &str = "id, title, salary, equity::float8 AS equity, company_handle";

pub struct JobRepository<'a> {
    pool: &'a PgPool,
    operators: &'a OperatorTable,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a PgPool, operators: &'a OperatorTable) -> Self {
        Self { pool, operators }
    }

    /// Job fields already match their columns, so updates translate nothing.
    pub fn update_translations() -> FieldTranslations {
        FieldTranslations::new()
    }

    /// Criteria in canonical order with their columns.
    ///
    /// `hasEquity = true` becomes `equity > 0`; `false` places no restriction.
    pub fn filter_fields(filter: &JobFilter) -> (FieldMap<SqlParam>, FieldTranslations) {
        let mut fields = FieldMap::new();
        let mut columns = FieldTranslations::new();

        if let Some(title) = &filter.title {
            fields.insert("title".to_string(), SqlParam::text(contains_pattern(title)));
            columns.insert("title".to_string(), "title".to_string());
        }
        if let Some(min) = filter.min_salary {
            fields.insert("minSalary".to_string(), SqlParam::Int(Some(min)));
            columns.insert("minSalary".to_string(), "salary".to_string());
        }
        if filter.has_equity == Some(true) {
            fields.insert("hasEquity".to_string(), SqlParam::Int(Some(0)));
            columns.insert("hasEquity".to_string(), "equity".to_string());
        }

        (fields, columns)
    }

    /// Insert a job; the owning company must already exist.
    pub async fn create(&self, data: &NewJob) -> Result<Job, DatabaseError> {
        let company: Option<(String,)> = sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.company_handle)
            .fetch_optional(self.pool)
            .await?;

        if company.is_none() {
            return Err(DatabaseError::InvalidReference(format!(
                "Company with handle {} does not exist",
                data.company_handle
            )));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(self.pool)
            .await?;

        debug!("Created job {} for {}", job.id, job.company_handle);
        Ok(job)
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(&self, filter: &JobFilter) -> Result<Vec<Job>, DatabaseError> {
        let (fields, columns) = Self::filter_fields(filter);
        let (where_sql, values) = where_clause(&fields, &columns, self.operators)?;

        let sql = format!("SELECT {} FROM jobs {} ORDER BY title, id", JOB_COLUMNS, where_sql);
        let mut q = sqlx::query_as::<_, Job>(&sql);
        for p in values.iter() {
            q = bind_param_query_as(q, p);
        }

        Ok(q.fetch_all(self.pool).await?)
    }

    /// A job with its company embedded.
    pub async fn get(&self, id: i32) -> Result<JobDetail, DatabaseError> {
        let job = self.find(id).await?;
        let company = CompanyRepository::new(self.pool, self.operators)
            .find(&job.company_handle)
            .await?;

        Ok(JobDetail::new(job, company))
    }

    pub async fn find(&self, id: i32) -> Result<Job, DatabaseError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    pub async fn find_by_company(&self, handle: &str) -> Result<Vec<Job>, DatabaseError> {
        let sql = format!("SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id", JOB_COLUMNS);
        Ok(sqlx::query_as::<_, Job>(&sql).bind(handle).fetch_all(self.pool).await?)
    }

    pub async fn update(&self, id: i32, data: &FieldMap<SqlParam>) -> Result<Job, DatabaseError> {
        let clause = build_update_clause(Some(data), Some(&Self::update_translations()))?;

        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            clause.to_sql(),
            clause.next_param_index(),
            JOB_COLUMNS
        );
        let mut q = sqlx::query_as::<_, Job>(&sql);
        for p in clause.values.iter() {
            q = bind_param_query_as(q, p);
        }

        q.bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    pub async fn remove(&self, id: i32) -> Result<(), DatabaseError> {
        let deleted: Option<(i32,)> = sqlx::query_as("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }
}
