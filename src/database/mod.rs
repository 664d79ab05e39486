pub mod manager;
pub mod models;
pub mod params;
pub mod repositories;

pub use manager::{DatabaseError, DatabaseManager};
pub use params::SqlParam;
pub use repositories::{CompanyRepository, JobRepository, UserRepository};
