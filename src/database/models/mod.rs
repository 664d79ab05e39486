pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyFilter, NewCompany};
pub use job::{CompanyJob, Job, JobDetail, JobFilter, NewJob};
pub use user::{NewUser, User, UserDetail};
