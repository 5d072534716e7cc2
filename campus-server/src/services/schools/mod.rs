pub mod schools_schema;
pub mod schools_service;

pub use schools_schema::CreateSchool;
pub use schools_service::SchoolsService;
