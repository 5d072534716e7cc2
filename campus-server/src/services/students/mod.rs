pub mod students_schema;
pub mod students_service;

pub use students_schema::CreateStudent;
pub use students_service::StudentsService;
