pub mod classes_schema;
pub mod classes_service;

pub use classes_schema::CreateClass;
pub use classes_service::ClassesService;
