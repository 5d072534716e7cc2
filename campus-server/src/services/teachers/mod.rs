pub mod teachers_service;

pub use teachers_service::TeachersService;
