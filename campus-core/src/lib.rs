//! campus-core: framework-agnostic core for Campus.
//!
//! Holds everything that does not care about HTTP: the tenant and session
//! model, the closed role set, typed errors, the table-backend seam with its
//! in-memory implementation, school-code rules, the route table with its
//! guard, and the dashboard dispatcher.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod memory;
pub mod records;
pub mod routes;
pub mod school_code;
pub mod session;
pub mod tenant;
pub mod validate;

pub use backend::{Filter, Order, Query, Table, TableBackend};
pub use config::{CampusConfig, CampusConfigSnapshot};
pub use dashboard::{dispatch, Dashboard, NavLink, StatCard};
pub use errors::{CampusError, CampusResult, ErrorKind};
pub use memory::MemoryBackend;
pub use records::{ClassRecord, RoleAssignment, School, SchoolType, StudentRecord};
pub use routes::{authorize, Access, Route, LOGIN_REDIRECT};
pub use school_code::{generate_code, slugify, SchoolCode};
pub use session::{Role, Session};
pub use tenant::{TenantContext, TenantId};
