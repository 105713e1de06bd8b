//! Services (servicios) that expenses are attributed to.
//!
//! Services are reference data: the dashboard only reads them. New services
//! are added by administration tools such as the `create_test_db` binary.

mod db;
mod domain;

pub use db::{create_service, create_service_table, get_all_services, get_service};
pub use domain::{Service, ServiceId, display_name, service_color};
