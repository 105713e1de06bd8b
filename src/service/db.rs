//! Database operations for services.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    service::{Service, ServiceId},
};

/// Create a service and return it with its generated ID.
///
/// # Errors
/// Returns [Error::MissingField] if `name` is blank.
pub fn create_service(name: &str, connection: &Connection) -> Result<Service, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::MissingField("nombre"));
    }

    connection.execute("INSERT INTO service (name) VALUES (?1);", (name,))?;

    Ok(Service {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
    })
}

/// Retrieve a single service by ID.
pub fn get_service(service_id: ServiceId, connection: &Connection) -> Result<Service, Error> {
    connection
        .prepare("SELECT id, name FROM service WHERE id = :id;")?
        .query_row(&[(":id", &service_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all services ordered by ID.
pub fn get_all_services(connection: &Connection) -> Result<Vec<Service>, Error> {
    connection
        .prepare("SELECT id, name FROM service ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_service| maybe_service.map_err(|error| error.into()))
        .collect()
}

/// Initialize the service table.
pub fn create_service_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS service (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Service, rusqlite::Error> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
