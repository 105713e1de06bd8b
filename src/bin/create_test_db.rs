use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use gastos_rs::{create_service, initialize_db};

/// The services that come with every new database.
const SERVICES: [&str; 12] = [
    "ARBA",
    "INTERNET",
    "EXPENSAS_COMUNES",
    "EXPENSAS_EXTRAS",
    "GAS",
    "LUZ",
    "MONOTRIBUTO",
    "MOVISTAR",
    "PERSONAL",
    "PROTECCION_CIUDADANA",
    "TASAS_RETRIBUTIVAS",
    "SERVICIOS_SANITARIOS",
];

/// A utility for creating a test database for the gastos dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The year to create sample expenses for.
    #[arg(long, short, default_value_t = 2024)]
    year: i32,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'gastos.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'gastos.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating services...");
    let services = SERVICES
        .iter()
        .map(|name| create_service(name, &conn))
        .collect::<Result<Vec<_>, _>>()?;

    println!("Creating sample expenses for {}...", args.year);
    for (index, service) in services.iter().enumerate() {
        let base_cents = 1_000 * (index as i64 + 1);

        for month in 1..=12_i64 {
            // Prices drift upwards through the year.
            let amount = base_cents + base_cents * month / 20;

            conn.execute(
                "INSERT INTO expense (service_id, year, month, amount) VALUES (?1, ?2, ?3, ?4)",
                (service.id, args.year, month, amount),
            )?;
        }
    }

    println!("Success!");

    Ok(())
}
