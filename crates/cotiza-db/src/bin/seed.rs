//! # Catalog Seed
//!
//! Populates the database with a starter material catalog and accessory
//! cost table for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database from COTIZA_DB_PATH (default ./cotiza.db)
//! cargo run -p cotiza-db --bin seed
//!
//! # Specify database path
//! cargo run -p cotiza-db --bin seed -- --db ./data/cotiza.db
//! ```
//!
//! ## Seeded Rows
//! - Boards (melamine, MDF, plywood) priced per sheet-m²
//! - Edge banding priced per linear metre
//! - Handles, slides and hinges priced per piece
//! - One accessory row per canonical category (patas, clip_patas, mensulas,
//!   kit_tornillo, cif)

use std::env;
use std::path::PathBuf;

use cotiza_core::{AccessoryCostEntry, MaterialKind};
use cotiza_db::{logging, CotizaConfig, Database};
use rust_decimal::Decimal;
use tracing::{error, info};

/// Catalog materials: (name, kind, unit cost in cents).
const MATERIALS: &[(&str, MaterialKind, i64)] = &[
    ("Melamina blanca 16mm", MaterialKind::Tablero, 12000),
    ("Melamina nogal 16mm", MaterialKind::Tablero, 14500),
    ("MDF 15mm", MaterialKind::Tablero, 11000),
    ("Triplay de pino 18mm", MaterialKind::Tablero, 16800),
    ("Chapa de roble 16mm", MaterialKind::Tablero, 26000),
    ("Cubrecanto PVC blanco 19mm", MaterialKind::Cubrecanto, 850),
    ("Cubrecanto PVC nogal 19mm", MaterialKind::Cubrecanto, 1100),
    ("Cubrecanto ABS 2mm", MaterialKind::Cubrecanto, 1800),
    ("Jaladera barra 128mm", MaterialKind::Jaladera, 4500),
    ("Jaladera oculta gola", MaterialKind::Jaladera, 9800),
    ("Corredera telescópica 45cm", MaterialKind::Corredera, 12500),
    ("Corredera cierre suave 50cm", MaterialKind::Corredera, 32000),
    ("Bisagra bidimensional", MaterialKind::Bisagra, 1800),
    ("Bisagra cierre suave", MaterialKind::Bisagra, 4500),
    ("Mecanismo tip-on largo", MaterialKind::Accesorio, 21000),
];

/// Accessory cost table: (name, category, unit cost in cents).
const ACCESSORIES: &[(&str, &str, i64)] = &[
    ("Pata niveladora 10cm", "patas", 1000),
    ("Clip para zoclo", "clip_patas", 200),
    ("Ménsula para entrepaño", "mensulas", 90),
    ("Kit de tornillería", "kit_tornillo", 3000),
    ("Costo indirecto de fabricación", "cif", 10000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let mut config = CotizaConfig::load()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cotiza Catalog Seed");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $COTIZA_DB_PATH or ./cotiza.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cotiza Catalog Seed");
    println!("======================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.materials().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} materials", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let materials = db.materials();
    let mut seeded = 0;
    for (name, kind, cents) in MATERIALS {
        match materials.insert(name, *kind, Decimal::new(*cents, 2)).await {
            Ok(material) => {
                info!(id = material.id, name = %material.name, "Material seeded");
                seeded += 1;
            }
            Err(e) => error!(name = %name, error = %e, "Failed to insert material"),
        }
    }
    println!("✓ Seeded {} materials", seeded);

    let accessories = db.accessories();
    let mut seeded = 0;
    for (name, category, cents) in ACCESSORIES {
        let entry = AccessoryCostEntry::new(*name, *category, Decimal::new(*cents, 2))?;
        match accessories.insert(&entry).await {
            Ok(_) => seeded += 1,
            Err(e) => error!(name = %name, error = %e, "Failed to insert accessory"),
        }
    }
    println!("✓ Seeded {} accessory rows", seeded);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
