//! # Seed Data Generator
//!
//! Populates a fresh database with a demo pharmacy for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p medora-db --bin seed
//!
//! # Specify database path and owner password
//! cargo run -p medora-db --bin seed -- --db ./data/medora.db --password secret123
//! ```
//!
//! ## Generated Data
//! - Owner account `owner` (password `medora123` unless overridden)
//! - Categories: tablets, syrups, topicals, injectables
//! - Two suppliers
//! - Medicines with two or three batches each. Expiries are spread over
//!   "already expired", "expiring this month" and "next year" so the
//!   FEFO, expiry and low-stock screens all have something to show.

use chrono::{Duration, Utc};
use medora_core::{NewBatch, NewCategory, NewMedicine, NewSupplier, NewUser, Role};
use medora_db::{Database, DbConfig};
use std::env;

/// (category, name, generic, brand, barcode, price cents, reorder level)
const MEDICINES: &[(&str, &str, &str, &str, &str, i64, i64)] = &[
    ("Tablets", "Paracetamol 500mg", "Paracetamol", "Cetamol", "8901234500011", 200, 50),
    ("Tablets", "Amoxicillin 250mg", "Amoxicillin", "Amoxil", "8901234500028", 1200, 20),
    ("Tablets", "Cetirizine 10mg", "Cetirizine", "Zyrtec", "8901234500035", 350, 30),
    ("Tablets", "Omeprazole 20mg", "Omeprazole", "Losec", "8901234500042", 800, 25),
    ("Tablets", "Metformin 500mg", "Metformin", "Glucophage", "8901234500059", 450, 40),
    ("Syrups", "Benadryl Cough Syrup", "Diphenhydramine", "Benadryl", "8901234500066", 1850, 10),
    ("Syrups", "Oral Rehydration Salts", "ORS", "Jeevan Jal", "8901234500073", 150, 60),
    ("Topicals", "Diclofenac Gel 1%", "Diclofenac", "Voltaren", "8901234500080", 2400, 8),
    ("Topicals", "Povidone Iodine 5%", "Povidone Iodine", "Betadine", "8901234500097", 1600, 8),
    ("Injectables", "Insulin Glargine", "Insulin Glargine", "Lantus", "8901234500103", 95000, 3),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Tablets", "Oral solid dosage"),
    ("Syrups", "Oral liquids"),
    ("Topicals", "Creams, gels and antiseptics"),
    ("Injectables", "Cold-chain injectables"),
];

/// (days until expiry, quantity) for each generated batch.
const BATCH_PLAN: &[(i64, i64)] = &[(-10, 12), (20, 8), (400, 60)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./medora_dev.db");
    let mut password = String::from("medora123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Medora POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./medora_dev.db)");
                println!("  -p, --password <PASS>   Owner password (default: medora123)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Medora POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.users().count().await? > 0 {
        println!("⚠ Database already has users");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let owner = db
        .users()
        .create(&NewUser {
            username: "owner".to_string(),
            name: "Store Owner".to_string(),
            password,
            role: Role::Owner,
            phone: None,
        })
        .await?;
    println!("✓ Owner account: {}", owner.username);

    let mut category_ids = Vec::new();
    for (name, description) in CATEGORIES {
        let category = db
            .categories()
            .create(&NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        category_ids.push((*name, category.id));
    }
    println!("✓ {} categories", category_ids.len());

    let mut supplier_ids = Vec::new();
    for (name, contact) in [("Everest Pharma", "Ram Shrestha"), ("Himalaya Distributors", "Sita Gurung")] {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: name.to_string(),
                contact_person: Some(contact.to_string()),
                ..Default::default()
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    let today = db.calendar().local_date(Utc::now());
    let mut batches = 0;

    for (idx, (category, name, generic, brand, barcode, price, reorder)) in MEDICINES.iter().enumerate() {
        let category_id = category_ids
            .iter()
            .find(|(n, _)| n == category)
            .map(|(_, id)| id.clone());

        let medicine = db
            .medicines()
            .create(&NewMedicine {
                name: name.to_string(),
                generic_name: Some(generic.to_string()),
                brand: Some(brand.to_string()),
                barcode: Some(barcode.to_string()),
                category_id,
                unit_price_cents: *price,
                reorder_level: Some(*reorder),
                requires_prescription: *category == "Injectables" || generic.starts_with("Amox"),
                ..Default::default()
            })
            .await?;

        // Every third medicine skips its big lot so it shows up as low stock.
        let plan = if idx % 3 == 0 { &BATCH_PLAN[..2] } else { BATCH_PLAN };

        for (lot, (days, quantity)) in plan.iter().enumerate() {
            let input = NewBatch {
                medicine_id: medicine.id.clone(),
                batch_number: format!("{}-{:02}", &barcode[barcode.len() - 4..], lot + 1),
                quantity: *quantity,
                expiry_date: today + Duration::days(*days),
                manufacture_date: Some(today - Duration::days(365)),
                purchase_price_cents: price * 70 / 100,
                selling_price_cents: *price,
                supplier_id: Some(supplier_ids[idx % supplier_ids.len()].clone()),
            };

            if let Err(e) = db.batches().create(&input).await {
                eprintln!("Failed to insert batch {}: {}", input.batch_number, e);
                continue;
            }
            batches += 1;
        }
    }
    println!("✓ {} medicines, {} batches", MEDICINES.len(), batches);

    println!();
    println!("Verifying...");
    println!("  Search 'para': {} results", db.medicines().search("para").await?.len());
    println!("  Low stock: {}", db.medicines().low_stock().await?.len());
    println!("  Expiring in 30 days: {}", db.batches().expiring(30).await?.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
