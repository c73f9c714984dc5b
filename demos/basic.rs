//! Basic usage example for SparseDb
//!
//! This example demonstrates the fundamental operations:
//! - Declaring a schema
//! - Writing rows
//! - Reading rows
//! - Deleting a column

use sparsedb::{KeyType, MemIndex, Options, Row, RowStore, Schema, Value, WriteTimestamp};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Schemas can be kept as JSON next to the data they describe
    let schema = Schema::from_json(
        r#"{"name":"employee","primary_key":"id","primary_key_type":"Integer"}"#,
    )?;
    println!("Schema: {}", schema);

    let options = Options::default().key_capacity(256);
    let store = RowStore::with_options(MemIndex::new(), schema, options)?;

    // Write some rows
    println!("Writing rows...");
    for (id, name, employer) in [(12, "Bryan", "SAIC"), (13, "Martyn", "SYSTAP"), (7, "Mike", "SAIC")] {
        let row = Row::new().with("id", id).with("Name", name).with("Employer", employer);
        let ts = store.write(&row, WriteTimestamp::Auto)?;
        println!("  wrote row {} at {}", id, ts);
    }

    // Read a row
    println!("Reading row 12...");
    if let Some(row) = store.read(&Value::Int(12))? {
        for (column, value) in &row {
            println!("  {} = {}", column, value);
        }
    }

    // Delete a column
    println!("Deleting Employer of row 12...");
    store.write(&Row::new().with("id", 12).with("Employer", Value::Absent), WriteTimestamp::Auto)?;
    match store.read(&Value::Int(12))? {
        Some(row) if row.contains("Employer") => println!("  Employer still exists (unexpected)"),
        Some(_) => println!("  Employer was successfully deleted"),
        None => println!("  row 12 vanished (unexpected)"),
    }

    // Scan every row in primary-key order
    println!("Scanning...");
    for row in store.scan(None, None)? {
        let row = row?;
        println!("  {:?}", row.iter().map(|(c, v)| format!("{}={}", c, v)).collect::<Vec<_>>());
    }

    // Read a row that was never written
    match store.read(&Value::Int(999))? {
        Some(_) => println!("row 999 exists (unexpected)"),
        None => println!("row 999 not found"),
    }

    Ok(())
}
