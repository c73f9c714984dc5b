//! Versioned reads with SparseDb
//!
//! Every write adds revisions at a new timestamp, so earlier states of a row
//! stay readable. This example replays an employment history and reads the
//! row as of each point in time.

use sparsedb::{KeyType, MemIndex, Row, RowStore, Schema, Value, WriteTimestamp};
use std::sync::Arc;

fn column(row: &Row, name: &str) -> String {
    row.get(name).map_or_else(|| "-".to_string(), Value::to_string)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    // Two schemas sharing one index
    let index = Arc::new(MemIndex::new());
    let employees = RowStore::new(index.clone(), Schema::new("employee", "id", KeyType::Integer)?)?;
    let employers =
        RowStore::new(index.clone(), Schema::new("employer", "name", KeyType::UnicodeText)?)?;

    employees.write(
        &Row::new().with("id", 12).with("Name", "Bryan").with("Employer", "SAIC"),
        WriteTimestamp::At(100),
    )?;
    employees.write(&Row::new().with("id", 12).with("Employer", "SYSTAP"), WriteTimestamp::At(200))?;
    employees.write(&Row::new().with("id", 12).with("Employer", Value::Absent), WriteTimestamp::At(300))?;

    employers.write(&Row::new().with("name", "SAIC").with("Founded", 1969), WriteTimestamp::At(50))?;
    employers.write(&Row::new().with("name", "SYSTAP").with("Founded", 2006), WriteTimestamp::At(50))?;

    for as_of in [Some(50), Some(100), Some(200), Some(300), None] {
        let label = as_of.map_or("latest".to_string(), |ts| format!("t={}", ts));
        match employees.read_at(&Value::Int(12), as_of)? {
            Some(row) => println!(
                "{:>7}: Name={}, Employer={}",
                label,
                column(&row, "Name"),
                column(&row, "Employer")
            ),
            None => println!("{:>7}: no such row", label),
        }
    }

    println!("Employers:");
    for row in employers.scan(None, None)? {
        let row = row?;
        println!("  {} (founded {})", column(&row, "name"), column(&row, "Founded"));
    }

    println!("Index holds {} revisions", index.len());
    Ok(())
}
