use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{RecoError, Result};
use crate::settings::db_path;

const MATCH_TYPES: &[&str] = &["contains", "starts_with", "regex"];

pub fn add_rule(
    conn: &Connection,
    pattern: &str,
    expense_head: &str,
    vendor: &str,
    match_type: &str,
    priority: i64,
) -> Result<i64> {
    if !MATCH_TYPES.contains(&match_type) {
        return Err(RecoError::Other(format!(
            "Unknown match type '{match_type}' (expected one of: {})",
            MATCH_TYPES.join(", ")
        )));
    }
    if match_type == "regex" {
        regex::Regex::new(pattern).map_err(|e| RecoError::Other(format!("Invalid regex: {e}")))?;
    }
    conn.execute(
        "INSERT INTO rules (pattern, match_type, expense_head, vendor, priority) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![pattern, match_type, expense_head, vendor, priority],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_rule(conn: &Connection, id: i64) -> Result<String> {
    let row: std::result::Result<(String, i32), _> = conn.query_row(
        "SELECT pattern, is_active FROM rules WHERE id = ?1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );
    match row {
        Err(_) => Err(RecoError::Other(format!("No rule with ID {id}"))),
        Ok((_, 0)) => Err(RecoError::Other(format!("Rule {id} is already inactive"))),
        Ok((pattern, _)) => {
            conn.execute("UPDATE rules SET is_active = 0 WHERE id = ?1", [id])?;
            Ok(pattern)
        }
    }
}

pub fn add(pattern: &str, expense_head: &str, vendor: &str, match_type: &str, priority: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    add_rule(&conn, pattern, expense_head, vendor, match_type, priority)?;
    println!("Added rule: '{pattern}' \u{2192} {expense_head} / {vendor}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT id, pattern, match_type, expense_head, vendor, priority FROM rules \
         WHERE is_active = 1 ORDER BY priority DESC, id ASC",
    )?;
    let rows: Vec<(i64, String, String, String, String, i64)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Type", "Expense Head", "Vendor", "Priority"]);
    for (id, pattern, match_type, head, vendor, priority) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(pattern),
            Cell::new(match_type),
            Cell::new(head),
            Cell::new(vendor),
            Cell::new(priority),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let pattern = delete_rule(&conn, id)?;
    println!("Deleted rule {id}: '{pattern}'");
    Ok(())
}
