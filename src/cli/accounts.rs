use comfy_table::{Cell, Table};
use rusqlite::{Connection, OptionalExtension};

use crate::db::get_connection;
use crate::error::{RecoError, Result};
use crate::fmt::{display_date, rupees};
use crate::models::BankAccount;
use crate::settings::db_path;
use crate::statement::{get_by_key, StatementFormat};

pub fn add_account(
    conn: &Connection,
    name: &str,
    number: Option<&str>,
    account_type: &str,
    format: Option<&str>,
) -> Result<Option<StatementFormat>> {
    let format = match format {
        Some(key) => Some(get_by_key(key).ok_or_else(|| RecoError::UnknownFormat(key.to_string()))?),
        None => StatementFormat::for_bank_name(name),
    };
    let existing: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
    conn.execute(
        "INSERT INTO accounts (name, account_number, account_type, statement_format, is_primary) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![name, number, account_type, format.map(|f| f.key()), (existing == 0) as i32],
    )?;
    Ok(format)
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<BankAccount>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, account_number, account_type, statement_format, current_balance, \
         last_statement_date, is_primary, is_active \
         FROM accounts ORDER BY is_primary DESC, name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(BankAccount {
                id: row.get(0)?,
                name: row.get(1)?,
                account_number: row.get(2)?,
                account_type: row.get(3)?,
                statement_format: row.get(4)?,
                current_balance: row.get(5)?,
                last_statement_date: row.get(6)?,
                is_primary: row.get(7)?,
                is_active: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn account_id(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM accounts WHERE name = ?1", [name], |row| row.get(0))
        .optional()?
        .ok_or_else(|| RecoError::UnknownAccount(name.to_string()))
}

pub fn set_primary(conn: &Connection, name: &str) -> Result<()> {
    let id = account_id(conn, name)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute("UPDATE accounts SET is_primary = 0 WHERE id != ?1", [id])?;
    tx.execute("UPDATE accounts SET is_primary = 1 WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(())
}

pub fn set_active(conn: &Connection, name: &str, active: bool) -> Result<()> {
    let id = account_id(conn, name)?;
    conn.execute(
        "UPDATE accounts SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active as i32, id],
    )?;
    Ok(())
}

pub fn add(name: &str, number: Option<&str>, account_type: &str, format: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let format = add_account(&conn, name, number, account_type, format)?;
    match format {
        Some(f) => println!("Added account: {name} ({} format)", f.name()),
        None => println!("Added account: {name} (format auto-detected on import)"),
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let accounts = list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Number", "Type", "Format", "Balance", "Last Statement", "Primary", "Active",
    ]);
    for a in accounts {
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(a.name),
            Cell::new(a.account_number.unwrap_or_default()),
            Cell::new(a.account_type),
            Cell::new(a.statement_format.unwrap_or_else(|| "auto".to_string())),
            Cell::new(rupees(a.current_balance)),
            Cell::new(a.last_statement_date.as_deref().map(display_date).unwrap_or_default()),
            Cell::new(if a.is_primary { "yes" } else { "" }),
            Cell::new(if a.is_active { "yes" } else { "no" }),
        ]);
    }
    println!("Bank Accounts\n{table}");
    Ok(())
}

pub fn primary(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    set_primary(&conn, name)?;
    println!("Primary bank updated: {name}");
    Ok(())
}

pub fn activate(name: &str, active: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    set_active(&conn, name, active)?;
    println!("{name} is now {}", if active { "active" } else { "inactive" });
    Ok(())
}
