use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{RecoError, Result};
use crate::fmt::{display_date, rupees, signed_rupees};
use crate::reports::{get_months, get_transactions, get_vendors, TransactionFilter};
use crate::settings::db_path;

/// Some("") clears the field, None leaves it alone.
pub fn edit_transaction(
    conn: &Connection,
    id: i64,
    expense_head: Option<&str>,
    vendor: Option<&str>,
    remark: Option<&str>,
) -> Result<()> {
    let exists: bool = conn
        .query_row("SELECT count(*) FROM transactions WHERE id = ?1", [id], |r| r.get::<_, i64>(0))
        .map(|n| n > 0)?;
    if !exists {
        return Err(RecoError::Other(format!("No transaction with ID {id}")));
    }

    let tx = conn.unchecked_transaction()?;
    for (column, value) in [("expense_head", expense_head), ("vendor", vendor), ("remark", remark)] {
        if let Some(value) = value {
            let value = if value.is_empty() { None } else { Some(value) };
            tx.execute(
                &format!("UPDATE transactions SET {column} = ?1 WHERE id = ?2"),
                rusqlite::params![value, id],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(RecoError::Other(format!("No transaction with ID {id}")));
    }
    Ok(())
}

pub fn list(filter: TransactionFilter) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let register = get_transactions(&conn, &filter)?;

    let description = filter.describe();
    if !description.is_empty() {
        println!("{}", description.join(" | ").dimmed());
    }
    if register.rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Bank", "Description", "Expense Head", "Vendor", "Remark", "Amount",
    ]);
    for t in &register.rows {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(display_date(&t.date)),
            Cell::new(t.bank_name.as_deref().unwrap_or("")),
            Cell::new(&t.description),
            Cell::new(t.expense_head.as_deref().unwrap_or("")),
            Cell::new(t.vendor.as_deref().unwrap_or("")),
            Cell::new(t.remark.as_deref().unwrap_or("")),
            Cell::new(signed_rupees(t.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    println!("{} transaction(s), total {}", register.count, rupees(register.total));
    Ok(())
}

pub fn months() -> Result<()> {
    let conn = get_connection(&db_path())?;
    for m in get_months(&conn)? {
        println!("{m}");
    }
    Ok(())
}

pub fn vendors() -> Result<()> {
    let conn = get_connection(&db_path())?;
    for v in get_vendors(&conn)? {
        println!("{v}");
    }
    Ok(())
}

pub fn edit(id: i64, expense_head: Option<&str>, vendor: Option<&str>, remark: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    edit_transaction(&conn, id, expense_head, vendor, remark)?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_transaction(&conn, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn seeded_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO transactions (date, description, amount, expense_head, vendor) \
             VALUES ('2024-03-05', 'NEFT AVINASH', -500.0, 'Other Cost', 'Avinash')",
            [],
        )
        .unwrap();
        (dir, conn)
    }

    fn fields(conn: &Connection) -> (Option<String>, Option<String>, Option<String>) {
        conn.query_row(
            "SELECT expense_head, vendor, remark FROM transactions WHERE id = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap()
    }

    #[test]
    fn test_edit_sets_only_given_fields() {
        let (_dir, conn) = seeded_db();
        edit_transaction(&conn, 1, None, None, Some("March advance")).unwrap();
        assert_eq!(
            fields(&conn),
            (
                Some("Other Cost".to_string()),
                Some("Avinash".to_string()),
                Some("March advance".to_string())
            )
        );
    }

    #[test]
    fn test_edit_empty_string_clears() {
        let (_dir, conn) = seeded_db();
        edit_transaction(&conn, 1, Some(""), Some("Avinash K"), None).unwrap();
        assert_eq!(fields(&conn), (None, Some("Avinash K".to_string()), None));
    }

    #[test]
    fn test_edit_and_delete_unknown_id() {
        let (_dir, conn) = seeded_db();
        assert!(edit_transaction(&conn, 42, Some("x"), None, None).is_err());
        assert!(delete_transaction(&conn, 42).is_err());
    }

    #[test]
    fn test_delete() {
        let (_dir, conn) = seeded_db();
        delete_transaction(&conn, 1).unwrap();
        let n: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 0);
    }
}
