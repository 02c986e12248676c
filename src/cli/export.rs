use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{RecoError, Result};
use crate::fmt::display_date;
use crate::reports::{get_transactions, TransactionFilter};
use crate::settings::{db_path, get_data_dir};

const HEADER: [&str; 7] = ["Date", "Bank", "Description", "Expense Head", "Remark", "Vendor", "Amount"];

fn default_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir()
        .join("exports")
        .join(format!("bank-transactions-{date}.csv"))
}

/// Write the filtered transactions as CSV. Returns the number of rows written.
pub fn export_csv(conn: &Connection, filter: &TransactionFilter, path: &Path) -> Result<usize> {
    let register = get_transactions(conn, filter)?;
    if register.rows.is_empty() {
        return Err(RecoError::Other("No transactions to export".to_string()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;
    for t in &register.rows {
        writer.write_record([
            display_date(&t.date),
            t.bank_name.clone().unwrap_or_default(),
            t.description.clone(),
            t.expense_head.clone().unwrap_or_default(),
            t.remark.clone().unwrap_or_default(),
            t.vendor.clone().unwrap_or_default(),
            format!("{:.2}", t.amount),
        ])?;
    }
    writer.flush()?;
    Ok(register.count)
}

pub fn run(filter: TransactionFilter, output: Option<String>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let path = output.map(PathBuf::from).unwrap_or_else(default_path);
    let count = export_csv(&conn, &filter, &path)?;
    println!("Wrote {count} transaction(s) to {}", path.display());
    Ok(())
}
