use rusqlite::Connection;

use crate::error::{RecoError, Result};
use crate::models::StoredTransaction;

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account: Option<String>,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub vendor: Option<String>,
}

impl TransactionFilter {
    fn to_sql(&self) -> Result<(String, Vec<String>)> {
        let mut clauses = Vec::new();
        let mut params: Vec<String> = Vec::new();
        if let Some(account) = &self.account {
            params.push(account.clone());
            clauses.push(format!(
                "t.bank_account_id = (SELECT id FROM accounts WHERE name = ?{})",
                params.len()
            ));
        }
        if let Some(month) = &self.month {
            let valid = chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok();
            if !valid {
                return Err(RecoError::Other(format!("Invalid month '{month}', expected YYYY-MM")));
            }
            params.push(format!("{month}%"));
            clauses.push(format!("t.date LIKE ?{}", params.len()));
        }
        if let Some(vendor) = &self.vendor {
            params.push(vendor.clone());
            clauses.push(format!("t.vendor = ?{}", params.len()));
        }
        let clause = if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        };
        Ok((clause, params))
    }

    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(a) = &self.account {
            out.push(format!("Bank: {a}"));
        }
        if let Some(m) = &self.month {
            let label = chrono::NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|_| m.clone());
            out.push(format!("Month: {label}"));
        }
        if let Some(v) = &self.vendor {
            out.push(format!("Vendor: {v}"));
        }
        out
    }
}

pub struct Register {
    pub rows: Vec<StoredTransaction>,
    pub total: f64,
    pub count: usize,
}

/// Stored transactions matching the filter, newest first.
pub fn get_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Register> {
    let (clause, params) = filter.to_sql()?;
    let sql = format!(
        "SELECT t.id, t.date, t.description, t.amount, t.expense_head, t.vendor, t.remark, t.bank_name \
         FROM transactions t \
         WHERE {clause} \
         ORDER BY t.date DESC, t.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<StoredTransaction> = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(StoredTransaction {
                id: row.get(0)?,
                date: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
                expense_head: row.get(4)?,
                vendor: row.get(5)?,
                remark: row.get(6)?,
                bank_name: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total: f64 = rows.iter().map(|r| r.amount).sum();
    let count = rows.len();
    Ok(Register { rows, total, count })
}

/// Distinct `YYYY-MM` months with transactions, newest first.
pub fn get_months(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT substr(date, 1, 7) AS month FROM transactions ORDER BY month DESC",
    )?;
    let months = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(months)
}

/// Distinct non-empty vendors, sorted.
pub fn get_vendors(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT vendor FROM transactions WHERE vendor IS NOT NULL AND vendor != '' ORDER BY vendor",
    )?;
    let vendors = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(vendors)
}
