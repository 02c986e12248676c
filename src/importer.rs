use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::categorizer::load_rules;
use crate::dedup::{existing_keys, filter_duplicates};
use crate::error::{RecoError, Result};
use crate::statement::{get_by_key, parse_amount, parse_statement, read_grid, StatementFormat, StatementParse};

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

struct TargetAccount {
    id: i64,
    name: String,
    statement_format: Option<String>,
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TargetAccount> {
    Ok(TargetAccount {
        id: row.get(0)?,
        name: row.get(1)?,
        statement_format: row.get(2)?,
    })
}

/// The named account, or the primary one (first by name if none is primary).
fn resolve_account(conn: &Connection, account_name: Option<&str>) -> Result<TargetAccount> {
    match account_name {
        Some(name) => conn
            .query_row(
                "SELECT id, name, statement_format FROM accounts WHERE name = ?1",
                [name],
                account_from_row,
            )
            .optional()?
            .ok_or_else(|| RecoError::UnknownAccount(name.to_string())),
        None => conn
            .query_row(
                "SELECT id, name, statement_format FROM accounts \
                 ORDER BY is_primary DESC, is_active DESC, name LIMIT 1",
                [],
                account_from_row,
            )
            .optional()?
            .ok_or(RecoError::NoAccounts),
    }
}

#[derive(Debug)]
pub struct ImportResult {
    pub account_name: String,
    pub format: StatementFormat,
    pub imported: usize,
    pub duplicates: usize,
    pub closing_balance: String,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        if self.imported == 0 {
            "All transactions already exist in the database.".to_string()
        } else if self.duplicates > 0 {
            format!(
                "Imported {} new transaction{}. Skipped {} duplicate{}.",
                self.imported,
                plural(self.imported),
                self.duplicates,
                plural(self.duplicates)
            )
        } else {
            format!(
                "Successfully imported {} transaction{}",
                self.imported,
                plural(self.imported)
            )
        }
    }
}

/// Parse a statement file and persist the rows not already stored. Either every
/// new row is committed along with the account balance update, or nothing is.
pub fn import_file(
    conn: &Connection,
    file_path: &Path,
    account_name: Option<&str>,
    format_key: Option<&str>,
) -> Result<ImportResult> {
    let account = resolve_account(conn, account_name)?;

    let hint = match format_key {
        Some(key) => Some(get_by_key(key).ok_or_else(|| RecoError::UnknownFormat(key.to_string()))?),
        None => account.statement_format.as_deref().and_then(get_by_key),
    };

    let grid = read_grid(file_path)?;
    let rules = load_rules(conn)?;
    let StatementParse {
        format,
        transactions,
        closing_balance,
        ..
    } = parse_statement(&grid, hint, &rules)?;
    if transactions.is_empty() {
        return Err(RecoError::EmptyStatement(
            "No transactions found in the statement".to_string(),
        ));
    }

    let min_date = transactions.iter().map(|t| t.date).min().map(|d| d.format("%Y-%m-%d").to_string());
    let max_date = transactions.iter().map(|t| t.date).max().map(|d| d.format("%Y-%m-%d").to_string());

    let existing = existing_keys(conn)?;
    let outcome = filter_duplicates(transactions, &existing);
    info!(
        account = %account.name,
        fresh = outcome.fresh.len(),
        duplicates = outcome.duplicates,
        "deduplicated statement rows"
    );

    if outcome.fresh.is_empty() {
        return Ok(ImportResult {
            account_name: account.name,
            format,
            imported: 0,
            duplicates: outcome.duplicates,
            closing_balance,
        });
    }

    let checksum = compute_checksum(file_path)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO imports (filename, account_id, statement_format, record_count, duplicate_count, \
         date_range_start, date_range_end, closing_balance, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            account.id,
            format.key(),
            outcome.fresh.len() as i64,
            outcome.duplicates as i64,
            min_date,
            max_date,
            closing_balance,
            checksum,
        ],
    )?;
    let import_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO transactions (date, description, amount, expense_head, vendor, bank_account_id, bank_name, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for txn in &outcome.fresh {
            stmt.execute(rusqlite::params![
                txn.date_key(),
                txn.description,
                txn.amount,
                txn.expense_head,
                txn.vendor,
                account.id,
                account.name,
                import_id,
            ])?;
        }
    }
    // Keep the previous balance when the statement has no usable balance column.
    tx.execute(
        "UPDATE accounts SET current_balance = COALESCE(?1, current_balance), last_statement_date = ?2 WHERE id = ?3",
        rusqlite::params![parse_amount(&closing_balance), max_date, account.id],
    )?;
    tx.commit()?;
    info!(account = %account.name, import_id, "committed statement import");

    Ok(ImportResult {
        account_name: account.name,
        format,
        imported: outcome.fresh.len(),
        duplicates: outcome.duplicates,
        closing_balance,
    })
}
