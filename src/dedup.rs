use std::collections::HashSet;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::models::NormalizedTransaction;

/// `date|description|amount`, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(date: &str, description: &str, amount: f64) -> Self {
        let amount = if amount == 0.0 { 0.0 } else { amount };
        Self(format!("{date}|{description}|{amount}"))
    }

    pub fn for_transaction(txn: &NormalizedTransaction) -> Self {
        Self::new(&txn.date_key(), &txn.description, txn.amount)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Snapshot of every stored transaction's key, across all accounts.
pub fn existing_keys(conn: &Connection) -> Result<HashSet<DedupKey>> {
    let mut stmt = conn.prepare("SELECT date, description, amount FROM transactions")?;
    let keys = stmt
        .query_map([], |row| {
            let date: String = row.get(0)?;
            let description: String = row.get(1)?;
            let amount: f64 = row.get(2)?;
            Ok(DedupKey::new(&date, &description, amount))
        })?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(keys)
}

#[derive(Debug)]
pub struct DedupOutcome {
    pub fresh: Vec<NormalizedTransaction>,
    pub duplicates: usize,
}

/// Drop rows already present in `existing`. Rows repeated within the batch
/// are only checked against `existing`, so both copies survive.
pub fn filter_duplicates(rows: Vec<NormalizedTransaction>, existing: &HashSet<DedupKey>) -> DedupOutcome {
    let mut fresh = Vec::with_capacity(rows.len());
    let mut duplicates = 0usize;
    for txn in rows {
        let key = DedupKey::for_transaction(&txn);
        if existing.contains(&key) {
            debug!(key = key.as_str(), "skipping duplicate row");
            duplicates += 1;
        } else {
            fresh.push(txn);
        }
    }
    DedupOutcome { fresh, duplicates }
}
