use chrono::NaiveDate;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct BankAccount {
    pub id: i64,
    pub name: String,
    pub account_number: Option<String>,
    pub account_type: String,
    pub statement_format: Option<String>,
    pub current_balance: f64,
    pub last_statement_date: Option<String>,
    pub is_primary: bool,
    pub is_active: bool,
}

/// A transaction row as stored in the `transactions` table.
#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub expense_head: Option<String>,
    pub vendor: Option<String>,
    pub remark: Option<String>,
    pub bank_name: Option<String>,
}

/// Substring-triggered mapping from a narration to an expense head and vendor.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub pattern: String,
    pub match_type: String,
    pub expense_head: String,
    pub vendor: String,
    /// Compiled once for `regex` rules; `None` for other match types or an invalid pattern.
    pub regex: Option<Regex>,
}

impl ClassificationRule {
    pub fn new(pattern: &str, match_type: &str, expense_head: &str, vendor: &str) -> Self {
        let regex = if match_type == "regex" {
            Regex::new(&format!("(?i){pattern}")).ok()
        } else {
            None
        };
        Self {
            pattern: pattern.to_string(),
            match_type: match_type.to_string(),
            expense_head: expense_head.to_string(),
            vendor: vendor.to_string(),
            regex,
        }
    }

    pub fn contains(pattern: &str, expense_head: &str, vendor: &str) -> Self {
        Self::new(pattern, "contains", expense_head, vendor)
    }
}

impl PartialEq for ClassificationRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.match_type == other.match_type
            && self.expense_head == other.expense_head
            && self.vendor == other.vendor
    }
}

/// Canonical output of the statement pipeline, handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Positive = credit (inflow), negative = debit (outflow).
    pub amount: f64,
    pub expense_head: Option<String>,
    pub vendor: Option<String>,
}

impl NormalizedTransaction {
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
