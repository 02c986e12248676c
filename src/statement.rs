use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::categorizer::classify;
use crate::error::{RecoError, Result};
use crate::models::{ClassificationRule, NormalizedTransaction};

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One spreadsheet cell, as read from a CSV or workbook sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

pub type Grid = Vec<Vec<Cell>>;

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Dates written with slashes are day-first (DD/MM/YYYY).
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Number(serial) => excel_serial_to_date(*serial),
            Cell::Text(s) if s.contains('/') => parse_date_dmy(s),
            Cell::Text(s) => parse_date_generic(s),
            Cell::Empty => None,
        }
    }

    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_amount(s),
            _ => None,
        }
    }

    /// Header matching only ever looks at text cells.
    fn contains_phrase(&self, phrase: &str) -> bool {
        match self {
            Cell::Text(s) => s.to_lowercase().contains(phrase),
            _ => false,
        }
    }
}

fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('/');
    let d: u32 = parts.next()?.trim().parse().ok()?;
    let m: u32 = parts.next()?.trim().parse().ok()?;
    // Some exports append a time after the year.
    let y: i32 = parts.next()?.split_whitespace().next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d-%b-%Y", "%d %b %Y", "%d.%m.%Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

pub fn parse_date_generic(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 2958465 is 9999-12-31
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

// ---------------------------------------------------------------------------
// Statement formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    /// "Value Date" / "Description" header, CR/DR flag with a single amount column.
    Icici,
    /// "Date" / "Transaction Particulars" header, separate withdrawal and deposit columns.
    Janata,
}

const ALL_FORMATS: &[StatementFormat] = &[StatementFormat::Icici, StatementFormat::Janata];

impl StatementFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Icici => "icici",
            Self::Janata => "janata",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Icici => "ICICI",
            Self::Janata => "Janata",
        }
    }

    fn header_markers(&self) -> (&'static str, &'static str) {
        match self {
            Self::Icici => ("value date", "description"),
            Self::Janata => ("date", "transaction particulars"),
        }
    }

    pub fn is_header_row(&self, row: &[Cell]) -> bool {
        let (first, second) = self.header_markers();
        row.iter().any(|c| c.contains_phrase(first)) && row.iter().any(|c| c.contains_phrase(second))
    }

    /// Guess the statement layout from a bank account's display name.
    pub fn for_bank_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.contains("janata") {
            Some(Self::Janata)
        } else if lower.contains("icici") {
            Some(Self::Icici)
        } else {
            None
        }
    }
}

pub fn get_by_key(key: &str) -> Option<StatementFormat> {
    ALL_FORMATS
        .iter()
        .find(|f| f.key().eq_ignore_ascii_case(key.trim()))
        .copied()
}

// ---------------------------------------------------------------------------
// Format detection and column resolution
// ---------------------------------------------------------------------------

/// Locate the transaction table header. With a hint only that layout is tried.
pub fn detect_format(grid: &[Vec<Cell>], hint: Option<StatementFormat>) -> Result<(StatementFormat, usize)> {
    let candidates: &[StatementFormat] = match &hint {
        Some(f) => std::slice::from_ref(f),
        None => ALL_FORMATS,
    };
    for (idx, row) in grid.iter().enumerate() {
        for format in candidates {
            if format.is_header_row(row) {
                debug!(format = format.key(), row = idx, "found statement header");
                return Ok((*format, idx));
            }
        }
    }
    let label = hint.map(|f| f.name()).unwrap_or("bank");
    Err(RecoError::HeaderNotFound(label.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    Flagged { amount: usize, flag: usize },
    Split { withdrawal: usize, deposit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: AmountColumns,
    pub balance: Option<usize>,
}

fn find_column(header: &[Cell], phrase: &str) -> Option<usize> {
    header.iter().position(|c| c.contains_phrase(phrase))
}

pub fn resolve_columns(header: &[Cell], format: StatementFormat) -> Result<ColumnMap> {
    let require = |phrase: &str| {
        find_column(header, phrase).ok_or_else(|| RecoError::RequiredColumnMissing {
            format: format.name().to_string(),
            column: phrase.to_string(),
        })
    };
    let map = match format {
        StatementFormat::Icici => ColumnMap {
            date: require("value date")?,
            description: require("description")?,
            amount: AmountColumns::Flagged {
                amount: require("transaction amount")?,
                flag: require("cr/dr")?,
            },
            balance: find_column(header, "available balance"),
        },
        StatementFormat::Janata => ColumnMap {
            date: require("date")?,
            description: require("transaction particulars")?,
            amount: AmountColumns::Split {
                withdrawal: require("withdrawal")?,
                deposit: require("deposit")?,
            },
            balance: find_column(header, "available balance"),
        },
    };
    Ok(map)
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StatementParse {
    pub format: StatementFormat,
    pub header_row: usize,
    pub transactions: Vec<NormalizedTransaction>,
    /// Last non-empty balance cell in file order, as written in the statement.
    pub closing_balance: String,
}

fn row_amount(row: &[Cell], columns: AmountColumns) -> Option<f64> {
    let amount = match columns {
        AmountColumns::Flagged { amount, flag } => {
            let value = cell_at(row, amount).as_amount()?;
            if cell_at(row, flag).as_text().to_uppercase() == "CR" {
                value
            } else {
                -value
            }
        }
        AmountColumns::Split { withdrawal, deposit } => {
            let withdrawal = cell_at(row, withdrawal).as_amount().unwrap_or(0.0);
            let deposit = cell_at(row, deposit).as_amount().unwrap_or(0.0);
            deposit - withdrawal
        }
    };
    // no negative zero
    Some(if amount == 0.0 { 0.0 } else { amount })
}

pub fn normalize_rows(
    grid: &[Vec<Cell>],
    header_row: usize,
    map: &ColumnMap,
    rules: &[ClassificationRule],
) -> (Vec<NormalizedTransaction>, String) {
    let mut transactions = Vec::new();
    let mut closing_balance = String::new();

    for (idx, row) in grid.iter().enumerate().skip(header_row + 1) {
        let date_cell = cell_at(row, map.date);
        if date_cell.is_blank() {
            continue;
        }
        let Some(date) = date_cell.as_date() else {
            debug!(row = idx, value = %date_cell.as_text(), "skipping row with unparseable date");
            continue;
        };
        let Some(amount) = row_amount(row, map.amount) else {
            debug!(row = idx, "skipping row with unparseable amount");
            continue;
        };
        if let Some(col) = map.balance {
            let balance = cell_at(row, col);
            if !balance.is_blank() {
                closing_balance = balance.as_text();
            }
        }
        let description = cell_at(row, map.description).as_text();
        let (expense_head, vendor) = classify(rules, &description, None, None);
        transactions.push(NormalizedTransaction {
            date,
            description,
            amount,
            expense_head,
            vendor,
        });
    }
    (transactions, closing_balance)
}

/// Detect, resolve and normalize a whole statement grid. Fails before producing
/// any rows if the header or a mandatory column cannot be found.
pub fn parse_statement(
    grid: &[Vec<Cell>],
    hint: Option<StatementFormat>,
    rules: &[ClassificationRule],
) -> Result<StatementParse> {
    if grid.is_empty() {
        return Err(RecoError::EmptyStatement("No data found in the statement".to_string()));
    }
    let (format, header_row) = detect_format(grid, hint)?;
    let map = resolve_columns(&grid[header_row], format)?;
    debug!(?map, "resolved statement columns");
    let (transactions, closing_balance) = normalize_rows(grid, header_row, &map, rules);
    info!(
        format = format.key(),
        header_row,
        rows = transactions.len(),
        "parsed statement"
    );
    Ok(StatementParse {
        format,
        header_row,
        transactions,
        closing_balance,
    })
}

// ---------------------------------------------------------------------------
// Reading files into a grid
// ---------------------------------------------------------------------------

fn is_workbook(file_path: &Path) -> bool {
    file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xlsb" | "xls" | "ods"))
        .unwrap_or(false)
}

/// Read the first sheet of a workbook, or a CSV file, into a cell grid.
pub fn read_grid(file_path: &Path) -> Result<Grid> {
    if is_workbook(file_path) {
        read_workbook(file_path)
    } else {
        read_csv(file_path)
    }
}

fn read_csv(file_path: &Path) -> Result<Grid> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    // Non-UTF-8 bytes are replaced, never dropped with their row.
    let mut grid = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        grid.push(
            record
                .iter()
                .map(|field| Cell::text(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }
    Ok(grid)
}

#[cfg(feature = "xlsx")]
fn read_workbook(file_path: &Path) -> Result<Grid> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| RecoError::Spreadsheet(format!("Failed to open workbook: {e}")))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| RecoError::Spreadsheet(e.to_string()))?,
        None => return Ok(Vec::new()),
    };

    let grid = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|data| match data {
                    Data::String(s) => Cell::text(s),
                    Data::Float(f) => Cell::Number(*f),
                    Data::Int(i) => Cell::Number(*i as f64),
                    Data::Bool(b) => Cell::Text(b.to_string()),
                    Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                        .map(Cell::Date)
                        .unwrap_or(Cell::Empty),
                    Data::DateTimeIso(s) => Cell::text(s),
                    _ => Cell::Empty,
                })
                .collect()
        })
        .collect();
    Ok(grid)
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(file_path: &Path) -> Result<Grid> {
    Err(RecoError::UnknownFormat(format!(
        "{} (built without spreadsheet support)",
        file_path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::default_rules;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::text(c)).collect()
    }

    fn icici_grid(rows: &[&[&str]]) -> Grid {
        let mut grid = vec![
            row(&["DETAILED STATEMENT"]),
            row(&["Account Number", "000401234567"]),
            row(&[]),
            row(&[
                "S No.",
                "Value Date",
                "Transaction Date",
                "Cheque Number",
                "Transaction Remarks / Description",
                "Cr/Dr",
                "Transaction Amount(INR)",
                "Available Balance(INR)",
            ]),
        ];
        grid.extend(rows.iter().map(|r| row(r)));
        grid
    }

    fn janata_grid(rows: &[&[&str]]) -> Grid {
        let mut grid = vec![
            row(&["Janata Sahakari Bank"]),
            row(&["Date", "Transaction Particulars", "Chq No", "Withdrawal", "Deposit", "Available Balance"]),
        ];
        grid.extend(rows.iter().map(|r| row(r)));
        grid
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,23,456.78"), Some(123456.78));
        assert_eq!(parse_amount("  42.50 "), Some(42.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_parse_date_dmy() {
        assert_eq!(parse_date_dmy("15/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date_dmy("01/12/2023 10:42:00"), NaiveDate::from_ymd_opt(2023, 12, 1));
        assert_eq!(parse_date_dmy("31/02/2024"), None);
        assert_eq!(parse_date_dmy("15/13/2024"), None);
        assert_eq!(parse_date_dmy("15/03"), None);
    }

    #[test]
    fn test_parse_date_generic() {
        assert_eq!(parse_date_generic("2024-03-15"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date_generic("15-03-2024"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date_generic("15-Mar-2024"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date_generic("2024-03-15T09:30:00"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date_generic("Opening Balance"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_cell_as_date_variants() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(Cell::Date(d).as_date(), Some(d));
        assert_eq!(Cell::Number(45366.0).as_date(), Some(d));
        assert_eq!(Cell::text("15/03/2024").as_date(), Some(d));
        assert_eq!(Cell::Empty.as_date(), None);
    }

    #[test]
    fn test_get_by_key_and_bank_name() {
        assert_eq!(get_by_key("ICICI"), Some(StatementFormat::Icici));
        assert_eq!(get_by_key("janata"), Some(StatementFormat::Janata));
        assert_eq!(get_by_key("hdfc"), None);
        assert_eq!(StatementFormat::for_bank_name("Janata Sahakari"), Some(StatementFormat::Janata));
        assert_eq!(StatementFormat::for_bank_name("ICICI Current"), Some(StatementFormat::Icici));
        assert_eq!(StatementFormat::for_bank_name("Cash"), None);
    }

    #[test]
    fn test_detect_icici_header() {
        let grid = icici_grid(&[]);
        assert_eq!(detect_format(&grid, None).unwrap(), (StatementFormat::Icici, 3));
    }

    #[test]
    fn test_detect_janata_header() {
        let grid = janata_grid(&[]);
        assert_eq!(detect_format(&grid, None).unwrap(), (StatementFormat::Janata, 1));
    }

    #[test]
    fn test_detect_respects_hint() {
        let grid = icici_grid(&[]);
        let err = detect_format(&grid, Some(StatementFormat::Janata)).unwrap_err();
        assert!(matches!(err, RecoError::HeaderNotFound(ref f) if f == "Janata"));
    }

    #[test]
    fn test_header_not_found() {
        let grid = vec![row(&["Date", "Narration", "Amount"]), row(&["15/03/2024", "X", "10"])];
        let err = parse_statement(&grid, None, &[]).unwrap_err();
        assert!(matches!(err, RecoError::HeaderNotFound(_)));
    }

    #[test]
    fn test_header_ignores_numeric_cells() {
        let grid = vec![vec![Cell::Number(1.0), Cell::text("value date"), Cell::Number(2.0)]];
        assert!(detect_format(&grid, None).is_err());
    }

    #[test]
    fn test_empty_grid() {
        let err = parse_statement(&[], None, &[]).unwrap_err();
        assert!(matches!(err, RecoError::EmptyStatement(_)));
    }

    #[test]
    fn test_resolve_icici_columns_in_bounds() {
        let grid = icici_grid(&[]);
        let header = &grid[3];
        let map = resolve_columns(header, StatementFormat::Icici).unwrap();
        assert_eq!(map.date, 1);
        assert_eq!(map.description, 4);
        assert_eq!(map.amount, AmountColumns::Flagged { amount: 6, flag: 5 });
        assert_eq!(map.balance, Some(7));
        assert!([map.date, map.description, 5, 6].iter().all(|&i| i < header.len()));
    }

    #[test]
    fn test_resolve_missing_column() {
        let header = row(&["Value Date", "Description", "Transaction Amount"]);
        let err = resolve_columns(&header, StatementFormat::Icici).unwrap_err();
        match err {
            RecoError::RequiredColumnMissing { format, column } => {
                assert_eq!(format, "ICICI");
                assert_eq!(column, "cr/dr");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_janata_requires_both_amount_columns() {
        let header = row(&["Date", "Transaction Particulars", "Deposit"]);
        assert!(matches!(
            resolve_columns(&header, StatementFormat::Janata),
            Err(RecoError::RequiredColumnMissing { .. })
        ));
    }

    #[test]
    fn test_balance_column_optional() {
        let header = row(&["Date", "Transaction Particulars", "Withdrawal", "Deposit"]);
        let map = resolve_columns(&header, StatementFormat::Janata).unwrap();
        assert_eq!(map.balance, None);
    }

    #[test]
    fn test_icici_cr_dr_sign() {
        let grid = icici_grid(&[
            &["1", "15/03/2024", "15/03/2024", "", "NEFT CREDIT", "CR", "100", "1,100.00"],
            &["2", "16/03/2024", "16/03/2024", "", "ATM WDL", "DR", "100", "1,000.00"],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.format, StatementFormat::Icici);
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.transactions[0].amount, 100.0);
        assert_eq!(parsed.transactions[1].amount, -100.0);
        assert_eq!(parsed.transactions[0].date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_icici_flag_must_be_exact_cr() {
        let grid = icici_grid(&[&["1", "15/03/2024", "", "", "REFUND", "cr", "250", ""]]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions[0].amount, 250.0);

        let grid = icici_grid(&[&["1", "15/03/2024", "", "", "REFUND", "C", "250", ""]]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions[0].amount, -250.0);
    }

    #[test]
    fn test_icici_thousands_separator() {
        let grid = icici_grid(&[&["1", "15/03/2024", "", "", "SALARY", "CR", "1,25,000.50", ""]]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions[0].amount, 125000.5);
    }

    #[test]
    fn test_icici_unparseable_amount_dropped() {
        let grid = icici_grid(&[
            &["1", "15/03/2024", "", "", "BROKEN", "DR", "abc", ""],
            &["2", "16/03/2024", "", "", "GOOD", "DR", "10", ""],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].description, "GOOD");
        assert!(parsed.transactions.iter().all(|t| t.amount.is_finite()));
    }

    #[test]
    fn test_janata_withdrawal_and_deposit() {
        let grid = janata_grid(&[
            &["01/04/2024", "CHQ PAID", "", "50", "0", "950.00"],
            &["02/04/2024", "CASH DEP", "", "", "200", "1,150.00"],
            &["03/04/2024", "ODD ROW", "", "x", "y", ""],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        let amounts: Vec<f64> = parsed.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-50.0, 200.0, 0.0]);
    }

    #[test]
    fn test_skips_blank_and_invalid_dates() {
        let grid = janata_grid(&[
            &["01/04/2024", "FIRST", "", "10", "", ""],
            &["", "Total", "", "10", "0", ""],
            &["31/02/2024", "BAD DATE", "", "10", "", ""],
            &["Closing balance", "", "", "", "", "990.00"],
            &["05/04/2024", "LAST", "", "", "5", ""],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        let descs: Vec<&str> = parsed.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["FIRST", "LAST"]);
    }

    #[test]
    fn test_closing_balance_is_last_non_empty() {
        let grid = janata_grid(&[
            &["01/04/2024", "A", "", "10", "", "1,000.00"],
            &["02/04/2024", "B", "", "10", "", "990.00"],
            &["03/04/2024", "C", "", "10", "", ""],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.closing_balance, "990.00");
    }

    #[test]
    fn test_closing_balance_empty_without_column() {
        let grid = vec![
            row(&["Date", "Transaction Particulars", "Withdrawal", "Deposit"]),
            row(&["01/04/2024", "A", "10", ""]),
        ];
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.closing_balance, "");
    }

    #[test]
    fn test_preserves_statement_order() {
        let grid = janata_grid(&[
            &["05/04/2024", "NEWEST", "", "1", "", ""],
            &["01/04/2024", "OLDEST", "", "1", "", ""],
        ]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions[0].description, "NEWEST");
        assert_eq!(parsed.transactions[1].description, "OLDEST");
    }

    #[test]
    fn test_rows_are_classified() {
        let grid = janata_grid(&[
            &["01/04/2024", "Payment to Avinash for materials", "", "500", "", ""],
            &["02/04/2024", "UPI/GROCER", "", "20", "", ""],
        ]);
        let parsed = parse_statement(&grid, None, &default_rules()).unwrap();
        let first = &parsed.transactions[0];
        assert_eq!(first.expense_head.as_deref(), Some("Other Cost"));
        assert_eq!(first.vendor.as_deref(), Some("Avinash"));
        assert_eq!(parsed.transactions[1].expense_head, None);
    }

    #[test]
    fn test_native_cells() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let grid = vec![
            row(&["Value Date", "Description", "Cr/Dr", "Transaction Amount", "Available Balance"]),
            vec![
                Cell::Date(date),
                Cell::Number(4521.0),
                Cell::text("DR"),
                Cell::Number(99.5),
                Cell::Number(1000.0),
            ],
        ];
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        let txn = &parsed.transactions[0];
        assert_eq!(txn.date, date);
        assert_eq!(txn.description, "4521");
        assert_eq!(txn.amount, -99.5);
        assert_eq!(parsed.closing_balance, "1000");
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let grid = icici_grid(&[&["1", "15/03/2024"]]);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert!(parsed.transactions.is_empty());
    }

    #[test]
    fn test_read_csv_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("janata.csv");
        let content = "\
Janata Sahakari Bank,,,
Date,Transaction Particulars,Withdrawal,Deposit,Available Balance
01/04/2024,CHQ PAID,\"1,000.00\",,\"9,000.00\"
";
        std::fs::write(&path, content).unwrap();
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0][1], Cell::Empty);
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        assert_eq!(parsed.transactions[0].amount, -1000.0);
        assert_eq!(parsed.closing_balance, "9,000.00");
    }

    #[test]
    fn test_read_csv_keeps_non_utf8_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut content = b"Date,Transaction Particulars,Withdrawal,Deposit,Available Balance\n\
01/04/2024,ONE,100,,\n"
            .to_vec();
        content.extend_from_slice(b"02/04/2024,CAF\xe9 PAYMENT,200,,\n");
        content.extend_from_slice(b"03/04/2024,THREE,300,,\n");
        std::fs::write(&path, content).unwrap();

        let grid = read_grid(&path).unwrap();
        let parsed = parse_statement(&grid, None, &[]).unwrap();
        let descs: Vec<&str> = parsed.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["ONE", "CAF\u{fffd} PAYMENT", "THREE"]);
        assert_eq!(parsed.transactions[1].amount, -200.0);
    }
}
