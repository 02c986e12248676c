use crate::cli::accounts::list_accounts;
use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::fmt::{display_date, rupees};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let company = if settings.company_name.is_empty() { "(not set)" } else { settings.company_name.as_str() };
    println!("Company:    {company}");
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `bankreco init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let transactions: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let unclassified: i64 = conn.query_row(
        "SELECT count(*) FROM transactions \
         WHERE expense_head IS NULL OR expense_head = '' OR vendor IS NULL OR vendor = ''",
        [],
        |r| r.get(0),
    )?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
    let rules: i64 = conn.query_row("SELECT count(*) FROM rules WHERE is_active = 1", [], |r| r.get(0))?;

    println!();
    println!("Transactions:  {transactions}");
    println!("Unclassified:  {unclassified}");
    println!("Imports:       {imports}");
    println!("Rules:         {rules}");

    let accounts = list_accounts(&conn)?;
    if !accounts.is_empty() {
        println!();
        for a in accounts.iter().filter(|a| a.is_active) {
            let marker = if a.is_primary { "*" } else { " " };
            let as_of = a
                .last_statement_date
                .as_deref()
                .map(|d| format!(" (as of {})", display_date(d)))
                .unwrap_or_default();
            println!("{marker} {:<24} {:>18}{as_of}", a.name, rupees(a.current_balance));
        }
    }
    Ok(())
}
