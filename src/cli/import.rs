use std::path::PathBuf;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::rupees;
use crate::importer::import_file;
use crate::settings::db_path;
use crate::statement::parse_amount;

pub fn run(file: &str, account: Option<&str>, format: Option<&str>) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = get_connection(&db_path())?;

    let result = import_file(&conn, &file_path, account, format)?;

    println!("{} statement \u{2192} {}", result.format.name(), result.account_name);
    if result.imported > 0 {
        println!("{}", result.summary().green());
    } else {
        println!("{}", result.summary().yellow());
    }
    if let Some(balance) = parse_amount(&result.closing_balance) {
        println!("Closing balance: {}", rupees(balance));
    }
    Ok(())
}
