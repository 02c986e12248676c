use crate::categorizer::categorize_transactions;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let result = categorize_transactions(&conn)?;
    println!(
        "{} updated, {} still missing an expense head or vendor",
        result.updated, result.still_unclassified
    );
    Ok(())
}
