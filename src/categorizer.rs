use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::models::ClassificationRule;

/// Built-in rule table seeded into new databases, in match order.
const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    ("Avinash", "Other Cost", "Avinash"),
    ("Bhatsange", "Rent ", "Sonu Sir"),
    ("Ajit", "Funding", "Ajit"),
];

pub fn default_rules() -> Vec<ClassificationRule> {
    DEFAULT_RULES
        .iter()
        .map(|(pattern, head, vendor)| ClassificationRule::contains(pattern, head, vendor))
        .collect()
}

fn matches(description: &str, rule: &ClassificationRule) -> bool {
    let desc_lower = description.to_lowercase();
    let pat_lower = rule.pattern.to_lowercase();
    match rule.match_type.as_str() {
        "contains" => desc_lower.contains(&pat_lower),
        "starts_with" => desc_lower.starts_with(&pat_lower),
        "regex" => rule.regex.as_ref().is_some_and(|re| re.is_match(description)),
        _ => false,
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Fill an empty expense head and/or vendor from the first matching rule.
/// Values that are already set are never replaced.
pub fn classify(
    rules: &[ClassificationRule],
    description: &str,
    expense_head: Option<String>,
    vendor: Option<String>,
) -> (Option<String>, Option<String>) {
    if is_filled(&expense_head) && is_filled(&vendor) {
        return (expense_head, vendor);
    }
    match rules.iter().find(|r| matches(description, r)) {
        Some(rule) => (
            expense_head
                .filter(|v| !v.is_empty())
                .or_else(|| Some(rule.expense_head.clone())),
            vendor
                .filter(|v| !v.is_empty())
                .or_else(|| Some(rule.vendor.clone())),
        ),
        None => (expense_head, vendor),
    }
}

/// Active rules in match order: highest priority first, then insertion order.
pub fn load_rules(conn: &Connection) -> Result<Vec<ClassificationRule>> {
    let mut stmt = conn.prepare(
        "SELECT pattern, match_type, expense_head, vendor FROM rules \
         WHERE is_active = 1 ORDER BY priority DESC, id ASC",
    )?;
    let rules = stmt
        .query_map([], |row| {
            Ok(ClassificationRule::new(
                &row.get::<_, String>(0)?,
                &row.get::<_, String>(1)?,
                &row.get::<_, String>(2)?,
                &row.get::<_, String>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

pub fn seed_default_rules(conn: &Connection) -> Result<()> {
    for (pattern, head, vendor) in DEFAULT_RULES {
        conn.execute(
            "INSERT INTO rules (pattern, match_type, expense_head, vendor) VALUES (?1, 'contains', ?2, ?3)",
            rusqlite::params![pattern, head, vendor],
        )?;
    }
    Ok(())
}

pub struct CategorizeResult {
    pub updated: usize,
    pub still_unclassified: usize,
}

/// Re-apply the rule table to stored transactions missing an expense head or vendor.
pub fn categorize_transactions(conn: &Connection) -> Result<CategorizeResult> {
    let rules = load_rules(conn)?;

    let mut stmt = conn.prepare(
        "SELECT id, description, expense_head, vendor FROM transactions \
         WHERE expense_head IS NULL OR expense_head = '' OR vendor IS NULL OR vendor = ''",
    )?;
    let pending: Vec<(i64, String, Option<String>, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut updated = 0usize;
    let mut still_unclassified = 0usize;
    for (id, description, head, vendor) in pending {
        let (new_head, new_vendor) = classify(&rules, &description, head.clone(), vendor.clone());
        if new_head == head && new_vendor == vendor {
            still_unclassified += 1;
            continue;
        }
        conn.execute(
            "UPDATE transactions SET expense_head = ?1, vendor = ?2 WHERE id = ?3",
            rusqlite::params![new_head, new_vendor, id],
        )?;
        debug!(id, "applied classification rule");
        updated += 1;
    }

    Ok(CategorizeResult {
        updated,
        still_unclassified,
    })
}
