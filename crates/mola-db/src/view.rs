//! View functions shaping LCA reference data
//!
//! Each function runs one generated query (or a small hand-written one for
//! plain reference listings) and returns a [`Table`]. Database errors
//! propagate unchanged; the only empty-result substitution is the documented
//! empty-identifier-list case handled inside the generators.

use std::collections::{BTreeMap, HashMap};

use mola_sql::{quote_literal, RefIds};
use rusqlite::Connection;

use crate::table::{query_table, Table};
use crate::DataError;

/// Reject table names that are not plain SQL identifiers.
///
/// Table names arrive as caller data and are interpolated into query text,
/// so anything beyond `[A-Za-z_][A-Za-z0-9_]*` is refused outright.
fn check_table_name(name: &str) -> Result<(), DataError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest {
        return Err(DataError::BadTableName(name.to_string()));
    }
    Ok(())
}

/// Predicate for a list of name patterns; a trailing `%` switches the
/// comparison from equality to `LIKE` prefix matching.
fn name_predicate(column: &str, patterns: &[String]) -> String {
    if patterns.is_empty() {
        return "0 = 1".to_string();
    }
    let terms: Vec<String> = patterns
        .iter()
        .map(|p| {
            if p.contains('%') {
                format!("{} LIKE {}", column, quote_literal(p))
            } else {
                format!("{} = {}", column, quote_literal(p))
            }
        })
        .collect();
    format!("({})", terms.join(" OR "))
}

/// Raw dump of a named table.
pub fn get_table(conn: &Connection, table_name: &str) -> Result<Table, DataError> {
    check_table_name(table_name)?;
    query_table(conn, &format!("SELECT * FROM {}", table_name))
}

/// Internal ids for the given reference ids of a named table.
///
/// Returns an (ID, REF_ID) pair per match; reference ids absent from the
/// table simply contribute no rows.
pub fn get_ids(conn: &Connection, ref_ids: &[String], table_name: &str) -> Result<Table, DataError> {
    check_table_name(table_name)?;
    let sql = format!(
        "SELECT ID, REF_ID FROM {} WHERE {}",
        table_name,
        mola_sql::in_clause("REF_ID", ref_ids)
    );
    query_table(conn, &sql)
}

/// Reference ids for the given internal ids of a named table.
pub fn get_ref_ids(conn: &Connection, ids: &[i64], table_name: &str) -> Result<Table, DataError> {
    check_table_name(table_name)?;
    let predicate = if ids.is_empty() {
        "0 = 1".to_string()
    } else {
        let list: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        format!("ID IN ({})", list.join(", "))
    };
    let sql = format!("SELECT REF_ID, ID FROM {} WHERE {}", table_name, predicate);
    query_table(conn, &sql)
}

/// InternalID → ReferenceID maps for several tables in one call.
///
/// The alias keys are caller-chosen; each maps to the full id translation
/// for its table, so repeated per-row queries are avoided.
pub fn get_ref_id_dicts(
    conn: &Connection,
    tables: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, HashMap<i64, String>>, DataError> {
    let mut dicts = BTreeMap::new();
    for (alias, table_name) in tables {
        check_table_name(table_name)?;
        let table = query_table(conn, &format!("SELECT ID, REF_ID FROM {}", table_name))?;
        let mut dict = HashMap::with_capacity(table.len());
        for row in &table.rows {
            let (Some(id), Some(ref_id)) = (row[0].as_i64(), row[1].as_str()) else {
                // A row missing either id is invalid reference data.
                continue;
            };
            dict.insert(id, ref_id.to_string());
        }
        dicts.insert(alias.clone(), dict);
    }
    Ok(dicts)
}

/// All elementary flows: reference id and name.
pub fn get_elementary_flows(conn: &Connection) -> Result<Table, DataError> {
    query_table(
        conn,
        "SELECT REF_ID, NAME FROM TBL_FLOWS \
         WHERE FLOW_TYPE = 'ELEMENTARY_FLOW' ORDER BY NAME",
    )
}

/// Impact categories, optionally filtered by name pattern.
///
/// `None` means no filter; an explicit empty list selects nothing.
pub fn get_impact_categories(
    conn: &Connection,
    category_name: Option<&[String]>,
) -> Result<Table, DataError> {
    let mut sql = String::from(
        "SELECT ic.REF_ID, ic.NAME, ic.REFERENCE_UNIT, m.NAME AS METHOD \
         FROM TBL_IMPACT_CATEGORIES ic \
         JOIN TBL_IMPACT_METHODS m ON m.ID = ic.F_IMPACT_METHOD",
    );
    if let Some(patterns) = category_name {
        sql.push_str(&format!(" WHERE {}", name_predicate("ic.NAME", patterns)));
    }
    sql.push_str(" ORDER BY ic.NAME");
    query_table(conn, &sql)
}

/// Processes filtered by name pattern and/or location name.
pub fn get_processes(
    conn: &Connection,
    name: Option<&[String]>,
    location: Option<&[String]>,
) -> Result<Table, DataError> {
    let mut predicates = Vec::new();
    if let Some(patterns) = name {
        predicates.push(name_predicate("p.NAME", patterns));
    }
    if let Some(locations) = location {
        predicates.push(name_predicate("l.NAME", locations));
    }
    let mut sql = String::from(
        "SELECT p.REF_ID, p.NAME, l.NAME AS LOCATION \
         FROM TBL_PROCESSES p \
         LEFT JOIN TBL_LOCATIONS l ON l.ID = p.F_LOCATION",
    );
    if !predicates.is_empty() {
        sql.push_str(&format!(" WHERE {}", predicates.join(" AND ")));
    }
    sql.push_str(" ORDER BY p.NAME");
    query_table(conn, &sql)
}

/// Elementary-flow exchanges for the given processes.
pub fn get_process_elementary_flow(
    conn: &Connection,
    ref_ids: impl Into<RefIds>,
) -> Result<Table, DataError> {
    query_table(conn, &mola_sql::build_process_elementary_flow(&ref_ids.into()))
}

/// Locations (with coordinates) of the given processes.
pub fn get_process_locations(
    conn: &Connection,
    ref_ids: impl Into<RefIds>,
) -> Result<Table, DataError> {
    query_table(conn, &mola_sql::build_location(&ref_ids.into()))
}

/// Functional-unit output rows for the given processes.
///
/// A scalar reference id must match exactly one row; scalar and
/// one-element-list calls produce congruent five-column shapes.
pub fn get_process_product_flow(
    conn: &Connection,
    process_ref_ids: impl Into<RefIds>,
) -> Result<Table, DataError> {
    let ids = process_ref_ids.into();
    let table = query_table(conn, &mola_sql::build_product_flow(&ids))?;
    if ids.is_scalar() && table.len() != 1 {
        return Err(DataError::EmptyFilterMismatch(format!(
            "expected exactly one product flow row for process {:?}, got {}",
            ids.as_slice()[0],
            table.len()
        )));
    }
    Ok(table)
}

/// Product-flow costs of the given processes, one row per time period.
pub fn get_process_product_flow_costs(
    conn: &Connection,
    process_ref_ids: impl Into<RefIds>,
    time: &[String],
) -> Result<Table, DataError> {
    query_table(
        conn,
        &mola_sql::build_product_flow_cost(&process_ref_ids.into(), time),
    )
}

/// Units of the functional-unit flows of the given processes.
pub fn get_process_product_flow_units(
    conn: &Connection,
    process_ref_ids: impl Into<RefIds>,
) -> Result<Table, DataError> {
    let table = query_table(conn, &mola_sql::build_product_flow(&process_ref_ids.into()))?;
    let mut units = Table::new(vec!["PROCESS_REF_ID".to_string(), "UNIT".to_string()]);
    for row in &table.rows {
        let cells = vec![row[0].clone(), row[3].clone()];
        if !units.rows.contains(&cells) {
            units.rows.push(cells);
        }
    }
    Ok(units)
}

/// Characterization factors for the given impact categories.
pub fn get_impact_category_elementary_flow(
    conn: &Connection,
    ref_ids: impl Into<RefIds>,
) -> Result<Table, DataError> {
    query_table(
        conn,
        &mola_sql::build_impact_category_elementary_flow(&ref_ids.into()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_table_name() {
        assert!(check_table_name("TBL_PROCESSES").is_ok());
        assert!(check_table_name("a1_b2").is_ok());
        assert!(check_table_name("1abc").is_err());
        assert!(check_table_name("TBL; DROP TABLE x").is_err());
        assert!(check_table_name("").is_err());
    }

    #[test]
    fn test_name_predicate_wildcard() {
        let patterns = vec!["lemon production%".to_string()];
        assert_eq!(
            name_predicate("p.NAME", &patterns),
            "(p.NAME LIKE 'lemon production%')"
        );
        let exact = vec!["Spain".to_string()];
        assert_eq!(name_predicate("l.NAME", &exact), "(l.NAME = 'Spain')");
        assert_eq!(name_predicate("l.NAME", &[]), "0 = 1");
    }
}
