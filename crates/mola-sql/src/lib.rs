//! Query generation for the openLCA-style schema
//!
//! Each function builds the text of one join pattern over the LCA tables
//! (processes, flows, exchanges, locations, impact categories, costs) and
//! restricts rows to a list of external reference ids. The generators are
//! pure: they hold no connection and execute nothing.

/// One or more external reference ids.
///
/// Callers may pass a single id or a list; both normalize to the same
/// filter text so result shapes stay congruent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefIds {
    One(String),
    Many(Vec<String>),
}

impl RefIds {
    /// True when constructed from a single scalar id.
    pub fn is_scalar(&self) -> bool {
        matches!(self, RefIds::One(_))
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            RefIds::One(id) => std::slice::from_ref(id),
            RefIds::Many(ids) => ids,
        }
    }
}

impl From<&str> for RefIds {
    fn from(id: &str) -> Self {
        RefIds::One(id.to_string())
    }
}

impl From<String> for RefIds {
    fn from(id: String) -> Self {
        RefIds::One(id)
    }
}

impl From<Vec<String>> for RefIds {
    fn from(ids: Vec<String>) -> Self {
        RefIds::Many(ids)
    }
}

impl From<&[String]> for RefIds {
    fn from(ids: &[String]) -> Self {
        RefIds::Many(ids.to_vec())
    }
}

impl From<Vec<&str>> for RefIds {
    fn from(ids: Vec<&str>) -> Self {
        RefIds::Many(ids.into_iter().map(String::from).collect())
    }
}

/// Escape a string literal for embedding in query text.
///
/// Single quotes are doubled per SQL rules; reference ids are caller data
/// and must never be concatenated without this step.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build an `IN` predicate over `column` for the given ids.
///
/// An empty list yields a predicate that matches no rows. "No ids" means
/// "select nothing", never "select everything".
pub fn in_clause(column: &str, ids: &[String]) -> String {
    if ids.is_empty() {
        return "0 = 1".to_string();
    }
    let quoted: Vec<String> = ids.iter().map(|id| quote_literal(id)).collect();
    format!("{} IN ({})", column, quoted.join(", "))
}

/// Elementary-flow exchanges for the given processes.
///
/// One row per process/flow exchange: process ref id, flow ref id,
/// quantity, unit, direction.
pub fn build_process_elementary_flow(process_ref_ids: &RefIds) -> String {
    format!(
        "SELECT p.REF_ID AS PROCESS_REF_ID, f.REF_ID AS FLOW_REF_ID, \
         e.RESULTING_AMOUNT_VALUE AS QUANTITY, u.NAME AS UNIT, \
         CASE e.IS_INPUT WHEN 1 THEN 'Input' ELSE 'Output' END AS DIRECTION \
         FROM TBL_PROCESSES p \
         JOIN TBL_EXCHANGES e ON e.F_OWNER = p.ID \
         JOIN TBL_FLOWS f ON f.ID = e.F_FLOW \
         JOIN TBL_UNITS u ON u.ID = e.F_UNIT \
         WHERE f.FLOW_TYPE = 'ELEMENTARY_FLOW' AND {}",
        in_clause("p.REF_ID", process_ref_ids.as_slice())
    )
}

/// Locations of the given processes, with coordinates.
pub fn build_location(process_ref_ids: &RefIds) -> String {
    format!(
        "SELECT p.REF_ID AS PROCESS_REF_ID, l.REF_ID AS LOCATION_REF_ID, \
         l.NAME AS LOCATION, l.LATITUDE, l.LONGITUDE \
         FROM TBL_PROCESSES p \
         JOIN TBL_LOCATIONS l ON l.ID = p.F_LOCATION \
         WHERE {}",
        in_clause("p.REF_ID", process_ref_ids.as_slice())
    )
}

/// Product-flow output rows (the functional unit) for the given processes.
pub fn build_product_flow(process_ref_ids: &RefIds) -> String {
    format!(
        "SELECT p.REF_ID AS PROCESS_REF_ID, f.REF_ID AS FLOW_REF_ID, \
         e.RESULTING_AMOUNT_VALUE AS QUANTITY, u.NAME AS UNIT, \
         'Output' AS DIRECTION \
         FROM TBL_PROCESSES p \
         JOIN TBL_EXCHANGES e ON e.F_OWNER = p.ID \
         JOIN TBL_FLOWS f ON f.ID = e.F_FLOW \
         JOIN TBL_UNITS u ON u.ID = e.F_UNIT \
         WHERE f.FLOW_TYPE = 'PRODUCT_FLOW' AND e.IS_INPUT = 0 AND {}",
        in_clause("p.REF_ID", process_ref_ids.as_slice())
    )
}

/// Product-flow costs for the given processes, labelled per time period.
///
/// Cost values live on the output exchange; each row is repeated for every
/// time-period token so downstream parameters index by (process, flow, time).
/// An empty token list yields zero rows, like an empty id list.
pub fn build_product_flow_cost(process_ref_ids: &RefIds, time: &[String]) -> String {
    let periods = if time.is_empty() {
        "SELECT NULL AS TIME WHERE 0 = 1".to_string()
    } else {
        time.iter()
            .map(|t| format!("SELECT {} AS TIME", quote_literal(t)))
            .collect::<Vec<_>>()
            .join(" UNION ALL ")
    };
    format!(
        "SELECT p.REF_ID AS PROCESS_REF_ID, f.REF_ID AS FLOW_REF_ID, \
         t.TIME, e.COST_VALUE AS COST \
         FROM TBL_PROCESSES p \
         JOIN TBL_EXCHANGES e ON e.F_OWNER = p.ID \
         JOIN TBL_FLOWS f ON f.ID = e.F_FLOW \
         CROSS JOIN ({}) t \
         WHERE f.FLOW_TYPE = 'PRODUCT_FLOW' AND e.IS_INPUT = 0 \
         AND e.COST_VALUE IS NOT NULL AND {}",
        periods,
        in_clause("p.REF_ID", process_ref_ids.as_slice())
    )
}

/// Characterization factors joining impact categories to elementary flows.
///
/// An impact category with no matching factors contributes no rows; an
/// empty id list yields an empty result rather than the full factor table.
pub fn build_impact_category_elementary_flow(ref_ids: &RefIds) -> String {
    format!(
        "SELECT ic.REF_ID AS IMPACT_CATEGORY_REF_ID, f.REF_ID AS FLOW_REF_ID, \
         fac.VALUE AS FACTOR \
         FROM TBL_IMPACT_CATEGORIES ic \
         JOIN TBL_IMPACT_FACTORS fac ON fac.F_IMPACT_CATEGORY = ic.ID \
         JOIN TBL_FLOWS f ON f.ID = fac.F_FLOW \
         WHERE {}",
        in_clause("ic.REF_ID", ref_ids.as_slice())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("abc"), "'abc'");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_in_clause_empty_matches_nothing() {
        assert_eq!(in_clause("p.REF_ID", &[]), "0 = 1");
    }

    #[test]
    fn test_scalar_and_list_normalize() {
        let one: RefIds = "abc".into();
        let many: RefIds = vec!["abc"].into();
        assert_eq!(
            build_product_flow(&one),
            build_product_flow(&many),
        );
        assert!(one.is_scalar());
        assert!(!many.is_scalar());
    }

    #[test]
    fn test_process_elementary_flow_filters_ids() {
        let sql = build_process_elementary_flow(&vec!["id-1", "id-2"].into());
        assert!(sql.contains("p.REF_ID IN ('id-1', 'id-2')"));
        assert!(sql.contains("ELEMENTARY_FLOW"));
    }

    #[test]
    fn test_impact_category_empty_ids() {
        let sql = build_impact_category_elementary_flow(&RefIds::Many(vec![]));
        assert!(sql.contains("0 = 1"));
        assert!(!sql.contains("IN ("));
    }

    #[test]
    fn test_product_flow_cost_time_tokens() {
        let sql = build_product_flow_cost(&"id-1".into(), &["t0".to_string(), "t1".to_string()]);
        assert!(sql.contains("SELECT 't0' AS TIME UNION ALL SELECT 't1' AS TIME"));

        let empty = build_product_flow_cost(&"id-1".into(), &[]);
        assert!(empty.contains("WHERE 0 = 1"));
    }
}
