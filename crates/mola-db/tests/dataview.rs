//! Data view behavior against the seeded fixture database

use std::collections::BTreeMap;

use mola_db::testing::{
    seeded_connection, CO2_FLOW, GWP_CATEGORY, LAND_CATEGORY, LEMON_PROCESS, LORRY_PROCESS,
};
use mola_db::{DataError, LookupTables};

#[test]
fn get_ids_translates_ref_ids() {
    let conn = seeded_connection();
    let table = mola_db::get_ids(&conn, &[LEMON_PROCESS.to_string()], "TBL_PROCESSES").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.columns, vec!["ID", "REF_ID"]);

    let absent = mola_db::get_ids(&conn, &["no-such-id".to_string()], "TBL_PROCESSES").unwrap();
    assert!(absent.is_empty());
}

#[test]
fn get_ref_ids_translates_internal_ids() {
    let conn = seeded_connection();
    let table = mola_db::get_ref_ids(&conn, &[1], "TBL_PROCESSES").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column_strings("REF_ID"), vec![LEMON_PROCESS]);

    let absent = mola_db::get_ref_ids(&conn, &[99], "TBL_PROCESSES").unwrap();
    assert!(absent.is_empty());
}

#[test]
fn get_table_rejects_bad_names() {
    let conn = seeded_connection();
    assert!(mola_db::get_table(&conn, "TBL_IMPACT_METHODS").unwrap().len() > 0);
    assert!(matches!(
        mola_db::get_table(&conn, "TBL_PROCESSES; DROP TABLE TBL_FLOWS"),
        Err(DataError::BadTableName(_))
    ));
}

#[test]
fn get_elementary_flows_lists_all() {
    let conn = seeded_connection();
    let flows = mola_db::get_elementary_flows(&conn).unwrap();
    assert_eq!(flows.len(), 2);
    assert!(flows.column_strings("REF_ID").contains(&CO2_FLOW.to_string()));
}

#[test]
fn get_impact_categories_supports_trailing_wildcard() {
    let conn = seeded_connection();
    let filter = vec!["Climate change - GWP100%".to_string()];
    let categories = mola_db::get_impact_categories(&conn, Some(&filter)).unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories.column_strings("REF_ID"), vec![GWP_CATEGORY]);

    let all = mola_db::get_impact_categories(&conn, None).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn get_processes_filters_by_name_and_location() {
    let conn = seeded_connection();
    let name = vec!["lemon production%".to_string()];
    let location = vec!["Spain".to_string()];
    let processes = mola_db::get_processes(&conn, Some(&name), Some(&location)).unwrap();
    assert_eq!(processes.len(), 1);
    assert_eq!(processes.column_strings("REF_ID"), vec![LEMON_PROCESS]);

    let elsewhere = vec!["Germany".to_string()];
    let none = mola_db::get_processes(&conn, Some(&name), Some(&elsewhere)).unwrap();
    assert!(none.is_empty());
}

#[test]
fn get_process_elementary_flow_returns_exchanges() {
    let conn = seeded_connection();
    let table = mola_db::get_process_elementary_flow(
        &conn,
        vec![LEMON_PROCESS, LORRY_PROCESS],
    )
    .unwrap();
    // lemon emits CO2 and CH4, the lorry CO2
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.columns,
        vec!["PROCESS_REF_ID", "FLOW_REF_ID", "QUANTITY", "UNIT", "DIRECTION"]
    );
}

#[test]
fn get_process_locations_returns_coordinates() {
    let conn = seeded_connection();
    let table = mola_db::get_process_locations(&conn, LEMON_PROCESS).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column_strings("LOCATION"), vec!["Spain"]);
    assert_eq!(table.rows[0][3], serde_json::json!(40.0));
}

#[test]
fn get_process_product_flow_scalar_and_list_shapes_agree() {
    let conn = seeded_connection();
    let scalar = mola_db::get_process_product_flow(&conn, LEMON_PROCESS).unwrap();
    assert_eq!(scalar.shape(), (1, 5));

    let list = mola_db::get_process_product_flow(&conn, vec![LEMON_PROCESS]).unwrap();
    assert_eq!(list.shape(), scalar.shape());
}

#[test]
fn get_process_product_flow_scalar_requires_one_row() {
    let conn = seeded_connection();
    let err = mola_db::get_process_product_flow(&conn, "no-such-process").unwrap_err();
    assert!(matches!(err, DataError::EmptyFilterMismatch(_)));
}

#[test]
fn get_process_product_flow_costs_per_time_period() {
    let conn = seeded_connection();
    let time = vec!["t0".to_string(), "t1".to_string()];
    let costs = mola_db::get_process_product_flow_costs(&conn, LEMON_PROCESS, &time).unwrap();
    assert_eq!(costs.len(), 2);
    let mut periods = costs.column_strings("TIME");
    periods.sort();
    assert_eq!(periods, vec!["t0", "t1"]);

    let none = mola_db::get_process_product_flow_costs(&conn, LEMON_PROCESS, &[]).unwrap();
    assert!(none.is_empty());
}

#[test]
fn get_process_product_flow_units_deduplicates() {
    let conn = seeded_connection();
    let units = mola_db::get_process_product_flow_units(&conn, LEMON_PROCESS).unwrap();
    assert_eq!(units.shape(), (1, 2));
    assert_eq!(units.column_strings("UNIT"), vec!["kg"]);
}

#[test]
fn get_impact_category_elementary_flow_filters_by_id() {
    let conn = seeded_connection();
    let factors =
        mola_db::get_impact_category_elementary_flow(&conn, GWP_CATEGORY).unwrap();
    assert_eq!(factors.len(), 2);

    // a category with no factors yields an empty table, not an error
    let empty = mola_db::get_impact_category_elementary_flow(&conn, LAND_CATEGORY).unwrap();
    assert!(empty.is_empty());

    // an empty id list yields zero rows, not the whole factor table
    let none =
        mola_db::get_impact_category_elementary_flow(&conn, Vec::<String>::new()).unwrap();
    assert!(none.is_empty());
}

#[test]
fn get_ref_id_dicts_resolves_many_tables() {
    let conn = seeded_connection();
    let mut aliases = BTreeMap::new();
    aliases.insert("flows".to_string(), "TBL_FLOWS".to_string());
    aliases.insert("processes".to_string(), "TBL_PROCESSES".to_string());
    let dicts = mola_db::get_ref_id_dicts(&conn, &aliases).unwrap();
    assert_eq!(dicts.len(), 2);
    assert_eq!(dicts["processes"][&1], LEMON_PROCESS);
    assert_eq!(dicts["flows"].len(), 4);
}

#[test]
fn lookup_tables_have_fixed_widths() {
    let lookup = LookupTables::new(seeded_connection());

    let pm = lookup.get("P_m").unwrap();
    assert_eq!(pm.shape().1, 2);

    let kpi = lookup.get("KPI").unwrap();
    assert_eq!(kpi.shape().1, 3);

    let single = lookup.get_single_column("P_m").unwrap();
    assert_eq!(single.shape().1, 1);

    assert!(matches!(
        lookup.get("no-such-lookup"),
        Err(DataError::UnknownLookup(_))
    ));
}

#[test]
fn lookup_cache_serves_repeat_reads() {
    let lookup = LookupTables::new(seeded_connection());
    let first = lookup.get("E").unwrap();
    let second = lookup.get("E").unwrap();
    assert_eq!(first, second);

    let all = lookup.get_all().unwrap();
    assert_eq!(all.len(), LookupTables::names().len());
}
