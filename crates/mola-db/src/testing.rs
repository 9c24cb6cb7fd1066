//! Seeded in-memory fixture database
//!
//! A miniature openLCA-style database used by the test suites of this
//! crate and the crates above it: two processes with locations, product
//! and elementary exchanges (with costs on the functional units), and one
//! impact method with characterization factors.

use rusqlite::Connection;

pub const LEMON_PROCESS: &str = "proc-lemon-es";
pub const LORRY_PROCESS: &str = "proc-lorry-de";
pub const LEMON_FLOW: &str = "flow-lemon";
pub const CO2_FLOW: &str = "flow-co2";
pub const GWP_CATEGORY: &str = "cat-gwp100";
/// Impact category with no characterization factors.
pub const LAND_CATEGORY: &str = "cat-land";

const SCHEMA: &str = "
CREATE TABLE TBL_LOCATIONS (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL,
    LATITUDE REAL,
    LONGITUDE REAL
);
CREATE TABLE TBL_UNITS (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL
);
CREATE TABLE TBL_FLOWS (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL,
    FLOW_TYPE TEXT NOT NULL
);
CREATE TABLE TBL_PROCESSES (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL,
    F_LOCATION INTEGER
);
CREATE TABLE TBL_EXCHANGES (
    ID INTEGER PRIMARY KEY,
    F_OWNER INTEGER NOT NULL,
    F_FLOW INTEGER NOT NULL,
    F_UNIT INTEGER NOT NULL,
    IS_INPUT INTEGER NOT NULL,
    RESULTING_AMOUNT_VALUE REAL NOT NULL,
    COST_VALUE REAL
);
CREATE TABLE TBL_IMPACT_METHODS (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL
);
CREATE TABLE TBL_IMPACT_CATEGORIES (
    ID INTEGER PRIMARY KEY,
    REF_ID TEXT NOT NULL,
    NAME TEXT NOT NULL,
    REFERENCE_UNIT TEXT,
    F_IMPACT_METHOD INTEGER
);
CREATE TABLE TBL_IMPACT_FACTORS (
    ID INTEGER PRIMARY KEY,
    F_IMPACT_CATEGORY INTEGER NOT NULL,
    F_FLOW INTEGER NOT NULL,
    VALUE REAL NOT NULL
);
";

const DATA: &str = "
INSERT INTO TBL_LOCATIONS VALUES
    (1, 'loc-es', 'Spain', 40.0, -4.0),
    (2, 'loc-de', 'Germany', 51.0, 10.0);
INSERT INTO TBL_UNITS VALUES
    (1, 'unit-kg', 'kg'),
    (2, 'unit-tkm', 't*km');
INSERT INTO TBL_FLOWS VALUES
    (1, 'flow-co2', 'Carbon dioxide', 'ELEMENTARY_FLOW'),
    (2, 'flow-lemon', 'Lemon', 'PRODUCT_FLOW'),
    (3, 'flow-tkm', 'Transport, freight lorry', 'PRODUCT_FLOW'),
    (4, 'flow-ch4', 'Methane', 'ELEMENTARY_FLOW');
INSERT INTO TBL_PROCESSES VALUES
    (1, 'proc-lemon-es', 'lemon production, fresh grade', 1),
    (2, 'proc-lorry-de', 'transport, freight lorry 16-32 metric ton', 2);
INSERT INTO TBL_EXCHANGES VALUES
    (1, 1, 2, 1, 0, 1.0, 0.35),
    (2, 1, 1, 1, 0, 0.45, NULL),
    (3, 1, 4, 1, 0, 0.02, NULL),
    (4, 2, 3, 2, 0, 1.0, 1.2),
    (5, 2, 1, 1, 0, 0.12, NULL);
INSERT INTO TBL_IMPACT_METHODS VALUES
    (1, 'method-recipe', 'ReCiPe Midpoint (H) V1.13');
INSERT INTO TBL_IMPACT_CATEGORIES VALUES
    (1, 'cat-gwp100', 'Climate change - GWP100', 'kg CO2-Eq', 1),
    (2, 'cat-land', 'Land use', 'm2*a', 1);
INSERT INTO TBL_IMPACT_FACTORS VALUES
    (1, 1, 1, 1.0),
    (2, 1, 4, 28.0);
";

/// Create the fixture schema and data on an existing connection.
pub fn seed(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(DATA)
}

/// A fresh in-memory connection with the fixture loaded.
pub fn seeded_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory database");
    seed(&conn).expect("fixture data");
    conn
}
