//! Fixed schema of the mandi price store.

/// Table holding one row per market, commodity and arrival date
pub const TABLE_NAME: &str = "mandi_prices";

pub const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS mandi_prices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    state TEXT NOT NULL,
    district TEXT NOT NULL,
    market TEXT NOT NULL,
    commodity TEXT NOT NULL,
    variety TEXT,
    grade TEXT,
    arrival_date TEXT NOT NULL,
    min_price REAL,
    max_price REAL,
    modal_price REAL
);
CREATE INDEX IF NOT EXISTS idx_mandi_commodity ON mandi_prices (commodity);
CREATE INDEX IF NOT EXISTS idx_mandi_state_district ON mandi_prices (state, district);
CREATE INDEX IF NOT EXISTS idx_mandi_arrival_date ON mandi_prices (arrival_date);
";

/// Schema description handed to the model that writes the SQL
pub const SCHEMA_DESCRIPTION: &str = "\
Table mandi_prices (daily wholesale prices from Indian agricultural markets):
  state        TEXT  -- e.g. 'Punjab', 'Maharashtra'
  district     TEXT  -- district of the market
  market       TEXT  -- mandi name, e.g. 'Azadpur'
  commodity    TEXT  -- e.g. 'Wheat', 'Onion', 'Tomato'
  variety      TEXT  -- commodity variety, may be NULL
  grade        TEXT  -- quality grade, e.g. 'FAQ', may be NULL
  arrival_date TEXT  -- ISO date YYYY-MM-DD
  min_price    REAL  -- minimum price, Rs per quintal
  max_price    REAL  -- maximum price, Rs per quintal
  modal_price  REAL  -- most common price, Rs per quintal
Only SELECT statements are executed. At most 10 rows are returned.";
