//! Data freshness evaluation - the exporter's decision core.
//!
//! Given one CSV snapshot and the current time, decides per sensor what is
//! trustworthy enough to publish. Three gates run in order:
//!
//! 1. Schema gate: a snapshot without a `batteryStatus0` column is garbage
//!    (the station wrote a corrupted or non-weather line). A single garbage
//!    cycle republishes the last-known-good cache to avoid spurious gaps; a
//!    streak publishes the NaN sentinel everywhere.
//! 2. Freshness gate: rows whose `dateTime` differs from wall clock by more
//!    than the staleness threshold (either direction) are marked stale.
//! 3. Per-field parse gate: each temperature/humidity field is validated
//!    independently; one bad field never poisons its neighbor.
//!
//! The evaluator owns all cross-cycle state (garbage streak, last-known-good
//! cache) so it can be tested in isolation and safely moved behind a lock if
//! polling is ever parallelized.

use tracing::{error, warn};

use crate::domain::convert::fahrenheit_to_celsius;
use crate::domain::reading::{CachedReading, FieldValue, SensorReadout};
use crate::domain::snapshot::{Row, Snapshot};

/// Column whose presence marks a snapshot as well-formed station data.
const SCHEMA_SENTINEL_COLUMN: &str = "batteryStatus0";

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The schema gate failed; no row-level processing happened. The
    /// readouts are either the republished cache (first garbage cycle) or
    /// all-invalid (repeat garbage).
    Garbage {
        /// Per-sensor values to publish this cycle.
        sensors: Vec<SensorReadout>,
    },
    /// Row-level results, one per row that carried a parseable timestamp,
    /// in file order. Rows with an unparseable `dateTime` are absent.
    Rows(Vec<RowOutcome>),
}

/// Publishable result for a single data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// `now - dateTime` in seconds. Published regardless of sign or
    /// magnitude, even when the row is stale.
    pub data_age: i64,
    /// Per-sensor values for this row.
    pub sensors: Vec<SensorReadout>,
}

/// Stateful evaluator applying the schema, freshness, and parse gates.
pub struct DataFreshnessEvaluator {
    /// Ordered sensor names; the index fixes the CSV column suffix.
    sensors: Vec<String>,
    /// Freshness window in seconds (exclusive: exactly this age passes).
    staleness_seconds: i64,
    /// Consecutive garbage snapshots seen. Saturates; only 0/1/>1 matters.
    garbage_streak: u32,
    /// Last-known-good reading per sensor, parallel to `sensors`.
    cache: Vec<CachedReading>,
}

impl DataFreshnessEvaluator {
    /// Create an evaluator for the given ordered sensor list.
    pub fn new(sensors: Vec<String>, staleness_seconds: i64) -> Self {
        let cache = vec![CachedReading::default(); sensors.len()];
        Self {
            sensors,
            staleness_seconds,
            garbage_streak: 0,
            cache,
        }
    }

    /// Evaluate one snapshot against the current Unix time (seconds).
    ///
    /// Mutates only the garbage streak and the last-known-good cache, and
    /// the cache only absorbs values that passed every gate.
    pub fn evaluate(&mut self, snapshot: &Snapshot, now: i64) -> Evaluation {
        if !snapshot.has_column(SCHEMA_SENTINEL_COLUMN) {
            self.garbage_streak = self.garbage_streak.saturating_add(1);
            warn!(
                streak = self.garbage_streak,
                "Garbage data detected in the CSV snapshot"
            );
            let sensors = if self.garbage_streak > 1 {
                self.all_marked(FieldValue::Invalid)
            } else {
                // Single-cycle glitch: bridge the gap with cached values.
                self.sensors
                    .iter()
                    .zip(self.cache.iter())
                    .map(|(name, cached)| cached.to_readout(name))
                    .collect()
            };
            return Evaluation::Garbage { sensors };
        }

        // A well-formed header resets the streak even if every row below
        // turns out stale or unparseable.
        self.garbage_streak = 0;

        let mut outcomes = Vec::with_capacity(snapshot.rows().len());
        for row in snapshot.rows() {
            let Some(record_time) = parse_timestamp(row) else {
                error!("Invalid dateTime value; skipping row");
                continue;
            };
            let data_age = now - record_time;

            if data_age.abs() > self.staleness_seconds {
                warn!(data_age, "Data outside freshness window; marking stale");
                outcomes.push(RowOutcome {
                    data_age,
                    sensors: self.all_marked(FieldValue::Stale),
                });
                continue;
            }

            let sensors = (0..self.sensors.len())
                .map(|i| self.evaluate_sensor(row, i))
                .collect();
            outcomes.push(RowOutcome { data_age, sensors });
        }
        Evaluation::Rows(outcomes)
    }

    /// Evaluate both fields of one sensor, caching whatever validates.
    fn evaluate_sensor(&mut self, row: &Row, index: usize) -> SensorReadout {
        let sensor = self.sensors[index].clone();

        let temperature = match parse_field(row, &format!("temp{index}")) {
            FieldParse::Value(fahrenheit) => {
                let celsius = fahrenheit_to_celsius(fahrenheit);
                self.cache[index].temperature = Some(celsius);
                FieldValue::Valid(celsius)
            }
            FieldParse::Absent(key) => {
                warn!(sensor = %sensor, field = %key, "Missing or 'none' value");
                FieldValue::Invalid
            }
            FieldParse::Unparseable(key, raw) => {
                error!(sensor = %sensor, field = %key, value = %raw, "Invalid temperature value");
                FieldValue::Invalid
            }
        };

        let humidity = match parse_field(row, &format!("humidity{index}")) {
            FieldParse::Value(raw) => {
                // Stations report humidity as a float; export whole percent.
                let percent = raw.trunc();
                self.cache[index].humidity = Some(percent);
                FieldValue::Valid(percent)
            }
            FieldParse::Absent(key) => {
                warn!(sensor = %sensor, field = %key, "Missing or 'none' value");
                FieldValue::Invalid
            }
            FieldParse::Unparseable(key, raw) => {
                error!(sensor = %sensor, field = %key, value = %raw, "Invalid humidity value");
                FieldValue::Invalid
            }
        };

        SensorReadout {
            sensor,
            temperature,
            humidity,
        }
    }

    /// Readouts marking every field of every sensor with the same state.
    fn all_marked(&self, value: FieldValue) -> Vec<SensorReadout> {
        self.sensors
            .iter()
            .map(|name| SensorReadout {
                sensor: name.clone(),
                temperature: value,
                humidity: value,
            })
            .collect()
    }
}

/// Outcome of looking up and parsing one numeric field.
enum FieldParse {
    Value(f64),
    Absent(String),
    Unparseable(String, String),
}

fn parse_field(row: &Row, key: &str) -> FieldParse {
    match row.get(key).map(str::trim) {
        None | Some("") => FieldParse::Absent(key.to_string()),
        Some(raw) if raw.eq_ignore_ascii_case("none") => FieldParse::Absent(key.to_string()),
        Some(raw) => raw
            .parse::<f64>()
            .map_or_else(|_| FieldParse::Unparseable(key.to_string(), raw.to_string()), FieldParse::Value),
    }
}

fn parse_timestamp(row: &Row) -> Option<i64> {
    row.get("dateTime")?.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn evaluator(names: &[&str]) -> DataFreshnessEvaluator {
        DataFreshnessEvaluator::new(strings(names), 60)
    }

    /// Snapshot with the standard two-sensor header and one row.
    fn two_sensor_snapshot(values: &[&str]) -> Snapshot {
        Snapshot::new(
            strings(&[
                "#dateTime",
                "batteryStatus0",
                "temp0",
                "humidity0",
                "temp1",
                "humidity1",
            ]),
            vec![strings(values)],
        )
    }

    fn garbage_snapshot() -> Snapshot {
        Snapshot::new(strings(&["#dateTime", "temp0"]), vec![])
    }

    fn rows(eval: Evaluation) -> Vec<RowOutcome> {
        match eval {
            Evaluation::Rows(rows) => rows,
            Evaluation::Garbage { .. } => panic!("expected row-level evaluation"),
        }
    }

    fn garbage_sensors(eval: Evaluation) -> Vec<SensorReadout> {
        match eval {
            Evaluation::Garbage { sensors } => sensors,
            Evaluation::Rows(_) => panic!("expected garbage evaluation"),
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut eval = evaluator(&["s0", "s1"]);
        let ts = (NOW - 5).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "none", "50"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert_eq!(outcome.data_age, 5);
        assert_eq!(outcome.sensors[0].temperature, FieldValue::Valid(37.0));
        assert_eq!(outcome.sensors[0].humidity, FieldValue::Valid(45.0));
        assert_eq!(outcome.sensors[1].temperature, FieldValue::Invalid);
        assert_eq!(outcome.sensors[1].humidity, FieldValue::Valid(50.0));
    }

    #[test]
    fn test_row_exactly_at_threshold_passes() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 60).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "32.0", "40", "70", "40"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].data_age, 60);
        assert_eq!(outcomes[0].sensors[0].temperature, FieldValue::Valid(0.0));
    }

    #[test]
    fn test_row_past_threshold_is_stale() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 61).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "32.0", "40", "70", "40"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].data_age, 61);
        assert_eq!(outcomes[0].sensors[0].temperature, FieldValue::Stale);
        assert_eq!(outcomes[0].sensors[0].humidity, FieldValue::Stale);
    }

    #[test]
    fn test_row_from_the_future_is_stale() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW + 120).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "32.0", "40", "70", "40"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].data_age, -120);
        assert_eq!(outcomes[0].sensors[0].humidity, FieldValue::Stale);
    }

    #[test]
    fn test_unparseable_timestamp_skips_row() {
        let mut eval = evaluator(&["s0"]);
        let snap = two_sensor_snapshot(&["not-a-number", "1", "32.0", "40", "70", "40"]);
        assert_eq!(rows(eval.evaluate(&snap, NOW)), vec![]);
    }

    #[test]
    fn test_first_garbage_republishes_cache() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 5).to_string();
        let good = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "70", "40"]);
        eval.evaluate(&good, NOW);

        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW + 15));
        assert_eq!(sensors[0].temperature, FieldValue::Valid(37.0));
        assert_eq!(sensors[0].humidity, FieldValue::Valid(45.0));
    }

    #[test]
    fn test_second_garbage_publishes_invalid() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 5).to_string();
        let good = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "70", "40"]);
        eval.evaluate(&good, NOW);

        eval.evaluate(&garbage_snapshot(), NOW + 15);
        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW + 30));
        assert_eq!(sensors[0].temperature, FieldValue::Invalid);
        assert_eq!(sensors[0].humidity, FieldValue::Invalid);
    }

    #[test]
    fn test_first_garbage_without_history_republishes_invalid() {
        let mut eval = evaluator(&["s0", "s1"]);
        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW));
        assert!(sensors.iter().all(|s| s.temperature == FieldValue::Invalid));
        assert!(sensors.iter().all(|s| s.humidity == FieldValue::Invalid));
    }

    #[test]
    fn test_well_formed_snapshot_resets_garbage_streak() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 5).to_string();
        let good = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "70", "40"]);

        eval.evaluate(&garbage_snapshot(), NOW);
        eval.evaluate(&garbage_snapshot(), NOW);
        eval.evaluate(&good, NOW);

        // Back to the single-glitch path: the cache is republished again.
        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW));
        assert_eq!(sensors[0].temperature, FieldValue::Valid(37.0));
    }

    #[test]
    fn test_stale_snapshot_still_resets_garbage_streak() {
        let mut eval = evaluator(&["s0"]);
        let old_ts = (NOW - 300).to_string();
        let stale = two_sensor_snapshot(&[&old_ts, "1", "98.6", "45", "70", "40"]);

        eval.evaluate(&garbage_snapshot(), NOW);
        eval.evaluate(&stale, NOW);
        // The streak was reset by the well-formed header, so the next
        // garbage snapshot is treated as a fresh first occurrence.
        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW));
        assert_eq!(sensors[0].temperature, FieldValue::Invalid);
    }

    #[test]
    fn test_stale_row_never_overwrites_cache() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 5).to_string();
        let good = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "70", "40"]);
        eval.evaluate(&good, NOW);

        let old_ts = (NOW - 600).to_string();
        let stale = two_sensor_snapshot(&[&old_ts, "1", "212.0", "99", "70", "40"]);
        eval.evaluate(&stale, NOW);

        let sensors = garbage_sensors(eval.evaluate(&garbage_snapshot(), NOW));
        assert_eq!(sensors[0].temperature, FieldValue::Valid(37.0));
        assert_eq!(sensors[0].humidity, FieldValue::Valid(45.0));
    }

    #[test]
    fn test_none_sentinel_is_case_insensitive() {
        let mut eval = evaluator(&["s0", "s1"]);
        let ts = (NOW - 1).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "NoNe", "45", "NONE", "none"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].sensors[0].temperature, FieldValue::Invalid);
        assert_eq!(outcomes[0].sensors[0].humidity, FieldValue::Valid(45.0));
        assert_eq!(outcomes[0].sensors[1].temperature, FieldValue::Invalid);
        assert_eq!(outcomes[0].sensors[1].humidity, FieldValue::Invalid);
    }

    #[test]
    fn test_unparseable_field_is_invalid_independently() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 1).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "garbage", "45", "70", "40"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].sensors[0].temperature, FieldValue::Invalid);
        assert_eq!(outcomes[0].sensors[0].humidity, FieldValue::Valid(45.0));
    }

    #[test]
    fn test_humidity_truncates_to_whole_percent() {
        let mut eval = evaluator(&["s0"]);
        let ts = (NOW - 1).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "70", "45.9", "70", "40"]);

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes[0].sensors[0].humidity, FieldValue::Valid(45.0));
    }

    #[test]
    fn test_missing_sensor_columns_are_invalid() {
        // Header only covers sensor 0 but two sensors are configured.
        let mut eval = evaluator(&["s0", "s1"]);
        let ts = (NOW - 1).to_string();
        let snap = Snapshot::new(
            strings(&["#dateTime", "batteryStatus0", "temp0", "humidity0"]),
            vec![strings(&[&ts, "1", "70", "40"])],
        );

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert!(outcomes[0].sensors[0].temperature.is_valid());
        assert_eq!(outcomes[0].sensors[1].temperature, FieldValue::Invalid);
        assert_eq!(outcomes[0].sensors[1].humidity, FieldValue::Invalid);
    }

    #[test]
    fn test_evaluation_is_idempotent_for_fresh_rows() {
        let mut eval = evaluator(&["s0", "s1"]);
        let ts = (NOW - 5).to_string();
        let snap = two_sensor_snapshot(&[&ts, "1", "98.6", "45", "none", "50"]);

        let first = eval.evaluate(&snap, NOW);
        let second = eval.evaluate(&snap, NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiple_rows_each_evaluated() {
        let mut eval = evaluator(&["s0"]);
        let fresh = (NOW - 5).to_string();
        let old = (NOW - 500).to_string();
        let snap = Snapshot::new(
            strings(&["#dateTime", "batteryStatus0", "temp0", "humidity0"]),
            vec![
                strings(&[&old, "1", "70", "40"]),
                strings(&[&fresh, "1", "32", "55"]),
            ],
        );

        let outcomes = rows(eval.evaluate(&snap, NOW));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].sensors[0].temperature, FieldValue::Stale);
        assert_eq!(outcomes[1].sensors[0].temperature, FieldValue::Valid(0.0));
    }
}
