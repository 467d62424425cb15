use super::loader::MortalityRow;
use crate::streamer_core::SqlRow;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rusqlite::{params, Transaction};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MESSAGE_TEMPLATES: [&str; 8] = [
    "In {region}, {status} {sex} population reported {cause} mortality at {rate} (SE {se}).",
    "{region} {status} {sex}s observed a {cause} death rate of {rate}, SE {se}.",
    "{cause} mortality in {region} for {status} {sex}s: {rate} with SE {se}.",
    "{region} records {rate} deaths per 100,000 from {cause} among {status} {sex}s (SE {se}).",
    "For {status} {sex}s in {region}, {cause} mortality rate is {rate} (SE {se}).",
    "{sex} residents in {status} {region} face a {cause} death rate of {rate} ± {se}.",
    "{cause} claims {rate} per 100,000 {status} {sex}s in {region}, SE {se}.",
    "{region}'s {status} {sex} population has a {cause} mortality rate of {rate} (SE {se}).",
];

/// One line of the live stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityMessage {
    pub message: String,
    pub author: String,
    pub timestamp: String,
    pub category: String,
    pub region: String,
    pub status: String,
    pub sex: String,
    pub cause: String,
    pub rate: f64,
    pub se: f64,
}

impl SqlRow for MortalityMessage {
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS mortality_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT,
            author TEXT,
            timestamp TEXT,
            category TEXT,
            region TEXT,
            status TEXT,
            sex TEXT,
            cause TEXT,
            rate REAL,
            se REAL
        );
    ";

    fn insert(&self, tx: &Transaction<'_>) -> rusqlite::Result<usize> {
        tx.execute(
            "INSERT INTO mortality_messages
             (message, author, timestamp, category, region, status, sex, cause, rate, se)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.message,
                self.author,
                self.timestamp,
                self.category,
                self.region,
                self.status,
                self.sex,
                self.cause,
                self.rate,
                self.se,
            ],
        )
    }
}

/// Render a number the way the source table prints it (`100.0`, not `100`)
fn display_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn fill_template(template: &str, row: &MortalityRow) -> String {
    template
        .replace("{region}", &row.region)
        .replace("{status}", &row.status)
        .replace("{sex}", &row.sex)
        .replace("{cause}", &row.cause)
        .replace("{rate}", &display_number(row.rate))
        .replace("{se}", &display_number(row.se))
}

/// Synthetic timestamp for the n-th message: a fixed day, minute = n % 60,
/// hour = (n / 60) % 24. Wraps after one day of messages.
pub fn synthetic_timestamp(n: u64) -> String {
    let base: NaiveDateTime = NaiveDate::from_ymd_opt(2025, 9, 27)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let minutes = ((n / 60) % 24) * 60 + n % 60;
    (base + ChronoDuration::minutes(minutes as i64))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Endless message stream cycling over the loaded rows
pub struct MessageGenerator {
    rows: Vec<MortalityRow>,
    position: usize,
    emitted: u64,
    rng: StdRng,
}

impl MessageGenerator {
    pub fn new(rows: Vec<MortalityRow>) -> Self {
        Self::with_rng(rows, StdRng::from_entropy())
    }

    pub fn with_rng(rows: Vec<MortalityRow>, rng: StdRng) -> Self {
        Self {
            rows,
            position: 0,
            emitted: 0,
            rng,
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn build(&mut self, row: &MortalityRow) -> MortalityMessage {
        let template = MESSAGE_TEMPLATES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(MESSAGE_TEMPLATES[0]);

        MortalityMessage {
            message: fill_template(template, row),
            author: row.region.replace(' ', "_"),
            timestamp: synthetic_timestamp(self.emitted),
            category: row.cause.to_lowercase().replace(' ', "_"),
            region: row.region.clone(),
            status: row.status.clone(),
            sex: row.sex.clone(),
            cause: row.cause.clone(),
            rate: row.rate,
            se: row.se,
        }
    }
}

impl Iterator for MessageGenerator {
    type Item = MortalityMessage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rows.is_empty() {
            return None;
        }

        let row = self.rows[self.position].clone();
        let message = self.build(&row);

        self.position = (self.position + 1) % self.rows.len();
        self.emitted += 1;
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator_core::MortalityRecord;

    fn row(region: &str, sex: &str, rate: f64) -> MortalityRow {
        MortalityRow {
            region: region.to_string(),
            status: "Urban".to_string(),
            sex: sex.to_string(),
            cause: "Heart disease".to_string(),
            rate,
            se: 1.0,
        }
    }

    fn generator(rows: Vec<MortalityRow>) -> MessageGenerator {
        MessageGenerator::with_rng(rows, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_synthetic_timestamp() {
        assert_eq!(synthetic_timestamp(0), "2025-09-27 00:00:00");
        assert_eq!(synthetic_timestamp(59), "2025-09-27 00:59:00");
        assert_eq!(synthetic_timestamp(61), "2025-09-27 01:01:00");
        assert_eq!(synthetic_timestamp(1439), "2025-09-27 23:59:00");
        assert_eq!(synthetic_timestamp(1440), "2025-09-27 00:00:00");
    }

    #[test]
    fn test_message_fields() {
        let mut gen = generator(vec![row("HHS Region 01", "Male", 188.2)]);
        let msg = gen.next().unwrap();

        assert_eq!(msg.author, "HHS_Region_01");
        assert_eq!(msg.category, "heart_disease");
        assert_eq!(msg.timestamp, "2025-09-27 00:00:00");
        assert!(msg.message.contains("188.2"));
        assert!(msg.message.contains("HHS Region 01"));
        assert!(!msg.message.contains('{'));
    }

    #[test]
    fn test_cycles_rows_forever() {
        let mut gen = generator(vec![row("R1", "Male", 1.0), row("R2", "Female", 2.0)]);
        let regions: Vec<String> = gen.by_ref().take(5).map(|m| m.region).collect();

        assert_eq!(regions, vec!["R1", "R2", "R1", "R2", "R1"]);
        assert_eq!(gen.emitted(), 5);
    }

    #[test]
    fn test_empty_rows_end_stream() {
        assert!(generator(Vec::new()).next().is_none());
    }

    #[test]
    fn test_whole_rates_keep_decimal() {
        let msg = generator(vec![row("R1", "Male", 100.0)]).next().unwrap();
        assert!(msg.message.contains("100.0"));
    }

    #[test]
    fn test_serialized_message_is_consumable() {
        let msg = generator(vec![row("HHS Region 03", "Female", 121.4)]).next().unwrap();
        let line = serde_json::to_string(&msg).unwrap();

        let record = MortalityRecord::from_jsonl(&line).unwrap();
        assert_eq!(record.region, "HHS Region 03");
        assert_eq!(record.rate, 121.4);
        assert_eq!(record.identity(), "HHS_Region_03_2025-09-27 00:00:00");
    }
}
