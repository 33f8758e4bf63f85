//! CSV serialization of a finished (or in-progress) session.
//!
//! The export is a fixed 9-column table: one header row, one process-metadata
//! row, a blank separator row, a log sub-header row, then one row per event
//! in commit order. Rendering is deterministic given the inputs; the export
//! instant is a parameter, never read from the ambient clock.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

use crate::duration::format_ms;
use crate::event::Event;
use crate::metadata::{MetadataField, ProcessMetadata};

/// Export serialization errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The CSV writer rejected a record.
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV buffer could not be flushed.
    #[error("csv flush failed: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered table was not valid UTF-8.
    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders the session as comma-delimited text.
///
/// Field values are emitted verbatim (the writer quote-escapes embedded
/// commas and quotes); timestamps render as ISO 8601 instants with
/// millisecond precision, durations via [`format_ms`]. Read-only over its
/// inputs.
pub fn export_csv(
    metadata: &ProcessMetadata,
    events: &[Event],
    exported_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);

        let mut header: Vec<&str> = MetadataField::ALL.iter().map(|f| f.heading()).collect();
        header.extend(["Event", "Timestamp", "Duration"]);
        writer.write_record(&header)?;

        let exported_at = iso_instant(exported_at);
        let mut meta_row: Vec<&str> =
            MetadataField::ALL.iter().map(|&f| metadata.get(f)).collect();
        meta_row.extend(["Process Data", exported_at.as_str(), ""]);
        writer.write_record(&meta_row)?;

        writer.write_record([""; 9])?;
        writer.write_record(["", "", "", "", "", "", "Event Log", "Timestamp", "Duration"])?;

        for event in events {
            let label = event.kind.to_string();
            let timestamp = iso_instant(event.timestamp);
            let duration = format_ms(event.duration_ms);
            writer.write_record([
                "",
                "",
                "",
                "",
                "",
                "",
                label.as_str(),
                timestamp.as_str(),
                duration.as_str(),
            ])?;
        }

        writer.flush()?;
    }
    Ok(String::from_utf8(buf)?)
}

/// Filename for an export taken on the given calendar date.
#[must_use]
pub fn export_filename(date: NaiveDate) -> String {
    format!("time_study_{}.csv", date.format("%Y-%m-%d"))
}

/// ISO 8601 instant with millisecond precision and a `Z` suffix.
fn iso_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use insta::assert_snapshot;

    fn sample_metadata() -> ProcessMetadata {
        ProcessMetadata {
            process_name: "Bagging".into(),
            product_description: "Frozen peas 500g".into(),
            line: "Line 2".into(),
            units_per_bag: "1".into(),
            bags_per_case: "12".into(),
            cases_per_pallet: "60".into(),
        }
    }

    fn event(kind: EventKind, timestamp: &str, duration_ms: u64) -> Event {
        Event {
            kind,
            timestamp: timestamp.parse().unwrap(),
            duration_ms,
        }
    }

    #[test]
    fn full_table_layout() {
        let events = vec![
            event(EventKind::ProcessStarted, "2026-03-01T08:00:00Z", 0),
            event(
                EventKind::DowntimeStart {
                    description: Some("jam".into()),
                },
                "2026-03-01T08:00:05Z",
                5_000,
            ),
            event(
                EventKind::PalletComplete { sequence: 1 },
                "2026-03-01T08:00:09Z",
                4_000,
            ),
            event(EventKind::ProcessStopped, "2026-03-01T08:00:12Z", 3_000),
        ];
        let exported_at: DateTime<Utc> = "2026-03-01T08:15:00Z".parse().unwrap();

        let csv = export_csv(&sample_metadata(), &events, exported_at).unwrap();
        assert_snapshot!(csv, @r"
        Process Name,Product Description,Line,Units per Bag,Bags per Case,Cases per Pallet,Event,Timestamp,Duration
        Bagging,Frozen peas 500g,Line 2,1,12,60,Process Data,2026-03-01T08:15:00.000Z,
        ,,,,,,,,
        ,,,,,,Event Log,Timestamp,Duration
        ,,,,,,Process Started,2026-03-01T08:00:00.000Z,00:00.00
        ,,,,,,Downtime Start: jam,2026-03-01T08:00:05.000Z,00:05.00
        ,,,,,,Pallet Complete,2026-03-01T08:00:09.000Z,00:04.00
        ,,,,,,Process Stopped,2026-03-01T08:00:12.000Z,00:03.00
        ");
    }

    #[test]
    fn empty_log_still_renders_the_frame() {
        let exported_at: DateTime<Utc> = "2026-03-01T08:15:00Z".parse().unwrap();
        let csv = export_csv(&ProcessMetadata::default(), &[], exported_at).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Process Name,"));
        assert_eq!(lines[2], ",,,,,,,,");
        assert_eq!(lines[3], ",,,,,,Event Log,Timestamp,Duration");
    }

    #[test]
    fn embedded_commas_are_quoted() {
        let mut metadata = sample_metadata();
        metadata.product_description = "Peas, frozen, 500g".into();
        let events = vec![event(
            EventKind::OperatorTask {
                description: Some("cleared jam, restarted belt".into()),
            },
            "2026-03-01T08:00:05Z",
            5_000,
        )];
        let exported_at: DateTime<Utc> = "2026-03-01T08:15:00Z".parse().unwrap();

        let csv = export_csv(&metadata, &events, exported_at).unwrap();

        assert!(csv.contains(r#""Peas, frozen, 500g""#));
        assert!(csv.contains(r#""Operator Task: cleared jam, restarted belt""#));
        // Quoting keeps every row at exactly 9 columns.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(csv.as_bytes());
        for record in reader.records() {
            assert_eq!(record.unwrap().len(), 9);
        }
    }

    #[test]
    fn one_row_per_event_in_log_order() {
        let events = vec![
            event(EventKind::ProcessStarted, "2026-03-01T08:00:00Z", 0),
            event(EventKind::DowntimeEnd, "2026-03-01T08:00:02Z", 2_000),
            event(EventKind::ProcessStopped, "2026-03-01T08:00:03Z", 1_000),
        ];
        let exported_at: DateTime<Utc> = "2026-03-01T09:00:00Z".parse().unwrap();
        let csv = export_csv(&ProcessMetadata::default(), &events, exported_at).unwrap();

        let data_rows: Vec<&str> = csv.lines().skip(4).collect();
        assert_eq!(data_rows.len(), 3);
        assert!(data_rows[0].contains("Process Started"));
        assert!(data_rows[1].contains("Downtime End"));
        assert!(data_rows[2].contains("Process Stopped"));
    }

    #[test]
    fn filename_tags_the_calendar_date_only() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(export_filename(date), "time_study_2026-03-01.csv");
    }
}
