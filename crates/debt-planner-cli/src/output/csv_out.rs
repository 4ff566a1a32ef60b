use serde_json::Value;
use std::io;

use super::{cell, is_schedule, result_of, schedule_row, SCHEDULE_COLUMNS};

/// Write output as CSV to stdout.
///
/// Results carrying schedules are written as schedule rows with a leading
/// `schedule` column naming where each row came from; anything else becomes
/// a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    let mut schedules = Vec::new();
    collect_schedules("", result, &mut schedules);

    if !schedules.is_empty() {
        let mut header = vec!["schedule"];
        header.extend(SCHEDULE_COLUMNS);
        let _ = wtr.write_record(&header);
        for (name, rows) in schedules {
            for row in rows.as_array().into_iter().flatten() {
                let mut record = vec![name.clone()];
                record.extend(schedule_row(row));
                let _ = wtr.write_record(&record);
            }
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &cell(val)]);
        }
    } else {
        let _ = wtr.write_record([&cell(result)]);
    }

    let _ = wtr.flush();
}

fn collect_schedules<'a>(path: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    if is_schedule(value) {
        let name = if path.is_empty() { "schedule" } else { path };
        out.push((name.to_string(), value));
    } else if let Value::Object(map) = value {
        for (key, val) in map {
            let child = match (path, key.as_str()) {
                ("", k) => k.to_string(),
                (p, "schedule") => p.to_string(),
                (p, k) => format!("{}.{}", p, k),
            };
            collect_schedules(&child, val, out);
        }
    }
}
