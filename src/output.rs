use crate::error::EstimateError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<(), EstimateError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<(), EstimateError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path.as_ref(), s)?;
    info!(path = %path.as_ref().display(), "wrote JSON");
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItemRow;

    fn rows() -> Vec<LineItemRow> {
        vec![
            LineItemRow {
                item: "Booth space".into(),
                amount: "75,600.00".into(),
                taxable: "Yes".into(),
            },
            LineItemRow {
                item: "Travel".into(),
                amount: "57,000.00".into(),
                taxable: "No".into(),
            },
        ]
    }

    #[test]
    fn markdown_preview_uses_renamed_headers() {
        let table = render_table(&rows(), 1);
        assert!(table.contains("Item"));
        assert!(table.contains("Booth space"));
        assert!(!table.contains("Travel"));
        assert_eq!(render_table::<LineItemRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn csv_and_json_land_on_disk() {
        let dir = std::env::temp_dir().join(format!("expo_estimator_out_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("rows.csv");
        write_csv(&csv_path, &rows()).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("Item,Amount,Taxable"));
        assert!(text.contains("\"75,600.00\""));

        let json_path = dir.join("rows.json");
        write_json(&json_path, &rows()).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(v[1]["Item"], "Travel");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
