//! Export the displayed rate schedule to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Values are written in the chart's current display mode.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::chart::ChartFrame;
use crate::error::AppError;

/// Write the displayed datasets to a CSV file.
pub fn write_series_csv(path: &Path, frame: &ChartFrame) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(&mut file, frame)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_series(out: &mut impl Write, frame: &ChartFrame) -> std::io::Result<()> {
    writeln!(out, "date,rate,floor,ceiling,mode")?;

    let mode = frame.mode.display_name().to_lowercase();
    let ds = &frame.datasets;
    for (i, date) in frame.labels.iter().enumerate() {
        writeln!(
            out,
            "{date},{:.6},{:.6},{:.6},{mode}",
            ds.series[i], ds.floor_line[i], ds.ceiling_line[i],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Datasets;
    use crate::domain::DisplayMode;

    #[test]
    fn writes_header_and_rows_in_display_units() {
        let frame = ChartFrame {
            labels: vec!["2023-01-01".to_string(), "2023-02-01".to_string()],
            datasets: Datasets {
                series: vec![1.5, 1.8],
                floor_line: vec![1.0, 1.0],
                ceiling_line: vec![5.0, 5.0],
            },
            mode: DisplayMode::Percentage,
        };

        let mut out = Vec::new();
        write_series(&mut out, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,rate,floor,ceiling,mode");
        assert_eq!(lines[1], "2023-01-01,1.500000,1.000000,5.000000,percentage");
    }

    #[test]
    fn file_export_reports_bad_paths() {
        let frame = ChartFrame {
            labels: Vec::new(),
            datasets: Datasets::default(),
            mode: DisplayMode::Decimal,
        };
        let err = write_series_csv(Path::new("/nonexistent-dir/x/rates.csv"), &frame).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let path = std::env::temp_dir().join(format!("loan-rates-export-{}.csv", std::process::id()));
        write_series_csv(&path, &frame).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "date,rate,floor,ceiling,mode\n");
        let _ = std::fs::remove_file(&path);
    }
}
