//! Trajectory export to CSV and JSON

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::{DietError, Result};
use crate::models::{TrajectoryModel, WeightTrajectory};
use crate::units::Units;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = DietError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(DietError::InvalidArgument(format!(
                "export format: csv|json only, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct TrajectoryPoint {
    day: usize,
    weight: f64,
}

#[derive(Debug, Serialize)]
struct TrajectoryDocument<'a> {
    model: TrajectoryModel,
    units: &'a str,
    points: Vec<TrajectoryPoint>,
}

fn points(trajectory: &WeightTrajectory, units: Units) -> Vec<TrajectoryPoint> {
    trajectory
        .weights_kg
        .iter()
        .enumerate()
        .map(|(day, &kg)| TrajectoryPoint {
            day,
            weight: units.mass_from_kg(kg),
        })
        .collect()
}

/// Write `day,weight_<unit>` rows
pub fn write_csv<W: Write>(trajectory: &WeightTrajectory, units: Units, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let weight_header = format!("weight_{}", units.mass_label());
    csv_writer
        .write_record(["day", weight_header.as_str()])
        .map_err(|e| DietError::Serialization(e.to_string()))?;

    for point in points(trajectory, units) {
        csv_writer
            .write_record(&[point.day.to_string(), point.weight.to_string()])
            .map_err(|e| DietError::Serialization(e.to_string()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the trajectory as a pretty-printed JSON document
pub fn write_json<W: Write>(trajectory: &WeightTrajectory, units: Units, mut writer: W) -> Result<()> {
    let document = TrajectoryDocument {
        model: trajectory.model,
        units: units.mass_label(),
        points: points(trajectory, units),
    };
    serde_json::to_writer_pretty(&mut writer, &document)
        .map_err(|e| DietError::Serialization(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// Export a trajectory to `output_path` in the given units and format
pub fn export_trajectory<P: AsRef<Path>>(
    trajectory: &WeightTrajectory,
    units: Units,
    output_path: P,
    format: ExportFormat,
) -> Result<()> {
    let file = BufWriter::new(File::create(&output_path)?);
    match format {
        ExportFormat::Csv => write_csv(trajectory, units, file)?,
        ExportFormat::Json => write_json(trajectory, units, file)?,
    }

    info!(
        path = %output_path.as_ref().display(),
        ?format,
        points = trajectory.len(),
        "Trajectory exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::to_kg;
    use tempfile::NamedTempFile;

    fn sample() -> WeightTrajectory {
        WeightTrajectory::new(
            TrajectoryModel::ClosedForm,
            vec![to_kg(222.0), to_kg(221.5), to_kg(221.0)],
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_in_pounds() {
        let mut buffer = Vec::new();
        write_csv(&sample(), Units::Imperial, &mut buffer).unwrap();

        let content = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "day,weight_lbs");
        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(first[0], "0");
        assert!((first[1].parse::<f64>().unwrap() - 222.0).abs() < 1e-9);
        assert!(lines[3].starts_with("2,"));
    }

    #[test]
    fn test_json_document() {
        let mut buffer = Vec::new();
        write_json(&sample(), Units::Metric, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["model"], "closed_form");
        assert_eq!(value["units"], "kg");
        assert_eq!(value["points"].as_array().unwrap().len(), 3);
        assert_eq!(value["points"][2]["day"], 2);
    }

    #[test]
    fn test_export_to_file() {
        let temp_file = NamedTempFile::new().unwrap();
        export_trajectory(&sample(), Units::Metric, temp_file.path(), ExportFormat::Csv).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("day,weight_kg"));
    }
}
