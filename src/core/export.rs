mod summary;

use std::{
    fs,
    io::{self, BufWriter, IntoInnerError, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;

pub use self::summary::Summary;
use crate::{
    core::run::{ShapeError, SimulationRun},
    prelude::*,
};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid simulation run")]
    Shape(#[from] ShapeError),

    #[error("failed to write the export to `{path}`")]
    Io {
        path: PathBuf,

        #[source]
        source: io::Error,
    },
}

/// Export of a completed simulation run: metadata, raw and derived series, and summary.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: Metadata,
    pub timeseries: TimeSeries,
    pub summary: Summary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub start_time: String,
    pub end_time: String,
    pub num_datapoints: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub timestamps: Vec<String>,
    pub consumption: Vec<f64>,
    pub solar_generation: Vec<f64>,
    pub battery: BatterySeries,
    pub grid_power: Vec<f64>,
    pub spot_prices: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatterySeries {
    pub soc: Vec<f64>,
    pub power: Vec<f64>,
}

impl TimeSeries {
    /// Recompute the summary from the raw series.
    pub fn summarize(&self) -> Summary {
        Summary::from_hourly(
            &self.consumption,
            &self.solar_generation,
            &self.grid_power,
            &self.spot_prices,
        )
    }
}

fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl ExportDocument {
    /// Build the document from a validated run.
    #[instrument(skip_all, fields(n_timestamps = run.timestamps.len()))]
    pub fn try_from_run(run: &SimulationRun<'_>) -> Result<Self, ShapeError> {
        let num_datapoints = run.validate()?;
        let battery_power = run.battery_power();
        if !battery_power.iter().all(|power| power.is_finite()) {
            return Err(ShapeError::Overflow { quantity: "battery.power" });
        }

        let timeseries = TimeSeries {
            timestamps: run.timestamps.iter().map(format_timestamp).collect(),
            consumption: run.consumption.to_vec(),
            solar_generation: run.solar_generation.to_vec(),
            battery: BatterySeries { soc: run.battery_soc.to_vec(), power: battery_power },
            grid_power: run.grid_power.to_vec(),
            spot_prices: run.spot_price.to_vec(),
        };
        let metadata = Metadata {
            start_time: timeseries.timestamps[0].clone(),
            end_time: timeseries.timestamps[num_datapoints - 1].clone(),
            num_datapoints,
        };
        let summary = timeseries.summarize();
        if let Some(quantity) = summary.non_finite() {
            return Err(ShapeError::Overflow { quantity });
        }
        debug!(?summary, "built");

        Ok(Self { metadata, timeseries, summary })
    }

    /// Serialize the document as JSON indented with 4 spaces.
    pub fn to_writer_pretty(&self, writer: impl Write) -> serde_json::Result<()> {
        let mut serializer =
            serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)
    }

    /// Write the document to the path.
    ///
    /// The document goes to a temporary file in the same directory first and is renamed into
    /// place afterwards, so the destination is either fully written or left untouched.
    /// A symlinked destination is written through, keeping the link.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let into_error = |source| ExportError::Io { path: path.to_path_buf(), source };
        let destination = follow_symlinks(path).map_err(into_error)?;
        self.write_atomically(&destination).map_err(into_error)?;
        info!(n_points = self.metadata.num_datapoints, "written");
        Ok(())
    }

    fn write_atomically(&self, destination: &Path) -> io::Result<()> {
        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Dropping the temporary file on any error path removes it.
        let mut file = NamedTempFile::new_in(directory)?;
        let mut writer = BufWriter::new(file.as_file_mut());
        self.to_writer_pretty(&mut writer)?;
        writer.write_all(b"\n")?;
        writer.into_inner().map_err(IntoInnerError::into_error)?.sync_all()?;
        file.persist(destination)?;
        Ok(())
    }
}

fn follow_symlinks(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(error) => Err(error),
    }
}

/// Build the export document and, if a destination is given, write it there.
pub fn build_export(
    run: &SimulationRun<'_>,
    destination: Option<&Path>,
) -> Result<ExportDocument, ExportError> {
    let document = ExportDocument::try_from_run(run)?;
    if let Some(destination) = destination {
        document.write_to(destination)?;
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::{
        core::run::tests::hourly_timestamps,
        quantity::{
            energy::KilowattHours,
            power::Kilowatts,
            rate::KilowattHourRate,
            ratio::Ratio,
        },
    };

    struct Fixture {
        timestamps: Vec<DateTime<FixedOffset>>,
        consumption: Vec<f64>,
        solar_generation: Vec<f64>,
        battery_soc: Vec<f64>,
        grid_power: Vec<f64>,
        spot_price: Vec<f64>,
    }

    impl Fixture {
        fn three_hours() -> Self {
            Self {
                timestamps: hourly_timestamps(3),
                consumption: vec![1.0, 1.0, 1.0],
                solar_generation: vec![0.5, 0.0, 2.0],
                battery_soc: vec![50.0, 50.0, 50.0],
                grid_power: vec![0.5, 1.0, -1.0],
                spot_price: vec![1.0, 1.2, 0.8],
            }
        }

        fn day() -> Self {
            let hours = 0..24_u32;
            Self {
                timestamps: hourly_timestamps(24),
                consumption: hours.clone().map(|hour| 0.4 + 0.05 * f64::from(hour)).collect(),
                solar_generation: hours
                    .clone()
                    .map(|hour| if (7..19).contains(&hour) { 0.37 * f64::from(hour - 6) } else { 0.0 })
                    .collect(),
                battery_soc: hours.clone().map(|hour| 20.0 + 2.5 * f64::from(hour)).collect(),
                grid_power: hours.clone().map(|hour| 1.3 - 0.11 * f64::from(hour)).collect(),
                spot_price: hours.map(|hour| 0.9 + 0.017 * f64::from(hour % 7)).collect(),
            }
        }

        fn run(&self) -> SimulationRun<'_> {
            SimulationRun::builder()
                .timestamps(&self.timestamps)
                .consumption(&self.consumption)
                .solar_generation(&self.solar_generation)
                .battery_soc(&self.battery_soc)
                .grid_power(&self.grid_power)
                .spot_price(&self.spot_price)
                .build()
        }
    }

    #[test]
    fn test_three_hours() -> Result {
        let fixture = Fixture::three_hours();
        let document = ExportDocument::try_from_run(&fixture.run())?;

        assert_eq!(document.metadata.num_datapoints, 3);
        assert_eq!(document.metadata.start_time, "2024-03-20T00:00:00+01:00");
        assert_eq!(document.metadata.end_time, "2024-03-20T02:00:00+01:00");
        assert_eq!(document.timeseries.battery.power, [0.0, 0.0, 0.0]);
        assert_eq!(document.summary.total_consumption, KilowattHours::from(3.0));
        assert_eq!(document.summary.total_solar_generation, KilowattHours::from(2.5));
        assert_eq!(document.summary.max_grid_power, Kilowatts::from(1.0));
        assert_eq!(document.summary.average_spot_price, KilowattHourRate::from(1.0));
        assert_eq!(document.summary.self_consumption_ratio, Ratio::from(0.6));
        Ok(())
    }

    #[test]
    fn test_all_series_have_datapoint_count() -> Result {
        let fixture = Fixture::day();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        let n = document.metadata.num_datapoints;
        assert_eq!(n, 24);
        let timeseries = &document.timeseries;
        assert_eq!(timeseries.timestamps.len(), n);
        assert_eq!(timeseries.consumption.len(), n);
        assert_eq!(timeseries.solar_generation.len(), n);
        assert_eq!(timeseries.battery.soc.len(), n);
        assert_eq!(timeseries.battery.power.len(), n);
        assert_eq!(timeseries.grid_power.len(), n);
        assert_eq!(timeseries.spot_prices.len(), n);
        Ok(())
    }

    #[test]
    fn test_raw_series_keep_full_precision() -> Result {
        let fixture = Fixture::day();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        assert_eq!(document.timeseries.consumption, fixture.consumption);
        assert_eq!(document.timeseries.spot_prices, fixture.spot_price);
        for i in 0..24 {
            assert_eq!(
                document.timeseries.battery.power[i],
                fixture.consumption[i] - fixture.grid_power[i] - fixture.solar_generation[i],
            );
        }
        Ok(())
    }

    #[test]
    fn test_mismatch_produces_no_document() {
        let mut fixture = Fixture::day();
        fixture.consumption.pop();
        let error = ExportDocument::try_from_run(&fixture.run()).unwrap_err();
        assert_eq!(
            error,
            ShapeError::LengthMismatch { series: "consumption", expected: 24, actual: 23 },
        );
    }

    #[test]
    fn test_mismatch_produces_no_file() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        let mut fixture = Fixture::three_hours();
        fixture.spot_price.push(1.0);

        let error = build_export(&fixture.run(), Some(&path)).unwrap_err();
        assert!(matches!(error, ExportError::Shape(ShapeError::LengthMismatch { .. })));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_layout() -> Result {
        let fixture = Fixture::three_hours();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        let mut buffer = Vec::new();
        document.to_writer_pretty(&mut buffer)?;
        let text = String::from_utf8(buffer)?;
        assert!(text.starts_with("{\n    \"metadata\": {\n        \"start_time\""));

        let value: Value = serde_json::from_str(&text)?;
        let keys: Vec<&str> =
            value.as_object().context("not an object")?.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        for key in ["metadata", "timeseries", "summary"] {
            assert!(keys.contains(&key), "missing `{key}`");
        }
        assert_eq!(value["metadata"]["num_datapoints"], 3);
        assert_eq!(value["timeseries"]["timestamps"][1], "2024-03-20T01:00:00+01:00");
        assert_eq!(value["timeseries"]["battery"]["soc"][0], 50.0);
        assert_eq!(value["timeseries"]["battery"]["power"][2], 0.0);
        assert_eq!(value["timeseries"]["spot_prices"][1], 1.2);
        assert_eq!(value["summary"]["self_consumption_ratio"], 0.6);
        assert_eq!(value["summary"]["total_solar_generation"], 2.5);
        Ok(())
    }

    #[test]
    fn test_round_trip_summary_is_stable() -> Result {
        let fixture = Fixture::day();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        let mut buffer = Vec::new();
        document.to_writer_pretty(&mut buffer)?;

        let parsed: ExportDocument = serde_json::from_slice(&buffer)?;
        assert_eq!(parsed, document);
        assert_eq!(parsed.timeseries.summarize(), document.summary);
        Ok(())
    }

    #[test]
    fn test_summary_has_two_decimals_in_json() -> Result {
        let fixture = Fixture::day();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        let value = serde_json::to_value(&document)?;
        for (key, number) in value["summary"].as_object().context("not an object")? {
            let number = number.as_f64().context("not a number")?;
            let scaled = number * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "`{key}` = {number}");
        }
        Ok(())
    }

    #[test]
    fn test_utc_timestamps() -> Result {
        let mut fixture = Fixture::three_hours();
        fixture.timestamps = fixture
            .timestamps
            .iter()
            .map(|timestamp| timestamp.with_timezone(&FixedOffset::east_opt(0).unwrap()))
            .collect();
        let document = ExportDocument::try_from_run(&fixture.run())?;
        assert_eq!(document.metadata.start_time, "2024-03-19T23:00:00Z");
        Ok(())
    }

    #[test]
    fn test_write_to() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        let fixture = Fixture::three_hours();

        let document = build_export(&fixture.run(), Some(&path))?;
        let written: ExportDocument = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(written, document);
        assert_eq!(fs::read_dir(directory.path())?.count(), 1, "the temporary file must be gone");
        Ok(())
    }

    #[test]
    fn test_write_to_overwrites() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        fs::write(&path, "stale")?;
        let fixture = Fixture::three_hours();

        build_export(&fixture.run(), Some(&path))?;
        assert!(fs::read_to_string(&path)?.starts_with('{'));
        Ok(())
    }

    #[test]
    fn test_write_to_missing_directory() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("missing").join("export.json");
        let fixture = Fixture::three_hours();

        let error = build_export(&fixture.run(), Some(&path)).unwrap_err();
        match error {
            ExportError::Io { path: error_path, source } => {
                assert_eq!(error_path, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            ExportError::Shape(_) => bail!("unexpected shape error"),
        }
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_write_to_directory_fails() -> Result {
        let directory = tempfile::tempdir()?;
        let fixture = Fixture::three_hours();
        let document = ExportDocument::try_from_run(&fixture.run())?;

        // Renaming a file over a non-empty directory fails.
        let path = directory.path().join("occupied");
        fs::create_dir(&path)?;
        fs::write(path.join("file"), "")?;
        assert!(matches!(document.write_to(&path), Err(ExportError::Io { .. })));
        assert_eq!(fs::read_dir(directory.path())?.count(), 1, "the temporary file must be gone");
        Ok(())
    }

    #[test]
    fn test_write_to_keeps_neighbours() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        let neighbour = directory.path().join(".export.json.tmp");
        fs::write(&neighbour, "keep")?;
        let fixture = Fixture::three_hours();

        build_export(&fixture.run(), Some(&path))?;
        assert_eq!(fs::read_to_string(&neighbour)?, "keep");
        assert_eq!(fs::read_dir(directory.path())?.count(), 2);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_write_to_follows_symlink() -> Result {
        let directory = tempfile::tempdir()?;
        let target = directory.path().join("target.json");
        let link = directory.path().join("link.json");
        fs::write(&target, "stale")?;
        std::os::unix::fs::symlink(&target, &link)?;
        let fixture = Fixture::three_hours();

        let document = build_export(&fixture.run(), Some(&link))?;
        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
        let written: ExportDocument = serde_json::from_slice(&fs::read(&target)?)?;
        assert_eq!(written, document);
        Ok(())
    }

    #[test]
    fn test_written_values_keep_full_precision() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        let mut fixture = Fixture::three_hours();
        fixture.consumption = vec![0.929_590_366_316_450_5, 1.0, 1.0];
        fixture.spot_price = vec![0.929_590_366_316_450_5, 0.1, 0.7];

        let document = build_export(&fixture.run(), Some(&path))?;
        let parsed: ExportDocument = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(parsed, document);
        assert_eq!(parsed.timeseries.consumption, fixture.consumption);
        assert_eq!(parsed.timeseries.summarize(), document.summary);
        Ok(())
    }

    #[test]
    fn test_battery_power_overflow() {
        let mut fixture = Fixture::three_hours();
        fixture.consumption[1] = f64::MAX;
        fixture.grid_power[1] = -f64::MAX;
        assert_eq!(
            ExportDocument::try_from_run(&fixture.run()),
            Err(ShapeError::Overflow { quantity: "battery.power" }),
        );
    }

    #[test]
    fn test_summary_overflow() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("export.json");
        let mut fixture = Fixture::three_hours();
        fixture.solar_generation = vec![f64::MAX, f64::MAX, 0.0];
        fixture.grid_power = vec![0.0, 0.0, 0.0];
        fixture.consumption = vec![f64::MAX, f64::MAX, 0.0];

        let error = build_export(&fixture.run(), Some(&path)).unwrap_err();
        assert!(matches!(
            error,
            ExportError::Shape(ShapeError::Overflow { quantity: "total_consumption" }),
        ));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_without_destination() -> Result {
        let fixture = Fixture::three_hours();
        let document = build_export(&fixture.run(), None)?;
        assert_eq!(document.metadata.num_datapoints, 3);
        Ok(())
    }
}
