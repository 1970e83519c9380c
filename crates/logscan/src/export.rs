use std::path::{Path, PathBuf};

use colored::Colorize;
use logscan_core::export::{format_flight_time, generate_csv, sample_entries};
use logscan_core::logbook::FlightLogEntry;
use logscan_core::validate::validate_entries;
use prettytable::row;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ExportOptions {
    /// Entries JSON file, as edited during review
    #[arg(value_name = "ENTRIES")]
    pub entries: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "logbook-export.csv")]
    pub output: PathBuf,

    /// Print the CSV to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(options: ExportOptions, global: crate::Global) -> Result<()> {
    let contents = std::fs::read_to_string(&options.entries)
        .wrap_err_with(|| f!("failed to read {}", options.entries.display()))?;
    let entries: Vec<FlightLogEntry> =
        serde_json::from_str(&contents).map_err(|e| eyre!("Invalid entries JSON: {}", e))?;

    if global.verbose {
        println!("Validating {} entries...", entries.len());
    }

    if options.stdout {
        println!("{}", validated_csv(&entries)?);
        return Ok(());
    }

    write_validated_csv(&entries, &options.output)
}

pub fn run_sample() -> Result<()> {
    println!("{}", generate_csv(&sample_entries()));
    Ok(())
}

/// Validate then render. On failure the full message batch is printed so
/// the user can fix everything in one review pass; nothing is written.
fn validated_csv(entries: &[FlightLogEntry]) -> Result<String> {
    let report = validate_entries(entries);
    if !report.valid {
        for error in &report.errors {
            eprintln!("{}", error.as_str().red());
        }
        return Err(eyre!(
            "validation failed with {} error(s)",
            report.errors.len()
        ));
    }

    Ok(generate_csv(entries))
}

pub fn write_validated_csv(entries: &[FlightLogEntry], output: &Path) -> Result<()> {
    let csv = validated_csv(entries)?;
    std::fs::write(output, &csv).wrap_err_with(|| f!("failed to write {}", output.display()))?;

    println!("{} {}", "Exported".green(), output.display());
    Ok(())
}

/// Render entries as a table, or as pretty JSON with `--json`.
pub fn print_entries(entries: &[FlightLogEntry], json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(entries)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{rendered}");
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(row![
        "#", "Date", "Aircraft", "Type", "Route", "Total", "PIC", "Dual", "Ldg"
    ]);
    for (index, entry) in entries.iter().enumerate() {
        table.add_row(row![
            index + 1,
            entry.date,
            entry.aircraft_id,
            entry.aircraft_type,
            entry.route,
            format_flight_time(entry.total_time),
            format_flight_time(entry.pic_time),
            format_flight_time(entry.dual_time),
            entry.landings,
        ]);
    }
    table.printstd();

    Ok(())
}
