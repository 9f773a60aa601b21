//! The impls and functions
//!
use log::*;
use std::{env, fs, collections::HashMap, io::Write};
use chrono::{DateTime, Local, SecondsFormat};
use anyhow::{Result, Context};
use crate::utility::GridWriter;
use crate::{DEFAULT_HOSTS, DEFAULT_PORTS};

/// Returns the value of the switch if set, otherwise the value of the environment variable (which
/// can be set via `.env`), otherwise the default.
///
/// When the switch or the environment variable is used, it's recorded in `changed_options`,
/// so [dotenv_writer] can persist it.
fn set_option(
    option: &Option<String>,
    variable: &'static str,
    default: &str,
    changed_options: &mut HashMap<&str, String>,
) -> String
{
    match option {
        Some(value) => {
            info!("{} argument set: using: {}", variable, value);
            changed_options.insert(variable, value.to_string());
            value.to_string()
        },
        None => {
            match env::var(variable) {
                Ok(set_var) => {
                    info!("{} not set as argument: set via .env: {}", variable, set_var);
                    changed_options.insert(variable, set_var.to_owned());
                    set_var
                },
                Err(_e) => {
                    info!("{} not set: and not set via .env: using default: {}", variable, default);
                    default.to_string()
                },
            }
        },
    }
}

fn split_list(list: &str) -> Vec<String>
{
    list.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn set_hosts(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Vec<String>
{
    split_list(&set_option(option, "TOPSTAT_HOSTS", DEFAULT_HOSTS, changed_options))
}

pub fn set_ports(
    option: &Option<String>,
    changed_options: &mut HashMap<&str, String>,
) -> Vec<String>
{
    split_list(&set_option(option, "TOPSTAT_PORTS", DEFAULT_PORTS, changed_options))
}

/// With `--write-dotenv`, replace `.env` in the current directory with the hosts and ports that
/// were set by switch or environment, so the next run polls the same servers without switches.
///
/// Nothing is written when only defaults were used.
pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
) -> Result<()>
{
    if !write_dotenv || changed_options.is_empty() {
        return Ok(());
    }
    info!("Writing .env file");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(".env")
        .with_context(|| "Error writing .env file: .env")?;

    let mut variables: Vec<(&str, String)> = changed_options.into_iter().collect();
    variables.sort();
    for (variable, value) in variables {
        writeln!(file, "{}={}", variable, value)
            .with_context(|| format!("Error writing {} to .env", variable))?;
        info!("{}={}", variable, value);
    }
    Ok(())
}

/// The timestamp in the grid header and the stat line: `2006-01-02T15:04:05+01:00`, or with `Z` for UTC.
pub fn format_timestamp(
    timestamp: &DateTime<Local>,
) -> String
{
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a float with a fixed precision.
///
/// A division by zero upstream produces `NaN` or an infinity, these are rendered as `NaN`,
/// `+Inf` and `-Inf`.
pub fn format_float(
    value: f64,
    precision: usize,
) -> String
{
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0_f64 { "+Inf".to_string() } else { "-Inf".to_string() }
    } else {
        format!("{:.*}", precision, value)
    }
}

/// `numerator / denominator * 100` with one decimal and a `%` suffix.
pub fn format_percentage(
    numerator: f64,
    denominator: f64,
    precision: usize,
) -> String
{
    format!("{}%", format_float(numerator / denominator * 100_f64, precision))
}

fn format_units(
    amount: i64,
    base: f64,
    units: &[&str],
) -> String
{
    let mut result = amount as f64;
    let mut shifts = 0;
    while result.abs() >= base && shifts < units.len() - 1 {
        result /= base;
        shifts += 1;
    }
    if shifts == 0 {
        format!("{}{}", amount, units[0])
    } else {
        format!("{:.1}{}", result, units[shifts])
    }
}

/// An amount of bytes shown as bits, using powers of 1000.
pub fn format_bits(
    amount: i64,
) -> String
{
    format_units(amount.saturating_mul(8), 1000_f64, &["b", "k", "m", "g", "t"])
}

/// An amount of bytes, using powers of 1024.
pub fn format_byte_amount(
    amount: i64,
) -> String
{
    format_units(amount, 1024_f64, &["B", "K", "M", "G", "T"])
}

/// An amount of megabytes, using powers of 1024.
pub fn format_megabyte_amount(
    amount: i64,
) -> String
{
    format_byte_amount(amount.saturating_mul(1024 * 1024))
}

impl GridWriter {
    pub fn new(column_padding: usize) -> Self {
        GridWriter { column_padding, ..Default::default() }
    }
    pub fn write_cell<S: Into<String>>(
        &mut self,
        cell: S,
    )
    {
        self.current_row.push(cell.into());
    }
    pub fn write_cells<I, S>(
        &mut self,
        cells: I,
    )
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for cell in cells {
            self.write_cell(cell);
        }
    }
    pub fn end_row(&mut self)
    {
        let row = std::mem::take(&mut self.current_row);
        self.rows.push(row);
    }
    /// Aligns all rows, and returns them as a single string with a newline after every row.
    ///
    /// A row that is not ended with [GridWriter::end_row] is included too.
    pub fn flush(mut self) -> String
    {
        if !self.current_row.is_empty() {
            self.end_row();
        }

        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (column, cell) in row.iter().enumerate() {
                let length = cell.chars().count();
                match widths.get_mut(column) {
                    Some(width) => *width = (*width).max(length),
                    None => widths.push(length),
                }
            }
        }

        let mut output = String::new();
        for row in &self.rows {
            let mut line = String::new();
            for (column, cell) in row.iter().enumerate() {
                if column > 0 {
                    line.push_str(&" ".repeat(self.column_padding));
                }
                line.push_str(&format!("{:>width$}", cell, width = widths[column]));
            }
            output.push_str(line.trim_end());
            output.push('\n');
        }
        output
    }
}
