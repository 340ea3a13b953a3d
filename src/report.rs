//! Console report of a finished run.

use crate::algorithm::{KMeansResult, Termination};
use ndarray::ArrayView2;
use std::io::{self, Write};

/// Write the iteration the run stopped at, then every cluster with its
/// member points and final centroid. Ids are shown 1-based.
///
/// A declined run writes nothing.
pub fn write_report<W: Write>(
    out: &mut W,
    result: &KMeansResult,
    data: &ArrayView2<f64>,
) -> io::Result<()> {
    if result.termination == Termination::Declined {
        return Ok(());
    }

    writeln!(out, "Break in iteration {}\n", result.n_iterations)?;

    for cluster in &result.clusters {
        writeln!(out, "Cluster {}", cluster.id() + 1)?;
        for &point in cluster.members() {
            write!(out, "Point {}: ", point + 1)?;
            for &value in data.row(point) {
                write!(out, "{} ", format_value(value))?;
            }
            writeln!(out)?;
        }

        write!(out, "Cluster values: ")?;
        for &value in cluster.centroid() {
            write!(out, "{} ", format_value(value))?;
        }
        writeln!(out, "\n")?;
    }

    Ok(())
}

/// Format with six significant digits, switching to exponent notation for
/// very large or small magnitudes and dropping trailing zeros, the way a
/// default-configured C++ output stream prints a double.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Exponent after rounding to six significant digits
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
