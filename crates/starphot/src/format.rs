//! Fixed-column text output of growth curves.
//!
//! Downstream tools parse these tables by column position, so the widths and
//! precisions here must not change.

use std::io::{self, Write};

use starphot_core::{GrowthCurve, PhotometryRecord};

/// Column header matching [`format_record`].
pub const TABLE_HEADER: &str = " Radius       X       Y       S       I    SkyB Magnitude";

/// One table row: `Radius X Y S I SkyB Magnitude`.
pub fn format_record(rec: &PhotometryRecord) -> String {
    format!(
        "{:7.0} {:7.4} {:7.4} {:7.4} {:7.4} {:7.2} {:7.5}",
        rec.radius,
        rec.centroid_x,
        rec.centroid_y,
        rec.raw_sum,
        rec.net_flux,
        rec.sky_background,
        rec.magnitude
    )
}

/// Write the header followed by one row per aperture.
pub fn write_growth_curve<W: Write>(out: &mut W, curve: &GrowthCurve) -> io::Result<()> {
    writeln!(out, "{TABLE_HEADER}")?;
    for rec in &curve.records {
        writeln!(out, "{}", format_record(rec))?;
    }
    Ok(())
}
