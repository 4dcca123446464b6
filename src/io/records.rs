//! The element record format.
//!
//! One element per line, its corners as comma-separated coordinates:
//! three pairs for a triangle, four for a quad. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # unit square
//! 0,0,1,0,0,1
//! 1,0,1,1,0,1
//! ```

use std::io::{BufRead, Write};

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::mesh::{to_records, ElementRecord, Mesh};

/// Parse every record from a reader.
///
/// # Errors
/// Returns [`MeshError::InvalidRecord`] with the 1-based line number when a
/// line has the wrong number of values or a value is not a finite number.
///
/// # Example
/// ```
/// use qmorph::io::read_records;
///
/// let input = "# square\n0,0,1,0,0,1\n\n1,0,1,1,0,1\n";
/// let records = read_records(input.as_bytes()).unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ElementRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        records.push(parse_record(i + 1, trimmed)?);
    }
    Ok(records)
}

fn parse_record(line: usize, text: &str) -> Result<ElementRecord> {
    let values = text
        .split(',')
        .map(|field| {
            let field = field.trim();
            match field.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                Ok(_) => Err(MeshError::record(line, format!("non-finite value '{field}'"))),
                Err(_) => Err(MeshError::record(line, format!("invalid number '{field}'"))),
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    let p = |i: usize| Point2::new(values[2 * i], values[2 * i + 1]);
    match values.len() {
        6 => Ok(ElementRecord::Triangle([p(0), p(1), p(2)])),
        8 => Ok(ElementRecord::Quad([p(0), p(1), p(2), p(3)])),
        n => Err(MeshError::record(
            line,
            format!("expected 6 or 8 values, found {n}"),
        )),
    }
}

/// Write one record line per element.
pub fn write_records<W: Write>(mesh: &Mesh, mut writer: W) -> Result<()> {
    for record in to_records(mesh) {
        let fields: Vec<String> = record
            .corners()
            .iter()
            .flat_map(|c| [c.x.to_string(), c.y.to_string()])
            .collect();
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}
