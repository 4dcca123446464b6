//! Mesh file I/O.
//!
//! Meshes are stored as plain-text element records (see [`records`]). The
//! path-based helpers wrap the reader and writer with file handling and
//! attach the path to parse errors.
//!
//! # Usage
//!
//! ```no_run
//! use qmorph::io::{load, save};
//!
//! let mesh = load("domain.txt").unwrap();
//! save(&mesh, "copy.txt").unwrap();
//! ```

pub mod records;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_records, Mesh};

pub use records::{read_records, write_records};

/// Load a mesh from a record file.
///
/// # Errors
/// Returns [`MeshError::Io`] if the file cannot be opened and
/// [`MeshError::LoadError`] if its contents do not form a valid mesh.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let attach = |e: MeshError| match e {
        MeshError::Io(_) => e,
        other => MeshError::LoadError {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    };

    let records = read_records(BufReader::new(file)).map_err(attach)?;
    let mesh = build_from_records(&records).map_err(attach)?;
    log::info!(
        "loaded {}: {} elements, {} nodes",
        path.display(),
        mesh.num_elements(),
        mesh.num_nodes()
    );
    Ok(mesh)
}

/// Save a mesh as a record file.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_records(mesh, BufWriter::new(file))?;
    log::info!("wrote {} elements to {}", mesh.num_elements(), path.display());
    Ok(())
}
