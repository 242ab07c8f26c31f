use nalgebra::Point3;

/// Name of the backbone atom used as a residue's representative position.
pub const MARKER_ATOM: &str = "CA";

/// An atom parsed from a structure file.
///
/// Only the fields superposition needs are kept: the atom name (for marker
/// lookup) and its coordinates in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(name: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}
