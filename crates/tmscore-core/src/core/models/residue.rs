use super::atom::{Atom, MARKER_ATOM};
use nalgebra::Point3;
use phf::phf_map;

/// Three-letter residue name to one-letter amino-acid code.
static ONE_LETTER_CODES: phf::Map<&'static str, char> = phf_map! {
    "ALA" => 'A',
    "ARG" => 'R',
    "ASN" => 'N',
    "ASP" => 'D',
    "CYS" => 'C',
    "GLN" => 'Q',
    "GLU" => 'E',
    "GLY" => 'G',
    "HIS" => 'H',
    "ILE" => 'I',
    "LEU" => 'L',
    "LYS" => 'K',
    "MET" => 'M',
    "PHE" => 'F',
    "PRO" => 'P',
    "SER" => 'S',
    "THR" => 'T',
    "TRP" => 'W',
    "TYR" => 'Y',
    "VAL" => 'V',
};

/// A residue in source-file order, holding its atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Residue sequence number from the source file.
    pub id: isize,
    /// Name of the residue (e.g., "ALA", "GLY").
    pub name: String,
    atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(id: isize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Position of the first atom with the given name, if any.
    pub fn atom_position(&self, name: &str) -> Option<Point3<f64>> {
        self.atoms.iter().find(|a| a.name == name).map(|a| a.position)
    }

    /// Position of the designated backbone marker atom ("CA"), if present.
    pub fn marker_position(&self) -> Option<Point3<f64>> {
        self.atom_position(MARKER_ATOM)
    }

    /// One-letter amino-acid code, or `None` for non-standard residues.
    pub fn one_letter_code(&self) -> Option<char> {
        ONE_LETTER_CODES.get(self.name.as_str()).copied()
    }
}
