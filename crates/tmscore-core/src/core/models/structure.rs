use super::residue::Residue;

/// A single chain: residues in native file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: char,
    residues: Vec<Residue>,
}

impl Chain {
    pub fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    pub fn add_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Mutable access to the most recently added residue, if any.
    pub(crate) fn last_residue_mut(&mut self) -> Option<&mut Residue> {
        self.residues.last_mut()
    }

    /// One-letter peptide sequence projection.
    ///
    /// Residues without a standard one-letter code (waters, ligands,
    /// modified residues) are skipped, matching a peptide-builder style
    /// projection rather than a strict per-residue mapping.
    pub fn sequence(&self) -> String {
        self.residues
            .iter()
            .filter_map(|r| r.one_letter_code())
            .collect()
    }
}

/// A parsed structure: chains in native file order.
///
/// Read-only to the superposition engine; coordinates are never edited in
/// place, the writer produces a transformed copy of the source file instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    chains: Vec<Chain>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, id: char) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id == id)
    }

    pub(crate) fn chain_mut_or_insert(&mut self, id: char) -> &mut Chain {
        if let Some(pos) = self.chains.iter().position(|c| c.id == id) {
            &mut self.chains[pos]
        } else {
            self.chains.push(Chain::new(id));
            self.chains.last_mut().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn residue(id: isize, name: &str) -> Residue {
        let mut r = Residue::new(id, name);
        r.add_atom(Atom::new("CA", Point3::new(id as f64, 0.0, 0.0)));
        r
    }

    #[test]
    fn sequence_projection_skips_non_standard_residues() {
        let mut chain = Chain::new('A');
        chain.add_residue(residue(1, "GLY"));
        chain.add_residue(residue(2, "HOH"));
        chain.add_residue(residue(3, "ALA"));
        chain.add_residue(residue(4, "TRP"));

        assert_eq!(chain.sequence(), "GAW");
    }

    #[test]
    fn chain_lookup_by_id() {
        let mut structure = Structure::new();
        structure.chain_mut_or_insert('A').add_residue(residue(1, "GLY"));
        structure.chain_mut_or_insert('B').add_residue(residue(1, "ALA"));

        assert_eq!(structure.chains().len(), 2);
        assert!(structure.chain('B').is_some());
        assert!(structure.chain('C').is_none());
    }

    #[test]
    fn chain_mut_or_insert_reuses_existing_chain() {
        let mut structure = Structure::new();
        structure.chain_mut_or_insert('A').add_residue(residue(1, "GLY"));
        structure.chain_mut_or_insert('A').add_residue(residue(2, "ALA"));

        assert_eq!(structure.chains().len(), 1);
        assert_eq!(structure.chain('A').unwrap().residues().len(), 2);
    }
}
