use crate::core::models::residue::Residue;
use crate::core::models::structure::Chain;
use crate::engine::error::EngineError;
use bio::alignment::AlignmentOperation;
use bio::alignment::pairwise::Aligner;
use nalgebra::{Matrix4xX, Vector4};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

// Alignment parameters taken from the PconsFold renumbering script
// (match 2, mismatch -1, gap-open -0.5, gap-extend -0.1), scaled by 10 to
// the integer scores the aligner expects. The aligner charges a length-k
// gap `open + k * extend` while the reference charged `open` for the first
// position and `extend` for each further one, so one extend step is folded
// into the open cost to keep the schedules identical.
const MATCH_SCORE: i32 = 20;
const MISMATCH_SCORE: i32 = -10;
const GAP_OPEN: i32 = -4;
const GAP_EXTEND: i32 = -1;

/// How atom correspondence between the two structures is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Match residues sharing the same sequence number.
    Index,
    /// Match residues through a global pairwise sequence alignment.
    Alignment,
}

impl FromStr for MatchMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "index" => Ok(MatchMode::Index),
            "align" | "alignment" => Ok(MatchMode::Alignment),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}

/// Matched marker-atom coordinates for a pair of chains.
///
/// Both matrices are homogeneous, shaped (4, N_matched): rows x, y, z and a
/// constant 1, columns in matching order across the pair.
///
/// `n` is the reference count used to derive `d0` and to normalize scores.
/// It deliberately is NOT the matched column count: in index mode it is the
/// size of structure 1's full residue-id set, in alignment mode the full
/// length of sequence 1. This mirrors the original TM-score tooling and
/// changes the metric's numeric scale; correcting it to the matched count
/// would silently change every reported score.
#[derive(Debug, Clone, PartialEq)]
pub struct Correspondence {
    pub coord1: Matrix4xX<f64>,
    pub coord2: Matrix4xX<f64>,
    pub n: usize,
}

impl Correspondence {
    /// Builds the correspondence for the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyCorrespondence`] when no marker atoms
    /// match between the two chains.
    pub fn build(mode: MatchMode, chain1: &Chain, chain2: &Chain) -> Result<Self, EngineError> {
        match mode {
            MatchMode::Index => Self::build_index(chain1, chain2),
            MatchMode::Alignment => Self::build_alignment(chain1, chain2),
        }
    }

    fn build_index(chain1: &Chain, chain2: &Chain) -> Result<Self, EngineError> {
        let ids1: HashSet<isize> = chain1.residues().iter().map(|r| r.id).collect();
        let ids2: HashSet<isize> = chain2.residues().iter().map(|r| r.id).collect();
        let common: HashSet<isize> = ids1.intersection(&ids2).copied().collect();

        let columns1 = stack_by_id(chain1, &common);
        let columns2 = stack_by_id(chain2, &common);
        debug!(
            matched = columns1.len(),
            reference_n = ids1.len(),
            "index-mode correspondence"
        );

        Self::from_columns(columns1, columns2, ids1.len())
    }

    fn build_alignment(chain1: &Chain, chain2: &Chain) -> Result<Self, EngineError> {
        let seq1 = chain1.sequence();
        let seq2 = chain2.sequence();

        let score = |a: u8, b: u8| if a == b { MATCH_SCORE } else { MISMATCH_SCORE };
        let mut aligner =
            Aligner::with_capacity(seq1.len(), seq2.len(), GAP_OPEN, GAP_EXTEND, score);
        let alignment = aligner.global(seq1.as_bytes(), seq2.as_bytes());

        // Walk the alignment once, collecting for each sequence the positions
        // that sit in a column where neither side has a gap.
        let mut matched1 = HashSet::new();
        let mut matched2 = HashSet::new();
        let (mut i, mut j) = (0usize, 0usize);
        for op in &alignment.operations {
            match op {
                AlignmentOperation::Match | AlignmentOperation::Subst => {
                    matched1.insert(i);
                    matched2.insert(j);
                    i += 1;
                    j += 1;
                }
                AlignmentOperation::Ins => i += 1,
                AlignmentOperation::Del => j += 1,
                AlignmentOperation::Xclip(len) => i += len,
                AlignmentOperation::Yclip(len) => j += len,
            }
        }
        debug!(
            matched = matched1.len(),
            reference_n = seq1.len(),
            score = alignment.score,
            "alignment-mode correspondence"
        );

        let columns1 = stack_by_sequence_position(chain1, &matched1);
        let columns2 = stack_by_sequence_position(chain2, &matched2);

        Self::from_columns(columns1, columns2, seq1.len())
    }

    fn from_columns(
        columns1: Vec<Vector4<f64>>,
        columns2: Vec<Vector4<f64>>,
        n: usize,
    ) -> Result<Self, EngineError> {
        if columns1.is_empty() || columns2.is_empty() {
            return Err(EngineError::EmptyCorrespondence);
        }
        // A shape mismatch means the builder itself is defective, not that
        // the input was unusual.
        assert_eq!(
            columns1.len(),
            columns2.len(),
            "matched coordinate sets must have identical shape"
        );

        Ok(Self {
            coord1: Matrix4xX::from_columns(&columns1),
            coord2: Matrix4xX::from_columns(&columns2),
            n,
        })
    }

    /// Number of matched atom pairs (columns of either matrix).
    pub fn matched_len(&self) -> usize {
        self.coord1.ncols()
    }
}

fn homogeneous(residue: &Residue) -> Option<Vector4<f64>> {
    residue
        .marker_position()
        .map(|p| Vector4::new(p.x, p.y, p.z, 1.0))
}

/// Marker coordinates of residues whose sequence number is in `ids`, in
/// native chain order.
fn stack_by_id(chain: &Chain, ids: &HashSet<isize>) -> Vec<Vector4<f64>> {
    chain
        .residues()
        .iter()
        .filter(|r| ids.contains(&r.id))
        .filter_map(homogeneous)
        .collect()
}

/// Marker coordinates of residues whose position in the chain's one-letter
/// sequence projection is in `positions`.
///
/// Positions count only residues that contribute to the sequence, so they
/// line up with the aligner's indices even when waters or ligands are
/// interleaved in the file.
fn stack_by_sequence_position(chain: &Chain, positions: &HashSet<usize>) -> Vec<Vector4<f64>> {
    let mut columns = Vec::with_capacity(positions.len());
    let mut position = 0usize;
    for residue in chain.residues() {
        if residue.one_letter_code().is_none() {
            continue;
        }
        if positions.contains(&position) {
            if let Some(column) = homogeneous(residue) {
                columns.push(column);
            }
        }
        position += 1;
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn chain_with(names_ids: &[(&str, isize)]) -> Chain {
        let mut chain = Chain::new('A');
        for (k, (name, id)) in names_ids.iter().enumerate() {
            let mut r = Residue::new(*id, name);
            r.add_atom(Atom::new("CA", Point3::new(k as f64, 2.0 * k as f64, -1.0)));
            chain.add_residue(r);
        }
        chain
    }

    #[test]
    fn mode_parsing_accepts_known_names_only() {
        assert_eq!(MatchMode::from_str("index").unwrap(), MatchMode::Index);
        assert_eq!(MatchMode::from_str("align").unwrap(), MatchMode::Alignment);
        assert_eq!(
            MatchMode::from_str("alignment").unwrap(),
            MatchMode::Alignment
        );
        assert!(matches!(
            MatchMode::from_str("fuzzy"),
            Err(EngineError::InvalidMode(_))
        ));
    }

    #[test]
    fn index_mode_keeps_common_ids_and_full_first_id_set_as_n() {
        let chain1 = chain_with(&[("GLY", 1), ("ALA", 2), ("SER", 3), ("TRP", 4)]);
        let chain2 = chain_with(&[("GLY", 2), ("ALA", 3)]);

        let corr = Correspondence::build(MatchMode::Index, &chain1, &chain2).unwrap();
        assert_eq!(corr.coord1.shape(), (4, 2));
        assert_eq!(corr.coord2.shape(), (4, 2));
        // N is the size of structure 1's full id set, not the matched count.
        assert_eq!(corr.n, 4);
    }

    #[test]
    fn index_mode_skips_residues_without_marker_atoms() {
        // Residue 1 carries no CA in either chain; only residue 2 is stacked.
        let chain_without_first_marker = |ca: Point3<f64>| {
            let mut chain = Chain::new('A');
            let mut r1 = Residue::new(1, "GLY");
            r1.add_atom(Atom::new("N", Point3::new(0.0, 0.0, 0.0)));
            chain.add_residue(r1);
            let mut r2 = Residue::new(2, "ALA");
            r2.add_atom(Atom::new("CA", ca));
            chain.add_residue(r2);
            chain
        };
        let chain1 = chain_without_first_marker(Point3::new(1.0, 2.0, 3.0));
        let chain2 = chain_without_first_marker(Point3::new(5.0, 5.0, 5.0));

        let corr = Correspondence::build(MatchMode::Index, &chain1, &chain2).unwrap();
        assert_eq!(corr.coord1.shape(), (4, 1));
        assert_eq!(corr.coord2.shape(), (4, 1));
        assert_eq!(corr.coord2[(0, 0)], 5.0);
        // N still counts both ids of structure 1.
        assert_eq!(corr.n, 2);
    }

    #[test]
    fn affine_row_is_exactly_one() {
        let chain1 = chain_with(&[("GLY", 1), ("ALA", 2), ("SER", 3)]);
        let chain2 = chain_with(&[("GLY", 1), ("ALA", 2), ("SER", 3)]);

        let corr = Correspondence::build(MatchMode::Index, &chain1, &chain2).unwrap();
        for col in 0..corr.matched_len() {
            assert_eq!(corr.coord1[(3, col)], 1.0);
            assert_eq!(corr.coord2[(3, col)], 1.0);
        }
    }

    #[test]
    fn disjoint_id_sets_are_an_empty_correspondence() {
        let chain1 = chain_with(&[("GLY", 1), ("ALA", 2)]);
        let chain2 = chain_with(&[("GLY", 10), ("ALA", 11)]);
        assert!(matches!(
            Correspondence::build(MatchMode::Index, &chain1, &chain2),
            Err(EngineError::EmptyCorrespondence)
        ));
    }

    #[test]
    fn alignment_mode_excludes_inserted_region_from_both_sets() {
        // Sequence 1: GAWE. Sequence 2: GAKKWE (KK inserted after GA).
        let chain1 = chain_with(&[("GLY", 1), ("ALA", 2), ("TRP", 3), ("GLU", 4)]);
        let chain2 = chain_with(&[
            ("GLY", 1),
            ("ALA", 2),
            ("LYS", 3),
            ("LYS", 4),
            ("TRP", 5),
            ("GLU", 6),
        ]);

        let corr = Correspondence::build(MatchMode::Alignment, &chain1, &chain2).unwrap();
        // Common ungapped length is 4; N is the full length of sequence 1.
        assert_eq!(corr.matched_len(), 4);
        assert_eq!(corr.coord1.shape(), corr.coord2.shape());
        assert_eq!(corr.n, 4);
    }

    #[test]
    fn alignment_mode_ignores_non_peptide_residues_when_counting_positions() {
        let mut chain1 = chain_with(&[("GLY", 1), ("ALA", 2), ("TRP", 3)]);
        let chain2 = chain_with(&[("GLY", 1), ("ALA", 2), ("TRP", 3)]);
        // A water in the chain must not shift alignment positions.
        let mut water = Residue::new(100, "HOH");
        water.add_atom(Atom::new("O", Point3::new(9.0, 9.0, 9.0)));
        chain1.add_residue(water);

        let corr = Correspondence::build(MatchMode::Alignment, &chain1, &chain2).unwrap();
        assert_eq!(corr.matched_len(), 3);
    }

    #[test]
    fn gap_costs_charge_open_plus_one_extend_per_position() {
        let score = |a: u8, b: u8| if a == b { MATCH_SCORE } else { MISMATCH_SCORE };
        let mut aligner = Aligner::with_capacity(4, 2, GAP_OPEN, GAP_EXTEND, score);

        // A length-1 gap costs -5, matching the reference -0.5 scaled by 10.
        let alignment = aligner.global(b"GAW", b"GW");
        assert_eq!(alignment.score, 2 * MATCH_SCORE + GAP_OPEN + GAP_EXTEND);

        // Each further gap position adds the -0.1 extension (scaled).
        let alignment = aligner.global(b"GAAW", b"GW");
        assert_eq!(alignment.score, 2 * MATCH_SCORE + GAP_OPEN + 2 * GAP_EXTEND);
    }

    #[test]
    fn alignment_mode_of_identical_sequences_matches_every_residue() {
        let residues = [("GLY", 1), ("ALA", 2), ("SER", 3), ("TRP", 4), ("GLU", 5)];
        let chain1 = chain_with(&residues);
        let chain2 = chain_with(&residues);

        let corr = Correspondence::build(MatchMode::Alignment, &chain1, &chain2).unwrap();
        assert_eq!(corr.matched_len(), 5);
        assert_eq!(corr.n, 5);
        assert_eq!(corr.coord1, corr.coord2);
    }
}
