use crate::core::io::pdb::PdbError;
use crate::engine::minimizer::MinimizerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unrecognised matching mode '{0}' (expected 'index' or 'alignment')")]
    InvalidMode(String),

    #[error("Failed to read structure '{path}': {source}", path = path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: PdbError,
    },

    #[error("Chain '{chain}' not found in '{path}'", path = path.display())]
    ChainNotFound { path: PathBuf, chain: char },

    #[error("No matched marker atoms between the two structures")]
    EmptyCorrespondence,

    #[error("Minimisation failed: {source}")]
    Minimizer {
        #[from]
        source: MinimizerError,
    },

    #[error("Cannot write a transformed copy: scorer was not built from a source file")]
    NoSourceFile,

    #[error("Failed to write transformed structure: {0}")]
    Write(#[source] PdbError),
}
