use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use nalgebra::{Matrix4, Point3, Vector4};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Transformed coordinate {value} on line {line} does not fit its 8-byte field")]
    CoordinateOverflow { line: usize, value: f64 },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("ATOM record is too short (must reach the z field, 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &[u8], start: usize, end: usize) -> &str {
    let raw = line.get(start..end).unwrap_or(&[]);
    std::str::from_utf8(raw).unwrap_or("").trim()
}

fn parse_coord(line: &[u8], line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let raw = slice_and_trim(line, start, end);
    raw.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: raw.into(),
        },
    })
}

fn is_atom_record(line: &[u8]) -> bool {
    slice_and_trim(line, 0, 6) == "ATOM"
}

/// PDB format: fixed-column `ATOM` records, everything else passed through
/// untouched by the transformed writer.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let record = line.as_bytes();
            let line_num = line_num + 1;

            if !is_atom_record(record) {
                continue;
            }
            if record.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let name = slice_and_trim(record, 12, 16);
            let res_name = slice_and_trim(record, 17, 20);
            let chain_id = record[21] as char;
            let res_id_str = slice_and_trim(record, 22, 26);
            let res_id: isize = res_id_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_id_str.into(),
                },
            })?;
            let x = parse_coord(record, line_num, 30, 38)?;
            let y = parse_coord(record, line_num, 38, 46)?;
            let z = parse_coord(record, line_num, 46, 54)?;

            let chain = structure.chain_mut_or_insert(chain_id);
            let starts_new_residue = chain
                .last_residue_mut()
                .map(|r| r.id != res_id)
                .unwrap_or(true);
            if starts_new_residue {
                chain.add_residue(Residue::new(res_id, res_name));
            }
            chain
                .last_residue_mut()
                .expect("residue pushed above")
                .add_atom(Atom::new(name, Point3::new(x, y, z)));
        }

        Ok(structure)
    }
}

/// Writes a copy of `source` with every `ATOM` record's coordinates replaced
/// by their image under `matrix`.
///
/// Non-atom lines and all line terminators pass through byte-for-byte, so
/// CRLF sources and files without a trailing newline survive a round trip.
/// The x/y/z fields occupy byte columns 31-38, 39-46 and 47-54; each
/// replacement is formatted to the same fixed 8-byte width so total line
/// length is preserved exactly.
pub fn write_transformed<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    output: Q,
    matrix: &Matrix4<f64>,
) -> Result<(), PdbError> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let mut raw = Vec::new();
    let mut line_num = 0usize;
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        line_num += 1;

        let body_len = if raw.ends_with(b"\r\n") {
            raw.len() - 2
        } else if raw.ends_with(b"\n") {
            raw.len() - 1
        } else {
            raw.len()
        };
        let (body, terminator) = raw.split_at(body_len);

        if !is_atom_record(body) {
            writer.write_all(&raw)?;
            continue;
        }
        if body.len() < 54 {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let x = parse_coord(body, line_num, 30, 38)?;
        let y = parse_coord(body, line_num, 38, 46)?;
        let z = parse_coord(body, line_num, 46, 54)?;

        let moved = matrix * Vector4::new(x, y, z, 1.0);
        let mut fields = String::with_capacity(24);
        for value in [moved.x, moved.y, moved.z] {
            let field = format!("{:>8.3}", value);
            if field.len() != 8 {
                return Err(PdbError::CoordinateOverflow {
                    line: line_num,
                    value,
                });
            }
            fields.push_str(&field);
        }

        writer.write_all(&body[..30])?;
        writer.write_all(fields.as_bytes())?;
        writer.write_all(&body[54..])?;
        writer.write_all(terminator)?;
    }

    writer.flush()?;
    Ok(())
}
