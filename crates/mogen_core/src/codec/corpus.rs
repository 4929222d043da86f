//! Whole-file NPZ corpus archive: one compressed zip holding, per sequence
//! id, the members `{id}/rots`, `{id}/trans`, `{id}/joint_positions`,
//! `{id}/fps` and `{id}/fname` (UTF-8 bytes). Loaded completely or not at
//! all; there is no streaming or partial read.

use crate::error::{MogenError, Result};
use log::info;
use ndarray as nd;
use ndarray_npy::{NpzReader, NpzWriter};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

/// One corpus record before split/id metadata is attached.
#[derive(Clone, Debug)]
pub struct CorpusRecord {
    pub rots: nd::Array2<f32>,
    pub trans: nd::Array2<f32>,
    pub joint_positions: nd::Array3<f32>,
    pub fps: f32,
    pub fname: String,
}

/// Read the whole corpus mapping from `path`.
pub fn read_corpus(path: &Path) -> Result<BTreeMap<String, CorpusRecord>> {
    let file = File::open(path).map_err(|e| corpus_err(path, &e))?;
    let mut npz = NpzReader::new(file).map_err(|e| corpus_err(path, &e))?;

    let mut ids = BTreeSet::new();
    for name in npz.names().map_err(|e| corpus_err(path, &e))? {
        let name = name.strip_suffix(".npy").unwrap_or(&name);
        match name.rsplit_once('/') {
            Some((id, _field)) => ids.insert(id.to_owned()),
            None => return Err(corpus_err(path, &format!("member {name} has no sequence id prefix"))),
        };
    }

    let mut corpus = BTreeMap::new();
    for id in ids {
        let rots: nd::Array2<f32> = npz.by_name(&format!("{id}/rots")).map_err(|e| corpus_err(path, &e))?;
        let trans: nd::Array2<f32> = npz.by_name(&format!("{id}/trans")).map_err(|e| corpus_err(path, &e))?;
        let joint_positions: nd::Array3<f32> = npz
            .by_name(&format!("{id}/joint_positions"))
            .map_err(|e| corpus_err(path, &e))?;
        let fps: nd::Array0<f32> = npz.by_name(&format!("{id}/fps")).map_err(|e| corpus_err(path, &e))?;
        let fname: nd::Array1<u8> = npz.by_name(&format!("{id}/fname")).map_err(|e| corpus_err(path, &e))?;
        let fname = String::from_utf8(fname.to_vec())
            .map_err(|_| corpus_err(path, &format!("sequence {id} carries a non-UTF-8 fname")))?;
        corpus.insert(
            id,
            CorpusRecord {
                rots,
                trans,
                joint_positions,
                fps: fps.into_scalar(),
                fname,
            },
        );
    }
    info!("loaded corpus with {} sequences from {}", corpus.len(), path.display());
    Ok(corpus)
}

/// Write the whole corpus mapping to `path`, compressed.
pub fn write_corpus(path: &Path, corpus: &BTreeMap<String, CorpusRecord>) -> Result<()> {
    let file = File::create(path).map_err(|e| corpus_err(path, &e))?;
    let mut npz = NpzWriter::new_compressed(file);
    for (id, record) in corpus {
        npz.add_array(format!("{id}/rots"), &record.rots).map_err(|e| corpus_err(path, &e))?;
        npz.add_array(format!("{id}/trans"), &record.trans).map_err(|e| corpus_err(path, &e))?;
        npz.add_array(format!("{id}/joint_positions"), &record.joint_positions)
            .map_err(|e| corpus_err(path, &e))?;
        npz.add_array(format!("{id}/fps"), &nd::Array0::<f32>::from_elem((), record.fps))
            .map_err(|e| corpus_err(path, &e))?;
        let fname_bytes = nd::Array1::from_vec(record.fname.as_bytes().to_vec());
        npz.add_array(format!("{id}/fname"), &fname_bytes).map_err(|e| corpus_err(path, &e))?;
    }
    npz.finish().map_err(|e| corpus_err(path, &e))?;
    Ok(())
}

fn corpus_err(path: &Path, e: &dyn std::fmt::Display) -> MogenError {
    MogenError::CorpusLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
