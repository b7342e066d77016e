//! Reads the MNIST dataset from its IDX files.
//!
//! The files are looked up inside of a directory under their usual names, either raw or gzip
//! compressed with a `.gz` suffix. Images are halved to 14x14 when loaded through **load**, since
//! that is the resolution the digit networks are built for.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::Image;
use crate::types::NetworkError;

const IMAGES_MAGIC_NUMBER: u32 = 2051;
const LABELS_MAGIC_NUMBER: u32 = 2049;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which of the two MNIST sets to load.
pub enum Split {
    /// The 60,000 training samples
    Training,
    /// The 10,000 test samples
    Test,
}

impl Split {
    fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            Split::Training => ("train-images.idx3-ubyte", "train-labels.idx1-ubyte"),
            Split::Test => ("t10k-images.idx3-ubyte", "t10k-labels.idx1-ubyte"),
        }
    }
}

#[derive(Debug, Clone)]
/// Images paired with their labels, in file order.
pub struct Dataset {
    /// The images, at whatever resolution they were loaded with.
    pub images: Vec<Image>,
    /// The digit each image shows, in `[0, 9]`.
    pub labels: Vec<u8>,
}

fn open(path: &Path) -> Result<Box<dyn Read>, NetworkError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => NetworkError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => NetworkError::Io(err),
    })?;

    let reader = BufReader::new(file);
    if path.extension().map_or(false, |extension| extension == "gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

fn read_exact(reader: &mut dyn Read, buffer: &mut [u8], what: &str) -> Result<(), NetworkError> {
    reader.read_exact(buffer).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => NetworkError::FormatError {
            reason: format!("the file ended before all of the {} could be read", what),
        },
        _ => NetworkError::Io(err),
    })
}

fn read_u32(reader: &mut dyn Read) -> Result<u32, NetworkError> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, "header")?;
    Ok(u32::from_be_bytes(bytes))
}

fn expect_magic_number(reader: &mut dyn Read, expected: u32) -> Result<(), NetworkError> {
    let magic_number = read_u32(reader)?;
    if magic_number != expected {
        return Err(NetworkError::FormatError {
            reason: format!(
                "expected the magic number {} but found {}",
                expected, magic_number
            ),
        });
    }

    Ok(())
}

/// Reads exactly **count** bytes without reserving them up front, failing with a FormatError if
/// the file ends first.
fn read_bytes(reader: &mut dyn Read, count: usize, what: &str) -> Result<Vec<u8>, NetworkError> {
    let mut bytes = Vec::new();
    Read::take(&mut *reader, count as u64).read_to_end(&mut bytes)?;

    if bytes.len() != count {
        return Err(NetworkError::FormatError {
            reason: format!("the file ended before all of the {} could be read", what),
        });
    }

    Ok(bytes)
}

/// Reads every image of an IDX3 file at its full resolution.
pub fn read_images<P: AsRef<Path>>(path: P) -> Result<Vec<Image>, NetworkError> {
    let mut reader = open(path.as_ref())?;

    expect_magic_number(&mut reader, IMAGES_MAGIC_NUMBER)?;
    let images_amount = read_u32(&mut reader)? as usize;
    let height = read_u32(&mut reader)? as usize;
    let width = read_u32(&mut reader)? as usize;

    let image_size = width
        .checked_mul(height)
        .filter(|size| *size > 0)
        .ok_or_else(|| NetworkError::FormatError {
            reason: format!("invalid image dimensions {}x{}", width, height),
        })?;

    let mut images = Vec::new();
    for _ in 0..images_amount {
        let pixels = read_bytes(&mut reader, image_size, "images")?;
        images.push(Image::new(width, height, pixels)?);
    }

    Ok(images)
}

/// Reads every label of an IDX1 file.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, NetworkError> {
    let mut reader = open(path.as_ref())?;

    expect_magic_number(&mut reader, LABELS_MAGIC_NUMBER)?;
    let labels_amount = read_u32(&mut reader)? as usize;

    read_bytes(&mut reader, labels_amount, "labels")
}

/// Finds **name** inside of **directory**, preferring the raw file over a gzipped one.
fn locate(directory: &Path, name: &str) -> Result<PathBuf, NetworkError> {
    let raw = directory.join(name);
    if raw.exists() {
        return Ok(raw);
    }

    let compressed = directory.join(format!("{}.gz", name));
    if compressed.exists() {
        return Ok(compressed);
    }

    Err(NetworkError::FileNotFound { path: raw })
}

/// Loads one of the MNIST splits from **directory**, halving the resolution of every image.
///
/// Fails with a LengthMismatch if the images and labels files don't have the same amount of
/// samples.
pub fn load<P: AsRef<Path>>(directory: P, split: Split) -> Result<Dataset, NetworkError> {
    let (images_name, labels_name) = split.file_names();
    let directory = directory.as_ref();

    let images = read_images(locate(directory, images_name)?)?;
    let labels = read_labels(locate(directory, labels_name)?)?;

    if images.len() != labels.len() {
        return Err(NetworkError::LengthMismatch {
            images: images.len(),
            labels: labels.len(),
        });
    }

    Ok(Dataset {
        images: images.iter().map(Image::reduce_resolution).collect(),
        labels,
    })
}
