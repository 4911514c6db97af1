// crates/geotags-core/src/io.rs

//! File transport shared by configuration loading and store snapshots.

use crate::error::{GeoError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl CompressionMode {
    /// Gzip when the `compact` feature is enabled.
    pub fn preferred() -> Self {
        #[cfg(feature = "compact")]
        {
            CompressionMode::Gzip
        }
        #[cfg(not(feature = "compact"))]
        {
            CompressionMode::None
        }
    }
}

/// Opens a file, buffers it, and transparently decompresses gzip content.
/// Callers get a plain reader either way.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)
        .map_err(|e| GeoError::NotFound(format!("{}: {}", path.display(), e)))?;

    let mut reader = BufReader::new(file);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if !is_gzip {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(GeoError::Config(format!(
            "{} is gzipped but 'compact' is disabled",
            path.display()
        )))
    }
}

/// Writes any serializable value to disk with bincode.
///
/// The gzip trailer is written by an explicit `finish`, so a failed write is
/// reported instead of leaving a truncated file behind.
pub fn write_bincode<T: serde::Serialize>(
    path: &Path,
    value: &T,
    compression: CompressionMode,
) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                let mut encoder = GzEncoder::new(writer, Compression::default());
                bincode::serialize_into(&mut encoder, value)?;
                let mut writer = encoder.finish()?;
                writer.flush()?;
            }
            #[cfg(not(feature = "compact"))]
            {
                return Err(GeoError::Config(
                    "Gzip requested but 'compact' disabled".into(),
                ));
            }
        }
        CompressionMode::None => {
            bincode::serialize_into(&mut writer, value)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Reads a whole (possibly gzipped) file into memory.
pub fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut reader = open_stream(path)?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bincode_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.bin");
        write_bincode(&path, &vec![1u32, 2, 3], CompressionMode::None).unwrap();
        let data = read_all(&path).unwrap();
        let back: Vec<u32> = bincode::deserialize(&data).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[cfg(feature = "compact")]
    #[test]
    fn gzip_output_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packed.bin.gz");
        let value: Vec<u64> = (0..10_000).collect();
        write_bincode(&path, &value, CompressionMode::Gzip).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert!(raw.starts_with(&GZIP_MAGIC));
        // gzip trailer: last four bytes hold the uncompressed length
        let expected_len = bincode::serialize(&value).unwrap().len() as u32;
        let trailer: [u8; 4] = raw[raw.len() - 4..].try_into().unwrap();
        assert_eq!(u32::from_le_bytes(trailer), expected_len);

        let back: Vec<u64> = bincode::deserialize(&read_all(&path).unwrap()).unwrap();
        assert_eq!(back, value);
    }
}
