use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use giclass_common::{Error, Result};

/// Magic bytes at the start of every HDF5 file
const HDF5_SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

/// Attribute key carrying the input tensor shape in the embedded Keras config
const INPUT_SHAPE_KEY: &[u8] = b"\"batch_input_shape\"";

/// Chunk size for scanning the artifact
const SCAN_CHUNK: usize = 64 * 1024;

/// Upper bound on the serialized shape array, key to closing bracket
const SHAPE_MAX_LEN: usize = 256;

/// Declared input tensor shape; `None` marks the unconstrained batch dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputShape(pub Vec<Option<u64>>);

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, dim) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(size) => write!(f, "{size}")?,
                None => write!(f, "None")?,
            }
        }
        write!(f, ")")
    }
}

/// A trained classifier artifact on disk
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub input_shape: InputShape,
}

impl ModelArtifact {
    /// Open and probe the artifact at `path`.
    ///
    /// Verifies the HDF5 signature, then scans the embedded Keras model
    /// configuration for the declared input shape. A missing file surfaces as
    /// an IO error; a present-but-unusable file as `ModelLoadFailed`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let size_bytes = file.metadata()?.len();

        let mut signature = [0u8; 8];
        match file.read_exact(&mut signature) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Error::ModelLoadFailed(format!(
                    "{} is too short for an HDF5 signature",
                    path.display()
                )));
            }
            Err(err) => return Err(err.into()),
        }
        if signature != HDF5_SIGNATURE {
            return Err(Error::ModelLoadFailed(format!(
                "{} is not an HDF5 file (bad signature)",
                path.display()
            )));
        }

        let input_shape = scan_input_shape(&mut file)?;

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes,
            input_shape,
        })
    }
}

/// Stream the file in bounded chunks looking for the input-shape attribute.
/// A key-sized tail is carried across reads so a match spanning a chunk
/// border is not lost.
fn scan_input_shape(file: &mut File) -> Result<InputShape> {
    let mut buffer: Vec<u8> = Vec::with_capacity(SCAN_CHUNK * 2);
    let mut chunk = vec![0u8; SCAN_CHUNK];

    loop {
        let count = file.read(&mut chunk)?;
        if count == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..count]);

        if let Some(pos) = find(&buffer, INPUT_SHAPE_KEY) {
            buffer.drain(..pos + INPUT_SHAPE_KEY.len());
            return parse_shape_array(file, buffer);
        }

        if buffer.len() > INPUT_SHAPE_KEY.len() {
            buffer.drain(..buffer.len() - INPUT_SHAPE_KEY.len());
        }
    }

    Err(Error::ModelLoadFailed(
        "no input shape declared in model config".to_string(),
    ))
}

/// Parse the JSON array that follows the attribute key, pulling in more bytes
/// if the closing bracket is not in view yet.
fn parse_shape_array(file: &mut File, mut tail: Vec<u8>) -> Result<InputShape> {
    while !tail.contains(&b']') && tail.len() < SHAPE_MAX_LEN {
        let mut chunk = [0u8; 64];
        let count = file.read(&mut chunk)?;
        if count == 0 {
            break;
        }
        tail.extend_from_slice(&chunk[..count]);
    }

    let open = tail.iter().position(|&byte| byte == b'[');
    let close = tail.iter().position(|&byte| byte == b']');
    let (Some(open), Some(close)) = (open, close) else {
        return Err(Error::ModelLoadFailed(
            "malformed input shape in model config".to_string(),
        ));
    };
    if close < open {
        return Err(Error::ModelLoadFailed(
            "malformed input shape in model config".to_string(),
        ));
    }

    let dims: Vec<Option<u64>> = serde_json::from_slice(&tail[open..=close])
        .map_err(|err| Error::ModelLoadFailed(format!("malformed input shape: {err}")))?;
    if dims.is_empty() {
        return Err(Error::ModelLoadFailed(
            "empty input shape in model config".to_string(),
        ));
    }

    Ok(InputShape(dims))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
