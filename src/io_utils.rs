//! Input helpers for the command-line front end.
//!
//! The analysis engine only sees decoded text. This module reads it from a
//! file or, for the `-` path, from stdin, and decodes it with the requested
//! `encoding_rs` label (UTF-8 by default).

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

/// Decodes `bytes`. A leading byte-order mark takes precedence over `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(anyhow!(
            "Failed to decode input as {}",
            actual.name()
        ));
    }
    Ok(text.into_owned())
}

/// Reads the whole input as text.
pub fn read_input_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = if is_dash(path) {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Reading dataset from stdin")?;
        buffer
    } else {
        fs::read(path).with_context(|| format!("Opening input file {path:?}"))?
    };
    decode_bytes(&bytes, encoding).with_context(|| format!("Decoding {path:?}"))
}

/// Name recorded on the dataset: the file name, or nothing for stdin.
pub fn dataset_name(path: &Path) -> Option<String> {
    if is_dash(path) {
        return None;
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
