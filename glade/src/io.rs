//! External file access for `uri` members.
//!
//! The decoder itself never touches the filesystem. Buffers and images that reference
//! external files are fetched through a [`ReadFile`] implementation, called synchronously
//! with the URI as written in the document once JSON string escapes are resolved.
//! Percent-encoding is left for the reader.

use crate::Error;
use std::path::{Path, PathBuf};

pub trait ReadFile {
    /// Returns the full contents of `uri`. The string is only valid for the call.
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error>;
}

impl<R: ReadFile + ?Sized> ReadFile for &mut R {
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error> {
        (**self).read(uri)
    }
}

/// Resolves URIs as paths relative to a base directory.
#[derive(Clone, Debug)]
pub struct FsReader {
    base: PathBuf,
}

impl FsReader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ReadFile for FsReader {
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error> {
        let path = self.base.join(percent_decode(uri));
        log::trace!("reading {}", path.display());
        std::fs::read(&path).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Adapts a closure into a [`ReadFile`].
pub struct FnReader<F>(pub F);

impl<F> ReadFile for FnReader<F>
where
    F: FnMut(&str) -> Result<Vec<u8>, Error>,
{
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error> {
        (self.0)(uri)
    }
}

/// Refuses every read. For self-contained `.glb` input.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoExternalFiles;

impl ReadFile for NoExternalFiles {
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error> {
        Err(Error::Io {
            path: uri.to_string(),
            message: "external files are not available".to_string(),
        })
    }
}

/// Decodes `%XX` escapes. Malformed escapes are kept verbatim.
pub(crate) fn percent_decode(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
