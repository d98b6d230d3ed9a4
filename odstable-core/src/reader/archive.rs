//! ODS zip container access

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{OdsError, Result};

const CONTENT_STREAM: &str = "content.xml";

fn has_ods_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("ods"))
        .unwrap_or(false)
}

/// Read the `content.xml` stream of the ODS file at `path`
pub fn open_content<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)?;

    match read_content(BufReader::new(file)) {
        Err(OdsError::Archive(ZipError::InvalidArchive(_))) if !has_ods_extension(path_ref) => {
            Err(OdsError::UnsupportedFormat(path_ref.to_path_buf()))
        }
        other => other,
    }
}

/// Read the `content.xml` stream from any seekable zip source
pub fn read_content<R: Read + Seek>(reader: R) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(reader)?;

    let mut content_xml = match archive.by_name(CONTENT_STREAM) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(OdsError::MissingContentStream),
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::with_capacity(content_xml.size() as usize);
    content_xml.read_to_end(&mut content)?;
    debug!("Read {} bytes of {}", content.len(), CONTENT_STREAM);
    Ok(content)
}
