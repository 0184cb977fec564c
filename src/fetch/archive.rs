use std::io::{Cursor, Read};
use zip::ZipArchive;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

/// Pull the first `.csv` entry (archive order) out of a ZIP held in memory.
/// Returns the entry name and its bytes, or the reason nothing usable was found.
pub fn first_csv_entry(bytes: &[u8]) -> Result<(String, Vec<u8>), String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("reading ZIP archive: {}", e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("ZIP entry #{}: {}", i, e))?;
        let name = entry.name().to_string();
        if entry.is_file() && name.to_lowercase().ends_with(".csv") {
            // header-declared size is untrusted; read_to_end grows the buffer
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| format!("reading {}: {}", name, e))?;
            return Ok((name, buf));
        }
    }
    Err("ZIP archive holds no .csv entry".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    fn zip_of(entries: &[(&str, &str)]) -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, content) in entries {
                let options: FileOptions<'_, ()> =
                    FileOptions::default().compression_method(CompressionMethod::Stored);
                zip.start_file(*name, options)?;
                zip.write_all(content.as_bytes())?;
            }
            zip.finish()?;
        }
        Ok(buf)
    }

    #[test]
    fn picks_first_csv_entry() -> anyhow::Result<()> {
        let bytes = zip_of(&[
            ("README.txt", "ignore me"),
            ("obs/DATA.CSV", "location,year\n"),
            ("other.csv", "x\n"),
        ])?;
        assert!(is_zip(&bytes));
        let (name, data) = first_csv_entry(&bytes).map_err(anyhow::Error::msg)?;
        assert_eq!(name, "obs/DATA.CSV");
        assert_eq!(data, b"location,year\n");
        Ok(())
    }

    #[test]
    fn archive_without_csv_is_an_error() -> anyhow::Result<()> {
        let bytes = zip_of(&[("notes.txt", "x")])?;
        assert!(first_csv_entry(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn plain_csv_is_not_a_zip() {
        assert!(!is_zip(b"location,year\n"));
    }
}
