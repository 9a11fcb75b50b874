//! Signature catalog
//!
//! An ordered list of [`CatalogEntry`] rows. Order matters: manifest ids
//! are assigned in catalog order, so the same image and catalog always
//! produce the same manifest.
//!
//! Several entries may share a header (`PK\x03\x04` for zip and every
//! Office Open XML / OpenDocument container, `RIFF` for webp/wav/avi).
//! Each one is still carved independently under its own extension.

use crate::core::error::{CarveError, Result};
use crate::domain::entities::{CatalogEntry, SignatureDescriptor};
use aho_corasick::AhoCorasick;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureCatalog {
    entries: Vec<CatalogEntry>,
}

/// Number of header occurrences of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCount {
    pub extension: String,
    pub header: Vec<u8>,
    pub hits: usize,
}

impl SignatureCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The built-in table of image, archive, document, executable,
    /// audio, video, font, disk image and miscellaneous formats.
    pub fn builtin() -> Self {
        let e = |ext: &str, header: &[u8]| CatalogEntry::new(ext, header);
        let f = |ext: &str, header: &[u8], footer: &[u8]| {
            CatalogEntry::new(ext, header).with_footer(footer)
        };

        const OLE: &[u8] = b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1";
        const PK: &[u8] = b"PK\x03\x04";

        Self::new(vec![
            // Images
            f("jpg", b"\xff\xd8", b"\xff\xd9"),
            f("png", b"\x89PNG\r\n\x1a\n", b"IEND\xaeB`\x82"),
            f("gif", b"GIF87a", b";"),
            f("gif", b"GIF89a", b";"),
            e("tiff", b"II*\x00"),
            e("tiff", b"MM\x00*"),
            e("bmp", b"BM"),
            e("ico", b"\x00\x00\x01\x00"),
            e("webp", b"RIFF"),
            e("jp2", b"\x00\x00\x00\x0cjP  \r\n\x87\n"),
            e("heic", b"\x00\x00\x00\x18ftypheic"),
            e("heif", b"\x00\x00\x00\x18ftypheif"),
            e("avif", b"\x00\x00\x00\x18ftypavif"),
            e("exr", b"\x76\x2f\x31\x01"),
            e("pcx", b"\x0a"),
            // Archives and compression
            f("zip", PK, b"PK\x05\x06"),
            e("rar", b"Rar!\x1a\x07\x00"),
            e("rar5", b"Rar!\x1a\x07\x01\x00"),
            e("7z", b"7z\xbc\xaf\x27\x1c"),
            e("gz", b"\x1f\x8b"),
            e("bz2", b"BZh"),
            e("xz", b"\xfd7zXZ\x00"),
            e("lzma", b"\x5d\x00\x00\x80\x00"),
            e("Z", b"\x1f\x9d"),
            e("lzip", b"LZIP"),
            e("cab", b"MSCF"),
            e("arj", b"\x60\xea"),
            e("lz4", b"\x04\x22\x4d\x18"),
            e("zst", b"\x28\xb5\x2f\xfd"),
            e("lzo", b"LZOP"),
            e("zpaq", b"ZPAQ"),
            // Documents
            f("pdf", b"%PDF", b"%%EOF"),
            e("doc", OLE),
            e("xls", OLE),
            e("ppt", OLE),
            e("docx", PK),
            e("xlsx", PK),
            e("pptx", PK),
            e("docm", PK),
            e("xlsm", PK),
            e("pptm", PK),
            e("odt", PK),
            e("ods", PK),
            e("odp", PK),
            e("epub", PK),
            f("rtf", b"{\\rtf", b"}"),
            e("chm", b"ITSF"),
            e("mobi", b"BOOKMOBI"),
            e("ps", b"%!PS"),
            e("eps", b"%!PS"),
            e("xps", PK),
            // Executables
            e("exe", b"MZ"),
            e("elf", b"\x7fELF"),
            e("macho", b"\xfe\xed\xfa\xce"),
            e("macho", b"\xfe\xed\xfa\xcf"),
            e("macho", b"\xce\xfa\xed\xfe"),
            e("macho", b"\xcf\xfa\xed\xfe"),
            // Audio
            e("mp3", b"ID3"),
            e("wav", b"RIFF"),
            e("flac", b"fLaC"),
            e("ogg", b"OggS"),
            e("aac", b"\xff\xf1"),
            // Video
            e("avi", b"RIFF"),
            e("mp4", b"\x00\x00\x00\x18ftyp"),
            e("mkv", b"\x1a\x45\xdf\xa3"),
            e("mov", b"\x00\x00\x00\x18ftypqt"),
            // Fonts
            e("ttf", b"\x00\x01\x00\x00"),
            e("otf", b"OTTO"),
            e("woff", b"wOFF"),
            e("woff2", b"wOF2"),
            // Disk images
            e("dmg", b"koly"),
            e("vhd", b"conectix"),
            e("vmdk", b"# Disk"),
            // Misc
            e("swf", b"FWS"),
            e("swf", b"CWS"),
            e("swf", b"ZWS"),
            e("ser", b"\xac\xed\x00\x05"),
        ])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Keeps only entries whose extension is listed (ASCII case ignored).
    /// An empty list keeps everything.
    pub fn retain_extensions<S: AsRef<str>>(&mut self, extensions: &[S]) {
        if extensions.is_empty() {
            return;
        }
        self.entries.retain(|entry| {
            extensions
                .iter()
                .any(|ext| ext.as_ref().eq_ignore_ascii_case(&entry.extension))
        });
    }

    /// Validates every entry, in order.
    ///
    /// Returns the usable descriptors, each paired with its catalog index,
    /// together with the rejections. A bad entry never stops the others.
    pub fn descriptors(&self) -> (Vec<(usize, SignatureDescriptor)>, Vec<CarveError>) {
        let mut valid = Vec::with_capacity(self.entries.len());
        let mut rejected = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            match SignatureDescriptor::from_entry(index, entry) {
                Ok(desc) => valid.push((index, desc)),
                Err(err) => {
                    warn!("Skipping catalog entry: {}", err);
                    rejected.push(err);
                }
            }
        }
        (valid, rejected)
    }

    /// Counts header occurrences of every valid entry in one pass.
    ///
    /// Matches overlap, as in carving. Entries that share a header report
    /// the same count. Output follows catalog order.
    pub fn header_census(&self, haystack: &[u8]) -> Result<Vec<HeaderCount>> {
        let (descriptors, _) = self.descriptors();
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }

        let mut pattern_ids: HashMap<&[u8], usize> = HashMap::new();
        let mut patterns: Vec<&[u8]> = Vec::new();
        for (_, desc) in &descriptors {
            pattern_ids.entry(desc.header()).or_insert_with(|| {
                patterns.push(desc.header());
                patterns.len() - 1
            });
        }

        let matcher = AhoCorasick::new(&patterns)?;
        let mut hits = vec![0usize; patterns.len()];
        for mat in matcher.find_overlapping_iter(haystack) {
            hits[mat.pattern().as_usize()] += 1;
        }

        Ok(descriptors
            .iter()
            .map(|(_, desc)| HeaderCount {
                extension: desc.extension().to_string(),
                header: desc.header().to_vec(),
                hits: pattern_ids
                    .get(desc.header())
                    .map(|&id| hits[id])
                    .unwrap_or(0),
            })
            .collect())
    }
}

impl FromIterator<CatalogEntry> for SignatureCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
