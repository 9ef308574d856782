//! Test fixtures: minimal EXIF JPEGs and a canned container probe.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::traits::ContainerProbe;

const TAG_MAKE: u16 = 0x010F;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

/// Tags to embed, as EXIF `YYYY:MM:DD HH:MM:SS` strings.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    pub capture: Option<&'static str>,
    pub create: Option<&'static str>,
    pub modify: Option<&'static str>,
    pub make: Option<&'static str>,
}

struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

fn ascii(tag: u16, value: &str) -> Entry {
    let mut data = value.as_bytes().to_vec();
    data.push(0);
    Entry {
        tag,
        kind: TYPE_ASCII,
        count: data.len() as u32,
        data,
    }
}

fn ifd_len(entries: usize) -> usize {
    2 + 12 * entries + 4
}

fn write_ifd(tiff: &mut Vec<u8>, data_area: &mut Vec<u8>, data_base: usize, entries: &[Entry]) {
    tiff.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        tiff.extend_from_slice(&entry.tag.to_le_bytes());
        tiff.extend_from_slice(&entry.kind.to_le_bytes());
        tiff.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = entry.data.clone();
            inline.resize(4, 0);
            tiff.extend_from_slice(&inline);
        } else {
            let offset = (data_base + data_area.len()) as u32;
            tiff.extend_from_slice(&offset.to_le_bytes());
            data_area.extend_from_slice(&entry.data);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    // no next IFD
    tiff.extend_from_slice(&0u32.to_le_bytes());
}

/// Little-endian TIFF body with IFD0 (Make, DateTime) and an Exif sub-IFD
/// (DateTimeOriginal, DateTimeDigitized).
fn tiff_body(fixture: &ExifFixture) -> Vec<u8> {
    let mut exif_ifd = Vec::new();
    if let Some(capture) = fixture.capture {
        exif_ifd.push(ascii(TAG_DATE_TIME_ORIGINAL, capture));
    }
    if let Some(create) = fixture.create {
        exif_ifd.push(ascii(TAG_DATE_TIME_DIGITIZED, create));
    }

    let mut ifd0 = Vec::new();
    if let Some(make) = fixture.make {
        ifd0.push(ascii(TAG_MAKE, make));
    }
    if let Some(modify) = fixture.modify {
        ifd0.push(ascii(TAG_DATE_TIME, modify));
    }

    let ifd0_offset = 8;
    let ifd0_entries = ifd0.len() + usize::from(!exif_ifd.is_empty());
    let exif_ifd_offset = ifd0_offset + ifd_len(ifd0_entries);
    let exif_ifd_size = if exif_ifd.is_empty() {
        0
    } else {
        ifd_len(exif_ifd.len())
    };
    let data_base = exif_ifd_offset + exif_ifd_size;

    if !exif_ifd.is_empty() {
        ifd0.push(Entry {
            tag: TAG_EXIF_IFD_POINTER,
            kind: TYPE_LONG,
            count: 1,
            data: (exif_ifd_offset as u32).to_le_bytes().to_vec(),
        });
    }

    let mut tiff = b"II\x2a\x00".to_vec();
    tiff.extend_from_slice(&(ifd0_offset as u32).to_le_bytes());

    let mut data_area = Vec::new();
    write_ifd(&mut tiff, &mut data_area, data_base, &ifd0);
    if !exif_ifd.is_empty() {
        write_ifd(&mut tiff, &mut data_area, data_base, &exif_ifd);
    }
    tiff.extend_from_slice(&data_area);
    tiff
}

/// A JPEG consisting of SOI, one APP1 EXIF segment and EOI.
pub fn jpeg_with_exif(fixture: &ExifFixture) -> Vec<u8> {
    let tiff = tiff_body(fixture);
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// A structurally valid JPEG with no EXIF segment.
pub fn jpeg_without_exif() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xD9]
}

/// Container probe returning a fixed format section or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    result: Result<JsonValue, String>,
}

impl StaticProbe {
    pub fn format(format: JsonValue) -> Self {
        Self { result: Ok(format) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl ContainerProbe for StaticProbe {
    async fn probe_format(&self, _path: &Path) -> Result<JsonValue, anyhow::Error> {
        self.result.clone().map_err(anyhow::Error::msg)
    }
}
