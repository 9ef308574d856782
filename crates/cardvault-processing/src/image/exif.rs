//! EXIF extractor for JPEG files

use async_trait::async_trait;
use cardvault_core::{IngestError, IngestResult};
use chrono::{NaiveDate, NaiveDateTime};
use exif::{Exif, In, Reader, Tag, Value};
use serde_json::{Map, Number, Value as JsonValue};
use std::io::Cursor;
use std::path::Path;

use crate::fs_time::filesystem_creation_time;
use crate::metadata::{DateSource, ExtractedMetadata};
use crate::traits::MetadataExtractor;

/// Undefined-typed values above this size (maker notes, embedded previews)
/// are left out of the tag blob.
const MAX_UNDEFINED_BYTES: usize = 256;

/// Image extractor - EXIF tags with capture/create/modify date fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageExtractor;

/// Tag set and candidate dates read from one image
#[derive(Debug, Default)]
pub(crate) struct ExifTags {
    pub tags: Map<String, JsonValue>,
    pub capture: Option<NaiveDateTime>,
    pub create: Option<NaiveDateTime>,
    pub modify: Option<NaiveDateTime>,
}

impl ExifTags {
    /// First available date in capture, create, modify order.
    pub fn resolve(&self) -> Option<(NaiveDateTime, DateSource)> {
        self.capture
            .map(|d| (d, DateSource::CaptureTag))
            .or_else(|| self.create.map(|d| (d, DateSource::CreateTag)))
            .or_else(|| self.modify.map(|d| (d, DateSource::ModifyTag)))
    }
}

#[async_trait]
impl MetadataExtractor for ImageExtractor {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> IngestResult<ExtractedMetadata> {
        let file_name = display_name(path);
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::io(path, e))?;

        let parsed = tokio::task::spawn_blocking(move || read_exif_tags(&data))
            .await
            .map_err(|e| IngestError::parse(&file_name, e))?
            .map_err(|e| IngestError::parse(&file_name, e))?;

        let (created, date_source) = match parsed.resolve() {
            Some(found) => found,
            None => (
                filesystem_creation_time(path).await.naive_utc(),
                DateSource::Filesystem,
            ),
        };

        tracing::debug!(
            tag_count = parsed.tags.len(),
            created = %created,
            date_source = ?date_source,
            "EXIF metadata extracted"
        );

        Ok(ExtractedMetadata {
            tags: JsonValue::Object(parsed.tags),
            created,
            date_source,
        })
    }
}

/// Parse the EXIF segment of a JPEG/TIFF byte buffer.
///
/// A valid container without an EXIF segment yields an empty tag set; bytes
/// that are not an image container at all are an error.
pub(crate) fn read_exif_tags(data: &[u8]) -> Result<ExifTags, exif::Error> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(ExifTags::default()),
        Err(e) => return Err(e),
    };

    let mut tags = Map::new();
    for field in exif.fields() {
        let Some(value) = value_to_json(&field.value) else {
            continue;
        };
        let key = if field.ifd_num == In::PRIMARY {
            field.tag.to_string()
        } else {
            format!("{}.{}", ifd_label(field.ifd_num), field.tag)
        };
        tags.insert(key, value);
    }

    Ok(ExifTags {
        capture: exif_datetime(&exif, Tag::DateTimeOriginal),
        create: exif_datetime(&exif, Tag::DateTimeDigitized),
        modify: exif_datetime(&exif, Tag::DateTime),
        tags,
    })
}

fn exif_datetime(exif: &Exif, tag: Tag) -> Option<NaiveDateTime> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts.first().and_then(|raw| parse_exif_datetime(raw)),
        _ => None,
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value. Placeholder dates written by
/// cameras without a clock (all zeros) are rejected.
pub(crate) fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?.and_hms_opt(
        dt.hour.into(),
        dt.minute.into(),
        dt.second.into(),
    )
}

fn ifd_label(ifd: In) -> String {
    if ifd == In::THUMBNAIL {
        "Thumbnail".to_string()
    } else {
        format!("Ifd{}", ifd.index())
    }
}

fn value_to_json(value: &Value) -> Option<JsonValue> {
    let json = match value {
        Value::Ascii(parts) => {
            let mut strings: Vec<JsonValue> = parts
                .iter()
                .map(|part| {
                    JsonValue::String(
                        String::from_utf8_lossy(part)
                            .trim_end_matches('\0')
                            .trim()
                            .to_string(),
                    )
                })
                .collect();
            if strings.len() == 1 {
                strings.remove(0)
            } else {
                JsonValue::Array(strings)
            }
        }
        Value::Byte(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::Short(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::Long(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::SByte(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::SShort(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::SLong(v) => collapse(v.iter().map(|&n| JsonValue::from(n))),
        Value::Rational(v) => collapse(v.iter().map(|r| float(r.to_f64()))),
        Value::SRational(v) => collapse(v.iter().map(|r| float(r.to_f64()))),
        Value::Float(v) => collapse(v.iter().map(|&f| float(f64::from(f)))),
        Value::Double(v) => collapse(v.iter().map(|&f| float(f))),
        Value::Undefined(bytes, _) => {
            if bytes.len() > MAX_UNDEFINED_BYTES {
                return None;
            }
            if !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                JsonValue::String(String::from_utf8_lossy(bytes).into_owned())
            } else {
                collapse(bytes.iter().map(|&n| JsonValue::from(n)))
            }
        }
        _ => return None,
    };
    Some(json)
}

fn collapse(values: impl Iterator<Item = JsonValue>) -> JsonValue {
    let mut values: Vec<JsonValue> = values.collect();
    if values.len() == 1 {
        values.remove(0)
    } else {
        JsonValue::Array(values)
    }
}

fn float(value: f64) -> JsonValue {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_with_exif, jpeg_without_exif, ExifFixture};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_exif_datetime() {
        assert_eq!(
            parse_exif_datetime(b"2024:03:05 14:30:00"),
            Some(at(2024, 3, 5, 14, 30, 0))
        );
        assert_eq!(parse_exif_datetime(b"0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_datetime(b"not a date"), None);
    }

    #[test]
    fn test_capture_tag_wins() {
        let bytes = jpeg_with_exif(&ExifFixture {
            capture: Some("2021:06:01 08:00:00"),
            create: Some("2022:01:01 00:00:00"),
            modify: Some("2023:01:01 00:00:00"),
            make: Some("Canon"),
        });
        let parsed = read_exif_tags(&bytes).unwrap();
        assert_eq!(
            parsed.resolve(),
            Some((at(2021, 6, 1, 8, 0, 0), DateSource::CaptureTag))
        );
        assert_eq!(parsed.tags["Make"], "Canon");
        assert_eq!(parsed.tags["DateTimeOriginal"], "2021:06:01 08:00:00");
    }

    #[test]
    fn test_create_tag_used_without_capture() {
        let bytes = jpeg_with_exif(&ExifFixture {
            create: Some("2022:02:02 10:11:12"),
            modify: Some("2023:01:01 00:00:00"),
            ..Default::default()
        });
        let parsed = read_exif_tags(&bytes).unwrap();
        assert_eq!(
            parsed.resolve(),
            Some((at(2022, 2, 2, 10, 11, 12), DateSource::CreateTag))
        );
    }

    #[test]
    fn test_modify_tag_only() {
        let bytes = jpeg_with_exif(&ExifFixture {
            modify: Some("2019:12:31 23:59:59"),
            ..Default::default()
        });
        let parsed = read_exif_tags(&bytes).unwrap();
        assert_eq!(
            parsed.resolve(),
            Some((at(2019, 12, 31, 23, 59, 59), DateSource::ModifyTag))
        );
    }

    #[test]
    fn test_unparseable_capture_falls_through() {
        let bytes = jpeg_with_exif(&ExifFixture {
            capture: Some("0000:00:00 00:00:00"),
            modify: Some("2020:07:04 12:00:00"),
            ..Default::default()
        });
        let parsed = read_exif_tags(&bytes).unwrap();
        assert_eq!(
            parsed.resolve(),
            Some((at(2020, 7, 4, 12, 0, 0), DateSource::ModifyTag))
        );
    }

    #[test]
    fn test_jpeg_without_exif_is_not_an_error() {
        let parsed = read_exif_tags(&jpeg_without_exif()).unwrap();
        assert!(parsed.tags.is_empty());
        assert!(parsed.resolve().is_none());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(read_exif_tags(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn test_extract_modify_only_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(
            &path,
            jpeg_with_exif(&ExifFixture {
                modify: Some("2018:05:20 09:15:00"),
                ..Default::default()
            }),
        )
        .unwrap();

        let extracted = ImageExtractor.extract(&path).await.unwrap();
        assert_eq!(extracted.date_source, DateSource::ModifyTag);
        assert_eq!(
            extracted.creation_date(),
            NaiveDate::from_ymd_opt(2018, 5, 20).unwrap()
        );
        assert_eq!(extracted.tags["DateTime"], "2018:05:20 09:15:00");
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_filesystem_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpeg");
        std::fs::write(&path, jpeg_without_exif()).unwrap();

        let extracted = ImageExtractor.extract(&path).await.unwrap();
        assert_eq!(extracted.date_source, DateSource::Filesystem);
        assert_eq!(
            extracted.creation_date(),
            filesystem_creation_time(&path).await.date_naive()
        );
    }

    #[tokio::test]
    async fn test_extract_corrupt_file_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"\x00\x01\x02 truncated").unwrap();

        let err = ImageExtractor.extract(&path).await.unwrap_err();
        assert_eq!(err.error_code(), "PARSE_FAILURE");
        assert!(err.to_string().contains("broken.jpg"));
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageExtractor
            .extract(&dir.path().join("gone.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_FAILURE");
    }
}
