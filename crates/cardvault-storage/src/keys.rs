//! Archive key derivation.
//!
//! Key format: `{year}/{month:02}/{day:02}/{original_name}`, always
//! `/`-separated regardless of platform.

use chrono::{Datelike, NaiveDate};

/// Archive key for a file created on `created` under its original name.
///
/// Pure and deterministic: the same date and name always produce the same
/// key, which is how a re-ingested file is recognised as a duplicate.
pub fn archive_key(created: NaiveDate, original_name: &str) -> String {
    format!(
        "{:04}/{:02}/{:02}/{}",
        created.year(),
        created.month(),
        created.day(),
        original_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_key_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(archive_key(date, "clip.avi"), "2024/03/05/clip.avi");
    }

    #[test]
    fn test_archive_key_pads_and_keeps_name() {
        let date = NaiveDate::from_ymd_opt(987, 12, 1).unwrap();
        assert_eq!(archive_key(date, "IMG 0001.JPG"), "0987/12/01/IMG 0001.JPG");
    }

    #[test]
    fn test_archive_key_is_deterministic_across_threads() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(move || archive_key(date, "clip.avi")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "2024/03/05/clip.avi");
        }
    }
}
