//! Chat reply texts.

use filelink_core::{AppError, ErrorMetadata, FileRecord, LinkBuilder};

pub const USAGE: &str = "Send me a document, video, audio file or photo and I will reply with a direct download link.\n\nVideo and audio files also get a watch link that plays in the browser.";

pub const PROCESSING: &str = "Processing your file...";

/// Human-readable size with binary units; "unknown" when absent.
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let Some(bytes) = size else {
        return "unknown".to_string();
    };
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn record_details(record: &FileRecord, links: &LinkBuilder) -> String {
    let record_links = links.links_for(record);
    let mut text = format!(
        "Name: {}\nSize: {}\nKey: {}\n\nDownload: {}",
        record.file_name,
        format_size(record.file_size),
        record.key,
        record_links.direct
    );
    if let Some(watch) = record_links.watch {
        text.push_str(&format!("\nWatch: {}", watch));
    }
    text
}

/// Summary sent after a successful ingestion.
pub fn stored(record: &FileRecord, links: &LinkBuilder) -> String {
    format!("File stored.\n\n{}", record_details(record, links))
}

/// Summary sent when the media object was already registered.
pub fn already_stored(record: &FileRecord, links: &LinkBuilder) -> String {
    format!(
        "This file is already stored.\n\n{}",
        record_details(record, links)
    )
}

/// User-facing text for a failed ingestion.
pub fn failure(error: &AppError) -> String {
    match error.suggested_action() {
        Some(action) => format!("{}\n{}.", error.client_message(), action),
        None => error.client_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filelink_core::keys;
    use filelink_core::{MediaKind, RemoteFileId};

    fn record(kind: MediaKind, size: Option<u64>) -> FileRecord {
        FileRecord {
            key: keys::generate(RemoteFileId::new(9_876_543_210)),
            remote_location_id: 3,
            file_name: "talk.mp3".to_string(),
            mime_type: "audio/mpeg".to_string(),
            file_size: size,
            media_kind: kind,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "unknown");
        assert_eq!(format_size(Some(0)), "0 B");
        assert_eq!(format_size(Some(1023)), "1023 B");
        assert_eq!(format_size(Some(1024)), "1.0 KiB");
        assert_eq!(format_size(Some(5 * 1024 * 1024 + 512 * 1024)), "5.5 MiB");
        assert_eq!(format_size(Some(3 * 1024 * 1024 * 1024)), "3.0 GiB");
    }

    #[test]
    fn test_stored_summary_includes_links() {
        let links = LinkBuilder::new("https://files.example.com");
        let text = stored(&record(MediaKind::Audio, Some(2048)), &links);
        assert!(text.contains("Name: talk.mp3"));
        assert!(text.contains("Size: 2.0 KiB"));
        assert!(text.contains("Key: 5432109876543210"));
        assert!(text.contains("https://files.example.com/file/5432109876543210"));
        assert!(text.contains("https://files.example.com/watch/5432109876543210"));
    }

    #[test]
    fn test_document_summary_has_no_watch_link() {
        let links = LinkBuilder::new("https://files.example.com");
        let text = already_stored(&record(MediaKind::Document, None), &links);
        assert!(text.starts_with("This file is already stored."));
        assert!(text.contains("Size: unknown"));
        assert!(!text.contains("/watch/"));
    }

    #[test]
    fn test_unidentified_file_reply_is_chat_wording() {
        let text = failure(&AppError::InvalidInput(
            "Could not identify this file.".to_string(),
        ));
        assert_eq!(
            text,
            "Could not identify this file.\nSend the file again as a document, video, audio or photo."
        );
        assert!(!text.contains("request"));
    }

    #[test]
    fn test_failure_text_hides_internal_detail() {
        let text = failure(&AppError::RelayFailure("FLOOD_WAIT_42 at dc4".to_string()));
        assert!(text.starts_with("Failed to store the file"));
        assert!(!text.contains("dc4"));
    }
}
