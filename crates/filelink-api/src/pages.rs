//! HTML pages: the status page and the player page.

use filelink_core::constants::SERVICE_NAME;
use filelink_core::{FileRecord, MediaKind};
use std::time::Duration;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1d 2h 3m 4s`, omitting leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
    );

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

pub fn status_page(file_count: usize, uptime: Duration) -> String {
    let body = format!(
        "<main>\n<h1>{name}</h1>\n<p>Status: running</p>\n<p>Files registered: {count}</p>\n<p>Uptime: {uptime}</p>\n</main>",
        name = escape_html(SERVICE_NAME),
        count = file_count,
        uptime = format_uptime(uptime),
    );
    layout(SERVICE_NAME, &body)
}

/// Player page for `record`, embedding `direct_link` as the media source.
pub fn watch_page(record: &FileRecord, direct_link: &str) -> String {
    let name = escape_html(&record.file_name);
    let src = escape_html(direct_link);
    let mime = escape_html(record.content_type());

    let player = match record.media_kind {
        MediaKind::Video => format!(
            "<video controls preload=\"metadata\" width=\"100%\">\n<source src=\"{src}\" type=\"{mime}\">\n</video>"
        ),
        MediaKind::Audio => format!(
            "<audio controls preload=\"metadata\">\n<source src=\"{src}\" type=\"{mime}\">\n</audio>"
        ),
        MediaKind::Document | MediaKind::Photo => String::new(),
    };

    let body = format!(
        "<main>\n<h1>{name}</h1>\n{player}\n<p><a href=\"{src}\" download>Download {name}</a></p>\n</main>"
    );
    layout(&record.file_name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(kind: MediaKind, name: &str) -> FileRecord {
        FileRecord {
            key: "4567890123456789".to_string(),
            remote_location_id: 1,
            file_name: name.to_string(),
            mime_type: kind.default_mime_type().to_string(),
            file_size: None,
            media_kind: kind,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3_600 + 2)), "1h 0m 2s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_video_page_embeds_video_element() {
        let html = watch_page(&record(MediaKind::Video, "clip.mp4"), "http://h/file/4567890123456789");
        assert!(html.contains("<video"));
        assert!(html.contains("src=\"http://h/file/4567890123456789\""));
        assert!(html.contains("type=\"video/mp4\""));
    }

    #[test]
    fn test_audio_page_embeds_audio_element() {
        let html = watch_page(&record(MediaKind::Audio, "a.mp3"), "http://h/file/1");
        assert!(html.contains("<audio"));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn test_document_page_falls_back_to_download_link() {
        let html = watch_page(&record(MediaKind::Document, "<b>.pdf"), "http://h/file/1");
        assert!(!html.contains("<video"));
        assert!(!html.contains("<audio"));
        assert!(html.contains("href=\"http://h/file/1\" download"));
        assert!(html.contains("&lt;b&gt;.pdf"));
    }

    #[test]
    fn test_status_page_shows_count() {
        let html = status_page(3, Duration::from_secs(61));
        assert!(html.contains("Files registered: 3"));
        assert!(html.contains("Uptime: 1m 1s"));
    }
}
