use crate::shared::error::CollectionError;
use encoding_rs::{Encoding, EUC_KR, UTF_16BE, UTF_16LE, UTF_8};
use log::debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

pub fn truncation_notice(max_size: u64) -> String {
    format!(
        "... (file truncated, showing last {:.2}KB)\n",
        max_size as f64 / 1024.0
    )
}

fn sniff_encoding(file: &mut File) -> Result<&'static Encoding, CollectionError> {
    let mut head = Vec::with_capacity(3);
    file.by_ref().take(3).read_to_end(&mut head)?;
    Ok(Encoding::for_bom(&head)
        .map(|(encoding, _)| encoding)
        .unwrap_or(UTF_8))
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// Decodes a window of the file. `from_start` windows still carry the BOM.
/// BOM-less text that is not valid UTF-8 is read as EUC-KR (CP949), the
/// legacy code page of Korean-locale clients.
fn decode_window(encoding: &'static Encoding, buf: &[u8], from_start: bool) -> String {
    if is_utf16(encoding) {
        return if from_start {
            encoding.decode(buf).0.into_owned()
        } else {
            encoding.decode_without_bom_handling(buf).0.into_owned()
        };
    }

    let (body, has_bom) = match buf.strip_prefix(b"\xEF\xBB\xBF".as_slice()) {
        Some(rest) if from_start => (rest, true),
        _ => (buf, false),
    };
    let skip = if from_start {
        0
    } else {
        body.iter().take(3).take_while(|b| (**b & 0xC0) == 0x80).count()
    };

    let (text, had_errors) = UTF_8.decode_without_bom_handling(&body[skip..]);
    if !had_errors || has_bom {
        return text.into_owned();
    }

    debug!("Log window is not valid UTF-8, decoding as EUC-KR");
    let (text, had_errors) = EUC_KR.decode_without_bom_handling(body);
    if had_errors {
        debug!("Log window has bytes outside EUC-KR");
    }
    text.into_owned()
}

/// Keeps the last `max_size` bytes of `text`, moved forward to a character
/// boundary. Returns whether anything was dropped.
fn clip_tail(text: String, max_size: usize) -> (String, bool) {
    if text.len() <= max_size {
        return (text, false);
    }
    let mut start = text.len() - max_size;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    (text[start..].to_string(), true)
}

/// Reads a log file, keeping at most the last `max_size` bytes.
///
/// A truncated read is prefixed with a notice naming the cap. The tail window
/// starts on a character boundary: UTF-8 continuation bytes are skipped and
/// UTF-16 windows stay even-aligned. The decoded text never exceeds
/// `max_size` bytes, even when a legacy code page widens it.
pub fn read_log_content(path: &Path, max_size: u64) -> Result<String, CollectionError> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let encoding = sniff_encoding(&mut file)?;

    let mut start = file_size.saturating_sub(max_size);
    if is_utf16(encoding) && start % 2 == 1 {
        start += 1;
    }
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::with_capacity(file_size.saturating_sub(start) as usize);
    file.read_to_end(&mut buf)?;

    let decoded = decode_window(encoding, &buf, start == 0);
    let (content, clipped) = clip_tail(decoded, max_size as usize);

    if start > 0 || clipped {
        Ok(format!("{}{}", truncation_notice(max_size), content))
    } else {
        Ok(content)
    }
}
