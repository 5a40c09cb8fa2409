/// Escape one raw output line for embedding in a YAML block scalar.
///
/// Printable ASCII passes through; backslash and double quote get a leading
/// backslash; the named C escapes cover the common control characters and
/// every other byte becomes `\xHH`. A final literal space is rewritten as
/// `\x20` so trailing whitespace survives indentation-sensitive consumers.
/// The result carries no enclosing quotes.
pub fn escape_line(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    for &b in raw {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            0x1b => out.push_str("\\e"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02X}")),
        }
    }

    if out.ends_with(' ') {
        out.truncate(out.len() - 1);
        out.push_str("\\x20");
    }

    out
}

/// Invert [`escape_line`].
///
/// Used by fixture consumers and the round-trip tests; the capture path
/// itself is write-only. Returns `None` for input this scheme could not
/// have produced.
pub fn unescape_line(escaped: &str) -> Option<Vec<u8>> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let escape = *bytes.get(i + 1)?;
        i += 2;
        match escape {
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'e' => out.push(0x1b),
            b'x' => {
                let hi = char::from(*bytes.get(i)?).to_digit(16)?;
                let lo = char::from(*bytes.get(i + 1)?).to_digit(16)?;
                out.push(((hi << 4) | lo) as u8);
                i += 2;
            }
            _ => return None,
        }
    }

    Some(out)
}

/// Encode a raw capture into indented, escaped lines ready for a `|-`
/// block scalar.
pub fn encode_block(raw: &[u8], indent: &str) -> Vec<String> {
    split_lines(raw)
        .into_iter()
        .map(|line| format!("{indent}{}", escape_line(line)))
        .collect()
}

/// Split on `\n`, dropping the terminator and one trailing `\r` per line.
/// A trailing terminator does not produce an empty final line.
fn split_lines(raw: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = raw.split(|&b| b == b'\n').collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}
