use crate::error::{Result, VcfError};
use std::borrow::Cow;
use vcfmerge_core::domain::{ContactRecord, Property};

const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone, Default)]
pub struct ParsedVcf {
    pub records: Vec<ContactRecord>,
    pub warnings: Vec<String>,
}

/// Splits vCard text into records.
///
/// Every property inside a card is kept, including ones this crate never
/// interprets, so [`write_vcf`] can reproduce them. Delimiter problems are
/// tolerated and reported as warnings; a content line without a value
/// separator is an error.
pub fn parse_vcf(data: &str) -> Result<ParsedVcf> {
    let mut parsed = ParsedVcf::default();
    let mut current: Option<ContactRecord> = None;

    for (line_no, line) in unfold_lines(data) {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("BEGIN:VCARD") {
            if let Some(card) = current.take() {
                parsed
                    .warnings
                    .push(format!("line {line_no}: nested BEGIN:VCARD, closing previous card"));
                parsed.records.push(card);
            }
            current = Some(ContactRecord::new());
            continue;
        }

        if trimmed.eq_ignore_ascii_case("END:VCARD") {
            match current.take() {
                Some(card) => parsed.records.push(card),
                None => parsed
                    .warnings
                    .push(format!("line {line_no}: END:VCARD without matching BEGIN:VCARD")),
            }
            continue;
        }

        let Some(card) = current.as_mut() else {
            continue;
        };
        if trimmed.is_empty() {
            continue;
        }

        let property = split_property(&line).ok_or_else(|| VcfError::Parse {
            line: line_no,
            message: format!("malformed content line: {trimmed}"),
        })?;
        card.push(property);
    }

    if let Some(card) = current.take() {
        parsed
            .warnings
            .push("missing END:VCARD at end of file".to_string());
        parsed.records.push(card);
    }

    Ok(parsed)
}

/// Serializes records as vCard text with CRLF line endings and folded lines.
pub fn write_vcf<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ContactRecord>,
{
    let mut out = String::new();
    for record in records {
        out.push_str("BEGIN:VCARD\r\n");
        for property in record.properties() {
            push_folded(&mut out, &content_line(property));
        }
        out.push_str("END:VCARD\r\n");
    }
    out
}

fn content_line(property: &Property) -> String {
    let mut line = String::new();
    if let Some(group) = &property.group {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(&property.name);
    for param in &property.params {
        line.push(';');
        line.push_str(param);
    }
    line.push(':');
    line.push_str(&property.value);
    line
}

fn push_folded(out: &mut String, line: &str) {
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out.push_str("\r\n");
}

/// Joins folded continuation lines, remembering where each logical line began.
fn unfold_lines(input: &str) -> Vec<(usize, String)> {
    let input = normalize_line_endings(input);
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(&line[1..]);
            } else {
                lines.push((line_no, line[1..].to_string()));
            }
        } else {
            lines.push((line_no, line.to_string()));
        }
    }
    lines
}

fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn split_property(line: &str) -> Option<Property> {
    let colon = find_unquoted(line, ':')?;
    let (left, value) = (&line[..colon], &line[colon + 1..]);

    let mut segments = split_unquoted(left, ';').into_iter();
    let mut name = segments.next()?.trim();
    let mut group = None;
    if let Some((prefix, rest)) = name.rsplit_once('.') {
        group = Some(prefix.to_string());
        name = rest;
    }
    if name.is_empty() {
        return None;
    }

    Some(Property {
        group,
        name: name.to_ascii_uppercase(),
        params: segments.map(str::to_string).collect(),
        value: value.to_string(),
    })
}

fn find_unquoted(value: &str, needle: char) -> Option<usize> {
    let mut quoted = false;
    for (index, ch) in value.char_indices() {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == needle && !quoted {
            return Some(index);
        }
    }
    None
}

fn split_unquoted(value: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = value;
    while let Some(index) = find_unquoted(rest, separator) {
        parts.push(&rest[..index]);
        rest = &rest[index + 1..];
    }
    parts.push(rest);
    parts
}
