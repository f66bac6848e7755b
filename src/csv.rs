//! CSV-like field tokenizer, ported from `csvtok`/`find_end_quote`/`csvquote`.
//!
//! A field is either a bare run up to the next comma or end of line, or a
//! double-quoted run where `""` decodes to a literal `"` and the field ends
//! at the first quote immediately followed by a comma, a newline, or the
//! end of the string.

/// Iterates the comma-separated fields of a line, decoding quoted fields.
pub struct CsvTokenizer<'a> {
    rest: Option<&'a str>,
}

impl<'a> CsvTokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { rest: Some(line) }
    }
}

impl<'a> Iterator for CsvTokenizer<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let s = self.rest?;

        if let Some(rest) = s.strip_prefix('"') {
            if let Some(end) = find_end_quote(rest) {
                let inner = &rest[..end];
                let after = &rest[end + 1..];
                self.rest = after.strip_prefix(',');
                return Some(inner.replace("\"\"", "\""));
            }
        }

        match s.find(',') {
            Some(idx) => {
                let field = s[..idx].to_string();
                self.rest = Some(&s[idx + 1..]);
                Some(field)
            }
            None => {
                self.rest = None;
                Some(s.to_string())
            }
        }
    }
}

/// Finds the index (within `s`, the text after the opening quote) of the
/// quote that closes a quoted field: one immediately followed by `,`, `\n`,
/// or end of string, and not the first half of a `""` escape pair.
fn find_end_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                i += 2;
                continue;
            }
            let next = bytes.get(i + 1);
            if next.is_none() || next == Some(&b',') || next == Some(&b'\n') {
                return Some(i);
            }
            i += 1;
        } else {
            i += 1;
        }
    }
    None
}

/// Quotes and escapes `s` for CSV output if it contains a comma or a quote,
/// otherwise returns it unchanged.
pub fn csv_quote(s: &str) -> String {
    if !s.contains(',') && !s.contains('"') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
