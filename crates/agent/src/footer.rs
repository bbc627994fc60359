//! Footer tags embedded at the end of assistant text.
//!
//! Version 1 grammar:
//!
//! ```text
//! tag      = "[[" name ":" payload "]]"
//! name     = UPPER (UPPER | "_")*
//! payload  = (escaped | any char except "\" and "]")*
//! escaped  = "\" any-char
//! ```
//!
//! `\]` is a literal `]` and `\\` a literal `\`. Payloads are trimmed after
//! unescaping. Anything that starts like a tag but does not complete the
//! grammar is left in the body verbatim.

use thiserror::Error;

/// Name of the tag carrying hazard warnings.
pub const SAFETY: &str = "SAFETY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterTag {
    pub name: String,
    pub payload: String,
}

/// Assistant text split into its body and footer tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaggedText {
    /// Text with every well-formed tag removed, trailing whitespace trimmed
    pub body: String,
    /// Tags in order of appearance
    pub tags: Vec<FooterTag>,
}

impl TaggedText {
    /// Payloads of all tags with `name`.
    pub fn payloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.name == name)
            .map(|t| t.payload.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FooterError {
    #[error("invalid footer tag name '{0}': expected upper-case letters and underscores")]
    InvalidName(String),
}

/// Split `text` into body and tags.
pub fn parse(text: &str) -> TaggedText {
    let mut body = String::with_capacity(text.len());
    let mut tags = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("[[") {
        body.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match parse_tag(candidate) {
            Some((tag, consumed)) => {
                tags.push(tag);
                rest = &candidate[consumed..];
            }
            None => {
                // Keep one bracket and rescan, so "[[[SAFETY: x]]" still yields a tag.
                body.push('[');
                rest = &candidate[1..];
            }
        }
    }
    body.push_str(rest);

    TaggedText {
        body: body.trim_end().to_string(),
        tags,
    }
}

/// Parse one tag at the start of `input`, returning it and the bytes consumed.
fn parse_tag(input: &str) -> Option<(FooterTag, usize)> {
    let after_open = input.strip_prefix("[[")?;
    let colon = after_open.find(':')?;
    let name = &after_open[..colon];
    if !is_valid_name(name) {
        return None;
    }

    let payload_start = 2 + colon + 1;
    let mut payload = String::new();
    let mut chars = input[payload_start..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                payload.push(escaped);
            }
            ']' => {
                let (_, next) = chars.next()?;
                if next != ']' {
                    return None;
                }
                let consumed = payload_start + offset + 2;
                let tag = FooterTag {
                    name: name.to_string(),
                    payload: payload.trim().to_string(),
                };
                return Some((tag, consumed));
            }
            c => payload.push(c),
        }
    }
    None
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c == '_')
}

/// Render a tag, escaping the payload.
///
/// `parse(&encode(name, p)?)` yields `p` for any payload without leading or
/// trailing whitespace.
pub fn encode(name: &str, payload: &str) -> Result<String, FooterError> {
    if !is_valid_name(name) {
        return Err(FooterError::InvalidName(name.to_string()));
    }
    let mut escaped = String::with_capacity(payload.len());
    for c in payload.chars() {
        if c == '\\' || c == ']' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Ok(format!("[[{name}: {escaped}]]"))
}
