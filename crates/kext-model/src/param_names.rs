//! Parameter-name index.
//!
//! Class files compiled without `-parameters` carry no names. An index maps
//! `owner.method(type,type)` keys to comma separated names, in the
//! `.properties` format:
//!
//! ```text
//! org.gradle.api.Project.copy(org.gradle.api.Action)=action
//! org.gradle.api.Project.exec(java.lang.String,java.lang.Object[])=cmd,args
//! ```

use std::collections::HashMap;
use std::path::Path;

/// Looks up declared parameter names for a method key.
pub trait ParameterNames {
    fn parameter_names(&self, key: &str) -> Option<Vec<String>>;
}

/// No index configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoParameterNames;

impl ParameterNames for NoParameterNames {
    fn parameter_names(&self, _key: &str) -> Option<Vec<String>> {
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterNameIndex {
    entries: HashMap<String, Vec<String>>,
}

impl ParameterNameIndex {
    /// Parses an index; later duplicates of a key replace earlier ones.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let chars: Vec<char> = text.chars().collect();
        let mut offset = 0usize;
        while offset < chars.len() {
            let line = read_logical_line(&chars, &mut offset);
            let Some((key, value)) = parse_logical_line(&line) else {
                continue;
            };
            let names = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
            entries.insert(key, names);
        }
        Self { entries }
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let index = Self::parse(&text);
        tracing::debug!(
            target = "kext.model",
            path = %path.display(),
            entries = index.len(),
            "loaded parameter name index"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ParameterNames for ParameterNameIndex {
    fn parameter_names(&self, key: &str) -> Option<Vec<String>> {
        self.entries.get(key).cloned()
    }
}

/// Builds the index key for a method: `owner.name(p1,p2)`.
pub fn parameter_names_key(owner: &str, method: &str, parameter_types: &[String]) -> String {
    format!("{owner}.{method}({})", parameter_types.join(","))
}

fn read_logical_line(chars: &[char], offset: &mut usize) -> Vec<char> {
    let mut out = Vec::new();
    loop {
        let start = *offset;
        let mut end = start;
        while end < chars.len() && chars[end] != '\n' {
            end += 1;
        }
        let mut content_end = end;
        if content_end > start && chars[content_end - 1] == '\r' {
            content_end -= 1;
        }

        let segment = &chars[start..content_end];
        let continues = ends_with_unescaped_backslash(segment);
        let copy_end = if continues { segment.len() - 1 } else { segment.len() };
        out.extend_from_slice(&segment[..copy_end]);

        *offset = if end < chars.len() { end + 1 } else { end };
        if !continues {
            return out;
        }
        while *offset < chars.len() && is_whitespace(chars[*offset]) {
            *offset += 1;
        }
    }
}

fn ends_with_unescaped_backslash(line: &[char]) -> bool {
    line.iter().rev().take_while(|c| **c == '\\').count() % 2 == 1
}

fn parse_logical_line(line: &[char]) -> Option<(String, String)> {
    let mut i = 0usize;
    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }
    if i >= line.len() || line[i] == '#' || line[i] == '!' {
        return None;
    }

    let key_start = i;
    while i < line.len() {
        match line[i] {
            '\\' => i += 2,
            '=' | ':' => break,
            c if is_whitespace(c) => break,
            _ => i += 1,
        }
    }
    let key_end = i.min(line.len());

    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }
    if i < line.len() && (line[i] == '=' || line[i] == ':') {
        i += 1;
    }
    while i < line.len() && is_whitespace(line[i]) {
        i += 1;
    }

    Some((unescape(&line[key_start..key_end]), unescape(&line[i..])))
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0C')
}

fn unescape(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1;
        let Some(&escaped) = chars.get(i) else {
            out.push('\\');
            break;
        };
        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0C'),
            'u' => {
                let decoded = chars
                    .get(i + 1..i + 5)
                    .map(|hex| hex.iter().collect::<String>())
                    .and_then(|hex| u32::from_str_radix(&hex, 16).ok())
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        i += 4;
                    }
                    None => out.push('u'),
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    out
}
