//! YAML frontmatter reading and directive stripping.
//!
//! Handles the `---` delimited YAML frontmatter at the top of a note.
//! Format:
//! ```markdown
//! ---
//! tags: [daily]
//! spawn-destination: "Logs"
//! spawn-name: "{{date}}"
//! ---
//!
//! # Body content here
//! ```
//!
//! Edits work on the raw YAML text so that keys which are not removed
//! keep their exact formatting, comments, and order.

use serde_yaml::{Mapping, Value};

use crate::error::SpawnError;

/// Split a markdown file into frontmatter YAML and body content.
///
/// Returns `(yaml_str, body)` where `yaml_str` is the raw YAML between
/// `---` delimiters (including its final newline) and `body` is everything
/// after the closing `---` line.
///
/// # Errors
///
/// Returns [`SpawnError::Frontmatter`] if the file does not open with a
/// `---` line or the block is never closed.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), SpawnError> {
    let after_open = content
        .strip_prefix("---")
        .and_then(|rest| rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')))
        .ok_or_else(|| {
            SpawnError::Frontmatter("File must start with '---' frontmatter delimiter".to_string())
        })?;

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(SpawnError::Frontmatter(
        "No closing '---' frontmatter delimiter found".to_string(),
    ))
}

/// Parsed frontmatter that remembers the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    raw: String,
    map: Mapping,
    /// `"\r\n"` or `"\n"`, whichever the block was written with.
    newline: &'static str,
}

impl Frontmatter {
    /// Parse a raw YAML block.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Frontmatter`] if the YAML is malformed or is
    /// not a mapping.
    pub fn parse(yaml: &str) -> Result<Self, SpawnError> {
        let map = if yaml.trim().is_empty() {
            Mapping::new()
        } else {
            match serde_yaml::from_str::<Value>(yaml)
                .map_err(|e| SpawnError::Frontmatter(e.to_string()))?
            {
                Value::Mapping(map) => map,
                Value::Null => Mapping::new(),
                _ => {
                    return Err(SpawnError::Frontmatter(
                        "frontmatter must be a mapping".to_string(),
                    ))
                }
            }
        };

        Ok(Self {
            raw: yaml.to_string(),
            map,
            newline: line_ending(yaml),
        })
    }

    /// Parse the frontmatter of a whole note, or `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Frontmatter`] if a block is present but its YAML
    /// is malformed.
    pub fn from_document(content: &str) -> Result<Option<Self>, SpawnError> {
        match split_frontmatter(content) {
            Ok((yaml, _)) => Self::parse(yaml).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Scalar value for `key` as a string.
    ///
    /// Numbers and booleans are rendered as text. Null, sequences, and
    /// mappings count as absent.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The raw YAML text.
    #[must_use]
    pub fn as_yaml(&self) -> &str {
        &self.raw
    }

    /// Remove a top-level key. Removing an absent key does nothing.
    ///
    /// Returns whether the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.map.remove(key).is_none() {
            return false;
        }

        let edited = remove_key_lines(&self.raw, key);
        let consistent = Frontmatter::parse(&edited)
            .map(|fm| fm.map == self.map)
            .unwrap_or(false);

        self.raw = if consistent {
            edited
        } else {
            // Flow-style or otherwise unusual YAML: fall back to re-serializing.
            match serde_yaml::to_string(&self.map) {
                Ok(yaml) if self.newline == "\r\n" => yaml.replace('\n', "\r\n"),
                Ok(yaml) => yaml,
                Err(_) => edited,
            }
        };
        if self.map.is_empty() && self.raw.trim() == "{}" {
            self.raw.clear();
        }
        true
    }

    /// Render a full note from this frontmatter and `body`.
    ///
    /// An emptied block is dropped entirely.
    #[must_use]
    pub fn render_document(&self, body: &str) -> String {
        if self.raw.trim().is_empty() {
            return body.to_string();
        }

        let mut output = String::with_capacity(self.raw.len() + body.len() + 10);
        output.push_str("---");
        output.push_str(self.newline);
        output.push_str(&self.raw);
        if !self.raw.ends_with('\n') {
            output.push_str(self.newline);
        }
        output.push_str("---");
        output.push_str(self.newline);
        output.push_str(body);
        output
    }
}

/// Apply `mutate` to the frontmatter of `content`, leaving the body alone.
///
/// Returns `content` unchanged when it has no frontmatter or when
/// `mutate` leaves the block as it was.
///
/// # Errors
///
/// Returns [`SpawnError::Frontmatter`] if the existing block is malformed.
pub fn rewrite_frontmatter(
    content: &str,
    mutate: &mut dyn FnMut(&mut Frontmatter),
) -> Result<String, SpawnError> {
    let Ok((yaml, body)) = split_frontmatter(content) else {
        return Ok(content.to_string());
    };

    let mut frontmatter = Frontmatter::parse(yaml)?;
    frontmatter.newline = line_ending(&content[..content.len() - body.len()]);
    mutate(&mut frontmatter);

    if frontmatter.raw == yaml {
        return Ok(content.to_string());
    }
    Ok(frontmatter.render_document(body))
}

fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Top-level key declared on `line`, if any.
fn line_key(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if first.is_whitespace() || first == '#' || first == '-' {
        return None;
    }

    if first == '"' || first == '\'' {
        let rest = &line[1..];
        let close = rest.find(first)?;
        return rest[close + 1..]
            .trim_start()
            .starts_with(':')
            .then_some(&rest[..close]);
    }

    let colon = line.char_indices().find_map(|(i, c)| {
        (c == ':' && line[i + 1..].chars().next().is_none_or(char::is_whitespace)).then_some(i)
    })?;
    Some(line[..colon].trim_end())
}

/// Whether `line` belongs to the value of the preceding key.
fn is_continuation(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t') || line.starts_with('-')
}

/// Drop the line declaring `key` and every line of its value.
fn remove_key_lines(raw: &str, key: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut skipping = false;
    // Blank lines seen while skipping; kept only if the value has ended.
    let mut pending = String::new();

    for line in raw.split_inclusive('\n') {
        if skipping {
            if line.trim().is_empty() {
                pending.push_str(line);
                continue;
            }
            if is_continuation(line) {
                pending.clear();
                continue;
            }
            skipping = false;
            output.push_str(&pending);
            pending.clear();
        }

        if line_key(line) == Some(key) {
            skipping = true;
            continue;
        }
        output.push_str(line);
    }

    output.push_str(&pending);
    output
}
