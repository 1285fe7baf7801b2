//! Policy file adapter
//!
//! Reads and writes casbin-style policy CSV:
//!
//! ```text
//! # grants
//! p, writer, domain1, data1, read
//! # assignments
//! g, alice, writer, domain1
//! p, "ops, eu", domain1, "reports,2024", read
//! ```
//!
//! Values that would not survive the trip unquoted (a comma, a double
//! quote, surrounding whitespace, a leading `#`, or the empty string) are
//! written in double quotes with `""` standing for a literal quote. Line
//! breaks cannot be stored at all.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gate_rbac::{AdapterResult, Assignment, Grant, PolicyAdapter, PolicySnapshot};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

const GRANT_SECTION: &str = "p";
const ASSIGNMENT_SECTION: &str = "g";

/// Split one policy line into its unquoted fields
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let field = if chars.next_if_eq(&'"').is_some() {
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => value.push('"'),
                    Some('"') => break,
                    Some(c) => value.push(c),
                    None => return Err(format!("unterminated quoted value in field {}", fields.len() + 1)),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if let Some(c) = chars.peek().filter(|c| **c != ',') {
                return Err(format!("unexpected '{c}' after quoted value in field {}", fields.len() + 1));
            }
            value
        } else {
            let mut value = String::new();
            while let Some(c) = chars.next_if(|c| *c != ',') {
                value.push(c);
            }
            value.trim_end().to_string()
        };

        fields.push(field);
        // Either the separating comma or the end of the line
        if chars.next().is_none() {
            break;
        }
    }

    Ok(fields)
}

/// Parse policy text into grants and assignments, in file order
///
/// Blank lines and `#` comments are skipped. Line numbers in errors are
/// 1-based.
pub fn parse_policy(text: &str) -> StorageResult<PolicySnapshot> {
    let mut snapshot = PolicySnapshot::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = split_fields(line).map_err(|message| StorageError::malformed(index + 1, message))?;
        let (section, values) = match fields.split_first() {
            Some((section, values)) => (section.as_str(), values),
            None => continue,
        };

        match (section, values) {
            (GRANT_SECTION, [role, domain, module, action]) => {
                snapshot
                    .grants
                    .push(Grant::new(role.as_str(), domain.as_str(), module.as_str(), action.as_str()));
            }
            (ASSIGNMENT_SECTION, [user, role, domain]) => {
                snapshot
                    .assignments
                    .push(Assignment::new(user.as_str(), role.as_str(), domain.as_str()));
            }
            (GRANT_SECTION, _) => {
                return Err(StorageError::malformed(
                    index + 1,
                    format!("expected 4 fields after 'p', found {}", values.len()),
                ));
            }
            (ASSIGNMENT_SECTION, _) => {
                return Err(StorageError::malformed(
                    index + 1,
                    format!("expected 3 fields after 'g', found {}", values.len()),
                ));
            }
            (other, _) => {
                return Err(StorageError::malformed(index + 1, format!("unknown section '{other}'")));
            }
        }
    }

    Ok(snapshot)
}

/// Encode one value for a policy line
fn encode_value(value: &str) -> StorageResult<Cow<'_, str>> {
    if value.contains(['\n', '\r']) {
        return Err(StorageError::Unencodable(value.to_string()));
    }

    let needs_quotes = value.is_empty()
        || value.contains([',', '"'])
        || value.starts_with('#')
        || value.trim() != value;

    if needs_quotes {
        Ok(Cow::Owned(format!("\"{}\"", value.replace('"', "\"\""))))
    } else {
        Ok(Cow::Borrowed(value))
    }
}

fn push_line(out: &mut String, section: &str, values: &[&str]) -> StorageResult<()> {
    out.push_str(section);
    for value in values {
        out.push_str(", ");
        out.push_str(&encode_value(value)?);
    }
    out.push('\n');
    Ok(())
}

/// Render relations as policy text: every grant line, then every assignment line
///
/// Fails when a value contains a line break.
pub fn render_policy(grants: &[Grant], assignments: &[Assignment]) -> StorageResult<String> {
    let mut out = String::new();
    for grant in grants {
        push_line(
            &mut out,
            GRANT_SECTION,
            &[grant.role.as_str(), grant.domain.as_str(), grant.module.as_str(), grant.action.as_str()],
        )?;
    }
    for assignment in assignments {
        push_line(
            &mut out,
            ASSIGNMENT_SECTION,
            &[assignment.user.as_str(), assignment.role.as_str(), assignment.domain.as_str()],
        )?;
    }
    Ok(out)
}

/// Adapter persisting relations to a policy file
#[derive(Debug, Clone)]
pub struct FileAdapter {
    path: PathBuf,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> StorageResult<PolicySnapshot> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        parse_policy(&text)
    }

    /// Replace the file contents in one step
    ///
    /// Content goes to a temporary file next to the target, which is then
    /// renamed over it, so readers never see a partial policy.
    async fn write(&self, contents: String) -> StorageResult<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, contents.as_bytes()))
            .await
            .map_err(|e| StorageError::io(&self.path, std::io::Error::other(e)))?
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    file.write_all(contents).map_err(|e| StorageError::io(file.path(), e))?;
    file.as_file().sync_all().map_err(|e| StorageError::io(file.path(), e))?;
    file.persist(path).map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

#[async_trait]
impl PolicyAdapter for FileAdapter {
    async fn load_all(&self) -> AdapterResult<PolicySnapshot> {
        let snapshot = self.read().await?;
        debug!(
            path = %self.path.display(),
            grants = snapshot.grants.len(),
            assignments = snapshot.assignments.len(),
            "Read policy file"
        );
        Ok(snapshot)
    }

    async fn save_all(&self, grants: &[Grant], assignments: &[Assignment]) -> AdapterResult<()> {
        self.write(render_policy(grants, assignments)?).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
