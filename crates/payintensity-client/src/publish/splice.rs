use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::publish::write_artifact;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceFailure {
    NotFound,
    Ambiguous { matches: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct SpliceReport {
    pub path: String,
    pub declaration: String,
    pub changed: bool,
}

pub fn splice_declaration(
    document: &str,
    declaration: &str,
    block: &str,
) -> Result<String, SpliceFailure> {
    let opening = Regex::new(&format!(
        r"(?m)\bconst\s+{}\s*=\s*\{{[ \t\r]*$",
        regex::escape(declaration)
    ))
        .map_err(|_| SpliceFailure::NotFound)?;

    let openings = opening.find_iter(document).collect::<Vec<_>>();
    let open_end = match openings.as_slice() {
        [] => return Err(SpliceFailure::NotFound),
        [only] => only.end(),
        many => {
            return Err(SpliceFailure::Ambiguous {
                matches: many.len(),
            });
        }
    };

    let closing = Regex::new(r"\n[ \t]*\};").map_err(|_| SpliceFailure::NotFound)?;
    let close_start = closing
        .find(&document[open_end..])
        .map(|found| open_end + found.start())
        .ok_or(SpliceFailure::NotFound)?;

    let mut spliced = String::with_capacity(document.len() + block.len());
    spliced.push_str(&document[..open_end]);
    spliced.push('\n');
    spliced.push_str(block);
    spliced.push_str(&document[close_start..]);
    Ok(spliced)
}

pub fn splice_file(path: &Path, declaration: &str, block: &str) -> ClientResult<SpliceReport> {
    let document = fs::read_to_string(path)
        .map_err(|error| ClientError::input_unreadable(path, &error.to_string()))?;

    let spliced = splice_declaration(&document, declaration, block).map_err(|failure| match failure {
        SpliceFailure::NotFound => ClientError::splice_target_not_found(path, declaration),
        SpliceFailure::Ambiguous { matches } => {
            ClientError::splice_target_ambiguous(path, declaration, matches)
        }
    })?;

    let changed = spliced != document;
    if changed {
        write_artifact(path, &spliced)?;
    }
    info!(path = %path.display(), declaration, changed, "spliced script block");

    Ok(SpliceReport {
        path: path.display().to_string(),
        declaration: declaration.to_string(),
        changed,
    })
}
