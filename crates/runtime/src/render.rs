//! Output renderer: a registry as normalized display text or structural JSON.

use codify_core::{AliasTable, ResourceObject};
use regex::Regex;
use thiserror::Error;

use crate::Registry;

/// Written between two rendered objects, never after the last one.
const DOCUMENT_DELIMITER: &str = "---\n\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// YAML per object, alias tokens shortened, timestamps and status dropped.
    #[default]
    Display,
    /// The full object list as indented JSON, unmodified.
    Structural,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("alias pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub fn render(registry: &Registry, encoding: Encoding, table: &AliasTable) -> Result<String, RenderError> {
    match encoding {
        Encoding::Structural => Ok(serde_json::to_string_pretty(registry.as_slice())?),
        Encoding::Display => {
            let aliases = AliasTokens::new(table)?;
            let docs = registry
                .iter()
                .map(|obj| display(obj, &aliases))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(docs.join(DOCUMENT_DELIMITER))
        }
    }
}

/// The status cut is by line prefix: any nested field literally named
/// `status` truncates the object there as well.
fn display(obj: &ResourceObject, aliases: &AliasTokens) -> Result<String, RenderError> {
    let yaml = serde_yaml::to_string(obj)?;
    let mut out = String::with_capacity(yaml.len());
    for line in yaml.lines() {
        let field = line.trim_start().trim_start_matches("- ");
        if field.starts_with("status:") {
            break;
        }
        if field.starts_with("creationTimestamp:") {
            continue;
        }
        out.push_str(&aliases.shorten(line));
        out.push('\n');
    }
    Ok(out)
}

struct AliasTokens<'t> {
    table: &'t AliasTable,
    pattern: Option<Regex>,
}

impl<'t> AliasTokens<'t> {
    fn new(table: &'t AliasTable) -> Result<Self, regex::Error> {
        let mut aliases: Vec<&str> = table.packages().map(|(_, alias)| alias).collect();
        // Longest first so no alias shadows one it prefixes.
        aliases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let pattern = if aliases.is_empty() {
            None
        } else {
            let alts: Vec<String> = aliases.iter().map(|a| regex::escape(a)).collect();
            Some(Regex::new(&format!(r"\b(?:{})\b", alts.join("|")))?)
        };
        Ok(Self { table, pattern })
    }

    fn shorten(&self, line: &str) -> String {
        let Some(re) = &self.pattern else { return line.to_string() };
        re.replace_all(line, |caps: &regex::Captures<'_>| {
            self.table.display_name(&caps[0]).unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
    }
}
