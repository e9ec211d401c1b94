// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read-only dialect and security-rule catalogues
//!
//! The engine never owns catalogue data. It reads it through
//! [`KnowledgeStore`], which callers implement over whatever backs their
//! knowledge store. [`Catalogue`] is the in-memory implementation used by
//! the binary and the tests, loadable from YAML or JSON.

use crate::types::{Dialect, SecurityRule};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUILTIN_CATALOGUE: &str = include_str!("builtin.yaml");

/// Read-only queries the engine makes against the knowledge store
pub trait KnowledgeStore: Send + Sync {
    /// Resolve a dialect by id (or display name)
    fn dialect(&self, id: &str) -> Option<&Dialect>;

    /// Every security rule, in catalogue order
    fn security_rules(&self) -> &[SecurityRule];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub dialects: Vec<Dialect>,
    #[serde(default)]
    pub rules: Vec<SecurityRule>,
}

impl Catalogue {
    /// The seed catalogue shipped with the crate
    pub fn builtin() -> Result<Self> {
        serde_yaml::from_str(BUILTIN_CATALOGUE).context("parsing builtin catalogue")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading catalogue {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content)
                .with_context(|| format!("parsing json catalogue {}", path.display())),
            Some("yaml") | Some("yml") => Self::from_yaml(&content)
                .with_context(|| format!("parsing yaml catalogue {}", path.display())),
            _ => Err(anyhow!(
                "unsupported catalogue extension for {}",
                path.display()
            )),
        }
    }

    /// Overlay `other` on this catalogue. Entries with the same id replace
    /// existing ones in place; new entries are appended.
    pub fn merge(mut self, other: Catalogue) -> Self {
        for dialect in other.dialects {
            match self.dialects.iter_mut().find(|d| d.id == dialect.id) {
                Some(existing) => *existing = dialect,
                None => self.dialects.push(dialect),
            }
        }
        for rule in other.rules {
            match self.rules.iter_mut().find(|r| r.id == rule.id) {
                Some(existing) => *existing = rule,
                None => self.rules.push(rule),
            }
        }
        self
    }
}

impl KnowledgeStore for Catalogue {
    fn dialect(&self, id: &str) -> Option<&Dialect> {
        let id = id.trim();
        self.dialects
            .iter()
            .find(|d| d.id.eq_ignore_ascii_case(id))
            .or_else(|| self.dialects.iter().find(|d| d.is_named(id)))
    }

    fn security_rules(&self) -> &[SecurityRule] {
        &self.rules
    }
}
