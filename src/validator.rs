// SPDX-License-Identifier: PMPL-1.0-or-later

//! The analysis entry point
//!
//! [`Validator::analyze`] validates a request, builds the read-only
//! [`AnalysisContext`], runs each pass over it and assembles one
//! [`AnalysisResult`]. Passes share nothing but the context; their
//! findings are concatenated.

use crate::catalogue::KnowledgeStore;
use crate::compat;
use crate::config::EngineConfig;
use crate::context::{AnalysisContext, AnalysisRequest};
use crate::error::ValidationFailure;
use crate::practices;
use crate::score;
use crate::security;
use crate::syntax;
use crate::types::AnalysisResult;
use tracing::debug;

pub struct Validator<'s> {
    store: &'s dyn KnowledgeStore,
    config: EngineConfig,
}

impl<'s> Validator<'s> {
    pub fn new(store: &'s dyn KnowledgeStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: &'s dyn KnowledgeStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check the request and resolve its dialect. A blank dialect id
    /// counts as none.
    pub fn prepare<'r>(
        &'r self,
        request: &'r AnalysisRequest,
    ) -> Result<AnalysisContext<'r>, ValidationFailure> {
        request.check_text(&self.config)?;

        let dialect = match request.dialect_id().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Some(self.store.dialect(id).ok_or_else(|| {
                ValidationFailure::UnknownDialect {
                    dialect_id: id.to_string(),
                }
            })?),
            None => None,
        };

        Ok(AnalysisContext::new(
            request.text(),
            dialect,
            request.options(),
            &self.config,
        ))
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ValidationFailure> {
        let ctx = self.prepare(request)?;
        debug!(
            lines = ctx.total_lines(),
            dialect = ctx.dialect.map(|d| d.id.as_str()).unwrap_or("none"),
            "analysis started"
        );

        let syntax_findings = syntax::validate(&ctx);
        let security_findings = if ctx.options.check_security {
            security::scan(&ctx, self.store.security_rules())
        } else {
            Vec::new()
        };
        let improvements = if ctx.options.check_best_practices {
            practices::analyze(&ctx)
        } else {
            Vec::new()
        };
        let compatibility_notes = compat::check(&ctx);
        let scores = score::score(&ctx, &security_findings, &improvements);

        Ok(AnalysisResult {
            is_valid: !syntax_findings.iter().any(|f| f.is_error()),
            syntax_findings,
            security_findings,
            improvements,
            compatibility_notes,
            total_lines: ctx.total_lines(),
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::context::AnalysisOptions;

    #[test]
    fn test_rejects_blank_text() {
        let catalogue = Catalogue::default();
        let validator = Validator::new(&catalogue);
        let err = validator.analyze(&AnalysisRequest::new("   ")).unwrap_err();
        assert_eq!(err, ValidationFailure::EmptyText);
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let catalogue = Catalogue::default();
        let validator = Validator::new(&catalogue);
        let request = AnalysisRequest::new("think hi").with_dialect("nosuchmush");
        let err = validator.analyze(&request).unwrap_err();
        assert_eq!(err.field(), "dialectId");
    }

    #[test]
    fn test_blank_dialect_is_none() {
        let catalogue = Catalogue::default();
        let validator = Validator::new(&catalogue);
        let request = AnalysisRequest::new("think hi").with_dialect("  ");
        assert!(validator.analyze(&request).is_ok());
    }

    #[test]
    fn test_flags_disable_passes() {
        let catalogue = Catalogue::builtin().unwrap();
        let validator = Validator::new(&catalogue);
        let request = AnalysisRequest::new("@force me=%0\nthink password=\"x\"").with_options(
            AnalysisOptions {
                strict_mode: false,
                check_security: false,
                check_best_practices: false,
            },
        );
        let result = validator.analyze(&request).unwrap();
        assert!(result.security_findings.is_empty());
        assert!(result.improvements.is_empty());
        assert_eq!(result.scores.security_score, 100);
    }

    #[test]
    fn test_clean_script() {
        let catalogue = Catalogue::builtin().unwrap();
        let validator = Validator::new(&catalogue);
        let request = AnalysisRequest::new("@@ greet the player\n@pemit %#=Hello, [name(%#)]!")
            .with_dialect("pennmush");
        let result = validator.analyze(&request).unwrap();
        assert!(result.is_valid);
        assert!(result.syntax_findings.is_empty());
        assert!(result.security_findings.is_empty());
        assert_eq!(result.total_lines, 2);
        assert_eq!(result.scores.security_score, 100);
    }
}
