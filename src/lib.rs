// SPDX-License-Identifier: PMPL-1.0-or-later

//! mushcheck: analysis and scoring engine for MUSHcode script text.
//!
//! Given a piece of script text and an optional target dialect, the engine
//! reports syntax defects, security rule matches and best-practice
//! suggestions, and reduces them to three bounded quality scores.
//!
//! PASSES:
//! 1. **Syntax**: per-line shape checks plus whole-text bracket balance.
//! 2. **Security**: data-driven rules from a read-only catalogue.
//! 3. **Practices**: style, performance and maintainability heuristics.
//! 4. **Compat**: deprecated functions for the target dialect.
//!
//! Every pass is a pure function of the [`context::AnalysisContext`];
//! [`validator::Validator`] composes them.

pub mod batch;
pub mod catalogue;
pub mod compat;
pub mod config;
pub mod context;
pub mod error;
pub mod practices;
pub mod report;
pub mod scan;
pub mod score;
pub mod security;
pub mod syntax;
pub mod types;
pub mod validator;

pub use catalogue::{Catalogue, KnowledgeStore};
pub use config::{EngineConfig, ScoringWeights};
pub use context::{AnalysisOptions, AnalysisRequest};
pub use error::ValidationFailure;
pub use types::AnalysisResult;
pub use validator::Validator;
