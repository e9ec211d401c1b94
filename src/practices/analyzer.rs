// SPDX-License-Identifier: PMPL-1.0-or-later

//! Line heuristics behind the improvement suggestions

use super::patterns::{
    count_control_markers, is_one_of, CONDITIONAL_COMMANDS, CONDITIONAL_FUNCTIONS,
    EXPENSIVE_FUNCTIONS, FORCE_COMMANDS, FORCE_FUNCTIONS, ITERATION_COMMAND, ITERATION_FUNCTIONS,
    SANITIZERS,
};
use crate::context::AnalysisContext;
use crate::scan::{self, ScannedLine, SubstitutionKind};
use crate::types::{Effort, ImprovementFinding, ImprovementKind, IssueSeverity};
use std::collections::BTreeSet;

const MAX_POSITIONAL_PARAMETERS: usize = 5;
const MAX_SHORT_REGISTERS: usize = 3;
const MAGIC_NUMBER_FLOOR: u64 = 10;

pub struct Analyzer<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
}

impl<'c, 'a> Analyzer<'c, 'a> {
    pub fn new(ctx: &'c AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    /// Every scan over every code line, grouped by scan
    pub fn analyze(&self) -> Vec<ImprovementFinding> {
        let lines: Vec<(usize, &'a str, ScannedLine<'a>)> = self
            .ctx
            .code_lines()
            .map(|(number, text)| (number, text, ScannedLine::new(text)))
            .collect();

        let mut findings = Vec::new();
        for (number, text, scanned) in &lines {
            findings.extend(self.check_style(*number, text, scanned));
        }
        for (number, text, scanned) in &lines {
            findings.extend(self.check_performance(*number, text, scanned));
        }
        for (number, text, scanned) in &lines {
            findings.extend(self.check_maintainability(*number, text, scanned));
        }
        for (number, text, scanned) in &lines {
            findings.extend(self.check_readability(*number, text, scanned));
        }
        for (number, text, scanned) in &lines {
            findings.extend(self.check_security(*number, text, scanned));
        }
        findings
    }

    // ============================================================
    // Style
    // ============================================================

    fn check_style(&self, number: usize, text: &str, scanned: &ScannedLine<'_>) -> Vec<ImprovementFinding> {
        let mut findings = Vec::new();
        findings.extend(self.check_indentation(number, text));

        let branch_column = scanned
            .function_calls()
            .iter()
            .find(|call| is_one_of(call.name, CONDITIONAL_FUNCTIONS))
            .map(|call| call.column)
            .or_else(|| {
                scanned
                    .commands()
                    .iter()
                    .find(|cmd| is_one_of(cmd.name, CONDITIONAL_COMMANDS))
                    .map(|cmd| cmd.column)
            });

        if let Some(column) = branch_column {
            let inline_comment = text.contains("@@");
            let comment_above = number > 1 && scan::is_comment(self.ctx.line(number - 1));
            if !inline_comment && !comment_above {
                findings.push(ImprovementFinding {
                    message: "Conditional logic has no explanatory comment".to_string(),
                    before: text.to_string(),
                    after: format!("@@ Describe what each branch handles\n{}", text),
                    confidence: 0.6,
                    ..improvement(number, column, ImprovementKind::BestPractice, "style")
                });
            }
        }
        findings
    }

    fn check_indentation(&self, number: usize, text: &str) -> Option<ImprovementFinding> {
        let unit = self.ctx.config.indent_unit;
        let indent: String = text.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        if indent.is_empty() {
            return None;
        }
        let tabs = indent.chars().filter(|c| *c == '\t').count();
        let spaces = indent.len() - tabs;
        let mixed = tabs > 0 && spaces > 0;
        let misaligned = tabs == 0 && unit > 0 && spaces % unit != 0;
        if !mixed && !misaligned {
            return None;
        }

        let width = spaces + tabs * unit.max(1);
        let normalized = if unit > 0 { width.div_ceil(unit) * unit } else { width };
        let message = if mixed {
            "Indentation mixes tabs and spaces".to_string()
        } else {
            format!("Indentation of {} is not a multiple of {}", spaces, unit)
        };

        Some(ImprovementFinding {
            message,
            before: text.to_string(),
            after: format!("{}{}", " ".repeat(normalized), &text[indent.len()..]),
            confidence: 0.9,
            fixable: true,
            ..improvement(number, 1, ImprovementKind::BestPractice, "style")
        })
    }

    // ============================================================
    // Performance
    // ============================================================

    fn check_performance(&self, number: usize, text: &str, scanned: &ScannedLine<'_>) -> Vec<ImprovementFinding> {
        let mut findings = Vec::new();
        let calls = scanned.function_calls();

        for marker in EXPENSIVE_FUNCTIONS {
            let hits: Vec<_> = calls
                .iter()
                .filter(|call| call.name.eq_ignore_ascii_case(marker))
                .collect();
            if hits.len() >= 2 {
                findings.push(ImprovementFinding {
                    severity: IssueSeverity::Warning,
                    message: format!(
                        "{}() is evaluated {} times on one line",
                        marker,
                        hits.len()
                    ),
                    before: text.to_string(),
                    after: format!(
                        "[setq(0,{}(...))] once, then reuse %q0",
                        marker
                    ),
                    confidence: 0.7,
                    effort: Effort::Medium,
                    ..improvement(number, hits[1].column, ImprovementKind::Performance, "caching")
                });
            }
        }

        // (start, end, column) of every iteration construct
        let mut spans: Vec<(usize, usize, usize)> = calls
            .iter()
            .filter(|call| is_one_of(call.name, ITERATION_FUNCTIONS))
            .map(|call| {
                let end = scanned
                    .matching_paren(call.open_index)
                    .unwrap_or(scanned.chars().len());
                (call.open_index, end, call.column)
            })
            .collect();
        spans.extend(
            scanned
                .commands()
                .iter()
                .filter(|cmd| cmd.name.eq_ignore_ascii_case(ITERATION_COMMAND))
                .map(|cmd| (cmd.column - 1, scanned.chars().len(), cmd.column)),
        );

        let nested = spans.iter().find(|inner| {
            spans
                .iter()
                .any(|outer| outer.0 < inner.0 && inner.0 < outer.1)
        });
        if let Some(&(_, _, column)) = nested {
            findings.push(ImprovementFinding {
                severity: IssueSeverity::Warning,
                message: "Iteration nested inside another iteration".to_string(),
                before: text.to_string(),
                after: "Move the inner loop into its own attribute and call it with u()".to_string(),
                confidence: 0.75,
                effort: Effort::High,
                ..improvement(number, column, ImprovementKind::Performance, "nested_loop")
            });
        }
        findings
    }

    // ============================================================
    // Maintainability
    // ============================================================

    fn check_maintainability(&self, number: usize, text: &str, scanned: &ScannedLine<'_>) -> Vec<ImprovementFinding> {
        let mut findings = Vec::new();
        let chars = scanned.chars();

        let mut seen_numbers = BTreeSet::new();
        let mut idx = 0;
        while idx < chars.len() {
            let c = chars[idx];
            if !(c.is_code() && c.ch.is_ascii_digit()) {
                idx += 1;
                continue;
            }
            let mut end = idx;
            while end < chars.len() && chars[end].is_code() && chars[end].ch.is_ascii_digit() {
                end += 1;
            }
            let excluded = idx > 0 && {
                let prev = chars[idx - 1];
                prev.is_word() || matches!(prev.ch, '%' | '#' | '.')
            };
            let digits: String = chars[idx..end].iter().map(|d| d.ch).collect();
            if !excluded && digits.len() > 1 {
                if let Ok(value) = digits.parse::<u64>() {
                    if value > MAGIC_NUMBER_FLOOR && seen_numbers.insert(value) {
                        findings.push(ImprovementFinding {
                            message: format!("Magic number {}", value),
                            before: digits.clone(),
                            after: format!("v(LIMIT_{})", value),
                            confidence: 0.5,
                            ..improvement(number, c.column, ImprovementKind::Maintainability, "magic_number")
                        });
                    }
                }
            }
            idx = end;
        }

        let positionals: BTreeSet<u64> = scanned
            .substitutions()
            .iter()
            .filter_map(|sub| match sub.kind {
                SubstitutionKind::Positional(index) if index <= 9 => Some(index),
                _ => None,
            })
            .collect();
        if positionals.len() > MAX_POSITIONAL_PARAMETERS {
            findings.push(ImprovementFinding {
                severity: IssueSeverity::Warning,
                message: format!(
                    "{} positional parameters on one line",
                    positionals.len()
                ),
                before: text.to_string(),
                after: "Pass a delimited list and split it with extract() or setq()".to_string(),
                confidence: 0.8,
                effort: Effort::Medium,
                ..improvement(number, 1, ImprovementKind::Maintainability, "too_many_parameters")
            });
        }

        for (idx, c) in chars.iter().enumerate() {
            if c.ch != '#' || !c.is_code() {
                continue;
            }
            if idx > 0 && chars[idx - 1].ch == '%' {
                continue;
            }
            let digits: String = chars[idx + 1..]
                .iter()
                .take_while(|d| d.is_code() && d.ch.is_ascii_digit())
                .map(|d| d.ch)
                .collect();
            if digits.is_empty() {
                continue;
            }
            findings.push(ImprovementFinding {
                severity: IssueSeverity::Warning,
                message: format!("Hardcoded dbref #{}", digits),
                before: format!("#{}", digits),
                after: "v(TARGET_DBREF)".to_string(),
                confidence: 0.85,
                effort: Effort::Medium,
                ..improvement(number, c.column, ImprovementKind::Maintainability, "hardcoded_dbref")
            });
        }
        findings
    }

    // ============================================================
    // Readability
    // ============================================================

    fn check_readability(&self, number: usize, text: &str, scanned: &ScannedLine<'_>) -> Vec<ImprovementFinding> {
        let mut findings = Vec::new();

        let complexity = 1 + count_control_markers(scanned) + scanned.max_depth() / 2;
        if complexity > self.ctx.config.complexity_threshold {
            findings.push(ImprovementFinding {
                severity: IssueSeverity::Warning,
                message: format!(
                    "Expression complexity {} exceeds {}",
                    complexity, self.ctx.config.complexity_threshold
                ),
                before: text.to_string(),
                after: "Split the expression into named attributes called with u()".to_string(),
                confidence: 0.7,
                effort: Effort::Medium,
                ..improvement(number, 1, ImprovementKind::Readability, "complex_expression")
            });
        }

        let registers: BTreeSet<char> = scanned
            .substitutions()
            .iter()
            .filter_map(|sub| match sub.kind {
                SubstitutionKind::ShortRegister(reg) => Some(reg),
                _ => None,
            })
            .collect();
        if registers.len() > MAX_SHORT_REGISTERS {
            findings.push(ImprovementFinding {
                message: format!(
                    "{} single-character registers make the line hard to follow",
                    registers.len()
                ),
                before: text.to_string(),
                after: "Use named registers such as %q<total>".to_string(),
                confidence: 0.6,
                ..improvement(number, 1, ImprovementKind::Readability, "unclear_naming")
            });
        }
        findings
    }

    // ============================================================
    // Security hygiene
    // ============================================================

    fn check_security(&self, number: usize, text: &str, scanned: &ScannedLine<'_>) -> Vec<ImprovementFinding> {
        let calls = scanned.function_calls();
        let force_column = calls
            .iter()
            .find(|call| is_one_of(call.name, FORCE_FUNCTIONS))
            .map(|call| call.column)
            .or_else(|| {
                scanned
                    .commands()
                    .iter()
                    .find(|cmd| is_one_of(cmd.name, FORCE_COMMANDS))
                    .map(|cmd| cmd.column)
            });
        let Some(column) = force_column else {
            return Vec::new();
        };

        let has_positional = scanned
            .substitutions()
            .iter()
            .any(|sub| matches!(sub.kind, SubstitutionKind::Positional(_)));
        let sanitized = calls.iter().any(|call| is_one_of(call.name, SANITIZERS));
        if !has_positional || sanitized {
            return Vec::new();
        }

        vec![ImprovementFinding {
            severity: IssueSeverity::Warning,
            message: "User input reaches a forced command without sanitizing".to_string(),
            before: text.to_string(),
            after: secure_positionals(scanned),
            confidence: 0.8,
            effort: Effort::Medium,
            ..improvement(number, column, ImprovementKind::Security, "unsanitized_input")
        }]
    }
}

/// Defaults shared by every suggestion: info severity, low effort
fn improvement(line: usize, column: usize, kind: ImprovementKind, category: &str) -> ImprovementFinding {
    ImprovementFinding {
        line,
        column,
        kind,
        category: category.to_string(),
        severity: IssueSeverity::Info,
        message: String::new(),
        before: String::new(),
        after: String::new(),
        confidence: 0.5,
        effort: Effort::Low,
        fixable: false,
    }
}

/// The line with every positional reference wrapped in `secure()`
fn secure_positionals(scanned: &ScannedLine<'_>) -> String {
    let chars = scanned.chars();
    let mut out = String::with_capacity(scanned.text().len() + 16);
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        let starts_positional = c.ch == '%'
            && c.is_code()
            && chars
                .get(idx + 1)
                .is_some_and(|d| d.is_code() && d.ch.is_ascii_digit());
        if !starts_positional {
            out.push(c.ch);
            idx += 1;
            continue;
        }
        let mut end = idx + 1;
        while end < chars.len() && chars[end].is_code() && chars[end].ch.is_ascii_digit() {
            end += 1;
        }
        out.push_str("[secure(");
        out.extend(chars[idx..end].iter().map(|d| d.ch));
        out.push_str(")]");
        idx = end;
    }
    out
}
