// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-line syntax checks

use crate::config::EngineConfig;
use crate::context::AnalysisContext;
use crate::scan::{BracketKind, ScannedLine, SubstitutionKind};
use crate::types::{SyntaxCode, SyntaxFinding};

/// All per-line checks for one code line, in a fixed order
pub fn check_line(ctx: &AnalysisContext<'_>, number: usize, text: &str) -> Vec<SyntaxFinding> {
    let scanned = ScannedLine::new(text);
    let mut findings = Vec::new();

    findings.extend(check_characters(number, &scanned));
    findings.extend(check_brackets(number, &scanned));
    findings.extend(check_string_termination(number, &scanned));
    findings.extend(check_function_calls(ctx, number, &scanned));
    findings.extend(check_attribute_name(ctx.config, number, text));
    findings.extend(check_variables(ctx.config, number, &scanned));
    findings.extend(check_command(ctx.config, number, &scanned));
    if ctx.options.strict_mode {
        findings.extend(check_line_length(ctx.config, number, text));
    }

    findings
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub fn check_characters(number: usize, scanned: &ScannedLine<'_>) -> Vec<SyntaxFinding> {
    scanned
        .chars()
        .iter()
        .filter(|c| c.ch.is_control() && c.ch != '\t')
        .map(|c| {
            SyntaxFinding::error(
                number,
                c.column,
                SyntaxCode::InvalidCharacter,
                format!("Invalid control character U+{:04X}", c.ch as u32),
                "Remove the control character",
            )
            .fixable()
        })
        .collect()
}

pub fn check_brackets(number: usize, scanned: &ScannedLine<'_>) -> Vec<SyntaxFinding> {
    let mut findings = Vec::new();
    let mut stack: Vec<(BracketKind, usize)> = Vec::new();

    for c in scanned.chars() {
        if let Some(kind) = c.opens() {
            stack.push((kind, c.column));
            continue;
        }
        let Some(kind) = c.closes() else {
            continue;
        };

        match stack.iter().rposition(|(open, _)| *open == kind) {
            None => findings.push(SyntaxFinding::error(
                number,
                c.column,
                SyntaxCode::UnmatchedClosingBracket,
                format!("Unmatched closing '{}'", kind.close_char()),
                format!(
                    "Remove it or add a matching '{}' before it",
                    kind.open_char()
                ),
            )),
            Some(pos) if pos + 1 == stack.len() => {
                stack.pop();
            }
            Some(pos) => {
                let (top, top_column) = stack[stack.len() - 1];
                findings.push(SyntaxFinding::error(
                    number,
                    c.column,
                    SyntaxCode::MismatchedBracket,
                    format!(
                        "Found '{}' but '{}' opened at column {} is still open",
                        kind.close_char(),
                        top.open_char(),
                        top_column
                    ),
                    format!("Close '{}' with '{}' first", top.open_char(), top.close_char()),
                ));
                stack.truncate(pos);
            }
        }
    }

    findings.extend(stack.into_iter().map(|(kind, column)| {
        SyntaxFinding::error(
            number,
            column,
            SyntaxCode::UnclosedBracket,
            format!("Unclosed '{}'", kind.open_char()),
            format!("Add a matching '{}'", kind.close_char()),
        )
    }));
    findings
}

pub fn check_string_termination(number: usize, scanned: &ScannedLine<'_>) -> Vec<SyntaxFinding> {
    scanned
        .unterminated_literal()
        .map(|column| {
            SyntaxFinding::error(
                number,
                column,
                SyntaxCode::UnterminatedString,
                "Unterminated string literal",
                "Close the string with '\"' on the same line",
            )
        })
        .into_iter()
        .collect()
}

pub fn check_function_calls(
    ctx: &AnalysisContext<'_>,
    number: usize,
    scanned: &ScannedLine<'_>,
) -> Vec<SyntaxFinding> {
    let mut findings = Vec::new();

    for call in scanned.function_calls() {
        if call.space_after_paren {
            let column = scanned.chars()[call.open_index].column + 1;
            findings.push(
                SyntaxFinding::warning(
                    number,
                    column,
                    SyntaxCode::SpaceAfterParen,
                    format!("Space after '(' in call to {}()", call.name),
                    format!("Write {}(arg, ...) without the leading space", call.name),
                )
                .fixable(),
            );
        }

        let Some(dialect) = ctx.dialect else {
            continue;
        };
        match dialect.function(call.name) {
            Some(function) if function.deprecated => {
                let suggestion = match &function.replacement {
                    Some(replacement) => format!("Use {}() instead", replacement),
                    None => "Replace it with a supported alternative".to_string(),
                };
                let finding = SyntaxFinding::warning(
                    number,
                    call.column,
                    SyntaxCode::DeprecatedFunction,
                    format!(
                        "Function '{}' is deprecated in {}",
                        call.name, dialect.name
                    ),
                    suggestion,
                );
                findings.push(if function.replacement.is_some() {
                    finding.fixable()
                } else {
                    finding
                });
            }
            None if ctx.options.strict_mode && !dialect.functions.is_empty() => {
                findings.push(SyntaxFinding::warning(
                    number,
                    call.column,
                    SyntaxCode::UnknownFunction,
                    format!(
                        "Function '{}' is not in the {} catalogue",
                        call.name, dialect.name
                    ),
                    "Check the spelling or the target dialect",
                ));
            }
            _ => {}
        }
    }
    findings
}

/// `&NAME object=value` attribute sets
pub fn check_attribute_name(config: &EngineConfig, number: usize, text: &str) -> Vec<SyntaxFinding> {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed.strip_prefix('&') else {
        return Vec::new();
    };
    let name = rest
        .split(|c: char| c.is_whitespace() || c == '=')
        .next()
        .unwrap_or("");
    if name.is_empty() {
        return Vec::new();
    }

    let column = text.chars().count() - trimmed.chars().count() + 2;
    let mut findings = Vec::new();
    if !is_identifier(name) {
        findings.push(SyntaxFinding::error(
            number,
            column,
            SyntaxCode::InvalidAttributeName,
            format!("Invalid attribute name '{}'", name),
            "Attribute names must start with a letter or '_' and contain only letters, digits and '_'",
        ));
    }
    let length = name.chars().count();
    if length > config.max_attribute_name_length {
        findings.push(SyntaxFinding::error(
            number,
            column,
            SyntaxCode::AttributeNameTooLong,
            format!(
                "Attribute name is {} characters long (maximum {})",
                length, config.max_attribute_name_length
            ),
            "Shorten the attribute name",
        ));
    }
    findings
}

pub fn check_variables(
    config: &EngineConfig,
    number: usize,
    scanned: &ScannedLine<'_>,
) -> Vec<SyntaxFinding> {
    let mut findings = Vec::new();
    for sub in scanned.substitutions() {
        match sub.kind {
            SubstitutionKind::Positional(index) if index > config.max_variable_index => {
                findings.push(SyntaxFinding::warning(
                    number,
                    sub.column,
                    SyntaxCode::VariableOutOfRange,
                    format!(
                        "Variable reference %{} is outside 0-{}",
                        index, config.max_variable_index
                    ),
                    "Use a register or a named attribute instead",
                ));
            }
            SubstitutionKind::NamedRegister { name, closed } if !closed || !is_identifier(name) => {
                findings.push(SyntaxFinding::error(
                    number,
                    sub.column,
                    SyntaxCode::InvalidVariableReference,
                    format!("Invalid register reference %q<{}", name),
                    "Register names must be identifiers written as %q<name>",
                ));
            }
            _ => {}
        }
    }
    findings
}

/// `@command` lines: name length and the trailing-`;` convention
pub fn check_command(
    config: &EngineConfig,
    number: usize,
    scanned: &ScannedLine<'_>,
) -> Vec<SyntaxFinding> {
    let mut findings = Vec::new();
    let Some(first) = scanned.chars().iter().find(|c| !c.ch.is_whitespace()) else {
        return findings;
    };
    if first.ch != '@' {
        return findings;
    }
    let Some(command) = scanned
        .commands()
        .into_iter()
        .find(|c| c.column == first.column)
    else {
        return findings;
    };

    let length = command.name.chars().count();
    if length > config.max_command_name_length {
        findings.push(SyntaxFinding::warning(
            number,
            command.column,
            SyntaxCode::CommandNameTooLong,
            format!(
                "Command name '@{}' is {} characters long (maximum {})",
                command.name, length, config.max_command_name_length
            ),
            "Use a shorter command name",
        ));
    }

    if let Some(last) = scanned.chars().iter().rev().find(|c| !c.ch.is_whitespace()) {
        if last.ch == ';' && last.is_code() {
            findings.push(
                SyntaxFinding::info(
                    number,
                    last.column,
                    SyntaxCode::TrailingSemicolon,
                    "Trailing ';' adds an empty action",
                    "Remove the trailing ';'",
                )
                .fixable(),
            );
        }
    }
    findings
}

pub fn check_line_length(config: &EngineConfig, number: usize, text: &str) -> Vec<SyntaxFinding> {
    let length = text.chars().count();
    if length <= config.max_line_length {
        return Vec::new();
    }
    vec![SyntaxFinding::warning(
        number,
        config.max_line_length + 1,
        SyntaxCode::LineTooLong,
        format!(
            "Line is {} characters long (maximum {})",
            length, config.max_line_length
        ),
        "Split the line or move logic into a separate attribute",
    )]
}
