// SPDX-License-Identifier: PMPL-1.0-or-later

//! Marker tables for the best-practice heuristics and the scorer
//!
//! Function names are listed without the `(`; command names without the
//! `@`. Matching is case-insensitive, as MUSH servers resolve both.

use crate::scan::ScannedLine;

/// Branching functions
pub const CONDITIONAL_FUNCTIONS: &[&str] = &["switch", "switchall", "if", "ifelse", "case", "caseall"];

/// Branching commands
pub const CONDITIONAL_COMMANDS: &[&str] = &["switch", "select", "if"];

/// Functions that walk the database or the connection list
pub const EXPENSIVE_FUNCTIONS: &[&str] = &[
    "lsearch",
    "search",
    "nsearch",
    "lwho",
    "lattr",
    "children",
    "entrances",
    "lcon",
    "lexits",
    "sql",
];

/// List-iteration functions
pub const ITERATION_FUNCTIONS: &[&str] = &[
    "iter", "map", "filter", "fold", "parse", "step", "foreach", "munge", "sortby",
];

/// `@dolist` runs to the end of its line
pub const ITERATION_COMMAND: &str = "dolist";

/// Calls that run code or commands on behalf of someone else
pub const FORCE_FUNCTIONS: &[&str] = &["force", "trigger", "objeval"];
pub const FORCE_COMMANDS: &[&str] = &["force", "trigger"];

/// Calls that neutralize user input before evaluation
pub const SANITIZERS: &[&str] = &["secure", "escape", "decompose"];

pub fn is_one_of(name: &str, table: &[&str]) -> bool {
    table.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}

/// Branching and iteration constructs on one line, function calls and
/// `@commands` together
pub fn count_control_markers(scanned: &ScannedLine<'_>) -> usize {
    let functions = scanned
        .function_calls()
        .iter()
        .filter(|call| {
            is_one_of(call.name, CONDITIONAL_FUNCTIONS) || is_one_of(call.name, ITERATION_FUNCTIONS)
        })
        .count();
    let commands = scanned
        .commands()
        .iter()
        .filter(|cmd| {
            is_one_of(cmd.name, CONDITIONAL_COMMANDS) || cmd.name.eq_ignore_ascii_case(ITERATION_COMMAND)
        })
        .count();
    functions + commands
}
