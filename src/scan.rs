// SPDX-License-Identifier: PMPL-1.0-or-later

//! Quote/escape-aware character walk
//!
//! Every structural check (bracket matching, nesting depth, function-call
//! detection, substitution parsing) goes through [`LineScanner`], so all
//! passes agree on what is code and what is inside a string literal.
//!
//! Rules:
//! - `"` toggles literal state unless it is escaped.
//! - `\` consumes exactly the next character; an escaped `\` does not
//!   escape again.
//! - Literal state never crosses a line boundary.

pub const QUOTE: char = '"';
pub const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    Paren,
    Square,
    Brace,
}

impl BracketKind {
    pub const ALL: [BracketKind; 3] = [BracketKind::Paren, BracketKind::Square, BracketKind::Brace];

    pub fn from_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(BracketKind::Paren),
            '[' => Some(BracketKind::Square),
            '{' => Some(BracketKind::Brace),
            _ => None,
        }
    }

    pub fn from_close(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(BracketKind::Paren),
            ']' => Some(BracketKind::Square),
            '}' => Some(BracketKind::Brace),
            _ => None,
        }
    }

    pub fn open_char(self) -> char {
        match self {
            BracketKind::Paren => '(',
            BracketKind::Square => '[',
            BracketKind::Brace => '{',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            BracketKind::Paren => ')',
            BracketKind::Square => ']',
            BracketKind::Brace => '}',
        }
    }

    fn index(self) -> usize {
        match self {
            BracketKind::Paren => 0,
            BracketKind::Square => 1,
            BracketKind::Brace => 2,
        }
    }
}

/// How the walk classified a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Structural: outside any literal and not escaped
    Code,
    /// An escape marker that will consume the next character
    Escape,
    /// The character consumed by an escape marker
    Escaped,
    QuoteOpen,
    QuoteClose,
    /// Inside a quoted literal
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanned {
    /// 1-based character column
    pub column: usize,
    /// Byte offset into the line
    pub byte: usize,
    pub ch: char,
    pub class: CharClass,
}

impl Scanned {
    pub fn is_code(&self) -> bool {
        self.class == CharClass::Code
    }

    pub fn is_word(&self) -> bool {
        self.ch.is_ascii_alphanumeric() || self.ch == '_'
    }

    pub fn opens(&self) -> Option<BracketKind> {
        if self.is_code() {
            BracketKind::from_open(self.ch)
        } else {
            None
        }
    }

    pub fn closes(&self) -> Option<BracketKind> {
        if self.is_code() {
            BracketKind::from_close(self.ch)
        } else {
            None
        }
    }
}

/// Iterator over the characters of one line, classified by literal state
pub struct LineScanner<'a> {
    chars: std::str::CharIndices<'a>,
    column: usize,
    in_literal: bool,
    escaped: bool,
    literal_start: Option<usize>,
}

impl<'a> LineScanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            chars: line.char_indices(),
            column: 0,
            in_literal: false,
            escaped: false,
            literal_start: None,
        }
    }

    /// Column of the opening quote if the walk so far ends inside a literal
    pub fn unterminated_literal(&self) -> Option<usize> {
        if self.in_literal {
            self.literal_start
        } else {
            None
        }
    }
}

impl Iterator for LineScanner<'_> {
    type Item = Scanned;

    fn next(&mut self) -> Option<Scanned> {
        let (byte, ch) = self.chars.next()?;
        self.column += 1;

        let class = if self.escaped {
            self.escaped = false;
            CharClass::Escaped
        } else if ch == ESCAPE {
            self.escaped = true;
            CharClass::Escape
        } else if ch == QUOTE {
            if self.in_literal {
                self.in_literal = false;
                CharClass::QuoteClose
            } else {
                self.in_literal = true;
                self.literal_start = Some(self.column);
                CharClass::QuoteOpen
            }
        } else if self.in_literal {
            CharClass::Literal
        } else {
            CharClass::Code
        };

        Some(Scanned {
            column: self.column,
            byte,
            ch,
            class,
        })
    }
}

/// Full-line comment: `@@ ...`, or `#` / `# ...` in unformatted source
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("@@") || trimmed == "#" || trimmed.starts_with("# ")
}

/// A line the structural passes look at: non-blank and not a comment
pub fn is_code_line(line: &str) -> bool {
    !line.trim().is_empty() && !is_comment(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    /// Column of the first character of the name
    pub column: usize,
    /// Index of the `(` in [`ScannedLine::chars`]
    pub open_index: usize,
    pub space_after_paren: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandToken<'a> {
    /// Name without the leading `@`
    pub name: &'a str,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionKind<'a> {
    /// `%0`, `%12`, ...
    Positional(u64),
    /// `%q0` .. `%qz`
    ShortRegister(char),
    /// `%q<name>`; `closed` is false when the `>` is missing
    NamedRegister { name: &'a str, closed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution<'a> {
    pub column: usize,
    pub kind: SubstitutionKind<'a>,
}

/// One line, walked once, with the shape queries the checks need
#[derive(Debug, Clone)]
pub struct ScannedLine<'a> {
    text: &'a str,
    chars: Vec<Scanned>,
    open_literal: Option<usize>,
}

impl<'a> ScannedLine<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut scanner = LineScanner::new(text);
        let chars: Vec<Scanned> = scanner.by_ref().collect();
        let open_literal = scanner.unterminated_literal();
        Self {
            text,
            chars,
            open_literal,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn chars(&self) -> &[Scanned] {
        &self.chars
    }

    pub fn unterminated_literal(&self) -> Option<usize> {
        self.open_literal
    }

    pub fn code_chars(&self) -> impl Iterator<Item = &Scanned> + '_ {
        self.chars.iter().filter(|c| c.is_code())
    }

    /// Text between two scanned indices (end exclusive)
    fn slice(&self, from: usize, to: usize) -> &'a str {
        let start = self.chars.get(from).map_or(self.text.len(), |c| c.byte);
        let end = self.chars.get(to).map_or(self.text.len(), |c| c.byte);
        &self.text[start..end]
    }

    /// Deepest bracket nesting reached on this line, all kinds combined
    pub fn max_depth(&self) -> usize {
        let mut depth = 0usize;
        let mut max = 0usize;
        for c in &self.chars {
            if c.opens().is_some() {
                depth += 1;
                max = max.max(depth);
            } else if c.closes().is_some() {
                depth = depth.saturating_sub(1);
            }
        }
        max
    }

    /// Index of the `)` closing the `(` at `open_index`
    pub fn matching_paren(&self, open_index: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, c) in self.chars.iter().enumerate().skip(open_index) {
            match c.opens() {
                Some(BracketKind::Paren) => depth += 1,
                _ => {
                    if c.closes() == Some(BracketKind::Paren) {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(idx);
                        }
                    }
                }
            }
        }
        None
    }

    /// Identifiers immediately followed by `(` outside literals
    pub fn function_calls(&self) -> Vec<FunctionCall<'a>> {
        let mut calls = Vec::new();
        for (idx, c) in self.chars.iter().enumerate() {
            if c.ch != '(' || !c.is_code() {
                continue;
            }
            let mut start = idx;
            while start > 0 && self.chars[start - 1].is_code() && self.chars[start - 1].is_word() {
                start -= 1;
            }
            if start == idx {
                continue;
            }
            let first = self.chars[start].ch;
            if !(first.is_ascii_alphabetic() || first == '_') {
                continue;
            }
            if start > 0 {
                let prev = self.chars[start - 1];
                if prev.is_word() || matches!(prev.ch, '@' | '&' | '%' | '#' | '$' | ESCAPE) {
                    continue;
                }
            }
            calls.push(FunctionCall {
                name: self.slice(start, idx),
                column: self.chars[start].column,
                open_index: idx,
                space_after_paren: self.chars.get(idx + 1).is_some_and(|n| n.ch == ' '),
            });
        }
        calls
    }

    /// `@command` tokens at the start of an action
    pub fn commands(&self) -> Vec<CommandToken<'a>> {
        let mut commands = Vec::new();
        for (idx, c) in self.chars.iter().enumerate() {
            if c.ch != '@' || !c.is_code() {
                continue;
            }
            let at_action_start = idx == 0
                || matches!(self.chars[idx - 1].ch, ';' | '{' | ':')
                || self.chars[idx - 1].ch.is_whitespace();
            if !at_action_start {
                continue;
            }
            if self.chars.get(idx + 1).is_some_and(|n| n.ch == '@') {
                continue;
            }
            let mut end = idx + 1;
            while end < self.chars.len() && self.chars[end].is_code() && self.chars[end].is_word() {
                end += 1;
            }
            if end == idx + 1 {
                continue;
            }
            commands.push(CommandToken {
                name: self.slice(idx + 1, end),
                column: c.column,
            });
        }
        commands
    }

    /// `%`-substitutions that reference variables or registers
    pub fn substitutions(&self) -> Vec<Substitution<'a>> {
        let chars = &self.chars;
        let code_at = |i: usize| chars.get(i).filter(|c| c.is_code());
        let mut subs = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.ch != '%' || !c.is_code() {
                i += 1;
                continue;
            }
            let Some(next) = code_at(i + 1) else {
                i += 1;
                continue;
            };

            if next.ch.is_ascii_digit() {
                let mut end = i + 1;
                while code_at(end).is_some_and(|d| d.ch.is_ascii_digit()) {
                    end += 1;
                }
                let index = self.slice(i + 1, end).parse::<u64>().unwrap_or(u64::MAX);
                subs.push(Substitution {
                    column: c.column,
                    kind: SubstitutionKind::Positional(index),
                });
                i = end;
            } else if next.ch == 'q' || next.ch == 'Q' {
                match code_at(i + 2) {
                    Some(open) if open.ch == '<' => {
                        let mut end = i + 3;
                        while code_at(end).is_some_and(|d| d.ch != '>') {
                            end += 1;
                        }
                        let closed = code_at(end).is_some_and(|d| d.ch == '>');
                        subs.push(Substitution {
                            column: c.column,
                            kind: SubstitutionKind::NamedRegister {
                                name: self.slice(i + 3, end),
                                closed,
                            },
                        });
                        i = if closed { end + 1 } else { end };
                    }
                    Some(reg) if reg.ch.is_ascii_alphanumeric() => {
                        subs.push(Substitution {
                            column: c.column,
                            kind: SubstitutionKind::ShortRegister(reg.ch.to_ascii_lowercase()),
                        });
                        i += 3;
                    }
                    _ => i += 2,
                }
            } else {
                // %%, %r, %b, %#, ... are not variable references
                i += 2;
            }
        }
        subs
    }
}

/// Net bracket counts and nesting depth across many lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketProfile {
    net_open: [i64; 3],
    /// Openers still on a line's own stack at line end, summed over lines
    line_open: [i64; 3],
    pub max_depth: usize,
    /// Line on which `max_depth` was first reached (0 if nothing nested)
    pub max_depth_line: usize,
}

impl BracketProfile {
    /// Opens minus closes for one kind over the whole text
    pub fn net_open(&self, kind: BracketKind) -> i64 {
        self.net_open[kind.index()]
    }

    /// Net open count minus the openers already left open at some line end
    pub fn unreported_open(&self, kind: BracketKind) -> i64 {
        self.net_open[kind.index()] - self.line_open[kind.index()]
    }

    /// Profile `(line_number, text)` pairs, carrying bracket state across lines
    pub fn build<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut profile = BracketProfile::default();
        let mut depth = 0usize;

        for (number, text) in lines {
            let mut stack: Vec<BracketKind> = Vec::new();
            for c in LineScanner::new(text) {
                if let Some(kind) = c.opens() {
                    profile.net_open[kind.index()] += 1;
                    stack.push(kind);
                    depth += 1;
                    if depth > profile.max_depth {
                        profile.max_depth = depth;
                        profile.max_depth_line = number;
                    }
                } else if let Some(kind) = c.closes() {
                    profile.net_open[kind.index()] -= 1;
                    if let Some(pos) = stack.iter().rposition(|open| *open == kind) {
                        stack.truncate(pos);
                    }
                    depth = depth.saturating_sub(1);
                }
            }
            for kind in stack {
                profile.line_open[kind.index()] += 1;
            }
        }
        profile
    }
}

/// Maps byte offsets in a whole text to 1-based line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    /// Line = 1 + newlines before `offset`; column = 1 + characters from
    /// the start of that line. `offset` must lie on a char boundary.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let idx = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = self.text[self.starts[idx]..offset].chars().count() + 1;
        (idx + 1, column)
    }

    /// Text of a 1-based line without its line terminator
    pub fn line(&self, number: usize) -> &'a str {
        if number == 0 || number > self.starts.len() {
            return "";
        }
        let start = self.starts[number - 1];
        let end = self
            .starts
            .get(number)
            .map_or(self.text.len(), |next| next - 1);
        self.text[start..end].trim_end_matches('\r')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(line: &str) -> Vec<CharClass> {
        LineScanner::new(line).map(|c| c.class).collect()
    }

    #[test]
    fn test_quote_toggles_literal() {
        let c = classes("a\"(\"b");
        assert_eq!(
            c,
            vec![
                CharClass::Code,
                CharClass::QuoteOpen,
                CharClass::Literal,
                CharClass::QuoteClose,
                CharClass::Code
            ]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_toggle() {
        let scanned = ScannedLine::new(r#"say \"hello"#);
        assert_eq!(scanned.unterminated_literal(), None);
    }

    #[test]
    fn test_escape_is_not_recursive() {
        // `\\` is one escape pair, so the quote after it opens a literal
        let scanned = ScannedLine::new(r#"a\\"b"#);
        assert_eq!(scanned.unterminated_literal(), Some(4));
    }

    #[test]
    fn test_escaped_bracket_is_not_structural() {
        let scanned = ScannedLine::new(r"\(x");
        assert_eq!(scanned.max_depth(), 0);
    }

    #[test]
    fn test_unterminated_literal_reports_opening_column() {
        let scanned = ScannedLine::new("@pemit me=\"Hello");
        assert_eq!(scanned.unterminated_literal(), Some(11));
    }

    #[test]
    fn test_comment_detection() {
        assert!(is_comment("@@ a comment"));
        assert!(is_comment("   @@"));
        assert!(is_comment("# header"));
        assert!(!is_comment("#123"));
        assert!(!is_comment("@pemit me=hi"));
        assert!(!is_code_line("   "));
    }

    #[test]
    fn test_function_calls_skip_literals_and_prefixes() {
        let scanned = ScannedLine::new("[u(me/FN,%0)] \"get(x)\" &attr( add( 1,2)");
        let names: Vec<_> = scanned.function_calls().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["u", "add"]);
        let add = scanned.function_calls()[1];
        assert!(add.space_after_paren);
    }

    #[test]
    fn test_commands_found_at_action_starts() {
        let scanned = ScannedLine::new("$go *:@pemit %#=hi;@trigger me/X; @@ note");
        let names: Vec<_> = scanned.commands().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["pemit", "trigger"]);
    }

    #[test]
    fn test_substitutions() {
        let scanned = ScannedLine::new("%0 %123 %%1 %qa %q<total> %q<bad name %r");
        let kinds: Vec<_> = scanned.substitutions().into_iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SubstitutionKind::Positional(0),
                SubstitutionKind::Positional(123),
                SubstitutionKind::ShortRegister('a'),
                SubstitutionKind::NamedRegister {
                    name: "total",
                    closed: true
                },
                SubstitutionKind::NamedRegister {
                    name: "bad name %r",
                    closed: false
                },
            ]
        );
    }

    #[test]
    fn test_matching_paren() {
        let scanned = ScannedLine::new("iter(a,map(b,c))");
        assert_eq!(scanned.matching_paren(4), Some(15));
        assert_eq!(scanned.matching_paren(10), Some(14));
    }

    #[test]
    fn test_bracket_profile_carries_across_lines() {
        let profile = BracketProfile::build(vec![(1, "[switch(%0,"), (2, "a,b)")]);
        assert_eq!(profile.net_open(BracketKind::Square), 1);
        assert_eq!(profile.net_open(BracketKind::Paren), 0);
        assert_eq!(profile.max_depth, 2);
        assert_eq!(profile.max_depth_line, 1);
    }

    #[test]
    fn test_unreported_open_skips_line_end_openers() {
        let profile = BracketProfile::build(vec![(1, "think switch((a,b)"), (2, "[add(1,2)")]);
        assert_eq!(profile.net_open(BracketKind::Paren), 1);
        assert_eq!(profile.unreported_open(BracketKind::Paren), 0);
        assert_eq!(profile.unreported_open(BracketKind::Square), 0);

        // `]` closes `[` and drops the inner `(` from the line's stack
        let dropped = BracketProfile::build(vec![(1, "think [add(1]")]);
        assert_eq!(dropped.net_open(BracketKind::Paren), 1);
        assert_eq!(dropped.unreported_open(BracketKind::Paren), 1);
    }

    #[test]
    fn test_line_index_locate() {
        let index = LineIndex::new("ab\r\ncdé\nxyz");
        assert_eq!(index.locate(0), (1, 1));
        assert_eq!(index.locate(4), (2, 1));
        assert_eq!(index.locate(9), (3, 1));
        assert_eq!(index.line(1), "ab");
        assert_eq!(index.line(2), "cdé");
        assert_eq!(index.line(4), "");
    }
}
