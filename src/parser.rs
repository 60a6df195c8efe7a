//! Script parsing: flat statement lists and `@pose` / `@animation` / `main` programs.
//!
//! The parser keeps going after an error so that a single run reports every
//! problem it can attribute to a line; any diagnostic still rejects the input.

use crate::error::{CompileError, Diagnostic, MplError};
use crate::statement::Statement;
use std::collections::HashSet;
use std::fmt;

/// A named pose block
#[derive(Debug, Clone, PartialEq)]
pub struct PoseDecl {
    pub name: String,
    pub line: usize,
    pub statements: Vec<Statement>,
}

impl fmt::Display for PoseDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@pose {} {{", self.name)?;
        for statement in &self.statements {
            writeln!(f, "    {};", statement)?;
        }
        write!(f, "}}")
    }
}

/// `time: pose [& pose]*;`
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    /// Seconds from the start of the animation
    pub time: f32,
    pub poses: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDecl {
    pub name: String,
    pub line: usize,
    /// Strictly increasing in time
    pub entries: Vec<TimelineEntry>,
}

/// One animation reference inside `main`
#[derive(Debug, Clone, PartialEq)]
pub struct MainEntry {
    pub name: String,
    pub line: usize,
}

/// Block-structured script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub poses: Vec<PoseDecl>,
    pub animations: Vec<AnimationDecl>,
    /// `None` when the script has no `main` block
    pub main: Option<Vec<MainEntry>>,
}

impl Program {
    pub fn pose(&self, name: &str) -> Option<&PoseDecl> {
        self.poses.iter().find(|pose| pose.name == name)
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationDecl> {
        self.animations
            .iter()
            .find(|animation| animation.name == name)
    }
}

/// Parsed input
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    /// Statements separated by `;` or line breaks
    Statements(Vec<Statement>),
    Program(Program),
}

/// Parse either form. A script whose first word is `@pose`, `@animation`
/// or `main` is a program; anything else is a flat statement list.
pub fn parse(text: &str) -> Result<Script, CompileError> {
    let tokens = tokenize(text);
    let is_program = matches!(
        tokens.first(),
        Some(Token { kind: TokenKind::Word(word), .. }) if is_block_keyword(word)
    );
    if is_program {
        parse_program(tokens).map(Script::Program)
    } else {
        parse_statements(text).map(Script::Statements)
    }
}

/// Parse a flat statement list
pub fn parse_statements(text: &str) -> Result<Vec<Statement>, CompileError> {
    let mut statements = Vec::new();
    let mut diagnostics = Vec::new();

    for (i, line) in text.lines().enumerate() {
        for source in strip_comment(line).split(';') {
            let source = source.trim();
            if source.is_empty() {
                continue;
            }
            match source.parse::<Statement>() {
                Ok(statement) => statements.push(statement),
                Err(error) => diagnostics.push(Diagnostic::new(i + 1, source, error)),
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(statements)
    } else {
        Err(CompileError::new(diagnostics))
    }
}

fn is_block_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("@pose")
        || word.eq_ignore_ascii_case("@animation")
        || word.eq_ignore_ascii_case("main")
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(at) => &line[..at],
        None => line,
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    LBrace,
    RBrace,
    Semicolon,
    Colon,
    Ampersand,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(word) => f.write_str(word),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Ampersand => f.write_str("&"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    /// 1-based
    line: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let mut word = String::new();
        for c in strip_comment(line).chars() {
            let punct = match c {
                '{' => Some(TokenKind::LBrace),
                '}' => Some(TokenKind::RBrace),
                ';' => Some(TokenKind::Semicolon),
                ':' => Some(TokenKind::Colon),
                '&' => Some(TokenKind::Ampersand),
                _ => None,
            };
            if punct.is_some() || c.is_whitespace() {
                if !word.is_empty() {
                    tokens.push(Token {
                        kind: TokenKind::Word(std::mem::take(&mut word)),
                        line: i + 1,
                    });
                }
                if let Some(kind) = punct {
                    tokens.push(Token { kind, line: i + 1 });
                }
            } else {
                word.push(c);
            }
        }
        if !word.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Word(word),
                line: i + 1,
            });
        }
    }
    tokens
}

// ============================================================================
// Blocks
// ============================================================================

/// Tokens between two `;` inside a block
struct Item {
    line: usize,
    tokens: Vec<TokenKind>,
}

impl Item {
    fn source(&self) -> String {
        self.tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn words(&self) -> Option<Vec<&str>> {
        self.tokens
            .iter()
            .map(|token| match token {
                TokenKind::Word(word) => Some(word.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Items of one block
struct Body {
    items: Vec<Item>,
    /// The block closed on an item without `;`, already reported
    unterminated: bool,
}

impl Body {
    /// Empty with nothing else reported against it
    fn is_empty(&self) -> bool {
        self.items.is_empty() && !self.unterminated
    }
}

enum BlockKind {
    Pose,
    Animation,
    Main,
}

struct ProgramParser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    names: HashSet<String>,
    program: Program,
}

fn parse_program(tokens: Vec<Token>) -> Result<Program, CompileError> {
    let mut parser = ProgramParser {
        tokens,
        pos: 0,
        diagnostics: Vec::new(),
        names: HashSet::new(),
        program: Program::default(),
    };
    parser.run();

    if parser.diagnostics.is_empty() {
        Ok(parser.program)
    } else {
        Err(CompileError::new(parser.diagnostics))
    }
}

impl ProgramParser {
    fn run(&mut self) {
        while let Some(token) = self.next() {
            let kind = match &token.kind {
                TokenKind::Word(word) if word.eq_ignore_ascii_case("@pose") => BlockKind::Pose,
                TokenKind::Word(word) if word.eq_ignore_ascii_case("@animation") => {
                    BlockKind::Animation
                }
                TokenKind::Word(word) if word.eq_ignore_ascii_case("main") => BlockKind::Main,
                other => {
                    self.error(
                        token.line,
                        other.to_string(),
                        MplError::syntax("text outside of a block"),
                    );
                    self.skip_stray();
                    continue;
                }
            };
            self.block(kind, token.line);
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn error(&mut self, line: usize, source: impl Into<String>, error: MplError) {
        self.diagnostics.push(Diagnostic::new(line, source, error));
    }

    /// Skip to the next token that could start a block
    fn skip_stray(&mut self) {
        while let Some(token) = self.peek() {
            if matches!(&token.kind, TokenKind::Word(word) if is_block_keyword(word)) {
                break;
            }
            self.pos += 1;
        }
    }

    fn block(&mut self, kind: BlockKind, line: usize) {
        let name = match kind {
            BlockKind::Main => None,
            _ => match self.peek() {
                Some(Token {
                    kind: TokenKind::Word(word),
                    ..
                }) if !is_block_keyword(word) => {
                    let word = word.clone();
                    self.pos += 1;
                    Some(word)
                }
                _ => {
                    self.error(line, "", MplError::syntax("block is missing a name"));
                    None
                }
            },
        };
        let header = match (&kind, &name) {
            (BlockKind::Pose, Some(name)) => format!("@pose {}", name),
            (BlockKind::Animation, Some(name)) => format!("@animation {}", name),
            (BlockKind::Main, _) => "main".to_string(),
            _ => String::new(),
        };

        let Some(body) = self.items(line, &header) else {
            return;
        };

        match kind {
            BlockKind::Pose => {
                if let Some(name) = name {
                    self.pose(name, line, body);
                }
            }
            BlockKind::Animation => {
                if let Some(name) = name {
                    self.animation(name, line, body);
                }
            }
            BlockKind::Main => self.main(line, body),
        }
    }

    /// Read `{ item; item; ... }`. Returns `None` if the block never closes.
    fn items(&mut self, line: usize, header: &str) -> Option<Body> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::LBrace,
                ..
            }) => self.pos += 1,
            _ => {
                self.error(line, header, MplError::syntax("expected '{'"));
                self.skip_stray();
                return None;
            }
        }

        let mut items = Vec::new();
        let mut current: Vec<TokenKind> = Vec::new();
        let mut current_line = line;

        loop {
            let Some(token) = self.next() else {
                self.error(line, header, MplError::syntax("unclosed block"));
                return None;
            };
            match token.kind {
                TokenKind::RBrace => {
                    let unterminated = !current.is_empty();
                    if unterminated {
                        let item = Item {
                            line: current_line,
                            tokens: current,
                        };
                        self.error(item.line, item.source(), MplError::syntax("missing ';'"));
                    }
                    return Some(Body {
                        items,
                        unterminated,
                    });
                }
                TokenKind::Semicolon => {
                    if !current.is_empty() {
                        items.push(Item {
                            line: current_line,
                            tokens: std::mem::take(&mut current),
                        });
                    }
                }
                TokenKind::LBrace => {
                    self.error(token.line, header, MplError::syntax("nested blocks are not allowed"));
                    self.skip_nested();
                }
                TokenKind::Word(ref word) if is_block_keyword(word) => {
                    self.error(token.line, header, MplError::syntax("unclosed block"));
                    self.pos -= 1;
                    return None;
                }
                kind => {
                    if current.is_empty() {
                        current_line = token.line;
                    }
                    current.push(kind);
                }
            }
        }
    }

    /// Skip past the matching `}` of a nested block
    fn skip_nested(&mut self) {
        let mut depth = 1usize;
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn claim_name(&mut self, name: &str, line: usize) -> bool {
        if self.names.insert(name.to_string()) {
            return true;
        }
        self.error(
            line,
            name,
            MplError::DuplicateName {
                name: name.to_string(),
            },
        );
        false
    }

    fn pose(&mut self, name: String, line: usize, body: Body) {
        let unique = self.claim_name(&name, line);
        if body.is_empty() {
            self.error(line, format!("@pose {}", name), MplError::syntax("empty pose"));
        }

        let mut statements = Vec::new();
        for item in body.items {
            let source = item.source();
            let parsed = match item.words() {
                Some(words) => words.join(" ").parse::<Statement>(),
                None => Err(MplError::syntax("unexpected symbol in statement")),
            };
            match parsed {
                Ok(statement) => statements.push(statement),
                Err(error) => self.error(item.line, source, error),
            }
        }

        if unique {
            self.program.poses.push(PoseDecl {
                name,
                line,
                statements,
            });
        }
    }

    fn animation(&mut self, name: String, line: usize, body: Body) {
        let unique = self.claim_name(&name, line);
        if body.is_empty() {
            self.error(
                line,
                format!("@animation {}", name),
                MplError::syntax("empty animation"),
            );
        }

        let mut entries: Vec<TimelineEntry> = Vec::new();
        for item in body.items {
            match timeline_entry(&item) {
                Ok(entry) => {
                    if let Some(previous) = entries.last() {
                        if entry.time <= previous.time {
                            self.error(
                                item.line,
                                item.source(),
                                MplError::TimelineOrder {
                                    previous: previous.time,
                                    time: entry.time,
                                },
                            );
                            continue;
                        }
                    }
                    entries.push(entry);
                }
                Err(error) => self.error(item.line, item.source(), error),
            }
        }

        if unique {
            self.program.animations.push(AnimationDecl {
                name,
                line,
                entries,
            });
        }
    }

    fn main(&mut self, line: usize, body: Body) {
        if self.program.main.is_some() {
            self.error(line, "main", MplError::syntax("duplicate main block"));
            return;
        }
        if body.is_empty() {
            self.error(line, "main", MplError::syntax("empty main block"));
        }

        let mut entries = Vec::new();
        for item in body.items {
            match item.words().as_deref() {
                Some([name]) => entries.push(MainEntry {
                    name: name.to_string(),
                    line: item.line,
                }),
                _ => self.error(
                    item.line,
                    item.source(),
                    MplError::syntax("expected one animation name"),
                ),
            }
        }
        self.program.main = Some(entries);
    }
}

/// `time: pose [& pose]*`, time in seconds with an optional `s` suffix
fn timeline_entry(item: &Item) -> Result<TimelineEntry, MplError> {
    let (time, rest) = match item.tokens.as_slice() {
        [TokenKind::Word(time), TokenKind::Colon, rest @ ..] if !rest.is_empty() => (time, rest),
        _ => return Err(MplError::syntax("expected 'time: pose [& pose]'")),
    };

    let number = time
        .strip_suffix('s')
        .or_else(|| time.strip_suffix('S'))
        .unwrap_or(time.as_str());
    let time = number
        .parse::<f32>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or_else(|| MplError::syntax(format!("invalid timestamp {}", time)))?;

    let mut poses = Vec::new();
    for (i, token) in rest.iter().enumerate() {
        match (i % 2, token) {
            (0, TokenKind::Word(name)) => poses.push(name.clone()),
            (1, TokenKind::Ampersand) => {}
            _ => return Err(MplError::syntax("expected 'pose & pose'")),
        }
    }
    if rest.len() % 2 == 0 {
        return Err(MplError::syntax("dangling '&'"));
    }

    Ok(TimelineEntry {
        time,
        poses,
        line: item.line,
    })
}
