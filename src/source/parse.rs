//! Parsing function source into logical lines.
//!
//! A logical line is one statement header or simple statement: its tokens in
//! source order and the number of blocks enclosing it. Clause headers
//! (`elif`, `else`, `except`, `finally`, `case`) and decorators start their
//! own line at the depth of the statement they belong to.

use tree_sitter::{Language, Node, Parser, Tree};

use super::NormalizationError;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Coarse token class used by the spacing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Name,
    /// Integer, float or imaginary literal.
    Number,
    /// A complete string literal, prefix and quotes included.
    String,
    /// Operator or delimiter.
    Op,
}

/// A leaf of the syntax tree, or a whole string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token class.
    pub kind: TokenKind,
    /// Exact source text.
    pub text: String,
}

impl Token {
    /// Whether this is the operator `op`.
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    /// Whether this is a reserved word.
    pub fn is_keyword(&self) -> bool {
        self.kind == TokenKind::Name && KEYWORDS.contains(&self.text.as_str())
    }

    /// `(`, `[` or `{`.
    pub fn opens_bracket(&self) -> bool {
        self.kind == TokenKind::Op && matches!(self.text.as_str(), "(" | "[" | "{")
    }

    /// `)`, `]` or `}`.
    pub fn closes_bracket(&self) -> bool {
        self.kind == TokenKind::Op && matches!(self.text.as_str(), ")" | "]" | "}")
    }
}

/// One statement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Number of enclosing blocks.
    pub depth: usize,
    /// Tokens, comments excluded.
    pub tokens: Vec<Token>,
}

/// Parse source text as a module.
///
/// # Errors
/// Returns [`NormalizationError::Syntax`] at the first ERROR or MISSING node
/// when the text is not valid source.
pub fn parse(source: &str) -> Result<Tree, NormalizationError> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| NormalizationError::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(NormalizationError::Aborted)?;
    let root = tree.root_node();
    if root.has_error() {
        let at = first_error(root).unwrap_or(root).start_position();
        return Err(NormalizationError::Syntax {
            line: at.row + 1,
            column: at.column + 1,
        });
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let children: Vec<Node<'_>> = node.children(&mut node.walk()).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Flatten a parsed module into logical lines.
///
/// With `strip_docstrings`, the docstring statement of every function body is
/// left out, nested functions included.
pub fn logical_lines(
    tree: &Tree,
    source: &str,
    strip_docstrings: bool,
) -> Result<Vec<LogicalLine>, NormalizationError> {
    let mut flattener = Flattener {
        source,
        strip_docstrings,
        lines: Vec::new(),
    };
    flattener.block(tree.root_node(), 0, false)?;
    Ok(flattener.lines)
}

struct Flattener<'s> {
    source: &'s str,
    strip_docstrings: bool,
    lines: Vec<LogicalLine>,
}

impl Flattener<'_> {
    fn block(
        &mut self,
        block: Node<'_>,
        depth: usize,
        function_body: bool,
    ) -> Result<(), NormalizationError> {
        let statements = significant_children(block);
        let skip = self.strip_docstrings
            && function_body
            && statements.first().is_some_and(|first| is_docstring(*first, self.source));

        for statement in statements.into_iter().skip(usize::from(skip)) {
            self.statement(statement, depth)?;
        }
        Ok(())
    }

    fn statement(&mut self, node: Node<'_>, depth: usize) -> Result<(), NormalizationError> {
        let mut tokens = Vec::new();
        self.collect(node, depth, &mut tokens)?;
        self.push_line(depth, tokens);
        Ok(())
    }

    fn collect(
        &mut self,
        node: Node<'_>,
        depth: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), NormalizationError> {
        let children: Vec<Node<'_>> = node.children(&mut node.walk()).collect();

        for child in children {
            if child.is_extra() {
                continue;
            }
            match child.kind() {
                "block" => {
                    self.push_line(depth, std::mem::take(tokens));
                    self.block(child, depth + 1, node.kind() == "function_definition")?;
                }
                kind if starts_line(node.kind(), kind) => {
                    self.push_line(depth, std::mem::take(tokens));
                    self.statement(child, depth)?;
                }
                "string" => tokens.push(Token {
                    kind: TokenKind::String,
                    text: self.text(child)?,
                }),
                _ if child.child_count() == 0 => tokens.push(self.leaf(child)?),
                _ => self.collect(child, depth, tokens)?,
            }
        }
        Ok(())
    }

    fn push_line(&mut self, depth: usize, tokens: Vec<Token>) {
        if !tokens.is_empty() {
            self.lines.push(LogicalLine { depth, tokens });
        }
    }

    fn leaf(&self, node: Node<'_>) -> Result<Token, NormalizationError> {
        let text = self.text(node)?;
        let kind = match node.kind() {
            "integer" | "float" => TokenKind::Number,
            _ if text.starts_with(|c: char| c.is_alphabetic() || c == '_') => TokenKind::Name,
            _ => TokenKind::Op,
        };
        Ok(Token { kind, text })
    }

    fn text(&self, node: Node<'_>) -> Result<String, NormalizationError> {
        node.utf8_text(self.source.as_bytes())
            .map(str::to_string)
            .map_err(|_| {
                let at = node.start_position();
                NormalizationError::Syntax {
                    line: at.row + 1,
                    column: at.column + 1,
                }
            })
    }
}

/// Child nodes that begin a new line at the parent statement's depth.
fn starts_line(parent: &str, kind: &str) -> bool {
    match kind {
        "decorator" | "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
        | "finally_clause" | "case_clause" => true,
        "function_definition" | "class_definition" => parent == "decorated_definition",
        _ => false,
    }
}

/// Named children, comments and line continuations excluded.
fn significant_children(node: Node<'_>) -> Vec<Node<'_>> {
    node.named_children(&mut node.walk())
        .filter(|child| !child.is_extra())
        .collect()
}

/// An expression statement made of plain string literals only.
fn is_docstring(statement: Node<'_>, source: &str) -> bool {
    statement.kind() == "expression_statement"
        && matches!(significant_children(statement).as_slice(), [value] if is_text_literal(*value, source))
}

fn is_text_literal(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        // Byte strings and f-strings are not documentation.
        "string" => node.utf8_text(source.as_bytes()).is_ok_and(|text| {
            !text
                .chars()
                .take_while(char::is_ascii_alphabetic)
                .any(|c| matches!(c.to_ascii_lowercase(), 'b' | 'f'))
        }),
        "concatenated_string" => {
            let parts = significant_children(node);
            !parts.is_empty() && parts.iter().all(|part| is_text_literal(*part, source))
        }
        "parenthesized_expression" => {
            matches!(significant_children(node).as_slice(), [inner] if is_text_literal(*inner, source))
        }
        _ => false,
    }
}
