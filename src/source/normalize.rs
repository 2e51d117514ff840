//! Canonical rendering of function source without docs and comments.
//!
//! ```text
//! normalize(text) = render(logical_lines(parse(text), strip_docstrings = true))
//! ```
//!
//! - `parse` rejects any text tree-sitter cannot read without an error.
//! - `logical_lines` drops comments and the docstring statement of every
//!   `def` / `async def` body, nested definitions included. Class docstrings
//!   and string literals anywhere else are kept verbatim.
//! - `render` writes one logical line per output line, four spaces per block
//!   level, tokens joined by a fixed spacing rule.
//!
//! The output is still valid source for any input that had a non-docstring
//! body, and layout-only edits do not change it.

use super::parse::{logical_lines, parse, LogicalLine, Token, TokenKind};
use super::NormalizationError;

const INDENT: &str = "    ";

/// Remove comments and leading documentation strings from source text.
///
/// # Errors
/// Returns [`NormalizationError`] when the text is not valid source.
///
/// # Example
///
/// ```rust
/// use dataflow_snapshot::source::normalize;
///
/// let source = "def f(x):\n    \"\"\"Add one.\"\"\"\n    return x + 1  # bump\n";
/// assert_eq!(normalize(source).unwrap(), "def f(x):\n    return x + 1");
/// ```
pub fn normalize(source: &str) -> Result<String, NormalizationError> {
    let tree = parse(source)?;
    let lines = logical_lines(&tree, source, true)?;
    Ok(render(&lines))
}

fn render(lines: &[LogicalLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", INDENT.repeat(line.depth), join_tokens(&line.tokens)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;

    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            let before = if idx > 1 { Some(&tokens[idx - 2]) } else { None };
            if needs_space(before, &tokens[idx - 1], token, depth) {
                out.push(' ');
            }
        }
        if token.opens_bracket() {
            depth += 1;
        } else if token.closes_bracket() {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&token.text);
    }
    out
}

/// Whether `prev` is a prefix operator (`-x`, `*args`, `**kwargs`, `~x`).
fn is_prefix_operator(before: Option<&Token>, prev: &Token) -> bool {
    if prev.kind != TokenKind::Op || !matches!(prev.text.as_str(), "-" | "+" | "~" | "*" | "**")
    {
        return false;
    }
    match before {
        None => true,
        Some(t) if t.kind == TokenKind::Op => !t.closes_bracket(),
        Some(t) => t.is_keyword() && !matches!(t.text.as_str(), "True" | "False" | "None"),
    }
}

fn needs_space(before: Option<&Token>, prev: &Token, next: &Token, depth: usize) -> bool {
    if prev.opens_bracket() || next.closes_bracket() {
        return false;
    }
    if next.kind == TokenKind::Op && matches!(next.text.as_str(), "," | ";" | ":") {
        return false;
    }
    if next.is_op(".") {
        return prev.kind == TokenKind::Number || prev.is_keyword();
    }
    if prev.is_op(".") {
        return next.is_keyword();
    }
    if next.is_op("(") || next.is_op("[") {
        let callable = (prev.kind == TokenKind::Name && !prev.is_keyword())
            || prev.kind == TokenKind::String
            || prev.closes_bracket();
        return !callable;
    }
    if depth > 0 && (prev.is_op("=") || next.is_op("=")) {
        return false;
    }
    if prev.is_op("@") && before.is_none() {
        return false;
    }
    !is_prefix_operator(before, prev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_docstring_and_comments() {
        let source = r#"def foo(a: int) -> int:
    """Docs.

    More docs.
    """
    # comment
    return a + 1  # trailing
"#;
        assert_eq!(normalize(source).unwrap(), "def foo(a: int) -> int:\n    return a + 1");
    }

    #[test]
    fn test_docstring_and_comment_variants_agree() {
        let plain = "def foo(a):\n    return a * 2\n";
        let documented = "def foo(a):\n    '''Double it.'''\n    # really\n    return a * 2\n";
        assert_eq!(normalize(plain).unwrap(), normalize(documented).unwrap());
    }

    #[test]
    fn test_keeps_non_doc_strings() {
        let source = "def greet(name):\n    x = 1\n    \"not a docstring\"\n    return 'hi ' + name\n";
        let normalized = normalize(source).unwrap();
        assert!(normalized.contains("\"not a docstring\""));
        assert!(normalized.contains("'hi '"));
    }

    #[test]
    fn test_keeps_byte_and_format_strings() {
        let bytes = "def f():\n    b\"raw\"\n    return 1\n";
        assert!(normalize(bytes).unwrap().contains("b\"raw\""));

        let fstring = "def f(x):\n    f\"{x}\"\n    return x\n";
        assert!(normalize(fstring).unwrap().contains("f\"{x}\""));
    }

    #[test]
    fn test_keeps_class_docstring() {
        let source = "class A:\n    \"\"\"Class docs.\"\"\"\n    def m(self):\n        \"\"\"Method docs.\"\"\"\n        return 1\n";
        assert_eq!(
            normalize(source).unwrap(),
            "class A:\n    \"\"\"Class docs.\"\"\"\n    def m(self):\n        return 1"
        );
    }

    #[test]
    fn test_nested_function_docstrings() {
        let source = "def outer():\n    \"\"\"Outer.\"\"\"\n    def inner():\n        \"\"\"Inner.\"\"\"\n        return 2\n    return inner()\n";
        assert_eq!(
            normalize(source).unwrap(),
            "def outer():\n    def inner():\n        return 2\n    return inner()"
        );
    }

    #[test]
    fn test_inline_body_docstring() {
        assert_eq!(
            normalize("def f(): \"doc\"; return 1\n").unwrap(),
            "def f():\n    return 1"
        );
    }

    #[test]
    fn test_parenthesized_docstring() {
        let wrapped = "def f(x):\n    (\"Docs \"\n     \"continued.\")\n    return x\n";
        assert_eq!(normalize(wrapped).unwrap(), "def f(x):\n    return x");
    }

    #[test]
    fn test_docstring_only_body() {
        assert_eq!(normalize("def f():\n    \"\"\"Only docs.\"\"\"\n").unwrap(), "def f():");
    }

    #[test]
    fn test_async_def_and_concatenated_docstring() {
        let source = "async def fetch(url):\n    \"part one \" 'part two'\n    return await get(url)\n";
        assert_eq!(
            normalize(source).unwrap(),
            "async def fetch(url):\n    return await get(url)"
        );
    }

    #[test]
    fn test_layout_is_canonical() {
        let compact = "def f(a, b=2, *args, **kwargs):\n  return g(a, key=b)[0].value\n";
        let spread = "def f( a,b = 2,\n      *args,**kwargs ):\n\n\treturn g( a,\n key = b )[ 0 ].value\n";
        let expected = "def f(a, b=2, *args, **kwargs):\n    return g(a, key=b)[0].value";
        assert_eq!(normalize(compact).unwrap(), expected);
        assert_eq!(normalize(spread).unwrap(), expected);
    }

    #[test]
    fn test_decorators_and_unary_operators() {
        let source = "@tag(owner=\"data\")\ndef f(x):\n    return -x if x else x * -1\n";
        assert_eq!(
            normalize(source).unwrap(),
            "@tag(owner=\"data\")\ndef f(x):\n    return -x if x else x * -1"
        );
    }

    #[test]
    fn test_relative_imports_keep_spacing() {
        assert_eq!(
            normalize("from . import mod\nfrom ..pkg import thing\n").unwrap(),
            "from . import mod\nfrom ..pkg import thing"
        );
    }

    #[test]
    fn test_string_literals_kept_verbatim() {
        let source = "def f(x):\n    return f\"{x[' a ']}\" + \"( a , b )\"\n";
        assert_eq!(
            normalize(source).unwrap(),
            "def f(x):\n    return f\"{x[' a ']}\" + \"( a , b )\""
        );
        assert_ne!(
            normalize(source).unwrap(),
            normalize("def f(x):\n    return f\"{x['a']}\" + \"( a , b )\"\n").unwrap()
        );
    }

    #[test]
    fn test_malformed_text_fails() {
        assert!(normalize("def f(:\n    return 1\n").is_err());
    }

    #[test]
    fn test_invalid_syntax_fails() {
        for source in [
            "def f(x):\n    return +\n",
            "def f(x) x:\n    return 1\n",
            "def f(x):\nreturn x\n",
        ] {
            assert!(
                matches!(normalize(source), Err(NormalizationError::Syntax { .. })),
                "{:?} should not normalize",
                source
            );
        }
    }
}
