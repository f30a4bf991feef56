//! Tokenizes one source line. Whitespace/token based, like the rest of this
//! instruction set's own tooling: no precedence, no nesting, one line at a
//! time.

use crate::error::AssemblerError;

/// One lexical token. Carries no line number; the caller attaches that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word: a mnemonic, or the `DATA`/`LABEL` directive keywords.
    Ident(String),
    /// `%IDENT` — a register name, not yet resolved to an id.
    Register(String),
    /// A decimal integer literal, with optional leading `-`.
    Integer(i64),
    /// A double-quoted string literal (only legal inside `DATA`).
    Str(String),
    /// `@IDENT` — a label reference.
    LabelRef(String),
    /// `,` — operand separator.
    Comma,
}

/// Lexes one already-trimmed, non-comment, non-blank source line.
pub fn lex_line(line: &str, line_no: usize) -> Result<Vec<Token>, AssemblerError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == ',' {
            tokens.push(Token::Comma);
            i += 1;
            continue;
        }

        if c == '%' {
            let (ident, next) = read_ident(&chars, i + 1);
            if ident.is_empty() {
                return Err(lex_err(line_no, "expected register name after '%'"));
            }
            tokens.push(Token::Register(ident));
            i = next;
            continue;
        }

        if c == '@' {
            let (ident, next) = read_ident(&chars, i + 1);
            if ident.is_empty() {
                return Err(lex_err(line_no, "expected label name after '@'"));
            }
            tokens.push(Token::LabelRef(ident));
            i = next;
            continue;
        }

        if c == '"' {
            let (s, next) = read_string(&chars, i + 1, line_no)?;
            tokens.push(Token::Str(s));
            i = next;
            continue;
        }

        if c == '-' || c.is_ascii_digit() {
            let (value, next) = read_integer(&chars, i, line_no)?;
            tokens.push(Token::Integer(value));
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let (ident, next) = read_ident(&chars, i);
            tokens.push(Token::Ident(ident));
            i = next;
            continue;
        }

        return Err(lex_err(line_no, format!("unexpected character '{c}'")));
    }

    Ok(tokens)
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

fn read_integer(
    chars: &[char],
    start: usize,
    line_no: usize,
) -> Result<(i64, usize), AssemblerError> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return Err(lex_err(line_no, "malformed integer literal"));
    }
    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<i64>()
        .map_err(|e| lex_err(line_no, format!("malformed integer literal: {e}")))?;
    Ok((value, i))
}

fn read_string(
    chars: &[char],
    start: usize,
    line_no: usize,
) -> Result<(String, usize), AssemblerError> {
    let mut i = start;
    let mut out = String::new();
    loop {
        if i >= chars.len() {
            return Err(lex_err(line_no, "unterminated string literal"));
        }
        match chars[i] {
            '"' => return Ok((out, i + 1)),
            '\\' if i + 1 < chars.len() => {
                let escaped = match chars[i + 1] {
                    'n' => '\n',
                    't' => '\t',
                    '"' => '"',
                    '\\' => '\\',
                    other => {
                        return Err(lex_err(
                            line_no,
                            format!("unknown escape sequence '\\{other}'"),
                        ))
                    }
                };
                out.push(escaped);
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
}

fn lex_err(line: usize, message: impl Into<String>) -> AssemblerError {
    AssemblerError::Lex {
        line,
        message: message.into(),
    }
}
