//! Shell-like command line splitting.
//!
//! Much smaller than a shell lexer: whitespace splits,
//! `'` and `"` quote, and `\` escapes the next character. Nothing else is
//! special, so `;`, `|` and `$` stay literal parts of their tokens.

use crate::error::TokenizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Between,
    InToken,
    /// Unescaped whitespace after a token that is not flushed yet.
    Gap,
    Quoted(char),
}

/// A token and the byte offset just past its last character in the input.
#[derive(Debug)]
struct Token {
    text: String,
    end: usize,
}

/// Split `command` into argument tokens.
///
/// A closing quote always ends the current token, so `'a b'c` yields
/// `["a b", "c"]`. An empty quoted section yields an empty token.
///
/// An escaped space or tab is never a separator. When one follows a token
/// across unescaped whitespace it continues that token and the unescaped
/// whitespace is dropped, so `a \ b` yields `["a b"]`.
pub fn tokenize(command: &str) -> Result<Vec<String>, TokenizeError> {
    Ok(scan(command)?.into_iter().map(|token| token.text).collect())
}

fn scan(command: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut end = 0;
    let mut state = State::Between;
    let mut escape_next = false;

    for (i, c) in command.char_indices() {
        let next = i + c.len_utf8();

        if let State::Quoted(quote) = state {
            if c == quote {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    end: next,
                });
                state = State::Between;
            } else {
                current.push(c);
            }
            continue;
        }

        if escape_next {
            escape_next = false;
            if state == State::Gap && !is_separator(c) {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    end,
                });
            }
            current.push(c);
            end = next;
            state = State::InToken;
            continue;
        }

        match c {
            '\\' => escape_next = true,
            _ if is_separator(c) => {
                if state == State::InToken {
                    end = i;
                    state = State::Gap;
                }
            }
            _ => {
                if state == State::Gap {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        end,
                    });
                }
                if c == '"' || c == '\'' {
                    state = State::Quoted(c);
                } else {
                    current.push(c);
                    end = next;
                    state = State::InToken;
                }
            }
        }
    }

    if matches!(state, State::Quoted(_)) {
        return Err(TokenizeError::UnterminatedQuote {
            command: command.to_string(),
        });
    }

    if !current.is_empty() {
        tokens.push(Token { text: current, end });
    }

    Ok(tokens)
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// A forced command split into its program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// First token of the command line.
    pub program: String,

    /// Remaining tokens.
    pub args: Vec<String>,

    /// Raw text following the program token, including its leading separator.
    pub args_string: String,
}

impl CommandLine {
    /// Tokenize `raw`. Returns `Ok(None)` when the line holds no tokens.
    pub fn parse(raw: &str) -> Result<Option<Self>, TokenizeError> {
        let mut tokens = scan(raw)?.into_iter();
        let Some(program) = tokens.next() else {
            return Ok(None);
        };

        Ok(Some(Self {
            program: program.text,
            args: tokens.map(|token| token.text).collect(),
            args_string: raw[program.end..].to_string(),
        }))
    }
}
