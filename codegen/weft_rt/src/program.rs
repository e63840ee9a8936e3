//! Parser from emitted procedure text to a block tree.
//!
//! The instruction language is line-oriented: a line ending in `:` opens a
//! block, nesting is 4-space indentation (the emitter's discipline), `#`
//! lines are metadata and skipped. Tokens are whitespace-separated with
//! double-quoted strings kept whole.

use rustc_hash::FxHashMap;
use weft_emit::INDENT;

use crate::RuntimeError;

/// One instruction line plus its nested block, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Tokens with surrounding quotes stripped.
    pub tokens: Vec<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn op(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

/// One parsed procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proc {
    pub name: String,
    pub param: String,
    pub body: Vec<Node>,
}

/// A parsed set of procedures, keyed by name.
///
/// Procedures generated for different shapes land in the same program, which
/// is what lets delegated `call` instructions resolve.
#[derive(Debug, Clone, Default)]
pub struct Program {
    procs: FxHashMap<String, Proc>,
}

struct Line {
    number: usize,
    indent: usize,
    tokens: Vec<String>,
    header: bool,
}

impl Program {
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        let lines = scan(text)?;
        let mut procs = FxHashMap::default();
        let mut pos = 0;
        while pos < lines.len() {
            let line = &lines[pos];
            if line.indent != 0 || line.tokens.first().map(String::as_str) != Some("proc") {
                return Err(RuntimeError::Parse {
                    line: line.number,
                    detail: "expected a top-level `proc` header".to_owned(),
                });
            }
            if !line.header {
                return Err(RuntimeError::Parse {
                    line: line.number,
                    detail: "`proc` line must open a block".to_owned(),
                });
            }
            let signature = line.tokens.get(1).cloned().unwrap_or_default();
            let (name, param) = split_signature(&signature).ok_or(RuntimeError::Parse {
                line: line.number,
                detail: format!("malformed procedure signature `{signature}`"),
            })?;
            pos += 1;
            let body = parse_block(&lines, &mut pos, 1)?;
            procs.insert(
                name.clone(),
                Proc { name, param, body },
            );
        }
        Ok(Self { procs })
    }

    pub fn proc(&self, name: &str) -> Option<&Proc> {
        self.procs.get(name)
    }

    pub fn proc_names(&self) -> impl Iterator<Item = &str> {
        self.procs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

fn split_signature(signature: &str) -> Option<(String, String)> {
    let open = signature.find('(')?;
    let close = signature.rfind(')')?;
    if close <= open {
        return None;
    }
    let name = signature[..open].to_owned();
    let param = signature[open + 1..close].to_owned();
    if name.is_empty() || param.is_empty() {
        return None;
    }
    Some((name, param))
}

fn scan(text: &str) -> Result<Vec<Line>, RuntimeError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim_start_matches(' ');
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let spaces = raw.len() - trimmed.len();
        if spaces % INDENT != 0 {
            return Err(RuntimeError::Parse {
                line: number,
                detail: format!("indentation of {spaces} spaces is not a multiple of {INDENT}"),
            });
        }
        let header = trimmed.ends_with(':');
        let content = trimmed.strip_suffix(':').unwrap_or(trimmed);
        let tokens = tokenize(content, number)?;
        if tokens.is_empty() {
            return Err(RuntimeError::Parse {
                line: number,
                detail: "empty instruction".to_owned(),
            });
        }
        lines.push(Line {
            number,
            indent: spaces / INDENT,
            tokens,
            header,
        });
    }
    Ok(lines)
}

fn tokenize(content: &str, number: usize) -> Result<Vec<String>, RuntimeError> {
    let mut tokens = Vec::new();
    let mut chars = content.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => token.push(c),
                    None => {
                        return Err(RuntimeError::Parse {
                            line: number,
                            detail: "unterminated string token".to_owned(),
                        })
                    }
                }
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(token);
        }
    }
    Ok(tokens)
}

fn parse_block(
    lines: &[Line],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<Node>, RuntimeError> {
    let mut nodes = Vec::new();
    while *pos < lines.len() {
        let line = &lines[*pos];
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(RuntimeError::Parse {
                line: line.number,
                detail: "unexpected indentation".to_owned(),
            });
        }
        let header = line.header;
        let tokens = line.tokens.clone();
        *pos += 1;
        let children = if header {
            parse_block(lines, pos, indent + 1)?
        } else {
            Vec::new()
        };
        nodes.push(Node { tokens, children });
    }
    Ok(nodes)
}
