//! Directive-file parsing.
//!
//! Syntax:
//!
//! ```text
//! markdown [<path-prefix>] {
//!     scheme <name>
//!     template <name>
//!     mime_types <type>...
//! }
//! ```
//!
//! A bare `markdown [<path-prefix>]` line takes all defaults. Unknown keywords
//! inside a block are ignored. `#` starts a comment.

use thiserror::Error;

use crate::markdown::HandlerConfig;

/// Name of the handler directive.
pub const DIRECTIVE: &str = "markdown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct DirectiveError {
    pub line: usize,
    pub message: String,
}

fn err(line: usize, message: impl Into<String>) -> DirectiveError {
    DirectiveError {
        line,
        message: message.into(),
    }
}

/// Parse every `markdown` block in `input`.
pub fn parse_directives(input: &str) -> Result<Vec<HandlerConfig>, DirectiveError> {
    let mut handlers = Vec::new();
    let mut open: Option<(usize, HandlerConfig)> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let mut close = false;
        let content = raw.split('#').next().unwrap_or_default();
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let Some((&keyword, args)) = tokens.split_first() else {
            continue;
        };

        match open.as_mut() {
            None => {
                if keyword != DIRECTIVE {
                    return Err(err(line, format!("unknown directive '{keyword}'")));
                }
                let (args, opens_block) = match args.split_last() {
                    Some((&"{", rest)) => (rest, true),
                    _ => (args, false),
                };
                let mut handler = HandlerConfig::default();
                match args {
                    [] => {}
                    [prefix] => handler.path_prefix = Some(prefix.to_string()),
                    _ => return Err(err(line, "markdown takes at most one path prefix")),
                }
                if opens_block {
                    open = Some((line, handler));
                } else {
                    handlers.push(handler);
                }
            }
            Some((_, handler)) => match keyword {
                "}" => {
                    if !args.is_empty() {
                        return Err(err(line, "unexpected tokens after '}'"));
                    }
                    close = true;
                }
                "{" => return Err(err(line, "nested blocks are not supported")),
                "scheme" | "template" => {
                    let [name] = args else {
                        return Err(err(line, format!("{keyword} expects exactly one argument")));
                    };
                    if keyword == "scheme" {
                        handler.scheme = Some(name.to_string());
                    } else {
                        handler.template = Some(name.to_string());
                    }
                }
                "mime_types" => {
                    if args.is_empty() {
                        return Err(err(line, "mime_types expects at least one argument"));
                    }
                    handler.mime_types = Some(args.iter().map(|s| s.to_string()).collect());
                }
                other => {
                    tracing::debug!(line, keyword = other, "Ignoring unknown markdown subdirective");
                }
            },
        }

        if close {
            if let Some((_, handler)) = open.take() {
                handlers.push(handler);
            }
        }
    }

    if let Some((line, _)) = open {
        return Err(err(line, "unterminated markdown block"));
    }

    Ok(handlers)
}
