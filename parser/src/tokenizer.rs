//! Splits raw arguments into option and value tokens.
//!
//! The tokenizer is lazy: an argument is only classified when the matcher
//! asks for the next token, so arguments after an early stop are handed
//! back untouched by [`Tokenizer::remaining_raw`].

use std::collections::VecDeque;
use std::sync::LazyLock;

use optline_core::{OptionId, OptionRegistry};
use regex::Regex;
use tracing::trace;

static NEGATIVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").expect("static regex must compile")
});

/// One classified piece of the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A registered option.
    Option {
        id: OptionId,
        /// The option as it was written, e.g. `-D` or `--output`.
        written: String,
        /// Value glued to the option in the same argument.
        attached: Option<String>,
    },
    /// Looks like an option but names none.
    Unknown {
        /// The whole argument.
        text: String,
        /// Unmatched remainder of a short option bundle.
        tail: Option<String>,
    },
    /// A long-option prefix shared by several long names.
    Ambiguous {
        /// The whole argument.
        text: String,
        /// Every long name the prefix matches, with hyphens.
        candidates: Vec<String>,
    },
    /// A plain argument.
    Value { text: String },
    /// The `--` marker that ends option scanning.
    EndOfOptions,
}

impl Token {
    /// Returns `true` for tokens that introduce an option, registered or not.
    pub fn is_option_like(&self) -> bool {
        matches!(
            self,
            Token::Option { .. } | Token::Unknown { .. } | Token::Ambiguous { .. }
        )
    }
}

/// Lazy token stream over a command line.
///
/// # Examples
///
/// ```
/// use optline_core::{OptionRegistry, OptionSpec};
/// use optline_parser::{Token, Tokenizer};
///
/// let mut registry = OptionRegistry::new();
/// let a = registry.add_option(OptionSpec::flag(Some('a'), None)).unwrap();
/// let b = registry.add_option(OptionSpec::with_value(Some('b'), None)).unwrap();
///
/// let tokens: Vec<Token> = Tokenizer::new(&registry, ["-abfoo", "-1"])
///     .collect();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Option { id: a, written: "-a".into(), attached: None },
///         Token::Option { id: b, written: "-b".into(), attached: Some("foo".into()) },
///         Token::Value { text: "-1".into() },
///     ]
/// );
/// ```
#[derive(Debug)]
pub struct Tokenizer<'r> {
    registry: &'r OptionRegistry,
    args: VecDeque<String>,
    queue: VecDeque<Token>,
    options_ended: bool,
    partial_matching: bool,
}

impl<'r> Tokenizer<'r> {
    pub fn new<I, S>(registry: &'r OptionRegistry, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry,
            args: args.into_iter().map(Into::into).collect(),
            queue: VecDeque::new(),
            options_ended: false,
            partial_matching: false,
        }
    }

    /// Accepts unique prefixes of long names after `--`.
    pub fn with_partial_matching(mut self, enabled: bool) -> Self {
        self.partial_matching = enabled;
        self
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Token> {
        self.fill();
        self.queue.front()
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        self.fill();
        self.queue.pop_front()
    }

    /// Drains every argument that has not been classified yet.
    pub fn remaining_raw(&mut self) -> Vec<String> {
        self.args.drain(..).collect()
    }

    fn fill(&mut self) {
        while self.queue.is_empty() {
            let Some(arg) = self.args.pop_front() else {
                break;
            };
            self.split(arg);
        }
    }

    fn split(&mut self, arg: String) {
        let before = self.queue.len();

        if self.options_ended || arg == "-" {
            self.queue.push_back(Token::Value { text: arg });
        } else if arg == "--" {
            self.options_ended = true;
            self.queue.push_back(Token::EndOfOptions);
        } else if let Some(body) = arg.strip_prefix("--") {
            let token = self.split_long(&arg, body);
            self.queue.push_back(token);
        } else if let Some(body) = arg.strip_prefix('-') {
            let tokens = self.split_short(&arg, body);
            self.queue.extend(tokens);
        } else {
            self.queue.push_back(Token::Value { text: arg });
        }

        trace!(tokens = ?self.queue.range(before..).collect::<Vec<_>>(), "Tokenized argument");
    }

    /// `--name` and `--name=value`.
    fn split_long(&self, arg: &str, body: &str) -> Token {
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let id = match self.registry.by_long(name) {
            Some(id) => Some(id),
            None if self.partial_matching && !name.is_empty() => {
                let candidates = self.registry.matching_long(name);
                if candidates.len() > 1 {
                    return Token::Ambiguous {
                        text: arg.to_string(),
                        candidates: candidates
                            .into_iter()
                            .map(|id| {
                                format!("--{}", self.registry.option(id).long().unwrap_or_default())
                            })
                            .collect(),
                    };
                }
                candidates.first().copied()
            }
            None => None,
        };

        match id {
            Some(id) if value.is_none() || self.accepts_values(id) => Token::Option {
                id,
                written: format!("--{name}"),
                attached: value.map(String::from),
            },
            _ => unknown(arg, None),
        }
    }

    /// Everything that starts with a single `-`.
    fn split_short(&self, arg: &str, body: &str) -> Vec<Token> {
        let Some(first) = body.chars().next() else {
            return vec![unknown(arg, None)];
        };

        if self.registry.by_short(first).is_none() && NEGATIVE_NUMBER_RE.is_match(arg) {
            return vec![Token::Value {
                text: arg.to_string(),
            }];
        }

        if let Some((name, value)) = body.split_once('=') {
            if let Some(token) = self.split_assignment(body, name, value) {
                return vec![token];
            }
        }

        // Single-hyphen long name, unless the argument is exactly a short name
        let is_single_short = body.len() == first.len_utf8() && self.registry.by_short(first).is_some();
        if !is_single_short {
            if let Some(id) = self.registry.by_long(body) {
                return vec![Token::Option {
                    id,
                    written: arg.to_string(),
                    attached: None,
                }];
            }
        }

        if let Some((id, name_len)) = self.long_prefix(body) {
            return vec![Token::Option {
                id,
                written: format!("-{}", &body[..name_len]),
                attached: Some(body[name_len..].to_string()),
            }];
        }

        self.split_bundle(arg, body)
    }

    /// `-X=V`, `-XREST=V` and `-name=V`.
    fn split_assignment(&self, body: &str, name: &str, value: &str) -> Option<Token> {
        let mut chars = name.chars();
        let first = chars.next()?;

        if chars.next().is_none() {
            let id = self
                .registry
                .by_short(first)
                .or_else(|| self.registry.by_long(name))?;
            return self.accepts_values(id).then(|| Token::Option {
                id,
                written: format!("-{name}"),
                attached: Some(value.to_string()),
            });
        }

        if let Some(id) = self.registry.by_short(first) {
            if self.registry.option(id).arity().is_multi_valued() {
                return Some(Token::Option {
                    id,
                    written: format!("-{first}"),
                    attached: Some(body[first.len_utf8()..].to_string()),
                });
            }
        }

        let id = self.registry.by_long(name)?;
        self.accepts_values(id).then(|| Token::Option {
            id,
            written: format!("-{name}"),
            attached: Some(value.to_string()),
        })
    }

    /// Longest long name of two or more characters that is a proper prefix
    /// of `body` and takes values. Returns the option and the name length in
    /// bytes.
    fn long_prefix(&self, body: &str) -> Option<(OptionId, usize)> {
        self.registry
            .options()
            .filter_map(|(id, option)| option.long().map(|long| (id, long)))
            .filter(|(id, long)| {
                long.chars().nth(1).is_some()
                    && long.len() < body.len()
                    && body.starts_with(long)
                    && self.accepts_values(*id)
            })
            .max_by_key(|(_, long)| long.len())
            .map(|(id, long)| (id, long.len()))
    }

    /// POSIX-style bundle of short options. The first option that takes
    /// values swallows the rest of the argument.
    fn split_bundle(&self, arg: &str, body: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for (offset, ch) in body.char_indices() {
            let Some(id) = self.registry.by_short(ch) else {
                let tail = (offset > 0).then(|| body[offset..].to_string());
                tokens.push(unknown(arg, tail));
                break;
            };

            let rest = &body[offset + ch.len_utf8()..];
            let accepts_values = self.accepts_values(id);
            tokens.push(Token::Option {
                id,
                written: format!("-{ch}"),
                attached: (accepts_values && !rest.is_empty()).then(|| rest.to_string()),
            });
            if accepts_values {
                break;
            }
        }

        tokens
    }

    fn accepts_values(&self, id: OptionId) -> bool {
        self.registry.option(id).arity().accepts_values()
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn unknown(arg: &str, tail: Option<String>) -> Token {
    Token::Unknown {
        text: arg.to_string(),
        tail,
    }
}
