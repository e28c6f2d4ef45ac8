//! The parse state machine.
//!
//! The matcher pulls tokens from a [`Tokenizer`] and either scans for the
//! next option or collects values for the option it just opened. All state
//! it builds up (occurrences, leftover arguments, group selections) belongs
//! to a single call, so the registry is only ever read.

use std::collections::HashMap;

use optline_core::{Arity, GroupId, OptionId, OptionRegistry, OptionalArity};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{MissingOption, ParseError, Result};
use crate::result::{Occurrence, ParseResult};
use crate::tokenizer::{Token, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    /// Gathering values for the occurrence at this index.
    Collecting(usize),
}

pub(crate) struct Matcher<'r> {
    registry: &'r OptionRegistry,
    config: ParserConfig,
    occurrences: Vec<Occurrence>,
    leftover: Vec<String>,
    selected: HashMap<GroupId, OptionId>,
}

impl<'r> Matcher<'r> {
    pub(crate) fn new(registry: &'r OptionRegistry, config: ParserConfig) -> Self {
        Self {
            registry,
            config,
            occurrences: Vec::new(),
            leftover: Vec::new(),
            selected: HashMap::new(),
        }
    }

    pub(crate) fn run(
        mut self,
        mut tokens: Tokenizer<'_>,
        defaults: Option<&HashMap<String, String>>,
    ) -> Result<ParseResult> {
        self.scan(&mut tokens)?;
        if let Some(defaults) = defaults {
            self.apply_defaults(defaults)?;
        }
        self.check_required()?;
        Ok(ParseResult::new(self.occurrences, self.leftover))
    }

    fn scan(&mut self, tokens: &mut Tokenizer<'_>) -> Result<()> {
        let mut state = State::Scanning;

        loop {
            match state {
                State::Scanning => {
                    let Some(token) = tokens.next_token() else {
                        return Ok(());
                    };
                    match token {
                        Token::Option {
                            id,
                            written,
                            attached,
                        } => state = self.open(id, &written, attached)?,
                        Token::Unknown { text, tail } => {
                            if self.config.stop_at_non_option {
                                self.leftover.push(tail.unwrap_or(text));
                                self.stop(tokens);
                                return Ok(());
                            }
                            if !self.config.allow_unknown {
                                return Err(ParseError::UnrecognizedOption { token: text });
                            }
                            let kept = tail.unwrap_or(text);
                            debug!(token = %kept, "Keeping unknown option as argument");
                            self.leftover.push(kept);
                        }
                        Token::Ambiguous { text, candidates } => {
                            return Err(ParseError::AmbiguousOption {
                                token: text,
                                candidates,
                            });
                        }
                        Token::Value { text } => {
                            self.leftover.push(text);
                            if self.config.stop_at_non_option {
                                self.stop(tokens);
                                return Ok(());
                            }
                        }
                        Token::EndOfOptions => {}
                    }
                }
                State::Collecting(index) => {
                    let occurrence = &self.occurrences[index];
                    let arity = occurrence.descriptor().arity();
                    let collected = occurrence.values().len();

                    let is_full = arity.max_values().is_some_and(|max| collected >= max);
                    let takes_next = !is_full
                        && tokens
                            .peek()
                            .is_some_and(|token| takes_token(arity, collected, token));

                    if takes_next {
                        if let Some(
                            Token::Value { text }
                            | Token::Unknown { text, .. }
                            | Token::Ambiguous { text, .. },
                        ) = tokens.next_token()
                        {
                            self.add_value(index, &text);
                        }
                    } else {
                        self.close(index)?;
                        state = State::Scanning;
                    }
                }
            }
        }
    }

    /// Records a matched option and returns the state to continue in.
    fn open(&mut self, id: OptionId, written: &str, attached: Option<String>) -> Result<State> {
        let registry = self.registry;
        let descriptor = registry.option(id);
        self.select(id)?;
        debug!(option = %written, attached = ?attached, "Matched option");

        self.occurrences.push(Occurrence::new(id, descriptor.clone()));
        let index = self.occurrences.len() - 1;

        if !descriptor.arity().accepts_values() {
            return Ok(State::Scanning);
        }
        if let Some(value) = attached {
            self.add_value(index, &value);
        }
        Ok(State::Collecting(index))
    }

    /// Marks `id` as its group's selection.
    fn select(&mut self, id: OptionId) -> Result<()> {
        let Some(group) = self.registry.group_of(id) else {
            return Ok(());
        };
        match self.selected.get(&group) {
            Some(&selected) if selected != id => Err(ParseError::AlreadySelected {
                option: self.registry.option(id).display_name(),
                selected: self.registry.option(selected).display_name(),
            }),
            _ => {
                self.selected.insert(group, id);
                Ok(())
            }
        }
    }

    /// Adds a raw value, splitting it on the option's separator. Splitting
    /// stops one short of the option's maximum so the remainder stays whole.
    fn add_value(&mut self, index: usize, raw: &str) {
        let occurrence = &mut self.occurrences[index];
        let separator = occurrence.descriptor().value_separator();
        let max = occurrence.descriptor().arity().max_values();
        let values = occurrence.values_mut();

        let Some(separator) = separator else {
            values.push(raw.to_string());
            return;
        };

        let mut rest = raw;
        while max.is_none_or(|max| values.len() + 1 < max) {
            let Some((head, tail)) = rest.split_once(separator) else {
                break;
            };
            values.push(head.to_string());
            rest = tail;
        }
        values.push(rest.to_string());
    }

    fn close(&self, index: usize) -> Result<()> {
        let occurrence = &self.occurrences[index];
        let descriptor = occurrence.descriptor();
        debug!(
            option = %descriptor.display_name(),
            values = ?occurrence.values(),
            "Closed option"
        );
        if occurrence.values().len() < descriptor.arity().min_values() {
            return Err(ParseError::MissingArgument {
                option: descriptor.display_name(),
            });
        }
        Ok(())
    }

    fn stop(&mut self, tokens: &mut Tokenizer<'_>) {
        let rest = tokens.remaining_raw();
        debug!(leftover = ?rest, "Stopped at non-option");
        self.leftover.extend(rest);
    }

    fn is_present(&self, id: OptionId) -> bool {
        self.occurrences.iter().any(|o| o.id() == id)
    }

    /// Injects default values for options the command line left out.
    fn apply_defaults(&mut self, defaults: &HashMap<String, String>) -> Result<()> {
        let mut keys: Vec<&String> = defaults.keys().collect();
        keys.sort();

        let mut by_option: HashMap<OptionId, &str> = HashMap::new();
        for key in keys {
            let id = self
                .registry
                .find(key)
                .ok_or_else(|| ParseError::UndefinedDefault(key.clone()))?;
            by_option.entry(id).or_insert(defaults[key].as_str());
        }

        let registry = self.registry;
        for (id, descriptor) in registry.options() {
            let Some(&value) = by_option.get(&id) else {
                continue;
            };
            let group_taken = registry
                .group_of(id)
                .is_some_and(|group| self.selected.contains_key(&group));
            if self.is_present(id) || group_taken {
                continue;
            }

            let mut occurrence = Occurrence::new(id, descriptor.clone());
            if descriptor.arity().accepts_values() {
                occurrence.values_mut().push(value.to_string());
            } else if !is_truthy(value) {
                continue;
            }

            debug!(option = %descriptor.display_name(), value, "Applied default");
            self.select(id)?;
            self.occurrences.push(occurrence);
        }
        Ok(())
    }

    /// Fails with every required option and group that was not satisfied.
    fn check_required(&self) -> Result<()> {
        let mut missing = Vec::new();

        for id in self.registry.required_options() {
            if !self.is_present(id) {
                missing.push(MissingOption::Option(self.registry.option(id).key()));
            }
        }
        for group in self.registry.required_groups() {
            if !self.selected.contains_key(&group) {
                let members = self
                    .registry
                    .group(group)
                    .members()
                    .iter()
                    .map(|&id| self.registry.option(id).key())
                    .collect();
                missing.push(MissingOption::Group(members));
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::MissingOptions { missing })
        }
    }
}

/// Decides whether an open option consumes `token` as its next value.
///
/// Exact counts take unregistered or ambiguous option-like strings
/// literally; unbounded options stop at anything option-like. An optional
/// option needs a plain value to start collecting at all.
fn takes_token(arity: Arity, collected: usize, token: &Token) -> bool {
    match token {
        Token::Value { .. } => true,
        Token::Unknown { .. } | Token::Ambiguous { .. } => match arity {
            Arity::Exactly(_) => true,
            Arity::Optional(OptionalArity::Exactly(_)) => collected > 0,
            _ => false,
        },
        Token::Option { .. } | Token::EndOfOptions => false,
    }
}

fn is_truthy(value: &str) -> bool {
    ["true", "yes", "1"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value() -> Token {
        Token::Value {
            text: "x".to_string(),
        }
    }

    fn unknown() -> Token {
        Token::Unknown {
            text: "-x".to_string(),
            tail: None,
        }
    }

    #[test]
    fn test_takes_token_by_arity() {
        assert!(takes_token(Arity::Exactly(2), 0, &unknown()));
        assert!(!takes_token(Arity::Unbounded, 1, &unknown()));
        assert!(takes_token(Arity::Unbounded, 1, &value()));

        let optional = Arity::Optional(OptionalArity::Exactly(2));
        assert!(!takes_token(optional, 0, &unknown()));
        assert!(takes_token(optional, 1, &unknown()));
        assert!(takes_token(optional, 0, &value()));

        assert!(!takes_token(Arity::Exactly(1), 0, &Token::EndOfOptions));

        let ambiguous = Token::Ambiguous {
            text: "--ver".to_string(),
            candidates: vec!["--verbose".to_string(), "--version".to_string()],
        };
        assert!(takes_token(Arity::Exactly(1), 0, &ambiguous));
        assert!(!takes_token(Arity::Unbounded, 0, &ambiguous));
    }

    #[test]
    fn test_is_truthy() {
        for value in ["true", "TRUE", "yes", "Yes", "1"] {
            assert!(is_truthy(value), "{value}");
        }
        for value in ["false", "no", "0", ""] {
            assert!(!is_truthy(value), "{value}");
        }
    }
}
