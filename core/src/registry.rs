//! The option registry a command line is parsed against.
//!
//! An [`OptionRegistry`] owns every [`OptionDescriptor`] and [`OptionGroup`]
//! of a command and answers lookups by short and long name. It is never
//! mutated by parsing, so one registry can serve any number of parses.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::strip_hyphens;
use crate::{
    DefinitionError, GroupId, GroupSpec, LoadError, OptionDescriptor, OptionGroup, OptionId,
    OptionSpec, RegistryDefinition,
};

/// All options and groups known to a parser.
///
/// # Examples
///
/// ```
/// use optline_core::*;
///
/// let mut registry = OptionRegistry::new();
/// let verbose = registry.add_option(OptionSpec::flag(Some('v'), Some("verbose"))).unwrap();
/// registry
///     .add_option(OptionSpec::with_value(Some('o'), Some("output")))
///     .unwrap();
///
/// assert_eq!(registry.by_short('v'), Some(verbose));
/// assert_eq!(registry.by_long("verbose"), Some(verbose));
/// assert_eq!(registry.find("--verbose"), Some(verbose));
/// assert_eq!(registry.len(), 2);
///
/// // Names are unique within a registry
/// let err = registry.add_option(OptionSpec::flag(Some('v'), None)).unwrap_err();
/// assert_eq!(err, DefinitionError::DuplicateShort('v'));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: Vec<OptionDescriptor>,
    short_index: HashMap<char, OptionId>,
    long_index: BTreeMap<String, OptionId>,
    groups: Vec<OptionGroup>,
    group_of: HashMap<OptionId, GroupId>,
}

impl OptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `spec` and registers the resulting option.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the spec is invalid or one of its
    /// names is already taken. The registry is unchanged on error.
    pub fn add_option(&mut self, spec: OptionSpec) -> Result<OptionId, DefinitionError> {
        self.add_descriptor(OptionDescriptor::new(spec)?)
    }

    /// Registers an already validated descriptor.
    pub fn add_descriptor(
        &mut self,
        descriptor: OptionDescriptor,
    ) -> Result<OptionId, DefinitionError> {
        self.check_unique(&descriptor)?;
        Ok(self.insert(descriptor))
    }

    /// Registers a group together with its member options.
    ///
    /// Members lose their own `required` flag: whether one of them must be
    /// present is decided by the group.
    ///
    /// # Errors
    ///
    /// Fails if any member spec is invalid or clashes with a registered name
    /// or another member. Nothing is registered on error.
    pub fn add_group(&mut self, spec: GroupSpec) -> Result<GroupId, DefinitionError> {
        let mut members = Vec::with_capacity(spec.options.len());
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();

        for option in spec.options {
            let mut descriptor = OptionDescriptor::new(option)?;
            self.check_unique(&descriptor)?;
            if let Some(short) = descriptor.short() {
                if !shorts.insert(short) {
                    return Err(DefinitionError::DuplicateShort(short));
                }
            }
            if let Some(long) = descriptor.long() {
                if !longs.insert(long.to_string()) {
                    return Err(DefinitionError::DuplicateLong(long.to_string()));
                }
            }
            descriptor.clear_required();
            members.push(descriptor);
        }

        let ids = members
            .into_iter()
            .map(|descriptor| self.insert(descriptor))
            .collect();
        Ok(self.push_group(ids, spec.required))
    }

    /// Groups options that are already registered.
    ///
    /// # Errors
    ///
    /// Fails with [`DefinitionError::UnknownOption`] for ids this registry
    /// did not hand out and [`DefinitionError::AlreadyGrouped`] if an option
    /// is listed twice or already belongs to a group.
    pub fn group_options(
        &mut self,
        ids: &[OptionId],
        required: bool,
    ) -> Result<GroupId, DefinitionError> {
        let mut seen = HashSet::new();
        for &id in ids {
            let descriptor = self
                .options
                .get(id.0)
                .ok_or(DefinitionError::UnknownOption(id.0))?;
            if self.group_of.contains_key(&id) || !seen.insert(id) {
                return Err(DefinitionError::AlreadyGrouped(descriptor.key()));
            }
        }

        for &id in ids {
            self.options[id.0].clear_required();
        }
        Ok(self.push_group(ids.to_vec(), required))
    }

    /// Returns the descriptor for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was handed out by a different registry and is out of
    /// range for this one.
    pub fn option(&self, id: OptionId) -> &OptionDescriptor {
        &self.options[id.0]
    }

    /// Returns the descriptor for `id`, if registered.
    pub fn get(&self, id: OptionId) -> Option<&OptionDescriptor> {
        self.options.get(id.0)
    }

    /// Returns the group for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for this registry.
    pub fn group(&self, id: GroupId) -> &OptionGroup {
        &self.groups[id.0]
    }

    /// Returns the group `id` belongs to.
    pub fn group_of(&self, id: OptionId) -> Option<GroupId> {
        self.group_of.get(&id).copied()
    }

    /// Looks up an option by short name.
    pub fn by_short(&self, short: char) -> Option<OptionId> {
        self.short_index.get(&short).copied()
    }

    /// Looks up an option by long name.
    pub fn by_long(&self, long: &str) -> Option<OptionId> {
        self.long_index.get(long).copied()
    }

    /// Returns the options whose long name starts with `prefix`.
    ///
    /// An exact match wins over longer names, so `--verb` selects `verb`
    /// even if `verbose` exists.
    pub fn matching_long(&self, prefix: &str) -> Vec<OptionId> {
        if let Some(id) = self.by_long(prefix) {
            return vec![id];
        }
        self.long_index
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(_, &id)| id)
            .collect()
    }

    /// Looks up an option by name, as a user would write it.
    ///
    /// Leading `-` or `--` is ignored. A single character is tried as a
    /// short name first, then as a long name.
    pub fn find(&self, name: &str) -> Option<OptionId> {
        let name = strip_hyphens(name);
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(id) = self.by_short(ch) {
                return Some(id);
            }
        }
        self.by_long(name)
    }

    /// Iterates over options in registration order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &OptionDescriptor)> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (OptionId(index), descriptor))
    }

    /// Iterates over groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &OptionGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| (GroupId(index), group))
    }

    /// Required options outside of any group.
    pub fn required_options(&self) -> impl Iterator<Item = OptionId> + '_ {
        self.options()
            .filter(|(id, descriptor)| descriptor.is_required() && !self.group_of.contains_key(id))
            .map(|(id, _)| id)
    }

    /// Groups that need one of their members present.
    pub fn required_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups()
            .filter(|(_, group)| group.is_required())
            .map(|(id, _)| id)
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Builds a registry from its serializable form.
    ///
    /// Ungrouped options are registered first, then each group with its
    /// members.
    pub fn from_definition(definition: RegistryDefinition) -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        for option in definition.options {
            registry.add_option(option)?;
        }
        for group in definition.groups {
            registry.add_group(group)?;
        }
        Ok(registry)
    }

    /// Loads a registry from a JSON [`RegistryDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::JsonError`] for malformed JSON and
    /// [`LoadError::Definition`] for invalid or clashing options.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let definition: RegistryDefinition = serde_json::from_str(json)?;
        Ok(Self::from_definition(definition)?)
    }

    /// Returns the serializable form of this registry.
    pub fn to_definition(&self) -> RegistryDefinition {
        let mut definition = RegistryDefinition::new();
        for (id, descriptor) in self.options() {
            if !self.group_of.contains_key(&id) {
                definition.options.push(descriptor.clone().into());
            }
        }
        for (_, group) in self.groups() {
            definition.groups.push(GroupSpec {
                options: group
                    .members()
                    .iter()
                    .map(|&id| self.option(id).clone().into())
                    .collect(),
                required: group.is_required(),
            });
        }
        definition
    }

    fn check_unique(&self, descriptor: &OptionDescriptor) -> Result<(), DefinitionError> {
        if let Some(short) = descriptor.short() {
            if self.short_index.contains_key(&short) {
                return Err(DefinitionError::DuplicateShort(short));
            }
        }
        if let Some(long) = descriptor.long() {
            if self.long_index.contains_key(long) {
                return Err(DefinitionError::DuplicateLong(long.to_string()));
            }
        }
        Ok(())
    }

    fn insert(&mut self, descriptor: OptionDescriptor) -> OptionId {
        let id = OptionId(self.options.len());
        if let Some(short) = descriptor.short() {
            self.short_index.insert(short, id);
        }
        if let Some(long) = descriptor.long() {
            self.long_index.insert(long.to_string(), id);
        }
        self.options.push(descriptor);
        id
    }

    fn push_group(&mut self, members: Vec<OptionId>, required: bool) -> GroupId {
        let id = GroupId(self.groups.len());
        for &member in &members {
            self.group_of.insert(member, id);
        }
        self.groups.push(OptionGroup::new(members, required));
        id
    }
}

#[cfg(test)]
mod tests {
    use crate::{Arity, ValueKind};

    use super::*;

    fn sample_registry() -> OptionRegistry {
        let mut registry = OptionRegistry::new();
        registry
            .add_option(OptionSpec::flag(Some('v'), Some("verbose")))
            .unwrap();
        registry
            .add_option(OptionSpec::flag(None, Some("verify")))
            .unwrap();
        registry
            .add_option(OptionSpec::with_value(None, Some("version-file")))
            .unwrap();
        registry
    }

    #[test]
    fn test_matching_long_prefers_exact_match() {
        let mut registry = sample_registry();
        let verb = registry.add_option(OptionSpec::flag(None, Some("verb"))).unwrap();

        assert_eq!(registry.matching_long("verb"), vec![verb]);
        assert_eq!(registry.matching_long("verbo").len(), 1);
        assert_eq!(registry.matching_long("ver").len(), 4);
        assert!(registry.matching_long("x").is_empty());
    }

    #[test]
    fn test_find_tries_short_then_long() {
        let mut registry = OptionRegistry::new();
        let c_short = registry.add_option(OptionSpec::flag(Some('c'), None)).unwrap();
        let d_long = registry.add_option(OptionSpec::flag(None, Some("d"))).unwrap();

        assert_eq!(registry.find("c"), Some(c_short));
        assert_eq!(registry.find("-c"), Some(c_short));
        assert_eq!(registry.find("--d"), Some(d_long));
        assert_eq!(registry.find("e"), None);
    }

    #[test]
    fn test_add_group_is_atomic() {
        let mut registry = sample_registry();
        let err = registry
            .add_group(
                GroupSpec::new()
                    .with_option(OptionSpec::flag(Some('l'), Some("left")))
                    .with_option(OptionSpec::flag(Some('v'), Some("vertical"))),
            )
            .unwrap_err();

        assert_eq!(err, DefinitionError::DuplicateShort('v'));
        assert_eq!(registry.by_short('l'), None);
        assert_eq!(registry.groups().count(), 0);
    }

    #[test]
    fn test_add_group_rejects_duplicate_members() {
        let mut registry = OptionRegistry::new();
        let err = registry
            .add_group(
                GroupSpec::new()
                    .with_option(OptionSpec::flag(None, Some("left")))
                    .with_option(OptionSpec::flag(None, Some("left"))),
            )
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateLong("left".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_group_members_are_not_required() {
        let mut registry = OptionRegistry::new();
        let group = registry
            .add_group(
                GroupSpec::new()
                    .with_option(OptionSpec::flag(Some('l'), None).required())
                    .with_option(OptionSpec::flag(Some('r'), None)),
            )
            .unwrap();

        let left = registry.by_short('l').unwrap();
        assert!(!registry.option(left).is_required());
        assert_eq!(registry.group_of(left), Some(group));
        assert_eq!(registry.required_options().count(), 0);
    }

    #[test]
    fn test_group_options_rejects_regrouping() {
        let mut registry = OptionRegistry::new();
        let a = registry.add_option(OptionSpec::flag(Some('a'), None)).unwrap();
        let b = registry.add_option(OptionSpec::flag(Some('b'), None).required()).unwrap();
        let c = registry.add_option(OptionSpec::flag(Some('c'), None)).unwrap();

        let group = registry.group_options(&[a, b], true).unwrap();
        assert!(!registry.option(b).is_required());
        assert_eq!(registry.required_groups().collect::<Vec<_>>(), vec![group]);

        assert_eq!(
            registry.group_options(&[b, c], false),
            Err(DefinitionError::AlreadyGrouped("b".to_string()))
        );
        assert_eq!(
            registry.group_options(&[c, c], false),
            Err(DefinitionError::AlreadyGrouped("c".to_string()))
        );
        assert_eq!(
            registry.group_options(&[OptionId(42)], false),
            Err(DefinitionError::UnknownOption(42))
        );
    }

    #[test]
    fn test_definition_round_trip() {
        let mut registry = OptionRegistry::new();
        registry
            .add_option(
                OptionSpec::with_value(Some('n'), Some("count"))
                    .with_kind(ValueKind::Number)
                    .required(),
            )
            .unwrap();
        registry
            .add_group(
                GroupSpec::new()
                    .with_option(OptionSpec::flag(Some('l'), Some("left")))
                    .with_option(OptionSpec::flag(Some('r'), Some("right")))
                    .required(),
            )
            .unwrap();

        let json = serde_json::to_string(&registry.to_definition()).unwrap();
        let loaded = OptionRegistry::from_json(&json).unwrap();

        let count = loaded.by_long("count").unwrap();
        assert_eq!(loaded.option(count).arity(), Arity::Exactly(1));
        assert_eq!(loaded.option(count).value_kind(), Some(ValueKind::Number));
        assert!(loaded.option(count).is_required());
        assert_eq!(loaded.required_groups().count(), 1);
        assert!(loaded.group_of(loaded.by_short('r').unwrap()).is_some());
    }

    #[test]
    fn test_from_json_reports_invalid_definition() {
        let err = OptionRegistry::from_json(r#"{"options": [{"short": "a"}, {"short": "a"}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Definition(DefinitionError::DuplicateShort('a'))
        ));

        let err = OptionRegistry::from_json("{not json").unwrap_err();
        assert!(matches!(err, LoadError::JsonError(_)));
    }
}
