//! Composable filters over field and method descriptors
//!
//! Every filter takes an ordered sequence and returns the kept items in their
//! original relative order, so filters compose freely.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MapperError, Result};
use crate::registry::{FieldDescriptor, MethodDescriptor, Visibility};

const GETTER_PATTERN: &str = "get[A-Za-z0-9]+|is[A-Za-z0-9]+";
const SETTER_PATTERN: &str = "set[A-Za-z0-9]+";

static GETTER_REGEX: OnceLock<Regex> = OnceLock::new();
static SETTER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Anything with a name a pattern can be matched against
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for FieldDescriptor {
    fn name(&self) -> &str {
        FieldDescriptor::name(self)
    }
}

impl Named for MethodDescriptor {
    fn name(&self) -> &str {
        MethodDescriptor::name(self)
    }
}

/// An order-preserving filter
pub trait Criteria<T>: Send + Sync {
    fn meet_criteria(&self, items: Vec<T>) -> Vec<T>;
}

/// Keeps items whose name contains a match of the pattern
#[derive(Debug, Clone)]
pub struct NamePatternCriteria {
    pattern: Regex,
}

impl NamePatternCriteria {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| MapperError::Configuration {
            message: format!("Invalid name pattern '{}': {}", pattern, e),
            source: Some(e.into()),
        })?;
        Ok(Self { pattern })
    }

    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Matches names containing `text` literally
    pub fn literal(text: &str) -> Result<Self> {
        Self::new(&regex::escape(text))
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl<T: Named> Criteria<T> for NamePatternCriteria {
    fn meet_criteria(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.pattern.is_match(item.name()))
            .collect()
    }
}

/// Keeps methods with the given visibility and, optionally, arity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureCriteria {
    visibility: Visibility,
    arity: Option<usize>,
}

impl SignatureCriteria {
    pub fn new(visibility: Visibility, arity: Option<usize>) -> Self {
        Self { visibility, arity }
    }
}

impl Criteria<MethodDescriptor> for SignatureCriteria {
    fn meet_criteria(&self, items: Vec<MethodDescriptor>) -> Vec<MethodDescriptor> {
        items
            .into_iter()
            .filter(|m| m.visibility() == self.visibility)
            .filter(|m| self.arity.map_or(true, |arity| m.arity() == arity))
            .collect()
    }
}

/// Keeps fields that carry an accessor tag, optionally a specific one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedFieldCriteria {
    accessor: Option<String>,
}

impl TaggedFieldCriteria {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_accessor(accessor: impl Into<String>) -> Self {
        Self {
            accessor: Some(accessor.into()),
        }
    }
}

impl Criteria<FieldDescriptor> for TaggedFieldCriteria {
    fn meet_criteria(&self, items: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
        items
            .into_iter()
            .filter(|field| match (&self.accessor, field.accessor_tag()) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(wanted), Some(tag)) => wanted == tag,
            })
            .collect()
    }
}

/// Applies each member filter in turn
pub struct CompoundCriteria<T> {
    members: Vec<Box<dyn Criteria<T>>>,
}

impl<T> CompoundCriteria<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    pub fn with(mut self, criteria: impl Criteria<T> + 'static) -> Self {
        self.members.push(Box::new(criteria));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<T> Default for CompoundCriteria<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Criteria<T> for CompoundCriteria<T> {
    fn meet_criteria(&self, items: Vec<T>) -> Vec<T> {
        self.members
            .iter()
            .fold(items, |kept, criteria| criteria.meet_criteria(kept))
    }
}

/// Narrows the output of a wrapped filter with an extra filter
pub struct DecoratorCriteria<T> {
    inner: Box<dyn Criteria<T>>,
    decoration: Box<dyn Criteria<T>>,
}

impl<T> DecoratorCriteria<T> {
    pub fn new(inner: impl Criteria<T> + 'static, decoration: impl Criteria<T> + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            decoration: Box::new(decoration),
        }
    }
}

impl<T> std::fmt::Debug for DecoratorCriteria<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratorCriteria").finish_non_exhaustive()
    }
}

impl<T> Criteria<T> for DecoratorCriteria<T> {
    fn meet_criteria(&self, items: Vec<T>) -> Vec<T> {
        self.decoration.meet_criteria(self.inner.meet_criteria(items))
    }
}

/// Public, argument-free `get*`/`is*` methods
pub fn getter_criteria() -> CompoundCriteria<MethodDescriptor> {
    let pattern = GETTER_REGEX
        .get_or_init(|| Regex::new(GETTER_PATTERN).expect("Valid regex pattern"))
        .clone();
    CompoundCriteria::new()
        .with(NamePatternCriteria::from_regex(pattern))
        .with(SignatureCriteria::new(Visibility::Public, Some(0)))
}

/// Public one-argument `set*` methods
pub fn setter_criteria() -> CompoundCriteria<MethodDescriptor> {
    let pattern = SETTER_REGEX
        .get_or_init(|| Regex::new(SETTER_PATTERN).expect("Valid regex pattern"))
        .clone();
    CompoundCriteria::new()
        .with(NamePatternCriteria::from_regex(pattern))
        .with(SignatureCriteria::new(Visibility::Public, Some(1)))
}

/// Getters whose name contains one of `names`
///
/// An empty list, or an empty name in it, is rejected: either would build a
/// pattern that keeps every getter.
pub fn accessor_by_name_criteria<S: AsRef<str>>(names: &[S]) -> Result<DecoratorCriteria<MethodDescriptor>> {
    if names.is_empty() {
        return Err(MapperError::configuration("accessor name list is empty"));
    }
    if names.iter().any(|name| name.as_ref().is_empty()) {
        return Err(MapperError::configuration("accessor name list contains an empty name"));
    }
    let alternation = names
        .iter()
        .map(|name| regex::escape(name.as_ref()))
        .collect::<Vec<_>>()
        .join("|");
    let names = NamePatternCriteria::new(&format!("(?:{})", alternation))?;
    Ok(DecoratorCriteria::new(getter_criteria(), names))
}
