//! Name-sorted method lists and binary lookup
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use crate::registry::MethodDescriptor;

/// Methods sorted by name, so lookup by name is a binary search
///
/// The sort is stable: same-named methods keep hierarchy order, most-derived
/// first, and lookup returns the first of them.
#[derive(Debug, Clone, Default)]
pub struct SortedMethods {
    methods: Vec<MethodDescriptor>,
}

impl SortedMethods {
    pub fn new(mut methods: Vec<MethodDescriptor>) -> Self {
        methods.sort_by(|a, b| a.name().cmp(b.name()));
        Self { methods }
    }

    pub fn lookup(&self, name: &str) -> Option<&MethodDescriptor> {
        lookup_by_name(name, &self.methods)
    }

    pub fn as_slice(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl FromIterator<MethodDescriptor> for SortedMethods {
    fn from_iter<I: IntoIterator<Item = MethodDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Binary search for the first method named `name` in a name-sorted slice
pub fn lookup_by_name<'a>(name: &str, sorted: &'a [MethodDescriptor]) -> Option<&'a MethodDescriptor> {
    debug_assert!(
        sorted.windows(2).all(|pair| pair[0].name() <= pair[1].name()),
        "lookup_by_name requires a name-sorted slice"
    );

    let index = sorted.partition_point(|method| method.name() < name);
    sorted.get(index).filter(|method| method.name() == name)
}
