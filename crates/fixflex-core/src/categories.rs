//! Known category names and the fixed subset

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{CategoryKind, Transaction, FLAGGED_FOR_REVIEW, REVIEW_LATER, UNCATEGORIZED};

/// Fixed categories when no configuration overrides them
pub const DEFAULT_FIXED_CATEGORIES: &[&str] = &["Bills & Utilities", "Home", "Education"];

/// An entry in the category list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub name: String,
    pub kind: CategoryKind,
}

/// Category rule set owned by a session
#[derive(Debug, Clone)]
pub struct CategorySet {
    /// Available names in the order they were first seen
    available: Vec<String>,
    fixed: BTreeSet<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_CATEGORIES.iter().copied())
    }
}

impl CategorySet {
    pub fn new<I, S>(fixed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            available: Vec::new(),
            fixed: fixed.into_iter().map(Into::into).collect(),
        };
        set.ensure_builtin();
        set
    }

    pub fn is_fixed(&self, category: &str) -> bool {
        self.fixed.contains(category)
    }

    pub fn kind_of(&self, category: &str) -> CategoryKind {
        if self.is_fixed(category) {
            CategoryKind::Fixed
        } else if category == REVIEW_LATER || category == FLAGGED_FOR_REVIEW {
            CategoryKind::Review
        } else {
            CategoryKind::Flexible
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.available.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Available categories with their kind, sorted by name
    pub fn list(&self) -> Vec<CategoryInfo> {
        let mut list: Vec<CategoryInfo> = self
            .available
            .iter()
            .map(|name| CategoryInfo {
                name: name.clone(),
                kind: self.kind_of(name),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    /// Register a user-entered category
    ///
    /// The name is trimmed; empty names and names that already exist
    /// (compared case-insensitively) are rejected without changing the set.
    pub fn add_category(&mut self, name: &str, is_fixed: bool) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Rejected empty category name");
            return Err(Error::EmptyCategoryName);
        }
        if self.contains(name) {
            warn!("Rejected duplicate category '{}'", name);
            return Err(Error::DuplicateCategory(name.to_string()));
        }

        self.available.push(name.to_string());
        if is_fixed {
            self.fixed.insert(name.to_string());
        }
        info!(
            "Added category '{}' ({})",
            name,
            if is_fixed { "fixed" } else { "flexible" }
        );
        Ok(name.to_string())
    }

    /// Make every category used by `transactions` available
    pub fn register_from<'a, I>(&mut self, transactions: I)
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        for tx in transactions {
            self.insert(tx.category());
        }
        self.ensure_builtin();
    }

    /// Make a category available without the user-facing checks
    pub(crate) fn insert(&mut self, name: &str) {
        if !self.available.iter().any(|c| c == name) {
            debug!("Registering category '{}'", name);
            self.available.push(name.to_string());
        }
    }

    fn ensure_builtin(&mut self) {
        let builtin = [UNCATEGORIZED, REVIEW_LATER, FLAGGED_FOR_REVIEW];
        let fixed: Vec<String> = self.fixed.iter().cloned().collect();
        for name in builtin.iter().copied().chain(fixed.iter().map(String::as_str)) {
            self.insert(name);
        }
    }
}
