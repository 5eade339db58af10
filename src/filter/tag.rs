//! Tag-based sink routing (§4.4). Each sink carries an optional `only` set
//! and an optional `except` set of tags.
//!
//! Admission rule: if `except` is non-empty and the record has any tag in
//! it, the record is rejected outright (except wins over only). Otherwise,
//! if `only` is non-empty, the record is admitted iff it carries at least
//! one tag in `only`. If neither set is configured, every record is
//! admitted regardless of its tags.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct TagRouting {
    only: HashSet<String>,
    except: HashSet<String>,
}

impl TagRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_only(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.only.extend(tags);
        self
    }

    pub fn with_except(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.except.extend(tags);
        self
    }

    pub fn admits(&self, record_tags: &[String]) -> bool {
        if !self.except.is_empty() && record_tags.iter().any(|t| self.except.contains(t)) {
            return false;
        }
        if !self.only.is_empty() {
            return record_tags.iter().any(|t| self.only.contains(t));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sets_admits_everything() {
        let routing = TagRouting::new();
        assert!(routing.admits(&["audit".to_string()]));
        assert!(routing.admits(&[]));
    }

    #[test]
    fn only_set_requires_overlap() {
        let routing = TagRouting::new().with_only(["audit".to_string()]);
        assert!(routing.admits(&["audit".to_string(), "extra".to_string()]));
        assert!(!routing.admits(&["other".to_string()]));
        assert!(!routing.admits(&[]));
    }

    #[test]
    fn except_set_rejects_overlap_even_with_only() {
        let routing = TagRouting::new().with_only(["audit".to_string()]).with_except(["noisy".to_string()]);
        assert!(!routing.admits(&["audit".to_string(), "noisy".to_string()]));
        assert!(routing.admits(&["audit".to_string()]));
    }
}
