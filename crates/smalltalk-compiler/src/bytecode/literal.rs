//! Per-class literal pool.
//!
//! Strings, character texts, selectors, global names and debug file names
//! referenced by a class's bytecode are interned here and addressed by a
//! 16-bit index.

use rustc_hash::FxHashMap;
use smalltalk_core::{CompilationError, Span};

/// Number of distinct literals a pool can address.
pub const MAX_LITERALS: usize = u16::MAX as usize + 1;

/// Ordered, deduplicated literal storage.
#[derive(Debug, Clone)]
pub struct LiteralPool {
    owner: String,
    literals: Vec<String>,
    index: FxHashMap<String, u16>,
    limit: usize,
}

impl LiteralPool {
    /// Create an empty pool for the named class.
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_limit(owner, MAX_LITERALS)
    }

    pub(crate) fn with_limit(owner: impl Into<String>, limit: usize) -> Self {
        Self {
            owner: owner.into(),
            literals: Vec::new(),
            index: FxHashMap::default(),
            limit: limit.min(MAX_LITERALS),
        }
    }

    /// Return the index of `text`, appending it if it is new.
    ///
    /// Interning the same text twice yields the same index. An overflow
    /// names the owning class and carries no position; callers that know
    /// the scope and span fill them in.
    pub fn intern(&mut self, text: &str) -> Result<u16, CompilationError> {
        if let Some(&idx) = self.index.get(text) {
            return Ok(idx);
        }
        if self.literals.len() >= self.limit {
            return Err(CompilationError::LiteralPoolOverflow {
                literal: text.to_string(),
                scope: self.owner.clone(),
                count: self.literals.len(),
                span: Span::default(),
            });
        }
        let idx = self.literals.len() as u16;
        self.literals.push(text.to_string());
        self.index.insert(text.to_string(), idx);
        Ok(idx)
    }

    /// Get a literal by index.
    pub fn get(&self, index: u16) -> Option<&str> {
        self.literals.get(index as usize).map(String::as_str)
    }

    /// All literals in first-interned order.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Number of interned literals.
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Check if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Consume the pool, keeping the ordered literals.
    pub fn into_literals(self) -> Vec<String> {
        self.literals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut pool = LiteralPool::new("Point");
        let a = pool.intern("x:y:").unwrap();
        let b = pool.intern("hello").unwrap();
        assert_eq!(pool.intern("x:y:").unwrap(), a);
        assert_eq!((a, b), (0, 1));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn preserves_first_interned_order() {
        let mut pool = LiteralPool::new("Point");
        for text in ["c", "a", "b", "a"] {
            pool.intern(text).unwrap();
        }
        assert_eq!(pool.literals(), &["c", "a", "b"]);
        assert_eq!(pool.get(2), Some("b"));
        assert_eq!(pool.get(3), None);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut pool = LiteralPool::with_limit("Big", 2);
        pool.intern("a").unwrap();
        pool.intern("b").unwrap();
        assert_eq!(pool.intern("a").unwrap(), 0);

        let err = pool.intern("c").unwrap_err();
        assert_eq!(
            err,
            CompilationError::LiteralPoolOverflow {
                literal: "c".into(),
                scope: "Big".into(),
                count: 2,
                span: Span::default(),
            }
        );
    }

    #[test]
    fn addresses_the_full_index_range() {
        let mut pool = LiteralPool::new("Big");
        for i in 0..MAX_LITERALS {
            pool.intern(&i.to_string()).unwrap();
        }
        assert_eq!(pool.intern("65535").unwrap(), u16::MAX);
        assert!(pool.intern("one more").is_err());
    }
}
