//! Process-wide string interning for node names, ids and style classes.
//!
//! Class-set membership and selector matching compare interned symbols, not
//! strings, so the comparisons reduce to integer equality. The pool grows
//! monotonically for the lifetime of the process; symbols are never freed.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

/// An interned string. Copyable, comparable in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

struct Pool {
  map: FxHashMap<&'static str, u32>,
  strings: Vec<&'static str>,
}

fn pool() -> &'static RwLock<Pool> {
  static POOL: OnceLock<RwLock<Pool>> = OnceLock::new();
  POOL.get_or_init(|| {
    RwLock::new(Pool {
      map: FxHashMap::default(),
      strings: Vec::new(),
    })
  })
}

/// Interns `s`, returning its symbol. Inserts into the pool on first use.
pub fn intern(s: &str) -> Symbol {
  {
    let pool = pool().read();
    if let Some(&idx) = pool.map.get(s) {
      return Symbol(idx);
    }
  }
  let mut pool = pool().write();
  if let Some(&idx) = pool.map.get(s) {
    return Symbol(idx);
  }
  let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
  let idx = pool.strings.len() as u32;
  pool.strings.push(leaked);
  pool.map.insert(leaked, idx);
  Symbol(idx)
}

/// Looks up `s` without inserting. Returns `None` if the string was never
/// interned, which lets `remove_class` shortcut to a no-op.
pub fn try_intern(s: &str) -> Option<Symbol> {
  pool().read().map.get(s).copied().map(Symbol)
}

impl Symbol {
  /// The interned string. Stable for the process lifetime.
  pub fn as_str(self) -> &'static str {
    pool().read().strings[self.0 as usize]
  }
}

impl fmt::Debug for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Symbol({:?})", self.as_str())
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let a = intern("trough");
    let b = intern("trough");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "trough");
  }

  #[test]
  fn try_intern_misses_unseen_strings() {
    assert!(try_intern("never-interned-0b5c").is_none());
    let sym = intern("seen-once-0b5c");
    assert_eq!(try_intern("seen-once-0b5c"), Some(sym));
  }

  #[test]
  fn distinct_strings_get_distinct_symbols() {
    assert_ne!(intern("left"), intern("right"));
  }
}
