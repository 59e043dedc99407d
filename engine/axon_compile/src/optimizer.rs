//! Symbol/subexpression extraction ordering.
//!
//! Symbols are named bodies that may reference other symbols by name.
//! Each round picks the "leaves" — symbols whose body references no
//! other remaining symbol — builds them through the factory, and moves
//! the ones that folded to constants into the constants table, where
//! later factory calls can see them. The loop stops when a round finds
//! nothing further to extract or fewer than two symbols remain.
//!
//! The final (constants, symbols) partition does not depend on the
//! order leaves are picked within a round; iteration is sorted anyway
//! so runs are bit-for-bit reproducible.

use rustc_hash::FxHashMap;
use tracing::debug;

use axon_diagnostic::{not_logically_valid, CompileResult};
use axon_tree::{ConstantNode, Node};

/// Factory callback the optimizer drives: body text in, node tree out.
///
/// The constants extracted so far are passed alongside so bodies
/// referencing an already-folded symbol can substitute it. Returning
/// `Ok(None)` (no expression) is fatal to the whole compile.
pub type SymbolFactory<'a> =
    dyn FnMut(&str, &FxHashMap<String, ConstantNode>) -> CompileResult<Option<Node>> + 'a;

/// Working set of named subexpressions and the constants extracted from
/// them.
#[derive(Debug, Default)]
pub struct SymbolOptimizer {
    symbols: FxHashMap<String, String>,
    constants: FxHashMap<String, ConstantNode>,
    /// Leaves already built that did not fold; they stay live symbols
    /// but are never rebuilt.
    settled: Vec<String>,
}

impl SymbolOptimizer {
    /// Seed the working set from named bodies.
    pub fn new(symbols: impl IntoIterator<Item = (String, String)>) -> Self {
        SymbolOptimizer {
            symbols: symbols.into_iter().collect(),
            constants: FxHashMap::default(),
            settled: Vec::new(),
        }
    }

    /// Symbols still unresolved (including settled non-constant ones).
    pub fn symbols(&self) -> &FxHashMap<String, String> {
        &self.symbols
    }

    /// Constants extracted so far, by symbol name.
    pub fn constants(&self) -> &FxHashMap<String, ConstantNode> {
        &self.constants
    }

    /// Run leaf extraction to a fixed point.
    ///
    /// A set that starts with fewer than two symbols has no extraction
    /// order to decide and is left untouched.
    pub fn run(&mut self, factory: &mut SymbolFactory<'_>) -> CompileResult<()> {
        if self.symbols.len() < 2 {
            return Ok(());
        }
        loop {
            let leaves = self.current_leaves();
            if leaves.is_empty() {
                return Ok(());
            }
            let mut extracted = 0usize;
            for name in leaves {
                let body = match self.symbols.get(&name) {
                    Some(body) => body.clone(),
                    None => continue,
                };
                let node = factory(&body, &self.constants)?.ok_or_else(|| {
                    not_logically_valid(format!("symbol `{name}` produced no expression"))
                })?;
                match node {
                    Node::Constant(constant) => {
                        debug!(symbol = %name, "folded to a constant");
                        self.symbols.remove(&name);
                        self.constants.insert(name, constant);
                        extracted += 1;
                    }
                    _ => {
                        // Stays a live subexpression body; never rebuilt.
                        self.settled.push(name);
                    }
                }
            }
            if extracted == 0 {
                return Ok(());
            }
        }
    }

    /// Names whose body references no other remaining symbol, excluding
    /// ones already settled. Sorted for reproducible processing.
    fn current_leaves(&self) -> Vec<String> {
        let mut names: Vec<&String> = self.symbols.keys().collect();
        names.sort();
        names
            .iter()
            .filter(|name| !self.settled.contains(**name))
            .filter(|name| {
                let body = &self.symbols[**name];
                names
                    .iter()
                    .all(|other| *other == **name || !body.contains(other.as_str()))
            })
            .map(|name| (*name).clone())
            .collect()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
