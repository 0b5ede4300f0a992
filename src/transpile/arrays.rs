//! Compile-time shadows of array-valued variables.
//!
//! A shadow exists only while a variable's contents are statically known.
//! Arrays have value semantics in the source language, so every shadow is
//! owned by exactly one variable key.
//!
//! Elements are frozen when written: each holds the lowered text of the
//! value that was stored. Only numeric text folds on a later read; any
//! other element may have changed at runtime and is read back from the
//! Workshop array instead.

use std::collections::HashMap;

use super::alloc::VarKey;
use super::fold::Num;

#[derive(Clone, Debug, Default)]
pub(crate) struct ShadowArrays {
    arrays: HashMap<VarKey, Vec<String>>,
    /// Keys whose shadow changed, in write order.
    written: Vec<VarKey>,
}

/// The folded value of a frozen element, if it is a compile-time number.
pub(crate) fn literal(element: &str) -> Option<&str> {
    Num::parse(element).map(|_| element)
}

impl ShadowArrays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &VarKey) -> Option<&[String]> {
        self.arrays.get(key).map(Vec::as_slice)
    }

    fn touch(&mut self, key: &VarKey) {
        self.written.push(key.clone());
    }

    /// Replace the shadow of `key` with `elements`.
    pub fn record(&mut self, key: VarKey, elements: Vec<String>) {
        self.touch(&key);
        self.arrays.insert(key, elements);
    }

    /// The variable now holds a value that is not statically known.
    pub fn forget(&mut self, key: &VarKey) {
        self.touch(key);
        self.arrays.remove(key);
    }

    /// Forget every shadow.
    pub fn forget_all(&mut self) {
        let keys: Vec<VarKey> = self.arrays.keys().cloned().collect();
        for key in &keys {
            self.forget(key);
        }
    }

    /// Shadow of `key`, starting an empty one if there is none.
    fn entry(&mut self, key: &VarKey) -> &mut Vec<String> {
        self.touch(key);
        self.arrays.entry(key.clone()).or_default()
    }

    pub fn push(&mut self, key: &VarKey, element: String) {
        self.entry(key).push(element);
    }

    /// Overwrite position `index` of an existing shadow, padding with zeros
    /// when writing past its end. Does nothing if `key` has no shadow.
    pub fn set(&mut self, key: &VarKey, index: usize, element: String) {
        if !self.arrays.contains_key(key) {
            return;
        }
        self.touch(key);
        if let Some(elements) = self.arrays.get_mut(key) {
            if elements.len() <= index {
                elements.resize(index + 1, "0".to_string());
            }
            elements[index] = element;
        }
    }

    // ── Write log ─────────────────────────────────────────────────

    /// Position in the write log, for a later `written_since`.
    pub fn mark(&self) -> usize {
        self.written.len()
    }

    /// Distinct keys written after `mark`, in first-write order.
    pub fn written_since(&self, mark: usize) -> Vec<VarKey> {
        let mut keys: Vec<VarKey> = Vec::new();
        for key in &self.written[mark.min(self.written.len())..] {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Forget the shadow of every key written after `mark`.
    pub fn forget_since(&mut self, mark: usize) {
        for key in self.written_since(mark) {
            self.forget(&key);
        }
    }
}
