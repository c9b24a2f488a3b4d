//! Case-insensitive multi-pattern matcher over company names.
//!
//! An Aho-Corasick automaton built once per registry snapshot. Matching walks
//! the text a single time, so its cost depends on the text length and not on
//! how many companies are tracked. Building is linear in the total length of
//! the patterns and is the expensive step; rebuild only when the registry
//! changes.

use crate::domain::entities::stock_registry::StockRegistry;
use std::collections::{HashMap, VecDeque};

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct Node {
    next: HashMap<char, usize>,
    fail: usize,
    /// Pattern ending exactly at this node.
    output: Option<usize>,
    /// Nearest node along the failure chain that carries an output.
    dict: Option<usize>,
}

#[derive(Debug)]
pub struct EntityMatcher {
    nodes: Vec<Node>,
    patterns: Vec<String>,
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

impl EntityMatcher {
    pub fn build<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = EntityMatcher {
            nodes: vec![Node::default()],
            patterns: Vec::new(),
        };
        for pattern in patterns {
            matcher.insert(pattern.as_ref());
        }
        matcher.link_failures();
        matcher
    }

    /// Matcher over the company names of one registry snapshot.
    pub fn from_registry(registry: &StockRegistry) -> Self {
        Self::build(registry.company_names())
    }

    fn insert(&mut self, pattern: &str) {
        if pattern.is_empty() {
            return;
        }
        let mut state = ROOT;
        for c in folded(pattern) {
            state = match self.nodes[state].next.get(&c) {
                Some(&n) => n,
                None => {
                    self.nodes.push(Node::default());
                    let n = self.nodes.len() - 1;
                    self.nodes[state].next.insert(c, n);
                    n
                }
            };
        }
        // Patterns equal after case folding share a node; the first one wins.
        if self.nodes[state].output.is_none() {
            self.patterns.push(pattern.to_string());
            self.nodes[state].output = Some(self.patterns.len() - 1);
        }
    }

    fn link_failures(&mut self) {
        let mut queue = VecDeque::new();
        let root_children: Vec<usize> = self.nodes[ROOT].next.values().copied().collect();
        for child in root_children {
            self.nodes[child].fail = ROOT;
            queue.push_back(child);
        }

        while let Some(parent) = queue.pop_front() {
            let children: Vec<(char, usize)> =
                self.nodes[parent].next.iter().map(|(c, n)| (*c, *n)).collect();
            for (c, child) in children {
                let mut f = self.nodes[parent].fail;
                let fail = loop {
                    if let Some(&n) = self.nodes[f].next.get(&c) {
                        break n;
                    }
                    if f == ROOT {
                        break ROOT;
                    }
                    f = self.nodes[f].fail;
                };
                self.nodes[child].fail = fail;
                self.nodes[child].dict = if self.nodes[fail].output.is_some() {
                    Some(fail)
                } else {
                    self.nodes[fail].dict
                };
                queue.push_back(child);
            }
        }
    }

    fn step(&self, mut state: usize, c: char) -> usize {
        loop {
            if let Some(&n) = self.nodes[state].next.get(&c) {
                return n;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].fail;
        }
    }

    /// The pattern whose occurrence ends earliest in `text`. When several end
    /// at the same position the longest wins. Returns the pattern as given
    /// to [`EntityMatcher::build`].
    pub fn first_match(&self, text: &str) -> Option<&str> {
        if self.patterns.is_empty() {
            return None;
        }
        let mut state = ROOT;
        for c in folded(text) {
            state = self.step(state, c);
            let node = &self.nodes[state];
            let hit = node
                .output
                .or_else(|| node.dict.and_then(|d| self.nodes[d].output));
            if let Some(p) = hit {
                return Some(&self.patterns[p]);
            }
        }
        None
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
