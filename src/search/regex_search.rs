use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use regex::Regex;

use crate::core::config::RegexConfig;
use crate::core::types::DocId;
use crate::trie::node::TrieNode;
use crate::trie::Trie;

#[derive(Debug, Clone)]
pub struct RegexHit {
    pub doc_id: DocId,
    pub term: String,
}

fn complexity_is_high(pattern: &str) -> bool {
    pattern.len() > 20 || pattern.chars().any(|c| matches!(c, '{' | '+' | '*' | '?' | '|' | '['))
        || pattern.contains("(?")
}

fn literal_runs(pattern: &str) -> Vec<&str> {
    pattern
        .split(|c| matches!(c, '(' | ')' | '.' | '*' | '+' | '?' | '|' | '{' | '}' | '^' | '$' | '['))
        .filter(|s| s.len() > 2)
        .collect()
}

/// Necessary (not sufficient) feasibility test: can `path` possibly be extended into a
/// string the regex matches, given the literal content it must contain?
fn feasible(pattern: &str, path: &str) -> bool {
    if let Some(anchored) = pattern.strip_prefix('^') {
        let prefix: String = anchored.chars().take_while(|c| !matches!(c, '(' | '.' | '*' | '+' | '?' | '|' | '{' | '[' | '^' | '$')).collect();
        if prefix.is_empty() {
            return true;
        }
        let shorter = prefix.len().min(path.len());
        return prefix[..shorter] == path[..shorter];
    }
    literal_runs(pattern).iter().all(|run| path.contains(run) || run.len() > path.len())
}

fn collect_hits(node: &TrieNode, path: &str, hits: &mut Vec<RegexHit>) {
    for id in &node.document_refs {
        hits.push(RegexHit { doc_id: id.clone(), term: path.to_string() });
    }
}

/// Breadth-first traversal, used for "simple" regex patterns.
pub fn search_bfs(trie: &Trie, pattern: &str, config: &RegexConfig) -> Vec<RegexHit> {
    let Ok(re) = Regex::new(pattern) else { return Vec::new() };
    let started = Instant::now();
    let mut hits = Vec::new();
    let mut visited = HashSet::new();
    let mut queue: VecDeque<(String, &TrieNode)> = VecDeque::new();
    queue.push_back((String::new(), trie.root()));

    while let Some((path, node)) = queue.pop_front() {
        if started.elapsed().as_millis() as u64 >= config.timeout_ms {
            break;
        }
        if path.chars().count() as usize > config.max_depth {
            continue;
        }
        if !visited.insert(path.clone()) {
            continue;
        }
        if node.end_of_word && re.is_match(&path) {
            collect_hits(node, &path, &mut hits);
        }
        for (ch, child) in &node.children {
            let mut next = path.clone();
            next.push(*ch);
            queue.push_back((next, child));
        }
    }

    hits
}

/// Depth-first traversal with prefix-feasibility pruning, used for "complex" patterns.
pub fn search_dfs(trie: &Trie, pattern: &str, config: &RegexConfig) -> Vec<RegexHit> {
    let Ok(re) = Regex::new(pattern) else { return Vec::new() };
    let started = Instant::now();
    let mut hits = Vec::new();
    let mut visited = HashSet::new();

    fn recurse(
        node: &TrieNode,
        path: String,
        re: &Regex,
        pattern: &str,
        config: &RegexConfig,
        started: &Instant,
        visited: &mut HashSet<String>,
        hits: &mut Vec<RegexHit>,
    ) {
        if started.elapsed().as_millis() as u64 >= config.timeout_ms {
            return;
        }
        if path.chars().count() > config.max_depth {
            return;
        }
        if !visited.insert(path.clone()) {
            return;
        }
        if path.chars().count() > 2 && !feasible(pattern, &path) {
            return;
        }
        if node.end_of_word && re.is_match(&path) {
            collect_hits(node, &path, hits);
        }
        for (ch, child) in &node.children {
            let mut next = path.clone();
            next.push(*ch);
            recurse(child, next, re, pattern, config, started, visited, hits);
        }
    }

    recurse(trie.root(), String::new(), &re, pattern, config, &started, &mut visited, &mut hits);
    hits
}

/// Dispatches to BFS or DFS based on an estimate of the pattern's structural complexity.
pub fn search(trie: &Trie, pattern: &str, config: &RegexConfig) -> Vec<RegexHit> {
    if config.timeout_ms == 0 {
        return Vec::new();
    }
    if complexity_is_high(pattern) {
        search_dfs(trie, pattern, config)
    } else {
        search_bfs(trie, pattern, config)
    }
}
