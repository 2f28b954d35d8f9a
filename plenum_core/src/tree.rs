use std::collections::{HashMap, HashSet};

use crate::models::Post;

/// A post with its replies attached, as produced by [`build_post_tree`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostNode {
    pub post: Post,
    pub children: Vec<PostNode>,
}

/// Rebuilds the reply tree from the flat post list the data layer delivers.
///
/// One pass groups posts by parent id, preserving the flat list's order, then
/// the roots (no parent) are materialized depth-first with each post's own
/// group attached as its children. Sibling order therefore matches the
/// relative order of those posts in the input.
///
/// A post whose parent id names no post in the input never gets visited and
/// is dropped from the result. Malformed parent cycles cannot loop: a post is
/// materialized at most once.
pub fn build_post_tree(posts: &[Post]) -> Vec<PostNode> {
    let mut by_parent: HashMap<Option<&str>, Vec<&Post>> = HashMap::new();
    for post in posts {
        by_parent
            .entry(post.parent_id.as_deref())
            .or_default()
            .push(post);
    }

    let mut visited = HashSet::new();
    let roots = match by_parent.get(&None) {
        Some(roots) => roots.clone(),
        None => Vec::new(),
    };
    let tree: Vec<PostNode> = roots
        .into_iter()
        .filter_map(|post| materialize(post, &by_parent, &mut visited))
        .collect();

    let placed = visited.len();
    if placed < posts.len() {
        log::debug!(
            "dropped {} post(s) with unresolvable parents from a list of {}",
            posts.len() - placed,
            posts.len()
        );
    }

    tree
}

fn materialize<'a>(
    post: &'a Post,
    by_parent: &HashMap<Option<&'a str>, Vec<&'a Post>>,
    visited: &mut HashSet<&'a str>,
) -> Option<PostNode> {
    // A re-encountered id means a parent cycle; treat it as already placed.
    if !visited.insert(post.id.as_str()) {
        log::debug!("post {} revisited during materialization, skipping", post.id);
        return None;
    }
    let children = match by_parent.get(&Some(post.id.as_str())) {
        Some(replies) => replies
            .iter()
            .filter_map(|reply| materialize(reply, by_parent, visited))
            .collect(),
        None => Vec::new(),
    };
    Some(PostNode {
        post: post.clone(),
        children,
    })
}

/// Depth-first flattening of a tree back into display order.
pub fn flatten_tree(nodes: &[PostNode]) -> Vec<&Post> {
    let mut out = Vec::new();
    for node in nodes {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into<'a>(node: &'a PostNode, out: &mut Vec<&'a Post>) {
    out.push(&node.post);
    for child in &node.children {
        flatten_into(child, out);
    }
}

/// Number of posts below this node, not counting the node itself.
pub fn count_descendants(node: &PostNode) -> usize {
    node.children
        .iter()
        .map(|child| 1 + count_descendants(child))
        .sum()
}
