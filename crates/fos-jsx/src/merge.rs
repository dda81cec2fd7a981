//! Merge engine
//!
//! Folds runs of literal text and mergeable partials so a static run of
//! children becomes one template instead of many runtime calls.

use crate::partial::Partial;

/// A compiled child
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, not escaped
    Text(String),
    Partial(Partial),
    /// JavaScript expression evaluated at runtime
    Code(String),
}

/// Merge two neighbours, or hand both back when they cannot merge
pub fn merge_pair(left: Node, right: Node) -> Result<Node, (Node, Node)> {
    match (left, right) {
        (Node::Text(mut a), Node::Text(b)) => {
            a.push_str(&b);
            Ok(Node::Text(a))
        }
        (Node::Text(text), Node::Partial(mut partial)) if partial.is_mergeable() => {
            partial.prepend_text(&text);
            Ok(Node::Partial(partial))
        }
        (Node::Partial(mut partial), Node::Text(text)) if partial.is_mergeable() => {
            partial.push_text(&text);
            Ok(Node::Partial(partial))
        }
        (Node::Partial(mut a), Node::Partial(b)) if a.is_mergeable() && b.is_mergeable() => {
            a.append(b);
            Ok(Node::Partial(a))
        }
        pair => Err(pair),
    }
}

/// Single left-to-right pass: each node merges into the one before it when
/// possible, keeping source order
pub fn merge_children(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut current: Option<Node> = None;
    for next in nodes {
        current = Some(match current.take() {
            None => next,
            Some(node) => match merge_pair(node, next) {
                Ok(merged) => merged,
                Err((node, next)) => {
                    out.push(node);
                    next
                }
            },
        });
    }
    out.extend(current);
    tracing::trace!("merged children into {} nodes", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_runs_concatenate() {
        let merged = merge_children(vec![
            Node::Text("a".into()),
            Node::Text("b".into()),
            Node::Code("x".into()),
            Node::Text("c".into()),
        ]);
        assert_eq!(
            merged,
            vec![
                Node::Text("ab".into()),
                Node::Code("x".into()),
                Node::Text("c".into())
            ]
        );
    }

    #[test]
    fn test_code_never_merges() {
        let merged = merge_children(vec![Node::Code("a".into()), Node::Code("b".into())]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(merge_children(Vec::new()).is_empty());
    }
}
