use std::collections::HashMap;

use crate::models::{Comment, CommentNode};

/// Rebuilds the forest of a post from comments sorted by `thread_path`.
///
/// Pre-order input guarantees every child comes after its parent, so walking
/// the slice backwards finishes each node's replies before the node itself is
/// attached. Comments whose parent is not in the slice are dropped.
pub fn build_forest(comments: Vec<Comment>) -> Vec<CommentNode> {
    let index: HashMap<i64, usize> = comments
        .iter()
        .enumerate()
        .map(|(position, comment)| (comment.id, position))
        .collect();

    let mut arena: Vec<Option<CommentNode>> =
        comments.into_iter().map(|c| Some(CommentNode::from(c))).collect();
    let mut roots = Vec::new();

    for position in (0..arena.len()).rev() {
        let Some(mut node) = arena[position].take() else {
            continue;
        };
        // Replies were pushed last-to-first.
        node.replies.reverse();

        match node.comment.parent_id {
            None => roots.push(node),
            Some(parent_id) => {
                let parent = index
                    .get(&parent_id)
                    .filter(|&&parent_position| parent_position < position)
                    .and_then(|&parent_position| arena[parent_position].as_mut());

                if let Some(parent) = parent {
                    parent.replies.push(node);
                }
            }
        }
    }

    roots.reverse();
    roots
}
