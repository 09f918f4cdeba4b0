//! Materialized thread paths.
//!
//! Every comment stores the chain of its ancestors' ids, root first, as
//! fixed-width decimal tokens joined by [`SEPARATOR`]. Ordering the rows of
//! one post by that string yields a pre-order walk of the comment tree:
//! a parent precedes all of its descendants, and siblings follow id
//! (creation) order.

use crate::error::{Error, Result};

pub const SEPARATOR: char = '.';

/// Width of `i64::MAX` in decimal.
pub const TOKEN_WIDTH: usize = 19;

/// Encodes a comment id as a zero-padded token of [`TOKEN_WIDTH`] digits.
pub fn token(id: i64) -> Result<String> {
    if id < 0 {
        return Err(Error::invalid(format!(
            "Comment id {} cannot be encoded in a thread path",
            id
        )));
    }

    Ok(format!("{:0>width$}", id, width = TOKEN_WIDTH))
}

/// Builds the path of comment `id` under a parent path (`None` for roots).
pub fn child_path(parent_path: Option<&str>, id: i64) -> Result<String> {
    let token = token(id)?;

    match parent_path {
        Some(parent) if !parent.is_empty() => Ok(format!("{parent}{SEPARATOR}{token}")),
        _ => Ok(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_ancestor(ancestor: &str, path: &str) -> bool {
        path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path[ancestor.len()..].starts_with(SEPARATOR)
    }

    #[test]
    fn tokens_are_fixed_width() {
        assert_eq!(token(7).unwrap(), "0000000000000000007");
        assert_eq!(token(i64::MAX).unwrap().len(), TOKEN_WIDTH);
        assert_eq!(token(0).unwrap().len(), TOKEN_WIDTH);
        assert!(token(-1).is_err());
    }

    #[test]
    fn child_paths_extend_the_parent() {
        let root = child_path(None, 3).unwrap();
        let child = child_path(Some(&root), 12).unwrap();
        let grandchild = child_path(Some(&child), 40).unwrap();

        assert_eq!(root, "0000000000000000003");
        assert_eq!(child, "0000000000000000003.0000000000000000012");
        assert!(is_ancestor(&root, &grandchild));
        assert!(is_ancestor(&child, &grandchild));
        assert!(!is_ancestor(&grandchild, &child));
        assert!(!is_ancestor(&root, &root));
    }

    #[test]
    fn empty_parent_path_behaves_like_root() {
        assert_eq!(child_path(Some(""), 5).unwrap(), token(5).unwrap());
    }

    #[test]
    fn lexicographic_order_is_pre_order() {
        // 1 ─┬─ 2 ── 10
        //    └─ 9
        // 3
        let one = child_path(None, 1).unwrap();
        let two = child_path(Some(&one), 2).unwrap();
        let ten = child_path(Some(&two), 10).unwrap();
        let nine = child_path(Some(&one), 9).unwrap();
        let three = child_path(None, 3).unwrap();

        let mut paths = vec![
            three.clone(),
            nine.clone(),
            ten.clone(),
            one.clone(),
            two.clone(),
        ];
        paths.sort();

        assert_eq!(paths, vec![one, two, ten, nine, three]);
    }

    #[test]
    fn token_prefix_is_not_ancestry() {
        let short = token(1).unwrap();
        let other = token(10).unwrap();
        assert!(!is_ancestor(&short, &other));
    }
}
