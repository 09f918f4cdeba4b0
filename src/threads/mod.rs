//! Threaded comments on posts.
//!
//! Replies form a tree per post, capped at [`MAX_DEPTH`] levels below the
//! root. Each row carries a materialized `thread_path` (see [`path`]) so a
//! whole tree can be read back in one ordered query, and a denormalized
//! `reply_count` that only ever moves by relative deltas.

pub mod path;
pub mod tree;

use chrono::Utc;
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, Transaction};

use crate::db;
use crate::error::{Error, Result};
use crate::models::{Comment, CommentNode, CommentPage, CommentQuery, CreateComment, UpdateComment};

pub const MAX_DEPTH: i64 = 10;
pub const DEFAULT_TREE_DEPTH: i64 = 3;
pub const MAX_CONTENT_LENGTH: usize = 2000;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, FromRow)]
struct ParentRow {
    id: i64,
    post_id: i64,
    depth: i64,
    root_comment_id: Option<i64>,
    thread_path: String,
}

/// Opens a transaction holding SQLite's write lock from the first statement.
///
/// A deferred transaction that reads before writing cannot wait for the lock
/// once another writer has committed; it fails with `SQLITE_BUSY` instead.
async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

async fn fetch_comment<'e, E>(executor: E, comment_id: i64) -> Result<Option<Comment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.*, u.id AS author_id, u.username AS author_username
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.id = ?
        "#,
    )
    .bind(comment_id)
    .fetch_optional(executor)
    .await?;

    Ok(comment)
}

pub async fn create_comment(pool: &SqlitePool, input: CreateComment) -> Result<Comment> {
    let content = validate_content(&input.content)?;

    let mut tx = begin_write(pool).await?;

    if !db::post_exists(&mut *tx, input.post_id).await? {
        return Err(Error::not_found("Post not found"));
    }
    if !db::user_exists(&mut *tx, input.user_id).await? {
        return Err(Error::not_found("User not found"));
    }

    let parent = match input.parent_id {
        Some(parent_id) => {
            let parent = sqlx::query_as::<_, ParentRow>(
                "SELECT id, post_id, depth, root_comment_id, thread_path FROM comments WHERE id = ?",
            )
            .bind(parent_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::not_found("Parent comment not found"))?;

            if parent.post_id != input.post_id {
                return Err(Error::invalid(
                    "Parent comment does not belong to this post",
                ));
            }

            Some(parent)
        }
        None => None,
    };

    let (depth, root_comment_id) = placement(parent.as_ref())?;

    let result = sqlx::query(
        r#"INSERT INTO comments (post_id, user_id, parent_id, content, depth, root_comment_id, thread_path, created_at)
           VALUES (?, ?, ?, ?, ?, ?, '', ?)"#,
    )
    .bind(input.post_id)
    .bind(input.user_id)
    .bind(input.parent_id)
    .bind(&content)
    .bind(depth)
    .bind(root_comment_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let comment_id = result.last_insert_rowid();
    let thread_path = path::child_path(
        parent.as_ref().map(|p| p.thread_path.as_str()),
        comment_id,
    )?;

    sqlx::query("UPDATE comments SET thread_path = ? WHERE id = ?")
        .bind(&thread_path)
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    if let Some(parent) = &parent {
        sqlx::query("UPDATE comments SET reply_count = reply_count + 1 WHERE id = ?")
            .bind(parent.id)
            .execute(&mut *tx)
            .await?;
    }

    let comment = fetch_comment(&mut *tx, comment_id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;

    tx.commit().await?;

    tracing::info!(
        "Comment {} created on post {} (depth {})",
        comment.id,
        comment.post_id,
        comment.depth
    );

    Ok(comment)
}

/// Depth and thread root of a new comment placed under `parent`.
fn placement(parent: Option<&ParentRow>) -> Result<(i64, Option<i64>)> {
    let Some(parent) = parent else {
        return Ok((0, None));
    };

    let depth = parent.depth + 1;
    if depth > MAX_DEPTH {
        return Err(Error::invalid(format!(
            "Maximum comment depth is {}",
            MAX_DEPTH
        )));
    }

    Ok((depth, Some(parent.root_comment_id.unwrap_or(parent.id))))
}

fn validate_content(raw: &str) -> Result<String> {
    let content = raw.trim();

    if content.is_empty() {
        return Err(Error::invalid("Comment content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(Error::invalid(format!(
            "Comment content cannot exceed {} characters",
            MAX_CONTENT_LENGTH
        )));
    }

    Ok(content.to_string())
}

pub async fn list_comments(pool: &SqlitePool, query: &CommentQuery) -> Result<CommentPage> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(Error::invalid("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(Error::invalid(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    if query.max_depth.is_some_and(|depth| depth < 0) {
        return Err(Error::invalid("max_depth cannot be negative"));
    }
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| Error::invalid("page is out of range"))?;

    let mut count_query =
        QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM comments c WHERE 1 = 1");
    push_filters(&mut count_query, query);
    let (total,) = count_query
        .build_query_as::<(i64,)>()
        .fetch_one(pool)
        .await?;

    let direction = query.sort_order.keyword();
    let mut select_query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT c.*, u.id AS author_id, u.username AS author_username
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE 1 = 1"#,
    );
    push_filters(&mut select_query, query);
    select_query
        .push(format!(
            " ORDER BY c.{} {}, c.id {}",
            query.sort_by.column(),
            direction,
            direction
        ))
        .push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let items = select_query
        .build_query_as::<Comment>()
        .fetch_all(pool)
        .await?;

    tracing::debug!(
        "Listed {} of {} comments (page {}, limit {})",
        items.len(),
        total,
        page,
        limit
    );

    Ok(CommentPage::new(items, page, limit, total))
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CommentQuery) {
    if let Some(post_id) = query.post_id {
        builder.push(" AND c.post_id = ").push_bind(post_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND c.user_id = ").push_bind(user_id);
    }
    if let Some(parent_id) = query.parent_id {
        builder.push(" AND c.parent_id = ").push_bind(parent_id);
    }
    if let Some(max_depth) = query.max_depth {
        builder.push(" AND c.depth <= ").push_bind(max_depth);
    }
}

pub async fn get_comment(pool: &SqlitePool, comment_id: i64) -> Result<Comment> {
    fetch_comment(pool, comment_id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))
}

/// Root comments of a post with replies nested down to `max_depth`.
pub async fn comment_tree(
    pool: &SqlitePool,
    post_id: i64,
    max_depth: i64,
) -> Result<Vec<CommentNode>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.*, u.id AS author_id, u.username AS author_username
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = ? AND c.depth <= ?
        ORDER BY c.thread_path ASC
        "#,
    )
    .bind(post_id)
    .bind(max_depth)
    .fetch_all(pool)
    .await?;

    tracing::debug!(
        "Building comment tree for post {} from {} rows",
        post_id,
        comments.len()
    );

    Ok(tree::build_forest(comments))
}

pub async fn update_comment(
    pool: &SqlitePool,
    comment_id: i64,
    input: UpdateComment,
) -> Result<Comment> {
    let content = input.content.as_deref().map(validate_content).transpose()?;

    let mut tx = begin_write(pool).await?;

    let updated = sqlx::query(
        "UPDATE comments SET content = COALESCE(?, content), updated_at = ? WHERE id = ?",
    )
    .bind(content)
    .bind(Utc::now())
    .bind(comment_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::not_found("Comment not found"));
    }

    let comment = fetch_comment(&mut *tx, comment_id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;
    tx.commit().await?;

    Ok(comment)
}

/// Deletes a comment and, through the foreign key cascade, all of its replies.
pub async fn remove_comment(pool: &SqlitePool, comment_id: i64) -> Result<()> {
    let mut tx = begin_write(pool).await?;

    let (parent_id,): (Option<i64>,) =
        sqlx::query_as("SELECT parent_id FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::not_found("Comment not found"))?;

    if let Some(parent_id) = parent_id {
        sqlx::query("UPDATE comments SET reply_count = reply_count - 1 WHERE id = ?")
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Comment {} deleted", comment_id);

    Ok(())
}

pub async fn increment_like_count(pool: &SqlitePool, comment_id: i64) -> Result<Comment> {
    increment_counter(pool, comment_id, "like_count").await
}

pub async fn increment_dislike_count(pool: &SqlitePool, comment_id: i64) -> Result<Comment> {
    increment_counter(pool, comment_id, "dislike_count").await
}

async fn increment_counter(
    pool: &SqlitePool,
    comment_id: i64,
    column: &'static str,
) -> Result<Comment> {
    let sql = format!("UPDATE comments SET {column} = {column} + 1 WHERE id = ?");

    let mut tx = begin_write(pool).await?;

    let updated = sqlx::query(&sql)
        .bind(comment_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(Error::not_found("Comment not found"));
    }

    let comment = fetch_comment(&mut *tx, comment_id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;
    tx.commit().await?;

    Ok(comment)
}
