use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::{CommentQuery, CreateComment, TreeQuery, UpdateComment};
use crate::threads;

pub fn comments_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route("/post/{post_id}/tree", get(comment_tree))
        .route(
            "/{comment_id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
        .route("/{comment_id}/like", post(like_comment))
        .route("/{comment_id}/dislike", post(dislike_comment))
}

type IdPath = std::result::Result<Path<i64>, PathRejection>;

fn path_id(path: IdPath) -> Result<i64> {
    let Path(id) = path.map_err(|e| Error::invalid(e.body_text()))?;
    Ok(id)
}

async fn create_comment(
    State(pool): State<SqlitePool>,
    input: std::result::Result<Json<CreateComment>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = input.map_err(|e| Error::invalid(e.body_text()))?;
    let comment = threads::create_comment(&pool, input).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(pool): State<SqlitePool>,
    query: std::result::Result<Query<CommentQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query.map_err(|e| Error::invalid(e.body_text()))?;
    let page = threads::list_comments(&pool, &query).await?;

    Ok(Json(page))
}

async fn comment_tree(
    State(pool): State<SqlitePool>,
    post_id: IdPath,
    query: std::result::Result<Query<TreeQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let post_id = path_id(post_id)?;
    let Query(query) = query.map_err(|e| Error::invalid(e.body_text()))?;
    let max_depth = query.max_depth.unwrap_or(threads::DEFAULT_TREE_DEPTH);
    let forest = threads::comment_tree(&pool, post_id, max_depth).await?;

    Ok(Json(forest))
}

async fn get_comment(
    State(pool): State<SqlitePool>,
    comment_id: IdPath,
) -> Result<impl IntoResponse> {
    let comment_id = path_id(comment_id)?;
    Ok(Json(threads::get_comment(&pool, comment_id).await?))
}

async fn update_comment(
    State(pool): State<SqlitePool>,
    comment_id: IdPath,
    input: std::result::Result<Json<UpdateComment>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let comment_id = path_id(comment_id)?;
    let Json(input) = input.map_err(|e| Error::invalid(e.body_text()))?;
    let comment = threads::update_comment(&pool, comment_id, input).await?;

    Ok(Json(comment))
}

async fn delete_comment(
    State(pool): State<SqlitePool>,
    comment_id: IdPath,
) -> Result<impl IntoResponse> {
    let comment_id = path_id(comment_id)?;
    threads::remove_comment(&pool, comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn like_comment(
    State(pool): State<SqlitePool>,
    comment_id: IdPath,
) -> Result<impl IntoResponse> {
    let comment_id = path_id(comment_id)?;
    Ok(Json(threads::increment_like_count(&pool, comment_id).await?))
}

async fn dislike_comment(
    State(pool): State<SqlitePool>,
    comment_id: IdPath,
) -> Result<impl IntoResponse> {
    let comment_id = path_id(comment_id)?;
    Ok(Json(threads::increment_dislike_count(&pool, comment_id).await?))
}
