pub mod comments;

pub use comments::comments_routes;
