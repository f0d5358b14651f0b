pub mod conf;
pub mod post;
