pub mod identifier;
pub mod post;
pub mod provider;
pub mod render;
pub mod reply;
