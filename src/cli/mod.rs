pub mod annotate;
pub mod auth;
pub mod output;
pub mod playlist;
