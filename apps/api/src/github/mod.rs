//! GitHub portfolio ingestion: repositories → documents → embeddings.

pub mod client;
pub mod documents;
pub mod handlers;
pub mod store;

pub use client::GitHubClient;
