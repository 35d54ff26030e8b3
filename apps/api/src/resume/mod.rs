// Resume ingestion: PDF text extraction, embedding storage, candidate search.

pub mod handlers;
pub mod parser;
pub mod store;
