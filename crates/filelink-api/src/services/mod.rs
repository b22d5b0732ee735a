pub mod ingestion;
pub mod replies;
pub mod retrieval;
