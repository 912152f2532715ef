pub mod growth;
pub mod retirement;
