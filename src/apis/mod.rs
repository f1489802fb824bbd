pub mod records;
pub mod schema;
pub mod scripts;
pub mod tables;

// Re-export all APIs
pub use records::RecordApi;
pub use schema::SchemaApi;
pub use scripts::ScriptApi;
pub use tables::TableApi;
