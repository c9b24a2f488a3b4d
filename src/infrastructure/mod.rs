pub mod crawler;
pub mod files;
pub mod nlp;
pub mod sqlite;
