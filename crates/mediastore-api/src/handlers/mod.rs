pub mod collections;
pub mod files;
pub mod health;
pub mod objects;
pub mod repositories;
