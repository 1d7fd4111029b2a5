//! Schema recovery module

mod builder;
pub mod ddl;
mod model;

pub use builder::SchemaBuilder;
pub use model::{Column, ForeignKey, Index, Relationship, Schema, Table};
