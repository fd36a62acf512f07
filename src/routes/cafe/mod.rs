mod handler;

pub use handler::{CafeTables, get_cafe_tables};
