// Core trading domain entities and value objects
pub mod symbol_series;
pub mod types;
