pub mod analyzer;
pub mod symbol_table;
pub mod types;

#[cfg(test)]
mod tests;
