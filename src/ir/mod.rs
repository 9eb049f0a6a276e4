pub mod ir;
pub mod translate;
