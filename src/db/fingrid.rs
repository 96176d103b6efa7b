pub mod datasets;
pub mod lib_fingrid;
