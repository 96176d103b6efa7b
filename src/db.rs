pub mod fingrid;
pub mod postgrest;
