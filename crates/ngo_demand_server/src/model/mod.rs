pub mod demand;
pub mod principal;
