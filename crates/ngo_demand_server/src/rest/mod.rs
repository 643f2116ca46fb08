pub mod demand;
pub mod status;
