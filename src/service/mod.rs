pub mod analysis;
pub mod dashboard;
pub mod dataset;
pub mod figures;
pub mod merger;
