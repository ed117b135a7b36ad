pub mod company;
pub mod resume;
