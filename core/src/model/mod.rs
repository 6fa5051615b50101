pub mod college;
pub mod percentage;
pub mod profile;
pub mod school;
pub mod state;
