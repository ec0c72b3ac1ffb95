pub mod flatten;
pub mod lead;
pub mod submission;
