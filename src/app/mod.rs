pub mod approval;
pub mod session;
pub mod workflow;
