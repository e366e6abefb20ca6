pub mod menu;
pub mod workflow;
