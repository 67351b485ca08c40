pub mod resource;
pub mod vote;
