pub mod api;
pub mod auth;
pub mod candidate;
pub mod code;
pub mod election;
pub mod results;
pub mod store;
pub mod vote;
pub mod voter;
