pub mod auth;
pub mod email;
pub mod error;
pub mod events;
pub mod friends;
pub mod invites;
pub mod middleware;
pub mod search;
