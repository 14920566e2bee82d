pub mod client;
pub mod export;
pub mod probe;
pub mod realm;
pub mod user;
