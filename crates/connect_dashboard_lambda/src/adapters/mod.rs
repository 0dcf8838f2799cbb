pub mod connect;
pub mod identity;
