pub mod admin;
pub mod class_session;
pub mod client;
pub mod client_group;
pub mod payment;

pub use admin::*;
pub use class_session::*;
pub use client::*;
pub use client_group::*;
pub use payment::*;
