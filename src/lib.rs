mod database {
    pub mod actions;
    pub mod error;
    pub mod memory;
    pub mod pagination;
    pub mod schema;
    pub mod store;
}
mod recipes {
    pub mod catalog;
    pub mod composer;
    pub mod filter;
    pub mod relations;
    pub mod shopping;
    pub mod subscriptions;
}
mod http {
    pub mod middleware;
    pub mod query;
    pub mod reply;
}
pub mod config;
mod constants;
pub mod session;

pub use constants::*;
pub use database::*;
pub use http::*;
pub use recipes::*;
