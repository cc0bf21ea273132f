pub mod bootstrap;
pub mod config;
pub mod fonts;
pub mod google;
pub mod record_store;
pub mod storage;
