#![allow(dead_code)]

mod test_server;

pub use test_server::{BrowserKeys, TestServer};
