#![allow(missing_docs)]

mod collector;
mod service;
mod store;
