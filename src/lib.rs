#![forbid(unsafe_code)]

pub mod collection;
pub mod config;
pub mod crud;
pub mod datamodel;
pub mod http;
pub mod metric_types;
pub mod storage;
