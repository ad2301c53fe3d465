pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod repository;
pub mod schedule;
pub mod service;
pub mod validation;
