//! Integration tests for the harvester
//!
//! These tests use wiremock to serve catalog and book pages and run the
//! catalog crawl and the worker pool end-to-end.

mod config_tests;
mod harvest_tests;
