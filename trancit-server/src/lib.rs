//! TranCIT route planner server.
//!
//! A JSON API for getting around Cebu: "How do I get from here to there, and
//! what will it cost by jeepney, bus, taxi, or motorcycle?"

pub mod accounts;
pub mod cache;
pub mod config;
pub mod domain;
pub mod fare;
pub mod geocode;
pub mod persist;
pub mod planner;
pub mod routing;
pub mod saved;
pub mod web;
