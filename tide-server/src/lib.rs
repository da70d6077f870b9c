//! Tide extremes server.
//!
//! A web service that answers: "when is the next high or low tide near
//! me, and has it already happened?" It keeps an in-memory directory of
//! tide stations and resolves predicted extremes through a third-party
//! provider.

pub mod config;
pub mod domain;
pub mod geo;
pub mod stations;
pub mod tides;
pub mod web;
