// * admit-flow
// * Ingest pipeline for admissions-result postings: scrape a public
// * listings site, normalize rows into a strict schema, optionally
// * canonicalize free-text fields through a local language model, and load
// * the result into a relational store exactly once per listing URL.

pub mod config;
pub mod engine;
pub mod enrich;
pub mod network;
pub mod ops;
pub mod persistence;
pub mod refinery;
