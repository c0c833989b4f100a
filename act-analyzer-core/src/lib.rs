#![doc = "act-analyzer-core: core pipeline library for act-analyzer."]

//! This crate contains the whole analysis pipeline for legislative acts:
//! turning a PDF or pasted text into document text, building the three task
//! prompts, invoking an LLM provider through the [`contract::LlmProvider`]
//! seam, and aggregating the results into an exportable report.
//!
//! No transport lives here. The CLI crate supplies the concrete provider.
//!
//! # Usage
//! Load a [`source::DocumentText`] into a [`session::Session`], run tasks with an
//! [`invoker::Analyzer`], then call [`session::Session::assemble_report`].

pub mod contract;
pub mod error;
pub mod invoker;
pub mod prompts;
pub mod report;
pub mod session;
pub mod source;
