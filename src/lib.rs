//! pylayer: build and publish AWS Lambda layers
//!
//! Architecture:
//! - `domain`: pure types and rules (layer names, manifest states, credential gate, pruning)
//! - `application`: pipeline stages as services over I/O traits
//! - `infrastructure`: filesystem, process, python, aws and zip adapters
//! - `cli`: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
