//! Library side of the `qmeta` command line tool.

pub mod logging;
pub mod pipeline;
