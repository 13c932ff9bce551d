//! koclean - disable kernel driver configs unused by a target architecture
//!
//! This library scans driver Kconfig files for configuration symbols,
//! filters them against per-definition allow lists, writes architecture
//! override files for the symbols that should be disabled, and records
//! each override as a git commit with an exported patch.

pub mod allowlist;
pub mod cli;
pub mod disabler;
pub mod errors;
pub mod kconfig;
pub mod orchestrator;
pub mod recorder;
