//! Weather team: a coordinator agent that answers weather and time
//! questions with local tools and delegates greetings and farewells to
//! specialist sub-agents.
//!
//! Which agent handles an utterance, and which tool it calls, is decided by
//! a pluggable [`inference::DecisionEngine`]: a hosted language model in
//! production, a keyword rule engine offline and in tests.

pub mod agent;
pub mod config;
pub mod driver;
pub mod error;
pub mod inference;
pub mod runner;
pub mod session;
pub mod tools;
pub mod types;
