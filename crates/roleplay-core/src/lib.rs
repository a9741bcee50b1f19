//! Roleplay Core Types and Definitions
//!
//! This crate provides the foundational types for branching role-play
//! stories. It includes:
//!
//! - **Identifiers**: String-interned scene and choice identifiers ([`identifier::Id`])
//! - **Model**: Projects, scenes, dialogue lines and choices ([`model`] module)
//! - **Media**: Binary payloads and their transient display handles ([`media`] module)
//! - **Graph**: The directed story graph built from a project ([`graph`] module)

pub mod graph;
pub mod identifier;
pub mod media;
pub mod model;
