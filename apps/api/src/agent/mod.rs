//! AI agent: the n8n webhook workflow and the consent, tracking and gating
//! endpoints around it.

pub mod accounts;
pub mod consent;
pub mod gates;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod workflow;
