//! # gap-finder
//!
//! A Rust web service that finds under-studied combinations in NASA's Open
//! Science Data Repository (OSDR): organism × tissue × condition × assay
//! cells where no dataset exists yet, ranked by how actionable they are.
//!
//! ## Architecture
//!
//! Each gap search is a single pass through the pipeline below. Everything
//! after the OSDR fetch is pure and synchronous.
//!
//! ```text
//!                       ┌──────────────────┐
//!                       │  Free-text query │
//!                       └────────┬─────────┘
//!                                │
//!                                ▼
//!                   ┌────────────────────────┐
//!                   │  LLM filter extraction │
//!                   │  organisms / assays /  │
//!                   │  condition / tissues   │
//!                   └───────────┬────────────┘
//!                               │ ordered query params
//!                               ▼
//!                   ┌────────────────────────┐
//!                   │  OSDR /query/assays/   │
//!                   │  json.records          │
//!                   └───────────┬────────────┘
//!                               │ raw records
//!                               ▼
//!                   ┌────────────────────────┐
//!                   │  Normalize + canonical │
//!                   │  tissue + coverage     │
//!                   │  index (one pass)      │
//!                   └───────────┬────────────┘
//!                               │
//!               ┌───────────────┴───────────────┐
//!               ▼                               ▼
//!     ┌───────────────────┐           ┌───────────────────┐
//!     │  Scope resolution │           │  Coverage rows    │
//!     │  explicit filters │           │  covered / weak   │
//!     │  or observed keys │           └───────────────────┘
//!     └─────────┬─────────┘
//!               │ organisms × tissues × conditions × assays
//!               ▼
//!     ┌───────────────────┐
//!     │  Gap enumeration  │
//!     │  empty cells only │
//!     └─────────┬─────────┘
//!               │
//!               ▼
//!     ┌─────────────────────────────────────────────┐
//!     │  Signal scoring                             │
//!     │  1.8 ground + 1.5 multi-omics + 1.2 phase   │
//!     │  + 1.0 cross-species + 0.8 neighbor         │
//!     │  + 0.6 feasibility − 0.7 redundancy         │
//!     └─────────┬───────────────────────────────────┘
//!               │
//!               ▼
//!     ┌───────────────────┐
//!     │  Rank + top-N     │
//!     │  highlights       │
//!     └───────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, OSDR, LLM and chat settings
//! - [`osdr`] - OSDR query parameters, record fetching, record field access and HTML links
//! - [`gaps::normalize`] - Raw records to observed tuples with fine and coarse conditions
//! - [`gaps::tissue`] - Canonical parent tissue names
//! - [`gaps::coverage`] - Coverage indices built in one pass over observed tuples
//! - [`gaps::scope`] - Request filters and the resolved evaluation universe
//! - [`gaps::enumerate`] - Universe enumeration into covered cells and gaps
//! - [`gaps::signals`] - Per-gap heuristic signals, weighted score and reasons
//! - [`gaps::rank`] - Deterministic ordering and top-N truncation
//! - [`llm`] - Ollama / OpenAI-compatible completions and filter-extraction prompts
//! - [`chat`] - In-memory chats with dummy, RAG and LLM reply backends
//! - [`api`] - Axum HTTP handlers for gap search, coverage, options, assay finder and chat
//! - [`state`] - Shared application state

pub mod api;
pub mod chat;
pub mod config;
pub mod gaps;
pub mod llm;
pub mod models;
pub mod osdr;
pub mod state;
