//! # Item Extractor
//!
//! Extracts numbered entries ("1. text", "2) text", ...) from uploaded
//! documents and keeps them as a single editable JSON collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌────────────┐   ┌──────────────┐
//! │  Upload    │──▶│  extract  │──▶│  numbered  │──▶│  ItemStore   │
//! │ PDF/DOCX/  │   │ bytes →   │   │ text →     │   │ items.json   │
//! │ text       │   │ text      │   │ items      │   │ (one doc)    │
//! └────────────┘   └───────────┘   └────────────┘   └──────┬───────┘
//!                                                          │
//!                                       ┌──────────────────┤
//!                                       ▼                  ▼
//!                                  ┌──────────┐      ┌──────────┐
//!                                  │   CLI    │      │   HTTP   │
//!                                  │  (itx)   │      │  (axum)  │
//!                                  └──────────┘      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! itx extract ./posts.pdf       # extract and store numbered items
//! itx list                      # show the stored collection
//! itx update 3 "edited text"    # change one item
//! itx export --format txt       # print "1. ..." entries
//! itx serve                     # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | `Item` and `Collection` |
//! | [`error`] | Error taxonomy |
//! | [`numbered`] | Numbered-item extraction |
//! | [`extract`] | Document bytes → plain text |
//! | [`store`] | Collection persistence and item operations |
//! | [`ingest`] | Decode → extract → store pipeline |
//! | [`items`] | CLI item commands |
//! | [`export`] | JSON / text export |
//! | [`server`] | HTTP API |

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod items;
pub mod models;
pub mod numbered;
pub mod server;
pub mod store;
