//! # pair-relay
//!
//! Rendezvous message relay for pairing and signalling.
//!
//! This crate implements a small HTTP relay that:
//! - Accepts a text payload addressed to a receiver key (`/send`)
//! - Holds a receiver's long-poll open until a payload for its key arrives
//!   or a fixed timeout elapses (`/receive`)
//! - Keeps no durable state (delivery is one-shot and ephemeral)
//! - Evicts mailboxes that have been idle past a quiet threshold
//!
//! ## Architecture
//!
//! ```text
//! Sender ──POST /send?receiver=K──┐          ┌──GET /receive?receiver=K── Receiver
//!                                 │          │   (long-poll, ≤30 s)
//!                             ┌───┴──────────┴───┐
//!                             │    pair-relay    │
//!                             │ ┌──────────────┐ │
//!                             │ │ MailboxStore │ │  key → one value OR one waiter
//!                             │ └──────────────┘ │
//!                             │   idle sweep ⟳   │
//!                             └──────────────────┘
//! ```
//!
//! ## Delivery contract
//!
//! Each key holds at most one pending value or one pending waiter. A deposit
//! that finds a waiter wakes it immediately; a deposit that finds none parks
//! its value for the next receive, overwriting any earlier undelivered value.
//! Timeout is absence, not an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod mailbox;
pub mod server;
pub mod store;
pub mod sweep;
