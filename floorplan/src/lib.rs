//! Interactive floor-plan table editor for the seating tool.
//!
//! This crate is the UI-free core of the editor. It owns the gesture state
//! machines for dragging, resizing and rotating table glyphs on a responsive
//! plan, keeps every table's geometry in plan-relative percentages so it
//! survives any container size, keeps per-table undo/redo history, and
//! reconciles each committed change with a remote store under a
//! save/rollback discipline. Hosts feed it pointer, keyboard, resize and
//! timer events and carry out the returned [`provider::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`provider`] | Top-level engine: selection, input routing, [`provider::Action`]s |
//! | [`controller`] | Per-table gesture state machine and commit logic |
//! | [`reconciler`] | Save indicator, request sequencing, rollback on failure |
//! | [`history`] | Bounded per-table undo/redo store |
//! | [`observer`] | Debounced plan-size measurement |
//! | [`transform`] | Percent/pixel coordinate transform and pixel geometry |
//! | [`doc`] | Table records, geometry snapshots, outbound updates |
//! | [`hit`] | Hit-testing glyph bodies and manipulation handles |
//! | [`input`] | Input event types and the gesture vocabulary |
//! | [`render`] | Toolkit-neutral draw list |
//! | [`store`] | Remote store trait and errors |
//! | [`config`] | Editor timing and reconciliation settings |
//! | [`consts`] | Shared numeric constants (history cap, delays, size floor) |

pub mod config;
pub mod consts;
pub mod controller;
pub mod doc;
pub mod hit;
pub mod history;
pub mod input;
pub mod observer;
pub mod provider;
pub mod reconciler;
pub mod render;
pub mod store;
pub mod transform;
