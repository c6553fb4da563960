// SPDX-License-Identifier: MIT OR Apache-2.0

//! Goban CLI - headless terminal front end for a game session
//!
//! The binary reads one command per line, applies it to a
//! [`goban_core::GameSession`] and prints the board after every change.

pub mod commands;
pub mod config;
pub mod render;
