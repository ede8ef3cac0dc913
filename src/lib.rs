//! # kiai
//!
//! Karate practice tracker for kids, rendered client-side with Leptos.
//! Practice logging, a kata library, movement combinations and a parent
//! dashboard with reward approvals, backed by a REST service.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod katas;
pub mod movement;
pub mod pages;
pub mod practice;
pub mod rewards;
pub mod stats;
pub mod storage;
pub mod types;
pub mod user;

use wasm_bindgen::prelude::*;
use leptos::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    tracing::info!("kiai starting");

    mount_to_body(app::App);
}
