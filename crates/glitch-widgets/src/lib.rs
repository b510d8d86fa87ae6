#![forbid(unsafe_code)]

//! Interactive glitch widgets.
//!
//! Currently one widget: the [`FilterMenu`](filter_menu::FilterMenu), a
//! keyboard-first fuzzy finder with a persisted list of recent picks. It
//! renders nothing itself; hosts draw [`rows`](filter_menu::FilterMenu::rows)
//! with [`highlight_segments`](filter_menu::scorer::highlight_segments) and
//! feed input back through `handle_event`.

pub mod filter_menu;

pub use filter_menu::{
    CloseReason, FilterMenu, MenuAction, MenuConfig, MenuEvent, MenuItem, MenuLayout, MenuRow,
    RecentSelections,
};
