#![forbid(unsafe_code)]

//! Keyboard-driven fuzzy filter menu.
//!
//! A [`FilterMenu`] holds a list of [`MenuItem`]s, filters them against a
//! typed query with subsequence scoring (see [`scorer`]), and remembers the
//! most recent selections across sessions (see [`recent`]).
//!
//! # Usage
//!
//! ```
//! use glitch_core::event::{Event, KeyCode, KeyEvent};
//! use glitch_widgets::filter_menu::{FilterMenu, MenuAction, MenuItem};
//!
//! let mut menu = FilterMenu::in_memory(vec![
//!     MenuItem::new("home", "Home"),
//!     MenuItem::new("archive", "Archive"),
//! ]);
//! menu.open();
//! for c in "arc".chars() {
//!     menu.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char(c))), 0.0);
//! }
//! let action = menu.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter)), 10.0);
//! assert_eq!(action, Some(MenuAction::Select("archive".into())));
//! assert!(!menu.is_open());
//! ```
//!
//! # Keys (while open)
//!
//! | Key | Action |
//! |-----|--------|
//! | `Down`, `Ctrl-n`, `Ctrl-j` | Cursor down (clamped) |
//! | `Up`, `Ctrl-p`, `Ctrl-k` | Cursor up (clamped) |
//! | `Home` / `End` | First / last row |
//! | `Enter` | Apply pending filter, select cursor row |
//! | `Ctrl`/`Super` + `1`..`9` | Select that recent item |
//! | `Esc` | Close |
//! | `Backspace` | Delete a char; close when the query is empty |
//! | printable | Append to query (filter is debounced) |
//!
//! # Invariants
//!
//! 1. The cursor is `0` when there are no rows, else within `[0, len-1]`.
//! 2. Filtering is debounced: rows change only in [`FilterMenu::tick`] or
//!    when `Enter` flushes the pending query.
//! 3. Every selection is recorded in the recent list before `Selected` is
//!    emitted.
//! 4. Nothing happens while closed; events return `None`.

pub mod recent;
pub mod scorer;

use std::time::Duration;

use glitch_core::animation::{Animation, Fade, ease_out};
use glitch_core::capabilities::{Capabilities, EnvironmentProbe};
use glitch_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, PointerEvent, PointerEventKind};
use glitch_core::geometry::Rect;
use glitch_core::notify::NotificationSink;
use glitch_runtime::{Debouncer, KeyValueStore, Lifecycle, MemoryStore};
use tracing::{debug, trace};

pub use recent::{DEFAULT_MAX_RECENT, RECENT_STORAGE_KEY, RecentSelections};
pub use scorer::{FuzzyMatch, KEYWORD_SCORE, MatchKind};

/// Default quiet period before a typed query is applied.
pub const DEFAULT_DEBOUNCE_MS: f64 = 40.0;

/// Length of the open/close glitch transition.
pub const TRANSITION_MS: u64 = 150;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Stable identifier, reported on selection and stored in the recent list.
    pub id: String,
    /// Display label; the primary match target.
    pub label: String,
    /// Optional grouping shown next to the label.
    pub category: Option<String>,
    /// Extra match targets (never highlighted).
    pub keywords: Vec<String>,
}

impl MenuItem {
    /// Create an item with no category or keywords.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: None,
            keywords: Vec::new(),
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the keywords.
    #[must_use]
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        self
    }
}

/// One visible result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    /// Index into the menu's items.
    pub item: usize,
    /// Match score (0 for an empty query).
    pub score: u32,
    /// Char indices of highlighted label characters.
    pub positions: Vec<usize>,
    /// Shown because it was recently selected.
    pub recent: bool,
}

// ---------------------------------------------------------------------------
// Events and actions
// ---------------------------------------------------------------------------

/// Why the menu closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Escape pressed.
    Escape,
    /// An item was selected.
    Selected,
    /// Pointer pressed outside the menu surface.
    PointerOutside,
    /// Backspace with an empty query.
    BackedOut,
    /// Closed by the host (`close()` or detach).
    Programmatic,
}

/// Notifications emitted through the menu's sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// The menu opened.
    Opened,
    /// The menu closed.
    Closed {
        /// What closed it.
        reason: CloseReason,
    },
    /// An item was chosen.
    Selected {
        /// The chosen item's id.
        id: String,
    },
    /// A debounced query was applied.
    FilterChanged {
        /// The applied query.
        query: String,
        /// Number of rows after filtering.
        result_count: usize,
    },
    /// The cursor moved to another row.
    CursorMoved {
        /// New cursor row.
        index: usize,
        /// Id of the item under the cursor.
        id: String,
    },
}

/// Result of handling an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// An item was selected (the menu has closed).
    Select(String),
    /// The menu closed without a selection.
    Dismiss(CloseReason),
}

// ---------------------------------------------------------------------------
// Configuration and layout
// ---------------------------------------------------------------------------

/// Menu configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuConfig {
    /// Filter debounce in milliseconds.
    pub debounce_ms: f64,
    /// Recent list capacity (at least 1).
    pub max_recent: usize,
    /// Storage key for the recent list.
    pub storage_key: String,
    /// Skip the open/close transition.
    pub reduced_motion: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_recent: DEFAULT_MAX_RECENT,
            storage_key: RECENT_STORAGE_KEY.to_string(),
            reduced_motion: false,
        }
    }
}

impl MenuConfig {
    /// Set the debounce period.
    #[must_use]
    pub fn debounce_ms(mut self, ms: f64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the recent list capacity.
    #[must_use]
    pub fn max_recent(mut self, max: usize) -> Self {
        self.max_recent = max;
        self
    }

    /// Set the storage key.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Disable the open/close transition.
    #[must_use]
    pub fn reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }
}

/// Where the host drew the menu, for pointer hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLayout {
    /// The whole menu surface.
    pub surface: Rect,
    /// The result list area; row `i` starts at `list.y + i * row_height`.
    pub list: Rect,
    /// Height of one result row (at least 1).
    pub row_height: u32,
}

impl MenuLayout {
    /// Row under a point, if the point is inside the list area.
    #[must_use]
    pub fn row_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.list.contains(x, y) {
            return None;
        }
        let offset = i64::from(y) - i64::from(self.list.y);
        usize::try_from(offset / i64::from(self.row_height.max(1))).ok()
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    fade: Fade,
    closing: bool,
}

// ---------------------------------------------------------------------------
// FilterMenu
// ---------------------------------------------------------------------------

/// Fuzzy filter menu state machine.
pub struct FilterMenu {
    items: Vec<MenuItem>,
    recent: RecentSelections,
    open: bool,
    query: String,
    applied_query: String,
    rows: Vec<MenuRow>,
    cursor: usize,
    debounce: Debouncer<String>,
    reduced_motion: bool,
    transition: Option<Transition>,
    layout: Option<MenuLayout>,
    sink: Option<Box<dyn NotificationSink<MenuEvent>>>,
}

impl std::fmt::Debug for FilterMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterMenu")
            .field("items", &self.items.len())
            .field("open", &self.open)
            .field("query", &self.query)
            .field("rows", &self.rows.len())
            .field("cursor", &self.cursor)
            .field("recent", &self.recent)
            .finish_non_exhaustive()
    }
}

impl FilterMenu {
    /// Create a menu, loading the recent list from `store`.
    pub fn new(items: Vec<MenuItem>, store: Box<dyn KeyValueStore>, config: MenuConfig) -> Self {
        let recent = RecentSelections::load(store, config.storage_key, config.max_recent);
        Self {
            items,
            recent,
            open: false,
            query: String::new(),
            applied_query: String::new(),
            rows: Vec::new(),
            cursor: 0,
            debounce: Debouncer::new(config.debounce_ms),
            reduced_motion: config.reduced_motion,
            transition: None,
            layout: None,
            sink: None,
        }
    }

    /// Create a menu with default config and session-only recents.
    pub fn in_memory(items: Vec<MenuItem>) -> Self {
        Self::new(items, Box::new(MemoryStore::new()), MenuConfig::default())
    }

    /// Route notifications to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: impl NotificationSink<MenuEvent> + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    // --- State access ---

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The query as typed (may not be applied yet).
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query the current rows were computed from.
    #[must_use]
    pub fn applied_query(&self) -> &str {
        &self.applied_query
    }

    /// Whether a typed query is waiting for its debounce.
    #[must_use]
    pub fn has_pending_filter(&self) -> bool {
        self.debounce.is_pending()
    }

    /// When the pending filter becomes due, for hosts scheduling a tick.
    #[must_use]
    pub fn filter_deadline(&self) -> Option<f64> {
        self.debounce.deadline()
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    /// The item shown in `row`.
    #[must_use]
    pub fn row_item(&self, row: usize) -> Option<&MenuItem> {
        self.rows.get(row).and_then(|r| self.items.get(r.item))
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The item under the cursor.
    #[must_use]
    pub fn selected_item(&self) -> Option<&MenuItem> {
        self.row_item(self.cursor)
    }

    #[must_use]
    pub fn recent(&self) -> &RecentSelections {
        &self.recent
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Record where the menu is drawn.
    pub fn set_layout(&mut self, layout: MenuLayout) {
        self.layout = Some(layout);
    }

    /// Replace the item list, re-filtering with the applied query.
    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        let kept = self.selected_item().map(|item| item.id.clone());
        self.items = items;
        if self.open {
            self.refresh_rows(kept);
        }
    }

    /// Screen-reader text for the current cursor row.
    #[must_use]
    pub fn announcement(&self) -> String {
        let Some(item) = self.selected_item() else {
            return "No results".to_string();
        };
        let position = format!("{} of {}", self.cursor + 1, self.rows.len());
        match &item.category {
            Some(category) => format!("{}, {}, {}", item.label, category, position),
            None => format!("{}, {}", item.label, position),
        }
    }

    // --- Open / close ---

    /// Open the menu with an empty query. No-op if already open.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.query.clear();
        self.debounce.cancel();
        self.rows = self.compute_rows("");
        self.applied_query.clear();
        self.cursor = 0;
        self.begin_transition(false);
        debug!(rows = self.rows.len(), "filter menu opened");
        self.emit(MenuEvent::Opened);
    }

    /// Close the menu. No-op if already closed.
    pub fn close(&mut self) {
        self.close_with(CloseReason::Programmatic);
    }

    fn close_with(&mut self, reason: CloseReason) {
        if !self.open {
            return;
        }
        self.open = false;
        self.debounce.cancel();
        self.begin_transition(true);
        debug!(?reason, "filter menu closed");
        self.emit(MenuEvent::Closed { reason });
    }

    // --- Transition ---

    fn begin_transition(&mut self, closing: bool) {
        if self.reduced_motion {
            self.transition = None;
            return;
        }
        let fade = Fade::new(Duration::from_millis(TRANSITION_MS)).easing(ease_out);
        self.transition = Some(Transition { fade, closing });
    }

    /// Advance the open/close transition.
    pub fn advance_transition(&mut self, dt: Duration) {
        if let Some(t) = self.transition.as_mut() {
            t.fade.tick(dt);
            if t.fade.is_complete() {
                self.transition = None;
            }
        }
    }

    /// Current transition opacity in `[0, 1]`, or `None` when idle.
    ///
    /// Rises while opening and falls while closing. Always `None` under
    /// reduced motion.
    #[must_use]
    pub fn transition_value(&self) -> Option<f32> {
        self.transition.map(|t| {
            let v = t.fade.value();
            if t.closing { 1.0 - v } else { v }
        })
    }

    // --- Time ---

    /// Apply the pending query once its debounce has elapsed.
    ///
    /// Returns whether the rows changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.open {
            return false;
        }
        match self.debounce.poll(now_ms) {
            Some(query) => self.apply_filter(query),
            None => false,
        }
    }

    // --- Input ---

    /// Handle an input event at host time `now_ms`.
    pub fn handle_event(&mut self, event: &Event, now_ms: f64) -> Option<MenuAction> {
        if !self.open {
            return None;
        }
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key, now_ms),
            Event::Pointer(pointer) => self.handle_pointer(pointer),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now_ms: f64) -> Option<MenuAction> {
        let command = key.command();
        match key.code {
            KeyCode::Escape => {
                self.close_with(CloseReason::Escape);
                Some(MenuAction::Dismiss(CloseReason::Escape))
            }
            KeyCode::Enter => {
                if let Some(query) = self.debounce.flush() {
                    self.apply_filter(query);
                }
                self.confirm(self.cursor)
            }
            KeyCode::Down => {
                self.move_cursor_by(1);
                None
            }
            KeyCode::Up => {
                self.move_cursor_by(-1);
                None
            }
            KeyCode::Home => {
                self.move_cursor_to(0);
                None
            }
            KeyCode::End => {
                self.move_cursor_to(self.rows.len().saturating_sub(1));
                None
            }
            KeyCode::Char('n' | 'j') if key.ctrl() => {
                self.move_cursor_by(1);
                None
            }
            KeyCode::Char('p' | 'k') if key.ctrl() => {
                self.move_cursor_by(-1);
                None
            }
            KeyCode::Char(c @ '1'..='9') if command => self.select_recent(digit_index(c)),
            KeyCode::Backspace => {
                if self.query.is_empty() {
                    self.close_with(CloseReason::BackedOut);
                    return Some(MenuAction::Dismiss(CloseReason::BackedOut));
                }
                self.query.pop();
                self.debounce.push(self.query.clone(), now_ms);
                None
            }
            KeyCode::Char(c) if !command && !c.is_control() => {
                self.query.push(c);
                trace!(query = %self.query, "query edited");
                self.debounce.push(self.query.clone(), now_ms);
                None
            }
            _ => None,
        }
    }

    fn handle_pointer(&mut self, pointer: &PointerEvent) -> Option<MenuAction> {
        if pointer.kind != PointerEventKind::Down {
            return None;
        }
        let layout = self.layout?;
        if !layout.surface.contains(pointer.x, pointer.y) {
            self.close_with(CloseReason::PointerOutside);
            return Some(MenuAction::Dismiss(CloseReason::PointerOutside));
        }
        let row = layout.row_at(pointer.x, pointer.y)?;
        self.confirm(row)
    }

    // --- Cursor ---

    fn move_cursor_by(&mut self, delta: isize) {
        let target = self.cursor.saturating_add_signed(delta);
        self.move_cursor_to(target);
    }

    fn move_cursor_to(&mut self, target: usize) {
        let clamped = target.min(self.rows.len().saturating_sub(1));
        if clamped == self.cursor {
            return;
        }
        self.cursor = clamped;
        if let Some(id) = self.selected_item().map(|item| item.id.clone()) {
            self.emit(MenuEvent::CursorMoved { index: clamped, id });
        }
    }

    // --- Selection ---

    fn confirm(&mut self, row: usize) -> Option<MenuAction> {
        let id = self.row_item(row)?.id.clone();
        Some(self.select(id))
    }

    fn select_recent(&mut self, n: usize) -> Option<MenuAction> {
        let item = *self.live_recent().get(n)?;
        let id = self.items[item].id.clone();
        Some(self.select(id))
    }

    fn select(&mut self, id: String) -> MenuAction {
        self.recent.record(&id);
        debug!(id = %id, "filter menu selection");
        self.emit(MenuEvent::Selected { id: id.clone() });
        self.close_with(CloseReason::Selected);
        MenuAction::Select(id)
    }

    // --- Filtering ---

    /// Returns whether the rows were recomputed.
    fn apply_filter(&mut self, query: String) -> bool {
        if query == self.applied_query {
            return false;
        }
        let kept = self.selected_item().map(|item| item.id.clone());
        self.applied_query = query;
        self.refresh_rows(kept);
        true
    }

    /// Recompute rows for the applied query, keeping the cursor on `kept`
    /// when it survives and falling back to the top row otherwise.
    fn refresh_rows(&mut self, kept: Option<String>) {
        let previous = self.cursor;
        self.rows = self.compute_rows(&self.applied_query);
        self.cursor = kept
            .and_then(|id| {
                self.rows
                    .iter()
                    .position(|row| self.items[row.item].id == id)
            })
            .unwrap_or(0);

        let result_count = self.rows.len();
        trace!(query = %self.applied_query, result_count, "filter applied");
        self.emit(MenuEvent::FilterChanged {
            query: self.applied_query.clone(),
            result_count,
        });
        if self.cursor != previous
            && let Some(id) = self.selected_item().map(|item| item.id.clone())
        {
            self.emit(MenuEvent::CursorMoved {
                index: self.cursor,
                id,
            });
        }
    }

    /// Indices of recent items still present in the menu, most recent first.
    fn live_recent(&self) -> Vec<usize> {
        self.recent
            .ids()
            .iter()
            .filter_map(|id| self.items.iter().position(|item| &item.id == id))
            .collect()
    }

    fn compute_rows(&self, query: &str) -> Vec<MenuRow> {
        let ranked = scorer::rank(query, &self.items);
        if !query.is_empty() {
            return ranked
                .into_iter()
                .map(|m| MenuRow {
                    item: m.index,
                    score: m.score,
                    positions: m.positions,
                    recent: false,
                })
                .collect();
        }

        let recent_items = self.live_recent();

        let mut rows: Vec<MenuRow> = recent_items
            .iter()
            .map(|&item| MenuRow {
                item,
                score: 0,
                positions: Vec::new(),
                recent: true,
            })
            .collect();
        rows.extend(
            ranked
                .into_iter()
                .filter(|m| !recent_items.contains(&m.index))
                .map(|m| MenuRow {
                    item: m.index,
                    score: m.score,
                    positions: m.positions,
                    recent: false,
                }),
        );
        rows
    }

    fn emit(&mut self, event: MenuEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.notify(event);
        }
    }
}

fn digit_index(c: char) -> usize {
    c.to_digit(10).map_or(0, |d| d as usize).saturating_sub(1)
}

impl Lifecycle for FilterMenu {
    /// Pick up the host's motion preference.
    fn on_attach(&mut self, probe: &dyn EnvironmentProbe) {
        let caps = Capabilities::detect(probe);
        self.reduced_motion = self.reduced_motion || caps.reduced_motion;
        if self.reduced_motion {
            self.transition = None;
        }
    }

    /// Close silently and drop any pending filter.
    fn on_detach(&mut self) {
        self.close();
        self.debounce.cancel();
        self.transition = None;
    }
}
