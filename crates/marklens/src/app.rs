#![forbid(unsafe_code)]

//! The marklens application model.
//!
//! ```text
//! ┌ marklens ─────────────────────────────────────────── Cards ┐
//! │┌ Categories ──────┐ / rust▏                                 │
//! ││▸ All Bookmarks   │ ╭──────────────╮ ╭──────────────╮       │
//! ││    40 bookmarks  │ │ ...          │ │ ...          │       │
//! ││  🦀 Rust      [i]│ │ ...          │ │ ...          │       │
//! ││    12 bookmarks  │ ╰──────────────╯ ╰──────────────╯       │
//! │└──────────────────┘                                         │
//! │ Showing 12 bookmarks in Rust                 / search · q quit│
//! ```
//!
//! All state lives in [`App`]; the [`Controller`] owns the dataset and the
//! filter, the optional [`GraphScene`] owns the force layout. `view` records
//! the screen regions and hit grid it drew so that the next mouse event can
//! be resolved against exactly what is on screen.
//!
//! # Timing
//!
//! Time comes from a [`Clock`], which tests replace with a manual one.
//! [`Model::next_tick`] reports the earliest of the search commit, the next
//! animation frame (graph visible and still cooling), and the copy
//! acknowledgment expiry.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use marklens_core::{
    CategorySelection, Controller, Dataset, LoadError, LoadState, load_from_path,
};
use marklens_layout::{Canvas, NodeKind};
use marklens_render::cards::CardGrid;
use marklens_render::chrome::SIDEBAR_WIDTH;
use marklens_render::style::theme;
use marklens_render::{
    AggregateKind, BarGrid, Buffer, CardRenderer, Capabilities, DetailModal, GraphScene,
    GraphView, HitGrid, HitTarget, Rect, SearchBar, Sidebar, Style, render_aggregate,
    render_error, render_message, render_status, select_aggregate_renderer,
};
use tracing::{debug, info, info_span};

use crate::cli::{Opts, StartView};
use crate::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use crate::runtime::{Cmd, Model};

/// Shown while the dataset loads.
pub const LOADING_TEXT: &str = "Loading bookmarks...";

/// How long `[ok]` replaces `[copy]`.
pub const COPY_ACK: Duration = Duration::from_millis(2000);

/// Interval between animation frames while the graph cools.
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(33);

/// Simulation steps per animation frame.
pub const TICKS_PER_FRAME: usize = 3;

const ZOOM_STEP: f64 = 1.25;
// World units per pan keypress at scale 1.
const PAN_STEP: f64 = 60.0;

/// Messages understood by [`App`].
#[derive(Debug)]
pub enum Msg {
    Event(Event),
    Loaded(Result<Dataset, LoadError>),
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        Msg::Event(event)
    }
}

/// Source of `now`. The manual variant is shared between clones, so a test
/// can keep a handle and advance the app's time.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    manual: Option<Rc<Cell<Instant>>>,
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self { manual: None }
    }

    #[must_use]
    pub fn manual(start: Instant) -> Self {
        Self {
            manual: Some(Rc::new(Cell::new(start))),
        }
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.manual.as_ref().map_or_else(Instant::now, |c| c.get())
    }

    /// Move a manual clock forward. No effect on the system clock.
    pub fn advance(&self, by: Duration) {
        if let Some(cell) = &self.manual {
            cell.set(cell.get() + by);
        }
    }
}

/// Which main view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Cards,
    Aggregate,
}

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Search,
    Content,
}

/// Start-up settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub start_view: StartView,
    pub caps: Capabilities,
    pub debounce: Duration,
}

impl AppConfig {
    #[must_use]
    pub fn from_opts(opts: &Opts) -> Self {
        Self {
            data_path: opts.data.clone(),
            start_view: opts.view,
            caps: Capabilities {
                layout_engine: opts.graph,
                hyperlinks: opts.hyperlinks,
            },
            debounce: opts.debounce,
        }
    }
}

/// Screen regions of the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regions {
    pub screen: Rect,
    pub title: Rect,
    pub sidebar: Rect,
    pub search: Rect,
    pub content: Rect,
    pub status: Rect,
}

impl Regions {
    #[must_use]
    pub fn for_area(area: Rect) -> Self {
        let (title, rest) = area.split_top(1);
        let (body, status) = rest.split_bottom(1);
        let (sidebar, main) = body.split_left(SIDEBAR_WIDTH.min(body.width / 3));
        let (search, content) = main.split_top(1);
        Self {
            screen: area,
            title,
            sidebar,
            search,
            content,
            status,
        }
    }
}

/// The open detail modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    pub category: String,
    pub scroll: usize,
}

// Left button held on a graph node.
#[derive(Debug, Clone, Copy)]
struct Press {
    node: usize,
    moved: bool,
}

/// Application state.
pub struct App {
    controller: Controller,
    clock: Clock,
    config: AppConfig,
    mode: ViewMode,
    focus: Focus,
    sidebar_cursor: usize,
    card_focus: Option<usize>,
    prefer_graph: bool,
    scene: Option<GraphScene>,
    last_frame: Instant,
    modal: Option<ModalState>,
    copied: Option<(usize, Instant)>,
    press: Option<Press>,
    regions: Cell<Regions>,
    hits: RefCell<HitGrid>,
    drawn_aggregate: Cell<Option<AggregateKind>>,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig, clock: Clock) -> Self {
        let now = clock.now();
        let mode = match config.start_view {
            StartView::Cards => ViewMode::Cards,
            StartView::Aggregate => ViewMode::Aggregate,
        };
        Self {
            controller: Controller::new(config.debounce),
            clock,
            config,
            mode,
            focus: Focus::Sidebar,
            sidebar_cursor: 0,
            card_focus: None,
            prefer_graph: false,
            scene: None,
            last_frame: now,
            modal: None,
            copied: None,
            press: None,
            regions: Cell::new(Regions::default()),
            hits: RefCell::new(HitGrid::new(0, 0)),
            drawn_aggregate: Cell::new(None),
        }
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub fn sidebar_cursor(&self) -> usize {
        self.sidebar_cursor
    }

    #[must_use]
    pub fn card_focus(&self) -> Option<usize> {
        self.card_focus
    }

    #[must_use]
    pub fn modal(&self) -> Option<&ModalState> {
        self.modal.as_ref()
    }

    /// Card index whose copy acknowledgment is showing.
    #[must_use]
    pub fn copied(&self) -> Option<usize> {
        self.copied.map(|(i, _)| i)
    }

    #[must_use]
    pub fn scene(&self) -> Option<&GraphScene> {
        self.scene.as_ref()
    }

    #[must_use]
    pub fn prefers_graph(&self) -> bool {
        self.prefer_graph
    }

    /// Aggregate renderer used by the last frame, if it showed the overview.
    #[must_use]
    pub fn drawn_aggregate(&self) -> Option<AggregateKind> {
        self.drawn_aggregate.get()
    }

    #[must_use]
    pub fn regions(&self) -> Regions {
        self.regions.get()
    }

    /// Screen cell of `target` in the last frame.
    #[must_use]
    pub fn locate(&self, target: HitTarget) -> Option<(u16, u16)> {
        self.hits.borrow().locate(target)
    }

    fn graph_visible(&self) -> bool {
        self.mode == ViewMode::Aggregate && self.prefer_graph && self.scene.is_some()
    }

    fn animating(&self) -> bool {
        self.graph_visible() && self.scene.as_ref().is_some_and(GraphScene::is_animating)
    }

    // ── Updates ──────────────────────────────────────────────────────────

    fn on_loaded(&mut self, result: Result<Dataset, LoadError>) {
        let _span = info_span!("load_complete").entered();
        self.controller.finish_load(result);
        let Some(ds) = self.controller.dataset() else {
            return;
        };
        info!(
            bookmarks = ds.total_bookmarks,
            categories = ds.clusters.len(),
            "dataset ready"
        );
        let kind = select_aggregate_renderer(&self.config.caps, ds);
        self.prefer_graph = kind == AggregateKind::Graph;
        if self.prefer_graph {
            self.scene = Some(GraphScene::new(ds, Canvas::default()));
        }
        self.last_frame = self.clock.now();
    }

    fn on_tick(&mut self) {
        let now = self.clock.now();
        if self.controller.tick_at(now) {
            debug!(term = %self.controller.state().search_term, "search committed");
            self.list_changed();
        }
        if self.animating() && now.duration_since(self.last_frame) >= ANIMATION_INTERVAL {
            if let Some(scene) = self.scene.as_mut() {
                scene.step(TICKS_PER_FRAME);
            }
            self.last_frame = now;
        }
        if let Some((_, at)) = self.copied
            && now.duration_since(at) >= COPY_ACK
        {
            self.copied = None;
        }
    }

    // The visible list was rederived; index-based state no longer applies.
    fn list_changed(&mut self) {
        self.card_focus = None;
        self.copied = None;
    }

    fn select(&mut self, selection: CategorySelection) {
        let Some(ds) = self.controller.dataset() else {
            return;
        };
        self.sidebar_cursor = match &selection {
            CategorySelection::All => 0,
            CategorySelection::Named(name) => ds
                .clusters
                .iter()
                .position(|c| &c.name == name)
                .map_or(self.sidebar_cursor, |i| i + 1),
        };
        self.controller.select_category(selection);
        self.list_changed();
        self.mode = ViewMode::Cards;
    }

    fn select_cursor(&mut self) {
        let Some(selection) = self
            .controller
            .dataset()
            .and_then(|ds| Sidebar::selection_for(ds, self.sidebar_cursor))
        else {
            return;
        };
        self.select(selection);
    }

    fn move_cursor(&mut self, delta: isize) {
        let Some(ds) = self.controller.dataset() else {
            return;
        };
        let last = Sidebar::rows(ds).saturating_sub(1);
        self.sidebar_cursor = self.sidebar_cursor.saturating_add_signed(delta).min(last);
    }

    /// Category the keyboard points at: the sidebar cursor, else the focused
    /// card's category, else the selected one.
    fn highlighted_category(&self) -> Option<String> {
        let ds = self.controller.dataset()?;
        if self.sidebar_cursor > 0 {
            return ds.clusters.get(self.sidebar_cursor - 1).map(|c| c.name.clone());
        }
        if let Some(i) = self.card_focus
            && let Some(record) = self.controller.filtered_records().get(i)
        {
            return Some(record.cluster.clone());
        }
        self.controller.state().selected.name().map(str::to_string)
    }

    fn open_modal(&mut self, category: String) {
        if self.controller.category_detail(&category).is_none() {
            return;
        }
        debug!(category = %category, "detail opened");
        self.modal = Some(ModalState {
            category,
            scroll: 0,
        });
    }

    fn scroll_modal(&mut self, delta: isize) {
        let area = self.regions.get().screen;
        let Some(modal) = self.modal.as_ref() else {
            return;
        };
        let max = self
            .controller
            .category_detail(&modal.category)
            .map_or(0, |detail| DetailModal::new(detail).max_scroll(area));
        if let Some(modal) = self.modal.as_mut() {
            modal.scroll = modal.scroll.saturating_add_signed(delta).min(max);
        }
    }

    fn copy_card(&mut self, index: usize) -> Cmd<Msg> {
        let Some(url) = self
            .controller
            .filtered_records()
            .get(index)
            .map(|r| r.url.clone())
        else {
            return Cmd::none();
        };
        debug!(index, "copy requested");
        self.copied = Some((index, self.clock.now()));
        Cmd::copy(url)
    }

    fn move_card_focus(&mut self, delta: isize) {
        let count = self.controller.filtered().len();
        if count == 0 {
            return;
        }
        let next = match self.card_focus {
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(count - 1),
        };
        self.card_focus = Some(next);
        self.focus = Focus::Content;
    }

    fn card_row_step(&self) -> isize {
        CardGrid::columns(self.regions.get().content) as isize
    }

    fn zoom(&mut self, factor: f64) {
        if let Some(scene) = self.scene.as_mut() {
            scene.viewport_mut().zoom_by(factor);
        }
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        if let Some(scene) = self.scene.as_mut() {
            let scale = scene.viewport().scale();
            scene.viewport_mut().pan_by(dx * PAN_STEP / scale, dy * PAN_STEP / scale);
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Cards => ViewMode::Aggregate,
            ViewMode::Aggregate => ViewMode::Cards,
        };
        self.last_frame = self.clock.now();
    }

    fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.ctrl() && key.is_char('c') {
            return Cmd::quit();
        }
        if !self.controller.is_ready() {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Escape => Cmd::quit(),
                _ => Cmd::none(),
            };
        }
        if self.modal.is_some() {
            return self.on_modal_key(key);
        }
        if self.focus == Focus::Search {
            return self.on_search_key(key);
        }

        let graph = self.graph_visible();
        match key.code {
            KeyCode::Char('q') => return Cmd::quit(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_mode(),
            KeyCode::Char('g') => {
                if self.scene.is_some() {
                    self.prefer_graph = !self.prefer_graph;
                    self.last_frame = self.clock.now();
                } else {
                    debug!("graph unavailable; staying on bars");
                }
            }
            KeyCode::Down if graph => self.pan(0.0, 1.0),
            KeyCode::Up if graph => self.pan(0.0, -1.0),
            KeyCode::Left if graph => self.pan(-1.0, 0.0),
            KeyCode::Right if graph => self.pan(1.0, 0.0),
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_cursor(1);
                self.focus = Focus::Sidebar;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_cursor(-1);
                self.focus = Focus::Sidebar;
            }
            KeyCode::Home => self.sidebar_cursor = 0,
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter => self.select_cursor(),
            KeyCode::Char('h') | KeyCode::Left if self.mode == ViewMode::Cards => {
                self.move_card_focus(-1);
            }
            KeyCode::Char('l') | KeyCode::Right if self.mode == ViewMode::Cards => {
                self.move_card_focus(1);
            }
            KeyCode::PageDown if self.mode == ViewMode::Cards => {
                self.move_card_focus(self.card_row_step());
            }
            KeyCode::PageUp if self.mode == ViewMode::Cards => {
                self.move_card_focus(-self.card_row_step());
            }
            KeyCode::Char('i') => {
                if let Some(category) = self.highlighted_category() {
                    self.open_modal(category);
                }
            }
            KeyCode::Char('y') => return self.copy_card(self.card_focus.unwrap_or(0)),
            KeyCode::Char('+' | '=') => self.zoom(ZOOM_STEP),
            KeyCode::Char('-') => self.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('0') => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.viewport_mut().reset();
                }
            }
            KeyCode::Escape => {
                self.card_focus = None;
                self.focus = Focus::Sidebar;
            }
            _ => {}
        }
        Cmd::none()
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        let now = self.clock.now();
        match key.code {
            KeyCode::Escape | KeyCode::Enter => self.focus = Focus::Sidebar,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = Focus::Sidebar;
                self.toggle_mode();
            }
            KeyCode::Backspace => {
                let mut text = self.controller.input().to_string();
                if text.pop().is_some() {
                    self.controller.search_input_at(text, now);
                }
            }
            KeyCode::Char(c) if !key.ctrl() => {
                let mut text = self.controller.input().to_string();
                text.push(c);
                self.controller.search_input_at(text, now);
            }
            _ => {}
        }
        Cmd::none()
    }

    fn on_modal_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        match key.code {
            KeyCode::Char('q') => return Cmd::quit(),
            KeyCode::Escape | KeyCode::Char('x') => self.modal = None,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_modal(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_modal(-1),
            KeyCode::PageDown => self.scroll_modal(5),
            KeyCode::PageUp => self.scroll_modal(-5),
            KeyCode::Char('f') | KeyCode::Enter => {
                if let Some(modal) = self.modal.take() {
                    self.select(CategorySelection::Named(modal.category));
                }
            }
            _ => {}
        }
        Cmd::none()
    }

    fn on_mouse(&mut self, mouse: MouseEvent) -> Cmd<Msg> {
        if !self.controller.is_ready() {
            return Cmd::none();
        }
        let target = self.hits.borrow().hit_test(mouse.x, mouse.y);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => return self.on_click(target),
            MouseEventKind::Down(MouseButton::Right) => {
                if self.modal.is_none()
                    && let Some(HitTarget::Category(i) | HitTarget::CategoryInfo(i)) = target
                {
                    self.open_category_modal(i);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let content = self.regions.get().content;
                if let Some(press) = self.press.as_mut()
                    && let Some(scene) = self.scene.as_mut()
                    && scene.drag_to_cell(content, mouse.x, mouse.y)
                {
                    press.moved = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => return self.on_release(),
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let delta = if mouse.kind == MouseEventKind::ScrollDown {
                    1
                } else {
                    -1
                };
                if self.modal.is_some() {
                    self.scroll_modal(delta);
                } else if self.graph_visible()
                    && self.regions.get().content.contains(mouse.x, mouse.y)
                {
                    let factor = if delta < 0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                    self.zoom(factor);
                } else if self.mode == ViewMode::Cards {
                    self.move_card_focus(delta * self.card_row_step());
                }
            }
            _ => {}
        }
        Cmd::none()
    }

    fn on_click(&mut self, target: Option<HitTarget>) -> Cmd<Msg> {
        if self.modal.is_some() {
            if target != Some(HitTarget::Modal) {
                self.modal = None;
            }
            return Cmd::none();
        }
        if self.focus == Focus::Search && target != Some(HitTarget::SearchBox) {
            self.focus = Focus::Sidebar;
        }
        match target {
            Some(HitTarget::AllCategories) => self.select(CategorySelection::All),
            Some(HitTarget::Category(i)) => {
                if let Some(name) = self.category_name(i) {
                    self.select(CategorySelection::Named(name));
                }
            }
            Some(HitTarget::CategoryInfo(i)) => self.open_category_modal(i),
            Some(HitTarget::Card(i)) => {
                self.card_focus = Some(i);
                self.focus = Focus::Content;
            }
            Some(HitTarget::Copy(i)) => return self.copy_card(i),
            Some(HitTarget::SearchBox) => self.focus = Focus::Search,
            Some(HitTarget::GraphNode(node)) => {
                if let Some(scene) = self.scene.as_mut()
                    && scene.begin_drag(node)
                {
                    self.press = Some(Press { node, moved: false });
                }
            }
            Some(HitTarget::Modal | HitTarget::ModalClose) | None => {}
        }
        Cmd::none()
    }

    // A press without movement is a click on the node: hubs select their
    // category, samples copy their URL.
    fn on_release(&mut self) -> Cmd<Msg> {
        let Some(press) = self.press.take() else {
            return Cmd::none();
        };
        let Some(scene) = self.scene.as_mut() else {
            return Cmd::none();
        };
        scene.end_drag();
        if press.moved {
            return Cmd::none();
        }
        let node = scene.simulation().graph().nodes().get(press.node).cloned();
        match node.map(|n| (n.kind, n.id)) {
            Some((NodeKind::Category { .. }, name)) => {
                self.select(CategorySelection::Named(name));
                Cmd::none()
            }
            Some((NodeKind::Sample { url, .. }, _)) => {
                debug!(url = %url, "sample node clicked");
                Cmd::copy(url)
            }
            None => Cmd::none(),
        }
    }

    fn category_name(&self, index: usize) -> Option<String> {
        self.controller
            .dataset()?
            .clusters
            .get(index)
            .map(|c| c.name.clone())
    }

    fn open_category_modal(&mut self, index: usize) {
        if let Some(name) = self.category_name(index) {
            self.open_modal(name);
        }
    }

    // ── Drawing ──────────────────────────────────────────────────────────

    fn hints(&self) -> &'static str {
        if self.modal.is_some() {
            "Esc close · j/k scroll · f filter"
        } else if self.focus == Focus::Search {
            "type to filter · Enter/Esc done"
        } else if self.mode == ViewMode::Cards {
            "/ search · Tab overview · y copy · i detail · q quit"
        } else {
            "/ search · Tab cards · g graph/bars · i detail · q quit"
        }
    }

    fn draw_title(&self, ds: &Dataset, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let style = Style::new().bg(theme::ACCENT).fg(theme::BAR_EMPTY);
        buf.fill(area, style);
        let x = buf.print(area.x, area.y, " 🔖 marklens ", style.bold());
        buf.print(
            x,
            area.y,
            &format!(" {} bookmarks · {} categories", ds.total_bookmarks, ds.clusters.len()),
            style,
        );
        let label = match (self.mode, self.drawn_aggregate.get()) {
            (ViewMode::Cards, _) => " Cards ",
            (ViewMode::Aggregate, Some(AggregateKind::Graph)) => " Overview: graph ",
            (ViewMode::Aggregate, _) => " Overview: bars ",
        };
        let lw = marklens_render::text::display_width(label) as u16;
        if lw < area.width {
            buf.print(area.right() - lw, area.y, label, style.bold());
        }
    }

    fn draw_ready(&self, ds: &Dataset, regions: Regions, buf: &mut Buffer, hits: &mut HitGrid) {
        let highlighted = self.sidebar_cursor.checked_sub(1);

        let sidebar = Sidebar {
            selected: &self.controller.state().selected,
            cursor: self.sidebar_cursor,
            focused: self.focus == Focus::Sidebar,
        };
        sidebar.render(ds, regions.sidebar, buf, hits);

        SearchBar {
            input: self.controller.input(),
            focused: self.focus == Focus::Search,
            pending: self.controller.pending_search().is_some(),
        }
        .render(regions.search, buf, hits);

        match self.mode {
            ViewMode::Cards => {
                self.drawn_aggregate.set(None);
                let grid = CardGrid {
                    focused: self.card_focus,
                    copied: self.copied(),
                    hyperlinks: self.config.caps.hyperlinks,
                };
                grid.render_cards(&self.controller.filtered_records(), regions.content, buf, hits);
            }
            ViewMode::Aggregate => {
                let preferred = if self.prefer_graph {
                    AggregateKind::Graph
                } else {
                    AggregateKind::Bars
                };
                let graph = GraphView::new(self.scene.as_ref()).with_highlight(highlighted);
                let bars = BarGrid { highlighted };
                let used = render_aggregate(preferred, &graph, &bars, ds, regions.content, buf, hits);
                self.drawn_aggregate.set(Some(used));
            }
        }

        // After the content so the label reflects this frame's renderer.
        self.draw_title(ds, regions.title, buf);
        render_status(regions.status, buf, &self.controller.status_line(), self.hints());

        if let Some(modal) = &self.modal
            && let Some(detail) = self.controller.category_detail(&modal.category)
        {
            let mut overlay = DetailModal::new(detail);
            overlay.scroll = modal.scroll;
            overlay.hyperlinks = self.config.caps.hyperlinks;
            overlay.render(regions.screen, buf, hits);
        }
    }
}

impl Model for App {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        let path = self.config.data_path.clone();
        info!(path = %path.display(), "loading dataset");
        Cmd::task(move || Msg::Loaded(load_from_path(&path)))
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Loaded(result) => {
                self.on_loaded(result);
                Cmd::none()
            }
            Msg::Event(Event::Key(key)) => self.on_key(key),
            Msg::Event(Event::Mouse(mouse)) => self.on_mouse(mouse),
            Msg::Event(Event::Tick) => {
                self.on_tick();
                Cmd::none()
            }
            Msg::Event(Event::Resize { .. }) => Cmd::none(),
        }
    }

    fn view(&self, buf: &mut Buffer) {
        let area = buf.area();
        let regions = Regions::for_area(area);
        self.regions.set(regions);
        let mut hits = HitGrid::new(area.width, area.height);

        match self.controller.load_state() {
            LoadState::Pending => render_message(area, buf, LOADING_TEXT),
            LoadState::Failed(err) => render_error(area, buf, &err.user_message()),
            LoadState::Ready(ds) => self.draw_ready(ds, regions, buf, &mut hits),
        }

        *self.hits.borrow_mut() = hits;
    }

    fn next_tick(&self) -> Option<Duration> {
        let now = self.clock.now();
        let mut next = self.controller.time_until_commit(now);
        let mut consider = |d: Duration| {
            next = Some(next.map_or(d, |n| n.min(d)));
        };
        if self.animating() {
            consider((self.last_frame + ANIMATION_INTERVAL).saturating_duration_since(now));
        }
        if let Some((_, at)) = self.copied {
            consider((at + COPY_ACK).saturating_duration_since(now));
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_partition_the_screen() {
        let r = Regions::for_area(Rect::from_size(120, 40));
        assert_eq!(r.title, Rect::new(0, 0, 120, 1));
        assert_eq!(r.status, Rect::new(0, 39, 120, 1));
        assert_eq!(r.sidebar, Rect::new(0, 1, SIDEBAR_WIDTH, 38));
        assert_eq!(r.search.y, 1);
        assert_eq!(r.content.y, 2);
        assert_eq!(r.content.x, SIDEBAR_WIDTH);
        assert_eq!(r.content.right(), 120);
    }

    #[test]
    fn narrow_screen_shrinks_sidebar() {
        let r = Regions::for_area(Rect::from_size(45, 10));
        assert_eq!(r.sidebar.width, 15);
    }

    #[test]
    fn manual_clock_is_shared() {
        let start = Instant::now();
        let clock = Clock::manual(start);
        let handle = clock.clone();
        handle.advance(Duration::from_millis(300));
        assert_eq!(clock.now(), start + Duration::from_millis(300));
    }

    #[test]
    fn pending_app_waits_and_quits() {
        let config = AppConfig {
            data_path: PathBuf::from("unused.json"),
            start_view: StartView::Cards,
            caps: Capabilities::default(),
            debounce: Duration::from_millis(300),
        };
        let mut app = App::new(config, Clock::manual(Instant::now()));
        assert_eq!(app.next_tick(), None);
        let mut buf = Buffer::new(40, 5);
        app.view(&mut buf);
        assert!(buf.to_text().contains(LOADING_TEXT));
        assert!(matches!(app.update(Msg::from(Event::from('q'))), Cmd::Quit));
    }
}
