//! The canvas store: document, history, editor UI state and asset list, with
//! the action surface that is the only way to change them.

use crate::error::{CanvasError, Result};
use crate::history::{HistoryManager, DEFAULT_HISTORY_CAPACITY};
use crate::model::{
    Book, BookPatch, Books, Element, ElementPatch, ElementUpdate, Page, PagePatch,
};
use crate::session::Session;
use crate::state::{
    replace_books, replace_elements, replace_pages, Alignment, Applied, Axis, Document,
    PageBounds, Pointers,
};
use crate::subscriptions::{
    CanvasEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{
    AssetId, BookId, ElementId, InteractionState, Mode, PageId, Point, Selection, UiState,
    UploadedImage,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Canvas configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Frames kept on each of the undo and redo stacks.
    pub history_capacity: usize,

    /// Lower bound for `set_zoom`.
    pub min_zoom: f64,

    /// Upper bound for `set_zoom`.
    pub max_zoom: f64,

    /// Zoom a new canvas starts at.
    pub default_zoom: f64,

    /// Shift applied by `duplicate_element` when the caller gives none.
    pub duplicate_offset: Point,

    /// Page size and padding used by align and distribute.
    pub page: PageBounds,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_zoom: 0.25,
            max_zoom: 3.0,
            default_zoom: 1.0,
            duplicate_offset: Point::new(24.0, 24.0),
            page: PageBounds::default(),
        }
    }
}

struct CanvasState {
    document: Document,
    history: HistoryManager,
    ui: UiState,
    interaction: InteractionState,
    project_name: String,
    uploaded_images: Vec<UploadedImage>,
}

/// The canvas store.
///
/// Every method takes `&self`. Actions are serialised by a write lock and run
/// to completion before the next one starts. Transformation closures passed
/// to actions may read from the canvas but must not call other actions.
///
/// Tracked actions (books, pages, elements) record the previous book
/// collection for undo. Selection, active pointers, UI state and the asset
/// list are not tracked.
pub struct Canvas {
    config: CanvasConfig,

    state: RwLock<CanvasState>,

    subscriptions: SubscriptionManager,

    /// Lock for write operations to ensure atomicity.
    write_lock: Mutex<()>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    /// An empty canvas: no books, empty history, default UI.
    pub fn new(config: CanvasConfig) -> Self {
        let ui = UiState {
            zoom: config.default_zoom,
            ..UiState::default()
        };
        Self {
            state: RwLock::new(CanvasState {
                document: Document::new(),
                history: HistoryManager::new(config.history_capacity),
                ui,
                interaction: InteractionState::default(),
                project_name: String::new(),
                uploaded_images: Vec::new(),
            }),
            config,
            subscriptions: SubscriptionManager::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// A canvas opened on an existing collection.
    pub fn with_books(config: CanvasConfig, books: Books) -> Result<Self> {
        let canvas = Self::new(config);
        canvas.state.write().document = Document::from_books(books)?;
        Ok(canvas)
    }

    /// Reopen a saved session. Ids are re-validated and the saved pointers
    /// are re-resolved against the saved books.
    pub fn from_session(config: CanvasConfig, session: Session) -> Result<Self> {
        let mut document = Document::from_books(session.books)?;
        if let Some(book_id) = session.active_book_id {
            document.set_active_book(book_id);
            if let Some(page_id) = session.active_page_id {
                document.set_active_page(book_id, page_id);
            }
        }

        let canvas = Self::new(config);
        {
            let mut state = canvas.state.write();
            state.document = document;
            state.ui = session.ui;
            state.project_name = session.project_name;
            state.uploaded_images = session.uploaded_images;
        }
        Ok(canvas)
    }

    /// Capture the persistable part of the canvas.
    pub fn export_session(&self) -> Session {
        let state = self.state.read();
        Session {
            project_name: state.project_name.clone(),
            books: state.document.books().clone(),
            active_book_id: state.document.active_book_id(),
            active_page_id: state.document.active_page_id(),
            ui: state.ui.clone(),
            uploaded_images: state.uploaded_images.clone(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    // --- Commit Plumbing ---

    /// Run a tracked mutation against a copy of the document and commit it.
    ///
    /// On error nothing is committed and nothing is recorded.
    fn commit<T, F>(&self, label: &str, mutate: F) -> Result<Vec<Arc<T>>>
    where
        F: FnOnce(&mut Document) -> Result<Applied<T>>,
    {
        let _lock = self.write_lock.lock();

        let mut document = self.state.read().document.clone();
        let before = document.pointers();

        let applied = match mutate(&mut document) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(label, error = %e, "Action rejected");
                return Err(e);
            }
        };

        let after = document.pointers();
        let (can_undo, can_redo) = {
            let mut state = self.state.write();
            state.history.record(label, applied.previous);
            state.document = document;
            (state.history.can_undo(), state.history.can_redo())
        };

        tracing::debug!(label, "Action committed");

        let mut events = vec![CanvasEvent::BooksChanged {
            label: label.to_string(),
        }];
        pointer_events(before, after, &mut events);
        events.push(CanvasEvent::HistoryChanged { can_undo, can_redo });
        self.subscriptions.broadcast(&events);

        Ok(applied.slice)
    }

    /// Run an untracked change to pointers or selection.
    fn update_pointers<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        let _lock = self.write_lock.lock();

        let (result, before, after) = {
            let mut state = self.state.write();
            let before = state.document.pointers();
            let result = f(&mut state.document);
            (result, before, state.document.pointers())
        };

        let mut events = Vec::new();
        pointer_events(before, after, &mut events);
        self.subscriptions.broadcast(&events);
        result
    }

    /// Run an untracked change to UI or interaction state.
    fn update_ui<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut UiState, &mut InteractionState) -> R,
    {
        let result = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            f(&mut state.ui, &mut state.interaction)
        };
        self.subscriptions.broadcast(&[CanvasEvent::UiChanged]);
        result
    }

    fn time_travel(&self, label: &str, forward: bool) -> bool {
        let _lock = self.write_lock.lock();

        let (before, after, can_undo, can_redo) = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let before = state.document.pointers();
            let current = state.document.books().clone();

            let frame = if forward {
                state.history.redo(current)
            } else {
                state.history.undo(current)
            };
            let Some(frame) = frame else {
                tracing::debug!(label, "Nothing to {}", label.to_lowercase());
                return false;
            };

            state.document.restore(frame);
            (
                before,
                state.document.pointers(),
                state.history.can_undo(),
                state.history.can_redo(),
            )
        };

        let mut events = vec![CanvasEvent::BooksChanged {
            label: label.to_string(),
        }];
        pointer_events(before, after, &mut events);
        events.push(CanvasEvent::HistoryChanged { can_undo, can_redo });
        self.subscriptions.broadcast(&events);
        true
    }

    // --- Book Operations ---

    /// Append a book (a fresh empty one if `None`). Becomes active if there
    /// was no active book.
    pub fn add_book(&self, book: Option<Book>) -> Result<Books> {
        let book = book.unwrap_or_default();
        self.commit("Add book", move |doc| {
            replace_books(doc, move |mut books| {
                books.push(Arc::new(book));
                Ok(books)
            })
        })
    }

    pub fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<Books> {
        self.commit("Update book", move |doc| {
            replace_books(doc, move |mut books| {
                let book = books
                    .iter_mut()
                    .find(|b| b.id == book_id)
                    .ok_or(CanvasError::BookNotFound(book_id))?;
                patch.apply(Arc::make_mut(book));
                Ok(books)
            })
        })
    }

    /// Remove a book and everything in it.
    pub fn remove_book(&self, book_id: BookId) -> Result<Books> {
        self.commit("Remove book", move |doc| {
            replace_books(doc, move |books| {
                let before = books.len();
                let books: Books = books.into_iter().filter(|b| b.id != book_id).collect();
                if books.len() == before {
                    return Err(CanvasError::BookNotFound(book_id));
                }
                Ok(books)
            })
        })
    }

    // --- Page Operations ---

    /// Append a page (a fresh blank one if `None`) to `book_id`.
    pub fn add_page(&self, book_id: BookId, page: Option<Page>) -> Result<Vec<Arc<Page>>> {
        let page = page.unwrap_or_default();
        self.commit("Add page", move |doc| {
            replace_pages(doc, book_id, move |mut pages| {
                pages.push(Arc::new(page));
                Ok(pages)
            })
        })
    }

    pub fn update_page(
        &self,
        book_id: BookId,
        page_id: PageId,
        patch: PagePatch,
    ) -> Result<Vec<Arc<Page>>> {
        self.edit_page("Update page", book_id, page_id, move |page| patch.apply(page))
    }

    /// Remove a page and its elements.
    pub fn remove_page(&self, book_id: BookId, page_id: PageId) -> Result<Vec<Arc<Page>>> {
        self.commit("Remove page", move |doc| {
            replace_pages(doc, book_id, move |pages| {
                let before = pages.len();
                let pages: Vec<_> = pages.into_iter().filter(|p| p.id != page_id).collect();
                if pages.len() == before {
                    return Err(CanvasError::PageNotFound {
                        book: book_id,
                        page: page_id,
                    });
                }
                Ok(pages)
            })
        })
    }

    pub fn set_background_color(
        &self,
        book_id: BookId,
        page_id: PageId,
        color: impl Into<String>,
    ) -> Result<Vec<Arc<Page>>> {
        let color = color.into();
        self.edit_page("Set background color", book_id, page_id, move |page| {
            page.background.color = Some(color);
        })
    }

    pub fn set_background_image(
        &self,
        book_id: BookId,
        page_id: PageId,
        url: impl Into<String>,
    ) -> Result<Vec<Arc<Page>>> {
        let url = url.into();
        self.edit_page("Set background image", book_id, page_id, move |page| {
            page.background.url = Some(url);
        })
    }

    fn edit_page<F>(
        &self,
        label: &str,
        book_id: BookId,
        page_id: PageId,
        edit: F,
    ) -> Result<Vec<Arc<Page>>>
    where
        F: FnOnce(&mut Page),
    {
        self.commit(label, move |doc| {
            replace_pages(doc, book_id, move |mut pages| {
                let page = pages
                    .iter_mut()
                    .find(|p| p.id == page_id)
                    .ok_or(CanvasError::PageNotFound {
                        book: book_id,
                        page: page_id,
                    })?;
                edit(Arc::make_mut(page));
                Ok(pages)
            })
        })
    }

    // --- Element Operations ---

    pub fn add_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element: Element,
    ) -> Result<Vec<Arc<Element>>> {
        self.commit("Add element", move |doc| {
            replace_elements(doc, book_id, page_id, move |mut elements| {
                elements.push(Arc::new(element));
                Ok(elements)
            })
        })
    }

    /// Shallow-merge an update into an element. Accepts a literal
    /// [`ElementPatch`] or an [`ElementUpdate::With`] computed from the
    /// element's current value.
    pub fn update_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
        update: impl Into<ElementUpdate>,
    ) -> Result<Vec<Arc<Element>>> {
        self.patch_element("Update element", book_id, page_id, element_id, update.into())
    }

    pub fn remove_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Result<Vec<Arc<Element>>> {
        self.commit("Remove element", move |doc| {
            replace_elements(doc, book_id, page_id, move |elements| {
                let before = elements.len();
                let elements: Vec<_> =
                    elements.into_iter().filter(|e| e.id != element_id).collect();
                if elements.len() == before {
                    return Err(CanvasError::ElementNotFound {
                        page: page_id,
                        element: element_id,
                    });
                }
                Ok(elements)
            })
        })
    }

    /// Append a copy of an element with a fresh id, shifted by `offset`
    /// (the configured default when `None`).
    pub fn duplicate_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
        offset: Option<Point>,
    ) -> Result<Vec<Arc<Element>>> {
        let offset = offset.unwrap_or(self.config.duplicate_offset);
        self.commit("Duplicate element", move |doc| {
            replace_elements(doc, book_id, page_id, move |mut elements| {
                let source = elements
                    .iter()
                    .find(|e| e.id == element_id)
                    .ok_or(CanvasError::ElementNotFound {
                        page: page_id,
                        element: element_id,
                    })?;

                let mut copy = Element::clone(source).with_id(ElementId::new());
                copy.geometry.x += offset.x;
                copy.geometry.y += offset.y;

                elements.push(Arc::new(copy));
                Ok(elements)
            })
        })
    }

    pub fn toggle_element_visibility(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Result<Vec<Arc<Element>>> {
        let update = ElementUpdate::with(|el| ElementPatch::new().visible(!el.visible));
        self.patch_element("Toggle visibility", book_id, page_id, element_id, update)
    }

    pub fn toggle_element_lock(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Result<Vec<Arc<Element>>> {
        let update = ElementUpdate::with(|el| ElementPatch::new().locked(!el.locked));
        self.patch_element("Toggle lock", book_id, page_id, element_id, update)
    }

    pub fn rename_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
        name: impl Into<String>,
    ) -> Result<Vec<Arc<Element>>> {
        let update: ElementUpdate = ElementPatch::new().name(name).into();
        self.patch_element("Rename element", book_id, page_id, element_id, update)
    }

    /// Raise an element one step in the stacking order.
    pub fn bring_forward(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Result<Vec<Arc<Element>>> {
        let update = ElementUpdate::with(|el| {
            ElementPatch::new().z_index(el.geometry.z_index.saturating_add(1))
        });
        self.patch_element("Bring forward", book_id, page_id, element_id, update)
    }

    /// Lower an element one step in the stacking order.
    pub fn send_backward(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Result<Vec<Arc<Element>>> {
        let update = ElementUpdate::with(|el| {
            ElementPatch::new().z_index(el.geometry.z_index.saturating_sub(1))
        });
        self.patch_element("Send backward", book_id, page_id, element_id, update)
    }

    /// Snap an element to a page edge or center line.
    pub fn align_element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
        alignment: Alignment,
    ) -> Result<Vec<Arc<Element>>> {
        let bounds = self.config.page;
        let update = ElementUpdate::with(move |el| bounds.align(el, alignment));
        self.patch_element("Align element", book_id, page_id, element_id, update)
    }

    /// Spread the visible elements of a page evenly along `axis` as one
    /// undoable step. With fewer than two visible elements nothing changes
    /// and nothing is recorded.
    pub fn distribute_elements(
        &self,
        book_id: BookId,
        page_id: PageId,
        axis: Axis,
    ) -> Result<Vec<Arc<Element>>> {
        let current = self.page(book_id, page_id).ok_or_else(|| {
            match self.book(book_id) {
                Some(_) => CanvasError::PageNotFound {
                    book: book_id,
                    page: page_id,
                },
                None => CanvasError::BookNotFound(book_id),
            }
        })?;

        let bounds = self.config.page;
        if bounds.distribute(&current.elements, axis).is_empty() {
            return Ok(current.elements.clone());
        }

        self.commit("Distribute elements", move |doc| {
            replace_elements(doc, book_id, page_id, move |mut elements| {
                for (id, at) in bounds.distribute(&elements, axis) {
                    if let Some(el) = elements.iter_mut().find(|e| e.id == id) {
                        let el = Arc::make_mut(el);
                        match axis {
                            Axis::Horizontal => el.geometry.x = at,
                            Axis::Vertical => el.geometry.y = at,
                        }
                    }
                }
                Ok(elements)
            })
        })
    }

    fn patch_element(
        &self,
        label: &str,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
        update: ElementUpdate,
    ) -> Result<Vec<Arc<Element>>> {
        self.commit(label, move |doc| {
            replace_elements(doc, book_id, page_id, move |mut elements| {
                let element = elements
                    .iter_mut()
                    .find(|e| e.id == element_id)
                    .ok_or(CanvasError::ElementNotFound {
                        page: page_id,
                        element: element_id,
                    })?;
                let element = Arc::make_mut(element);
                update.resolve(element).apply(element);
                Ok(elements)
            })
        })
    }

    // --- History ---

    /// Step back to the previous frame. Clears selection and re-resolves the
    /// active book/page. Returns false when there is nothing to undo.
    pub fn undo(&self) -> bool {
        self.time_travel("Undo", false)
    }

    /// Step forward to the next frame. Returns false when there is nothing
    /// to redo.
    pub fn redo(&self) -> bool {
        self.time_travel("Redo", true)
    }

    /// A point-in-time copy of the history stacks. Frames are shared, not
    /// deep-copied.
    pub fn history(&self) -> HistoryManager {
        self.state.read().history.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.state.read().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.read().history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.state.read().history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.state.read().history.redo_count()
    }

    pub fn undo_label(&self) -> Option<String> {
        self.state.read().history.undo_label().map(str::to_string)
    }

    pub fn redo_label(&self) -> Option<String> {
        self.state.read().history.redo_label().map(str::to_string)
    }

    /// Past frames, oldest first.
    pub fn history_past(&self) -> Vec<Books> {
        self.state
            .read()
            .history
            .past()
            .map(|e| e.frame.clone())
            .collect()
    }

    /// Future frames, nearest first.
    pub fn history_future(&self) -> Vec<Books> {
        self.state
            .read()
            .history
            .future()
            .map(|e| e.frame.clone())
            .collect()
    }

    pub fn clear_history(&self) {
        let _lock = self.write_lock.lock();
        self.state.write().history.clear();
        self.subscriptions.broadcast(&[CanvasEvent::HistoryChanged {
            can_undo: false,
            can_redo: false,
        }]);
    }

    // --- Pointers & Selection ---

    /// Make a book active (the first book if `book_id` is unknown), with its
    /// first page. Clears selection.
    pub fn set_active_book(&self, book_id: BookId) -> Option<BookId> {
        self.update_pointers(|doc| doc.set_active_book(book_id))
    }

    /// Make a page active. Unknown ids fall back to the active or first book
    /// and that book's first page. Clears selection.
    pub fn set_active_page(&self, book_id: BookId, page_id: PageId) -> Option<PageId> {
        self.update_pointers(|doc| doc.set_active_page(book_id, page_id))
    }

    /// Select an element, or clear with `None`. A selection that does not
    /// name an element of the active book is rejected.
    pub fn set_selection(&self, selection: Option<Selection>) -> Result<()> {
        self.update_pointers(|doc| doc.set_selection(selection))
    }

    pub fn clear_selection(&self) {
        self.update_pointers(|doc| doc.selection = None);
    }

    // --- UI & Interaction ---

    pub fn set_mode(&self, mode: Mode) {
        self.update_ui(|ui, _| ui.mode = mode);
    }

    /// Set the zoom factor, clamped to the configured range. Non-finite
    /// values are ignored. Returns the zoom now in effect.
    pub fn set_zoom(&self, zoom: f64) -> f64 {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        self.update_ui(|ui, _| {
            if zoom.is_finite() {
                ui.zoom = zoom.clamp(min, max);
            }
            ui.zoom
        })
    }

    pub fn set_offset(&self, offset: Point) {
        self.update_ui(|ui, _| ui.offset = offset);
    }

    /// Returns the new grid visibility.
    pub fn toggle_grid(&self) -> bool {
        self.update_ui(|ui, _| {
            ui.show_grid = !ui.show_grid;
            ui.show_grid
        })
    }

    /// Returns the new ruler visibility.
    pub fn toggle_rulers(&self) -> bool {
        self.update_ui(|ui, _| {
            ui.show_rulers = !ui.show_rulers;
            ui.show_rulers
        })
    }

    pub fn set_panning(&self, is_panning: bool, pan_start: Option<Point>) {
        self.update_ui(|_, interaction| {
            interaction.is_panning = is_panning;
            interaction.pan_start = pan_start;
        });
    }

    pub fn set_space_pressed(&self, pressed: bool) {
        self.update_ui(|_, interaction| interaction.space_pressed = pressed);
    }

    pub fn set_project_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.write().project_name = name;
        self.subscriptions.broadcast(&[CanvasEvent::UiChanged]);
    }

    // --- Asset Library ---

    /// Add an image to the asset library. Returns `None` for an empty url.
    pub fn add_uploaded_image(&self, url: impl Into<String>) -> Option<UploadedImage> {
        let url = url.into();
        if url.is_empty() {
            return None;
        }

        let asset = UploadedImage {
            id: AssetId::new(),
            url,
        };
        self.state.write().uploaded_images.push(asset.clone());
        self.subscriptions.broadcast(&[CanvasEvent::AssetsChanged]);
        Some(asset)
    }

    /// Remove an image from the asset library. Elements already showing it
    /// keep their own copy of the url.
    pub fn remove_uploaded_image(&self, id: AssetId) -> Result<Vec<UploadedImage>> {
        let remaining = {
            let mut state = self.state.write();
            let before = state.uploaded_images.len();
            state.uploaded_images.retain(|a| a.id != id);
            if state.uploaded_images.len() == before {
                return Err(CanvasError::AssetNotFound(id));
            }
            state.uploaded_images.clone()
        };
        self.subscriptions.broadcast(&[CanvasEvent::AssetsChanged]);
        Ok(remaining)
    }

    // --- Reads ---

    pub fn books(&self) -> Books {
        self.state.read().document.books().clone()
    }

    /// A point-in-time copy of the document and its pointers.
    pub fn document(&self) -> Document {
        self.state.read().document.clone()
    }

    pub fn book(&self, book_id: BookId) -> Option<Arc<Book>> {
        self.state.read().document.book(book_id).cloned()
    }

    pub fn page(&self, book_id: BookId, page_id: PageId) -> Option<Arc<Page>> {
        self.state.read().document.page(book_id, page_id).cloned()
    }

    pub fn element(
        &self,
        book_id: BookId,
        page_id: PageId,
        element_id: ElementId,
    ) -> Option<Arc<Element>> {
        self.state
            .read()
            .document
            .element(book_id, page_id, element_id)
            .cloned()
    }

    pub fn active_book_id(&self) -> Option<BookId> {
        self.state.read().document.active_book_id()
    }

    pub fn active_page_id(&self) -> Option<PageId> {
        self.state.read().document.active_page_id()
    }

    pub fn active_book(&self) -> Option<Arc<Book>> {
        self.state.read().document.active_book().cloned()
    }

    pub fn active_page(&self) -> Option<Arc<Page>> {
        self.state.read().document.active_page().cloned()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.state.read().document.selection()
    }

    pub fn selected_element(&self) -> Option<Arc<Element>> {
        self.state.read().document.selected_element().cloned()
    }

    /// Elements of a page, top-most first.
    pub fn layers(&self, book_id: BookId, page_id: PageId) -> Vec<Arc<Element>> {
        self.page(book_id, page_id)
            .map(|p| p.layers())
            .unwrap_or_default()
    }

    pub fn ui(&self) -> UiState {
        self.state.read().ui.clone()
    }

    pub fn interaction(&self) -> InteractionState {
        self.state.read().interaction.clone()
    }

    pub fn project_name(&self) -> String {
        self.state.read().project_name.clone()
    }

    pub fn uploaded_images(&self) -> Vec<UploadedImage> {
        self.state.read().uploaded_images.clone()
    }

    // --- Subscriptions ---

    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }
}

/// Events describing how pointers moved between two states.
fn pointer_events(before: Pointers, after: Pointers, events: &mut Vec<CanvasEvent>) {
    if before.active_book_id != after.active_book_id
        || before.active_page_id != after.active_page_id
    {
        events.push(CanvasEvent::PointersChanged {
            active_book_id: after.active_book_id,
            active_page_id: after.active_page_id,
        });
    }
    if before.selection != after.selection {
        events.push(CanvasEvent::SelectionChanged {
            selection: after.selection,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::{SubscriptionFilter, Topic};

    struct Fixture {
        canvas: Canvas,
        book: BookId,
        page: PageId,
    }

    /// One book with one empty page, no history.
    fn fixture() -> Fixture {
        let book = Book::notebook("B1");
        let (book_id, page_id) = (book.id, book.pages[0].id);
        Fixture {
            canvas: Canvas::with_books(CanvasConfig::default(), vec![Arc::new(book)]).unwrap(),
            book: book_id,
            page: page_id,
        }
    }

    #[test]
    fn test_add_element_undo_redo() {
        let fx = fixture();
        fx.canvas
            .add_element(fx.book, fx.page, Element::text("hi"))
            .unwrap();
        assert_eq!(fx.canvas.books()[0].pages[0].elements.len(), 1);

        assert!(fx.canvas.undo());
        assert_eq!(fx.canvas.books()[0].pages[0].elements.len(), 0);

        assert!(fx.canvas.redo());
        let elements = &fx.canvas.books()[0].pages[0].elements;
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, "hi");
    }

    #[test]
    fn test_remove_only_book_clears_pointers() {
        let fx = fixture();
        let element = Element::text("x");
        let id = element.id;
        fx.canvas.add_element(fx.book, fx.page, element).unwrap();
        fx.canvas
            .set_selection(Some(Selection::new(fx.page, id)))
            .unwrap();

        fx.canvas.remove_book(fx.book).unwrap();

        assert_eq!(fx.canvas.active_book_id(), None);
        assert_eq!(fx.canvas.active_page_id(), None);
        assert_eq!(fx.canvas.selection(), None);
    }

    #[test]
    fn test_duplicate_element_offsets_and_renews_id() {
        let fx = fixture();
        let source = Element::text("x").at(100.0, 100.0);
        let source_id = source.id;
        fx.canvas.add_element(fx.book, fx.page, source).unwrap();

        let elements = fx
            .canvas
            .duplicate_element(fx.book, fx.page, source_id, Some(Point::new(10.0, 5.0)))
            .unwrap();

        assert_eq!(elements.len(), 2);
        let copy = &elements[1];
        assert_ne!(copy.id, source_id);
        assert_eq!(copy.geometry.x, 110.0);
        assert_eq!(copy.geometry.y, 105.0);
    }

    #[test]
    fn test_duplicate_uses_default_offset() {
        let fx = fixture();
        let source = Element::text("x").at(0.0, 0.0);
        let source_id = source.id;
        fx.canvas.add_element(fx.book, fx.page, source).unwrap();

        let elements = fx
            .canvas
            .duplicate_element(fx.book, fx.page, source_id, None)
            .unwrap();
        assert_eq!(elements[1].position(), Point::new(24.0, 24.0));
    }

    #[test]
    fn test_missing_element_is_error_and_not_recorded() {
        let fx = fixture();
        let result = fx.canvas.update_element(
            fx.book,
            fx.page,
            ElementId::new(),
            ElementPatch::new().x(1.0),
        );

        assert!(matches!(result, Err(CanvasError::ElementNotFound { .. })));
        assert!(!fx.canvas.can_undo());
    }

    #[test]
    fn test_computed_update() {
        let fx = fixture();
        let element = Element::text("x");
        let id = element.id;
        fx.canvas.add_element(fx.book, fx.page, element).unwrap();

        fx.canvas.bring_forward(fx.book, fx.page, id).unwrap();
        fx.canvas.bring_forward(fx.book, fx.page, id).unwrap();
        fx.canvas.send_backward(fx.book, fx.page, id).unwrap();

        let el = fx.canvas.element(fx.book, fx.page, id).unwrap();
        assert_eq!(el.geometry.z_index, 2);
        assert_eq!(fx.canvas.undo_label().as_deref(), Some("Send backward"));
    }

    #[test]
    fn test_stacking_order_saturates_at_bounds() {
        let fx = fixture();
        let top = Element::text("top");
        let bottom = Element::text("bottom");
        let (top_id, bottom_id) = (top.id, bottom.id);
        fx.canvas.add_element(fx.book, fx.page, top).unwrap();
        fx.canvas.add_element(fx.book, fx.page, bottom).unwrap();
        fx.canvas
            .update_element(fx.book, fx.page, top_id, ElementPatch::new().z_index(i32::MAX))
            .unwrap();
        fx.canvas
            .update_element(fx.book, fx.page, bottom_id, ElementPatch::new().z_index(i32::MIN))
            .unwrap();

        fx.canvas.bring_forward(fx.book, fx.page, top_id).unwrap();
        fx.canvas.send_backward(fx.book, fx.page, bottom_id).unwrap();

        let top = fx.canvas.element(fx.book, fx.page, top_id).unwrap();
        let bottom = fx.canvas.element(fx.book, fx.page, bottom_id).unwrap();
        assert_eq!(top.geometry.z_index, i32::MAX);
        assert_eq!(bottom.geometry.z_index, i32::MIN);
        assert_eq!(fx.canvas.layers(fx.book, fx.page)[0].id, top_id);
    }

    #[test]
    fn test_distribute_spaces_committed_elements() {
        let fx = fixture();
        let mut ids = Vec::new();
        for x in [400.0, 0.0, 200.0] {
            let el = Element::text("x").at(x, 0.0);
            ids.push(el.id);
            fx.canvas.add_element(fx.book, fx.page, el).unwrap();
        }
        fx.canvas
            .update_element(fx.book, fx.page, ids[2], ElementPatch::new().size(112.0, 10.0))
            .unwrap();
        for id in [ids[0], ids[1]] {
            fx.canvas
                .update_element(fx.book, fx.page, id, ElementPatch::new().size(100.0, 10.0))
                .unwrap();
        }

        let elements = fx
            .canvas
            .distribute_elements(fx.book, fx.page, Axis::Horizontal)
            .unwrap();

        let x_of = |id: ElementId| {
            elements
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.geometry.x)
                .unwrap()
        };
        // 512 usable, 312 taken, 100 per gap.
        assert_eq!(x_of(ids[1]), 24.0);
        assert_eq!(x_of(ids[2]), 224.0);
        assert_eq!(x_of(ids[0]), 436.0);
    }

    #[test]
    fn test_toggles() {
        let fx = fixture();
        let element = Element::text("x");
        let id = element.id;
        fx.canvas.add_element(fx.book, fx.page, element).unwrap();

        fx.canvas
            .toggle_element_visibility(fx.book, fx.page, id)
            .unwrap();
        fx.canvas.toggle_element_lock(fx.book, fx.page, id).unwrap();

        let el = fx.canvas.element(fx.book, fx.page, id).unwrap();
        assert!(!el.visible);
        assert!(el.locked);
    }

    #[test]
    fn test_background() {
        let fx = fixture();
        fx.canvas
            .set_background_color(fx.book, fx.page, "#fafafa")
            .unwrap();
        fx.canvas
            .set_background_image(fx.book, fx.page, "paper.png")
            .unwrap();

        let page = fx.canvas.page(fx.book, fx.page).unwrap();
        assert_eq!(page.background.color.as_deref(), Some("#fafafa"));
        assert_eq!(page.background.url.as_deref(), Some("paper.png"));
        assert_eq!(fx.canvas.undo_count(), 2);
    }

    #[test]
    fn test_zoom_is_clamped_and_untracked() {
        let fx = fixture();
        assert_eq!(fx.canvas.set_zoom(10.0), 3.0);
        assert_eq!(fx.canvas.set_zoom(0.1), 0.25);
        assert_eq!(fx.canvas.set_zoom(f64::NAN), 0.25);
        assert_eq!(fx.canvas.set_zoom(1.5), 1.5);
        assert!(!fx.canvas.can_undo());
    }

    #[test]
    fn test_ui_toggles() {
        let fx = fixture();
        assert!(!fx.canvas.toggle_grid());
        assert!(fx.canvas.toggle_rulers());
        fx.canvas.set_mode(Mode::from_name("bogus"));
        fx.canvas.set_offset(Point::new(5.0, -3.0));
        fx.canvas.set_panning(true, Some(Point::new(1.0, 2.0)));
        fx.canvas.set_space_pressed(true);

        let ui = fx.canvas.ui();
        assert!(!ui.show_grid);
        assert!(ui.show_rulers);
        assert_eq!(ui.mode, Mode::Edit);
        assert_eq!(ui.offset, Point::new(5.0, -3.0));
        let interaction = fx.canvas.interaction();
        assert!(interaction.is_panning);
        assert!(interaction.space_pressed);
        assert_eq!(interaction.pan_start, Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_assets_are_untracked() {
        let fx = fixture();
        assert!(fx.canvas.add_uploaded_image("").is_none());
        let asset = fx.canvas.add_uploaded_image("data:image/png;base64,AA").unwrap();
        assert_eq!(fx.canvas.uploaded_images().len(), 1);

        assert!(fx.canvas.remove_uploaded_image(asset.id).unwrap().is_empty());
        assert!(matches!(
            fx.canvas.remove_uploaded_image(asset.id),
            Err(CanvasError::AssetNotFound(_))
        ));
        assert!(!fx.canvas.can_undo());
    }

    #[test]
    fn test_add_book_to_empty_canvas_becomes_active() {
        let canvas = Canvas::default();
        let book = Book::notebook("first");
        let (book_id, page_id) = (book.id, book.pages[0].id);

        canvas.add_book(Some(book)).unwrap();
        assert_eq!(canvas.active_book_id(), Some(book_id));
        assert_eq!(canvas.active_page_id(), Some(page_id));

        canvas.add_book(None).unwrap();
        assert_eq!(canvas.active_book_id(), Some(book_id));
    }

    #[test]
    fn test_add_page_to_empty_active_book_becomes_active() {
        let canvas = Canvas::default();
        canvas.add_book(Some(Book::new("empty"))).unwrap();
        let book_id = canvas.active_book_id().unwrap();
        assert_eq!(canvas.active_page_id(), None);

        let pages = canvas.add_page(book_id, None).unwrap();
        assert_eq!(canvas.active_page_id(), Some(pages[0].id));
    }

    #[test]
    fn test_undo_keeps_active_page_when_it_survives() {
        let fx = fixture();
        let pages = fx.canvas.add_page(fx.book, Some(Page::new("2"))).unwrap();
        let second = pages[1].id;
        fx.canvas.set_active_page(fx.book, second);
        fx.canvas.update_book(fx.book, BookPatch::title("renamed")).unwrap();

        assert!(fx.canvas.undo());
        assert_eq!(fx.canvas.active_page_id(), Some(second));

        // Undoing the page addition drops the active page; fall back to the first.
        assert!(fx.canvas.undo());
        assert_eq!(fx.canvas.active_page_id(), Some(fx.page));
    }

    #[test]
    fn test_distribute_is_one_step() {
        let fx = fixture();
        for x in [300.0, 10.0, 200.0] {
            fx.canvas
                .add_element(fx.book, fx.page, Element::text("x").at(x, 0.0))
                .unwrap();
        }
        let recorded = fx.canvas.undo_count();

        fx.canvas
            .distribute_elements(fx.book, fx.page, Axis::Horizontal)
            .unwrap();
        assert_eq!(fx.canvas.undo_count(), recorded + 1);

        let layers = fx.canvas.page(fx.book, fx.page).unwrap();
        let mut xs: Vec<f64> = layers.elements.iter().map(|e| e.geometry.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs[0], 24.0);
    }

    #[test]
    fn test_distribute_single_element_is_noop() {
        let fx = fixture();
        fx.canvas
            .add_element(fx.book, fx.page, Element::text("x"))
            .unwrap();
        let recorded = fx.canvas.undo_count();

        fx.canvas
            .distribute_elements(fx.book, fx.page, Axis::Vertical)
            .unwrap();
        assert_eq!(fx.canvas.undo_count(), recorded);
    }

    #[test]
    fn test_events_emitted_on_commit() {
        let fx = fixture();
        let handle = fx.canvas.subscribe(SubscriptionConfig {
            filter: SubscriptionFilter::topics(vec![Topic::Books, Topic::History]),
            ..Default::default()
        });

        fx.canvas
            .add_element(fx.book, fx.page, Element::text("x"))
            .unwrap();
        fx.canvas.set_zoom(2.0);

        let events = handle.drain();
        assert_eq!(
            events,
            vec![
                CanvasEvent::BooksChanged {
                    label: "Add element".to_string()
                },
                CanvasEvent::HistoryChanged {
                    can_undo: true,
                    can_redo: false
                },
            ]
        );
    }

    #[test]
    fn test_session_round_trip() {
        let fx = fixture();
        fx.canvas.set_project_name("Viaje");
        fx.canvas
            .add_element(fx.book, fx.page, Element::text("x"))
            .unwrap();
        fx.canvas.set_zoom(2.0);

        let session = fx.canvas.export_session();
        let reopened = Canvas::from_session(CanvasConfig::default(), session).unwrap();

        assert_eq!(reopened.books(), fx.canvas.books());
        assert_eq!(reopened.project_name(), "Viaje");
        assert_eq!(reopened.ui().zoom, 2.0);
        assert_eq!(reopened.active_page_id(), Some(fx.page));
        assert!(!reopened.can_undo());
    }
}
