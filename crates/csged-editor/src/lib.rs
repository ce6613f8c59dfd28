#![warn(missing_docs)]

//! The csged application context.
//!
//! [`Editor`] owns the document, the snapshot history, the bounded
//! selection, and the playback mode flag: the explicit value replacing any
//! ambient global state. All mutation entry points run to completion on the
//! calling thread; the only valid ordering is mutate first, then snapshot,
//! and every snapshot call here is exactly that.
//!
//! Playback is cooperative: the host drives [`Editor::playback_tick`] on
//! its own timer, and while the mode flag says `Playing` every
//! edit-triggering entry point is rejected instead of racing the cursor.

use csged_command::{parse, ParsedCommand, ParseError};
use csged_eval::{CompositeMesh, MeshEvaluator};
use csged_ir::{wire, BoolOp, Document, DocumentError, Node, NodeId, Primitive, Transform};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod config;
pub mod history;
pub mod selection;

pub use config::{ConfigError, EditorConfig};
pub use history::HistoryStack;
pub use selection::{SelectionSet, MAX_SELECTED};

/// What the editor is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Accepting edits.
    Idle,
    /// Replaying history; edits are rejected until playback ends.
    Playing {
        /// The next history index a tick will restore.
        next: usize,
    },
}

/// Errors surfaced by editor operations. All of them are local and
/// recoverable: a failed operation leaves the document in its last-known
/// good state.
#[derive(Debug, Error)]
pub enum EditorError {
    /// An edit arrived while history playback was running.
    #[error("playback is active; stop it before editing")]
    PlaybackActive,
    /// An id that is not in the registry.
    #[error("no node with id node_{0}")]
    UnknownNode(NodeId),
    /// A boolean operation was requested without enough selected nodes.
    #[error("{needed} selected node(s) required, but {selected} selected")]
    SelectionRequired {
        /// How many the operation needs.
        needed: usize,
        /// How many are currently selected.
        selected: usize,
    },
    /// The command line failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Import/export failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What a successfully executed command line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A primitive was created.
    Created(NodeId),
    /// A primitive was created and combined with the selection; the id is
    /// the new operation node.
    Combined(NodeId),
}

/// The application context: document + history + selection + mode.
#[derive(Debug)]
pub struct Editor {
    document: Document,
    history: HistoryStack,
    selection: SelectionSet,
    mode: Mode,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Fresh editor over an empty document, with one seed snapshot so that
    /// index 0 and playback are always well-defined.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Fresh editor with explicit configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        let mut editor = Self {
            document: Document::new(),
            history: HistoryStack::new(),
            selection: SelectionSet::new(),
            mode: Mode::Idle,
            config,
        };
        editor.push_snapshot();
        editor
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The snapshot history.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The current mode flag.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Selected nodes in insertion order, resolved against the registry.
    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.selection
            .ids()
            .iter()
            .filter_map(|&id| self.document.get(id))
            .collect()
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.mode {
            Mode::Idle => Ok(()),
            Mode::Playing { .. } => Err(EditorError::PlaybackActive),
        }
    }

    /// Serialize the current document and append it to the history. Always
    /// called after the mutation it records, never before.
    fn push_snapshot(&mut self) {
        match wire::to_json(&self.document) {
            Ok(json) => {
                let index = self.history.push(json);
                debug!(step = index, "snapshot saved");
            }
            Err(err) => warn!(%err, "snapshot skipped: document failed to serialize"),
        }
    }

    // =========================================================================
    // Document edits
    // =========================================================================

    /// Add a box with the configured default size.
    pub fn add_box(&mut self) -> Result<NodeId, EditorError> {
        let [width, height, depth] = self.config.default_box_size;
        self.add_primitive(Primitive::Box {
            width,
            height,
            depth,
        })
    }

    /// Add a sphere with the configured default radius.
    pub fn add_sphere(&mut self) -> Result<NodeId, EditorError> {
        let radius = self.config.default_sphere_radius;
        self.add_primitive(Primitive::Sphere { radius })
    }

    /// Add an arbitrary primitive as a new root and snapshot.
    pub fn add_primitive(&mut self, primitive: Primitive) -> Result<NodeId, EditorError> {
        self.ensure_idle()?;
        let id = self.document.add_primitive(primitive);
        info!(node = id, "primitive added");
        self.push_snapshot();
        Ok(id)
    }

    /// Combine the two selected nodes under `op` (the tree-panel button
    /// path). The new operation node becomes the sole selection.
    pub fn boolean_selected(&mut self, op: BoolOp) -> Result<NodeId, EditorError> {
        self.ensure_idle()?;
        let ids = self.selection.ids();
        if ids.len() != 2 {
            return Err(EditorError::SelectionRequired {
                needed: 2,
                selected: ids.len(),
            });
        }
        let (a, b) = (ids[0], ids[1]);
        let id = self
            .document
            .apply_operation(a, b, op)
            .ok_or(EditorError::UnknownNode(a))?;
        info!(node = id, %op, left = a, right = b, "boolean applied");
        self.selection.clear();
        self.selection.select(id);
        self.push_snapshot();
        Ok(id)
    }

    /// Live transform update during a drag. No snapshot; the checkpoint
    /// comes from [`Editor::finish_transform`] when the drag ends.
    pub fn update_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), EditorError> {
        self.ensure_idle()?;
        if !self.document.set_transform(id, transform) {
            return Err(EditorError::UnknownNode(id));
        }
        debug!(node = id, "transform updated");
        Ok(())
    }

    /// Snapshot the state a finished transform drag produced.
    pub fn finish_transform(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.push_snapshot();
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggle a node in and out of the selection.
    pub fn toggle_selection(&mut self, id: NodeId) -> Result<(), EditorError> {
        if !self.document.contains(id) {
            return Err(EditorError::UnknownNode(id));
        }
        self.selection.toggle(id);
        Ok(())
    }

    /// Additively select a node (tree-item click).
    pub fn select_node(&mut self, id: NodeId) -> Result<(), EditorError> {
        if !self.document.contains(id) {
            return Err(EditorError::UnknownNode(id));
        }
        self.selection.select(id);
        Ok(())
    }

    /// Drop the whole selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // =========================================================================
    // Command lines
    // =========================================================================

    /// Parse and execute one natural-language command line.
    ///
    /// `Create` allocates the parsed primitive and places it. `Boolean`
    /// needs at least one selected node for the left operand (checked
    /// before anything is created, so a rejected command mutates nothing),
    /// then creates the parsed primitive as the right operand and combines
    /// the two.
    pub fn run_command(&mut self, line: &str) -> Result<CommandOutcome, EditorError> {
        self.ensure_idle()?;
        match parse(line)? {
            ParsedCommand::Create {
                primitive,
                position,
            } => {
                let id = self.create_placed(primitive, position);
                info!(node = id, "command created primitive");
                self.push_snapshot();
                Ok(CommandOutcome::Created(id))
            }
            ParsedCommand::Boolean {
                op,
                primitive,
                position,
            } => {
                let Some(&base) = self.selection.ids().first() else {
                    return Err(EditorError::SelectionRequired {
                        needed: 1,
                        selected: 0,
                    });
                };
                let operand = self.create_placed(primitive, position);
                let id = self
                    .document
                    .apply_operation(base, operand, op)
                    .ok_or(EditorError::UnknownNode(base))?;
                info!(node = id, %op, "command combined with selection");
                self.selection.clear();
                self.push_snapshot();
                Ok(CommandOutcome::Combined(id))
            }
        }
    }

    fn create_placed(&mut self, primitive: Primitive, position: [f64; 3]) -> NodeId {
        let id = self.document.add_primitive(primitive);
        let [x, y, z] = position;
        self.document
            .set_transform(id, Transform::from_translation(x, y, z));
        id
    }

    // =========================================================================
    // History and playback
    // =========================================================================

    /// Restore the document to snapshot `index` without pushing anything.
    ///
    /// False (and no mutation) when the index is out of range. Restoring
    /// replaces the document and clears the selection.
    pub fn restore(&mut self, index: usize) -> bool {
        let Some(snapshot) = self.history.get(index) else {
            return false;
        };
        match wire::from_json(snapshot) {
            Ok(document) => {
                self.document = document;
                self.selection.clear();
                self.history.set_cursor(index);
                info!(step = index, "state restored");
                true
            }
            Err(err) => {
                warn!(%err, step = index, "stored snapshot failed to parse");
                false
            }
        }
    }

    /// Step one snapshot back. False when already at the beginning.
    pub fn undo(&mut self) -> bool {
        match self.history.cursor() {
            Some(cursor) if cursor > 0 => self.restore(cursor - 1),
            _ => false,
        }
    }

    /// Step one snapshot forward. False when already at the end.
    pub fn redo(&mut self) -> bool {
        match self.history.cursor() {
            Some(cursor) => self.restore(cursor + 1),
            None => false,
        }
    }

    /// Enter playback. Starts after the cursor, wrapping to the beginning
    /// when the cursor already sits at the end. False when there is nothing
    /// to replay (fewer than two snapshots).
    pub fn start_playback(&mut self) -> bool {
        let len = self.history.len();
        if len < 2 {
            return false;
        }
        let next = match self.history.cursor() {
            Some(cursor) if cursor + 1 < len => cursor + 1,
            _ => 0,
        };
        self.mode = Mode::Playing { next };
        info!(next, "playback started");
        true
    }

    /// Restore the next snapshot in the replay. Returns false, and goes
    /// back to `Idle`, once the history is exhausted. The host owns the
    /// tick cadence ([`EditorConfig::playback_interval_ms`]).
    pub fn playback_tick(&mut self) -> bool {
        let Mode::Playing { next } = self.mode else {
            return false;
        };
        if !self.restore(next) {
            self.mode = Mode::Idle;
            return false;
        }
        if next + 1 < self.history.len() {
            self.mode = Mode::Playing { next: next + 1 };
        } else {
            self.mode = Mode::Idle;
            info!("playback finished");
        }
        true
    }

    /// Leave playback mode.
    pub fn stop_playback(&mut self) {
        if matches!(self.mode, Mode::Playing { .. }) {
            info!("playback stopped");
        }
        self.mode = Mode::Idle;
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        matches!(self.mode, Mode::Playing { .. })
    }

    // =========================================================================
    // Import / export / lifecycle
    // =========================================================================

    /// Serialize the current root forest.
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(wire::to_json(&self.document)?)
    }

    /// Replace the document with an imported forest. The whole import is
    /// rejected, leaving everything untouched, on any parse error; on
    /// success the history restarts at the imported state.
    pub fn load_json(&mut self, text: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let document = wire::from_json(text)?;
        info!(nodes = document.len(), "document imported");
        self.document = document;
        self.selection.clear();
        self.history.reset();
        self.push_snapshot();
        Ok(())
    }

    /// Throw everything away and start an empty document.
    pub fn new_document(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.document.clear();
        self.selection.clear();
        self.history.reset();
        self.push_snapshot();
        info!("new document");
        Ok(())
    }

    /// Evaluate the whole root forest for the external renderer. Safe to
    /// call after every mutation; recomputes from scratch each time.
    pub fn rebuild(&self, evaluator: &impl MeshEvaluator) -> Vec<CompositeMesh> {
        csged_eval::rebuild(&self.document, evaluator)
    }
}
