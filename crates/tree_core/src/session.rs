use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::flatten::{FlatRecord, flatten};
use crate::id::ItemId;
use crate::node::{TreeNode, ancestor_ids, check_unique_ids, descendant_ids, find_node};
use crate::projection::{Projection, move_item, project};
use crate::rebuild::build_tree;
use crate::visibility::visible_records;

/// Horizontal distance that corresponds to one depth level.
pub const DEFAULT_INDENT_WIDTH: f32 = 20.;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pointer displacement, in the same unit as drag deltas, that shifts the projected
    /// depth by one level. Should match the indentation used to render rows.
    pub indent_width: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.indent_width.is_finite() || self.indent_width <= 0. {
            return Err(TreeError::InvalidIndentWidth(self.indent_width));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        active_id: ItemId,
        over_id: Option<ItemId>,
        /// Cumulative horizontal pointer displacement since the drag started.
        offset_x: f32,
    },
}

/// Drag lifecycle events, as delivered by an input source.
#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent {
    Start { id: ItemId },
    Move { delta_x: f32 },
    Over { id: Option<ItemId> },
    End { over: Option<ItemId> },
    Cancel,
}

/// The move applied by a successful drop.
///
/// `depth` is where the item ended up in the rebuilt tree, which can be shallower than the
/// projected depth when no parent could be resolved for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropOutcome {
    pub moved_id: ItemId,
    pub parent_id: Option<ItemId>,
    pub depth: usize,
}

/// Drag state for one tree: the working items, which ids are expanded, and the drag in
/// progress.
///
/// Every event recomputes the visible rows and the projection before returning, so the
/// accessors always reflect the latest event.
#[derive(Clone, Debug)]
pub struct DragSession {
    items: Vec<TreeNode>,
    expanded: HashSet<ItemId>,
    state: DragState,
    config: SessionConfig,
    visible: Vec<FlatRecord>,
    projection: Option<Projection>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            expanded: HashSet::new(),
            state: DragState::Idle,
            config: SessionConfig::default(),
            visible: Vec::new(),
            projection: None,
        }
    }
}

impl DragSession {
    pub fn new(items: impl Into<Vec<TreeNode>>) -> Result<Self> {
        Self::with_config(items, SessionConfig::default())
    }

    pub fn with_config(items: impl Into<Vec<TreeNode>>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let items = items.into();
        check_unique_ids(&items)?;

        let mut session = Self {
            items,
            config,
            ..Self::default()
        };
        session.refresh_visible();
        Ok(session)
    }

    /// Set the indentation width used to turn pointer offsets into depth changes.
    ///
    /// Invalid widths are ignored.
    pub fn indent_width(mut self, indent_width: f32) -> Self {
        if let Err(err) = self.set_indent_width(indent_width) {
            tracing::warn!(%err, "keeping indent width {}", self.config.indent_width);
        }
        self
    }

    pub fn set_indent_width(&mut self, indent_width: f32) -> Result<()> {
        let config = SessionConfig { indent_width };
        config.validate()?;
        self.config = config;
        self.refresh_projection();
        Ok(())
    }

    pub fn with_expanded_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ItemId>,
    {
        self.expanded.extend(ids.into_iter().map(Into::into));
        self.refresh_visible();
        self
    }

    /// Replace the working items, abandoning any drag in progress.
    pub fn set_items(&mut self, items: impl Into<Vec<TreeNode>>) -> Result<()> {
        let items = items.into();
        check_unique_ids(&items)?;
        self.items = items;
        self.state = DragState::Idle;
        self.refresh_visible();
        Ok(())
    }

    pub fn handle(&mut self, event: DragEvent) -> Result<Option<DropOutcome>> {
        match event {
            DragEvent::Start { id } => self.drag_start(id).map(|()| None),
            DragEvent::Move { delta_x } => {
                self.drag_move(delta_x);
                Ok(None)
            }
            DragEvent::Over { id } => {
                self.drag_over(id);
                Ok(None)
            }
            DragEvent::End { over } => {
                self.drag_over(over);
                self.drag_end()
            }
            DragEvent::Cancel => {
                self.drag_cancel();
                Ok(None)
            }
        }
    }

    /// Start dragging `id`. Its subtree is collapsed for the duration of the drag.
    pub fn drag_start(&mut self, id: impl Into<ItemId>) -> Result<()> {
        let id = id.into();
        if let DragState::Dragging { active_id, .. } = &self.state {
            return Err(TreeError::DragInProgress(active_id.clone()));
        }
        if find_node(&self.items, &id).is_none() {
            return Err(TreeError::UnknownId(id));
        }

        self.expanded.remove(&id);
        for descendant in descendant_ids(&self.items, &id) {
            self.expanded.remove(&descendant);
        }

        tracing::debug!(active_id = %id, "drag started");
        self.state = DragState::Dragging {
            active_id: id.clone(),
            over_id: Some(id),
            offset_x: 0.,
        };
        self.refresh_visible();
        Ok(())
    }

    /// Update the cumulative horizontal pointer displacement.
    pub fn drag_move(&mut self, delta_x: f32) {
        let DragState::Dragging { offset_x, .. } = &mut self.state else {
            return;
        };
        *offset_x = delta_x;
        self.refresh_projection();
    }

    /// Update the row under the pointer, `None` when the pointer is over no row.
    pub fn drag_over(&mut self, id: Option<ItemId>) {
        let DragState::Dragging { over_id, .. } = &mut self.state else {
            return;
        };
        if *over_id == id {
            return;
        }
        *over_id = id;
        self.refresh_projection();
    }

    /// Finish the drag, applying the current projection.
    ///
    /// Returns `Ok(None)` when nothing was dragged or there was no drop target. On error
    /// the items are left unchanged.
    pub fn drag_end(&mut self) -> Result<Option<DropOutcome>> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let projection = self.projection.take();
        let DragState::Dragging {
            active_id, over_id, ..
        } = state
        else {
            return Ok(None);
        };

        let outcome = match (projection, over_id) {
            (Some(projection), Some(over_id)) => self.apply_drop(active_id, &over_id, projection),
            _ => {
                tracing::debug!(%active_id, "drag ended without a drop target");
                Ok(None)
            }
        };
        self.refresh_visible();
        outcome
    }

    pub fn drag_cancel(&mut self) {
        if let DragState::Dragging { active_id, .. } = &self.state {
            tracing::debug!(%active_id, "drag cancelled");
        }
        self.state = DragState::Idle;
        self.refresh_projection();
    }

    /// Expand `id`, or collapse it along with every expanded descendant.
    pub fn toggle_expand(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        if self.expanded.remove(&id) {
            for descendant in descendant_ids(&self.items, &id) {
                self.expanded.remove(&descendant);
            }
        } else {
            self.expanded.insert(id);
        }
        self.refresh_visible();
    }

    fn apply_drop(
        &mut self,
        active_id: ItemId,
        over_id: &ItemId,
        projection: Projection,
    ) -> Result<Option<DropOutcome>> {
        let mut records = flatten(&self.items);
        let (Some(active_ix), Some(over_ix)) = (
            records.iter().position(|record| record.id == active_id),
            records.iter().position(|record| record.id == *over_id),
        ) else {
            tracing::warn!(%active_id, %over_id, "drop references an unknown item");
            return Ok(None);
        };

        let record = &mut records[active_ix];
        record.parent_id = projection.parent_id.clone();
        record.depth = projection.depth;
        move_item(&mut records, active_ix, over_ix);

        self.items = build_tree(&records)?;
        if let Some(parent_id) = &projection.parent_id {
            self.expanded.insert(parent_id.clone());
        }

        // A parentless projection deeper than zero lands at the root level.
        let depth = ancestor_ids(&self.items, &active_id).len();
        tracing::debug!(
            moved_id = %active_id,
            parent_id = ?projection.parent_id,
            depth,
            "drop applied"
        );
        Ok(Some(DropOutcome {
            moved_id: active_id,
            parent_id: projection.parent_id,
            depth,
        }))
    }

    fn refresh_visible(&mut self) {
        self.visible = visible_records(&flatten(&self.items), &self.expanded);
        self.refresh_projection();
    }

    fn refresh_projection(&mut self) {
        let projection = match &self.state {
            DragState::Dragging {
                active_id,
                over_id: Some(over_id),
                offset_x,
            } => project(
                &self.visible,
                active_id,
                over_id,
                *offset_x,
                self.config.indent_width,
            ),
            _ => None,
        };
        if projection != self.projection {
            tracing::trace!(?projection, "projection changed");
            self.projection = projection;
        }
    }

    pub fn items(&self) -> &[TreeNode] {
        &self.items
    }

    /// Rows to render, in order.
    pub fn visible(&self) -> &[FlatRecord] {
        &self.visible
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.visible.iter().map(|record| &record.id)
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active_id(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Dragging { active_id, .. } => Some(active_id),
            DragState::Idle => None,
        }
    }

    pub fn over_id(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Dragging { over_id, .. } => over_id.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Horizontal pointer displacement of the drag in progress, zero when idle.
    pub fn offset_x(&self) -> f32 {
        match &self.state {
            DragState::Dragging { offset_x, .. } => *offset_x,
            DragState::Idle => 0.,
        }
    }

    /// The visible row being dragged.
    pub fn active_record(&self) -> Option<&FlatRecord> {
        let active_id = self.active_id()?;
        self.visible.iter().find(|record| record.id == *active_id)
    }

    pub fn expanded_ids(&self) -> &HashSet<ItemId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &ItemId) -> bool {
        self.expanded.contains(id)
    }

    /// Where the active row would land if dropped now.
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Depth to render `record` at: the projected depth for the dragged row.
    pub fn row_depth(&self, record: &FlatRecord) -> usize {
        match (&self.projection, self.active_id()) {
            (Some(projection), Some(active_id)) if *active_id == record.id => projection.depth,
            _ => record.depth,
        }
    }

    pub fn descendant_count(&self, id: &ItemId) -> usize {
        descendant_ids(&self.items, id).len()
    }
}
