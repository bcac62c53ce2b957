use std::{ops::Range, rc::Rc};

use gpui::{
    App, AppContext as _, Context, ElementId, Entity, EntityId, FocusHandle,
    InteractiveElement as _, IntoElement, ListSizingBehavior, ParentElement as _, Pixels, Render,
    RenderOnce, SharedString, StatefulInteractiveElement as _, StyleRefinement, Styled,
    UniformListScrollHandle, Window, div, prelude::FluentBuilder as _, px, uniform_list,
};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{ActiveTheme as _, StyledExt as _, h_flex};
use sortable_tree_core::{DragSession, DropOutcome, FlatRecord, ItemId, TreeNode};

const CONTEXT: &str = "SortableTree";

/// Create a [`SortableTree`].
pub fn sortable_tree<R>(state: &Entity<SortableTreeState>, render_item: R) -> SortableTree
where
    R: Fn(usize, &FlatRecord, SortableTreeRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    SortableTree::new(state, render_item)
}

#[derive(Clone)]
struct SortableTreeDrag {
    tree_id: EntityId,
    item_id: ItemId,
    label: SharedString,
    descendant_count: usize,
}

struct DragGhost {
    label: SharedString,
    descendant_count: usize,
}

impl DragGhost {
    fn new(label: SharedString, descendant_count: usize) -> Self {
        Self {
            label,
            descendant_count,
        }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        h_flex()
            .gap_x_2()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .when(self.descendant_count > 0, |this| {
                this.child(
                    div()
                        .px(px(6.))
                        .rounded(px(8.))
                        .bg(theme.muted)
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(self.descendant_count.to_string()),
                )
            })
            .child(self.label.clone())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SortableTreeRowState {
    pub selected: bool,
    pub dragging: bool,
    /// Depth to draw the row at; the projected depth while the row is being dragged.
    pub depth: usize,
    /// `depth` multiplied by the tree's indent width.
    pub indent: Pixels,
    pub expanded: bool,
    pub has_children: bool,
}

/// State for a sortable tree: the drag session plus selection and scrolling.
pub struct SortableTreeState {
    focus_handle: FocusHandle,
    session: DragSession,
    indent_width: Pixels,
    scrollbar_state: ScrollbarState,
    scroll_handle: UniformListScrollHandle,
    selected_id: Option<ItemId>,
    drag_origin_x: Option<Pixels>,
    last_drop: Option<DropOutcome>,
    render_item:
        Rc<dyn Fn(usize, &FlatRecord, SortableTreeRowState, &mut Window, &mut App) -> ListItem>,
}

impl SortableTreeState {
    pub fn new(cx: &mut App) -> Self {
        let indent_width = px(sortable_tree_core::DEFAULT_INDENT_WIDTH);
        Self {
            focus_handle: cx.focus_handle(),
            session: DragSession::default(),
            indent_width,
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: UniformListScrollHandle::default(),
            selected_id: None,
            drag_origin_x: None,
            last_drop: None,
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("sortable-tree-empty")),
        }
    }

    /// Set the indentation width (in pixels) of one depth level.
    ///
    /// Horizontal drag distance is measured in the same unit, so this should match the
    /// indentation used by your row renderer.
    pub fn indent_width(mut self, indent_width: Pixels) -> Self {
        self.indent_width = indent_width;
        self.sync_indent_width();
        self
    }

    pub fn session(mut self, session: DragSession) -> Self {
        self.session = session;
        self.sync_indent_width();
        self
    }

    fn sync_indent_width(&mut self) {
        if let Err(err) = self.session.set_indent_width(self.indent_width / px(1.)) {
            tracing::warn!(%err, "ignoring indent width");
        }
    }

    pub fn set_items(
        &mut self,
        items: impl Into<Vec<TreeNode>>,
        cx: &mut Context<Self>,
    ) -> sortable_tree_core::Result<()> {
        self.session.set_items(items)?;
        self.selected_id = None;
        self.drag_origin_x = None;
        self.last_drop = None;
        cx.notify();
        Ok(())
    }

    pub fn root_items(&self) -> &[TreeNode] {
        self.session.items()
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.session
    }

    pub fn selected_id(&self) -> Option<&ItemId> {
        self.selected_id.as_ref()
    }

    pub fn set_selected_id(&mut self, id: Option<ItemId>, cx: &mut Context<Self>) {
        self.selected_id = id;
        cx.notify();
    }

    pub fn selected_record(&self) -> Option<&FlatRecord> {
        let selected_id = self.selected_id.as_ref()?;
        self.session
            .visible()
            .iter()
            .find(|record| record.id == *selected_id)
    }

    /// The move applied by the most recent drop.
    pub fn last_drop(&self) -> Option<&DropOutcome> {
        self.last_drop.as_ref()
    }

    pub fn toggle_expand(&mut self, id: &ItemId, cx: &mut Context<Self>) {
        self.session.toggle_expand(id.clone());
        cx.notify();
    }

    fn on_row_click(&mut self, id: &ItemId, cx: &mut Context<Self>) {
        self.selected_id = Some(id.clone());
        let has_children = self
            .session
            .visible()
            .iter()
            .any(|record| record.id == *id && record.has_children());
        if has_children {
            self.session.toggle_expand(id.clone());
        }
        cx.notify();
    }

    fn on_drag_start(
        &mut self,
        drag: &SortableTreeDrag,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.session.is_dragging() {
            self.session.drag_cancel();
        }
        if let Err(err) = self.session.drag_start(drag.item_id.clone()) {
            tracing::warn!(%err, "could not start drag");
            return;
        }
        self.drag_origin_x = Some(window.mouse_position().x);
        self.selected_id = Some(drag.item_id.clone());
        cx.notify();
    }

    /// Outside the list there is no drop target.
    fn on_drag_move(
        &mut self,
        event: &gpui::DragMoveEvent<SortableTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        let tree_id = event.drag(cx).tree_id;
        if tree_id != cx.entity_id() {
            return;
        }

        if !event.bounds.contains(&event.event.position) && self.session.over_id().is_some() {
            self.session.drag_over(None);
            cx.notify();
        }
    }

    fn on_row_drag_move(
        &mut self,
        row_id: &ItemId,
        event: &gpui::DragMoveEvent<SortableTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        let tree_id = event.drag(cx).tree_id;
        if tree_id != cx.entity_id() {
            return;
        }

        let mouse_position = event.event.position;
        if !event.bounds.contains(&mouse_position) {
            return;
        }

        let before = (
            self.session.over_id().cloned(),
            self.session.projection().cloned(),
        );
        let origin_x = self.drag_origin_x.unwrap_or(mouse_position.x);
        self.session.drag_over(Some(row_id.clone()));
        self.session.drag_move((mouse_position.x - origin_x) / px(1.));

        let after = (
            self.session.over_id().cloned(),
            self.session.projection().cloned(),
        );
        if before != after {
            cx.notify();
        }
    }

    fn on_drop(&mut self, drag: &SortableTreeDrag, _window: &mut Window, cx: &mut Context<Self>) {
        if drag.tree_id != cx.entity_id() {
            return;
        }

        match self.session.drag_end() {
            Ok(Some(outcome)) => {
                self.selected_id = Some(outcome.moved_id.clone());
                self.last_drop = Some(outcome);
            }
            Ok(None) => {}
            Err(err) => tracing::error!(%err, "drop failed"),
        }
        self.drag_origin_x = None;
        cx.notify();
    }
}

impl Render for SortableTreeState {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() && self.session.is_dragging() {
            self.session.drag_cancel();
            self.drag_origin_x = None;
        }

        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let indent_width = self.indent_width;

        div()
            .id("sortable-tree-state")
            .size_full()
            .relative()
            .child(
                uniform_list("entries", self.session.visible().len(), {
                    cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let Some(record) = state.session.visible().get(ix).cloned() else {
                                continue;
                            };
                            let selected = state.selected_id.as_ref() == Some(&record.id);
                            let dragging = state.session.active_id() == Some(&record.id)
                                && cx.has_active_drag();
                            let depth = state.session.row_depth(&record);

                            let row_state = SortableTreeRowState {
                                selected,
                                dragging,
                                depth,
                                indent: indent_width * depth as f32,
                                expanded: state.session.is_expanded(&record.id),
                                has_children: record.has_children(),
                            };

                            let item = (render_item)(ix, &record, row_state, window, cx);
                            let drag_value = SortableTreeDrag {
                                tree_id: cx.entity_id(),
                                item_id: record.id.clone(),
                                label: record.display_label().to_string().into(),
                                descendant_count: state.session.descendant_count(&record.id),
                            };

                            let row = div()
                                .id(ix)
                                .child(item.selected(selected))
                                .on_drag_move::<SortableTreeDrag>(cx.listener({
                                    let row_id = record.id.clone();
                                    move |this, ev, window, cx| {
                                        this.on_row_drag_move(&row_id, ev, window, cx);
                                    }
                                }))
                                .on_drop::<SortableTreeDrag>(cx.listener(Self::on_drop))
                                .on_click(cx.listener({
                                    let row_id = record.id.clone();
                                    move |this, _click_event, _window, cx| {
                                        this.on_row_click(&row_id, cx);
                                    }
                                }))
                                .on_drag(drag_value, {
                                    let state_entity = state_entity.clone();
                                    move |drag, _cursor_offset, window, cx| {
                                        state_entity.update(cx, |state, cx| {
                                            state.on_drag_start(drag, window, cx);
                                        });
                                        let label = drag.label.clone();
                                        let descendant_count = drag.descendant_count;
                                        cx.new(|_| DragGhost::new(label, descendant_count))
                                    }
                                });

                            items.push(row);
                        }
                        items
                    })
                })
                .on_drag_move::<SortableTreeDrag>(cx.listener(Self::on_drag_move))
                .on_drop::<SortableTreeDrag>(cx.listener(Self::on_drop))
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
    }
}

/// A tree view whose rows can be reordered and re-parented by dragging.
#[derive(IntoElement)]
pub struct SortableTree {
    id: ElementId,
    state: Entity<SortableTreeState>,
    style: StyleRefinement,
    render_item:
        Rc<dyn Fn(usize, &FlatRecord, SortableTreeRowState, &mut Window, &mut App) -> ListItem>,
}

impl SortableTree {
    pub fn new<R>(state: &Entity<SortableTreeState>, render_item: R) -> Self
    where
        R: Fn(usize, &FlatRecord, SortableTreeRowState, &mut Window, &mut App) -> ListItem
            + 'static,
    {
        Self {
            id: ElementId::Name(format!("sortable-tree-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(move |ix, record, row_state, window, cx| {
                render_item(ix, record, row_state, window, cx)
            }),
        }
    }
}

impl Styled for SortableTree {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for SortableTree {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
