use anyhow::Context as _;
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{h_flex, v_flex};
use gpui_sortable_tree::{
    DragSession, FlatRecord, SortableTreeRowState, SortableTreeState, TreeNode, sortable_tree,
};

const DEMO_TREE: &str = include_str!("demo_tree.json");
const INDENT_WIDTH: f32 = 20.;

pub struct SortableTreeExample {
    tree: Entity<SortableTreeState>,
}

impl SortableTreeExample {
    pub fn view(session: DragSession, _window: &mut Window, cx: &mut App) -> Entity<Self> {
        let tree = cx.new(|cx| {
            SortableTreeState::new(cx)
                .session(session)
                .indent_width(px(INDENT_WIDTH))
        });
        cx.new(|_| Self { tree })
    }
}

/// Parse the bundled demo tree.
pub fn demo_items() -> anyhow::Result<Vec<TreeNode>> {
    serde_json::from_str(DEMO_TREE).context("parsing demo_tree.json")
}

pub fn demo_session() -> anyhow::Result<DragSession> {
    let session = DragSession::new(demo_items()?).context("loading demo tree")?;
    Ok(session.with_expanded_ids(["collections", "my-account"]))
}

impl Render for SortableTreeExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let state = self.tree.read(cx);
        let session = state.drag_session();
        let tree_dump = format_tree(state.root_items());

        let selected_id = state
            .selected_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<none>".to_string());

        let mut expanded: Vec<&str> = session.expanded_ids().iter().map(|id| id.as_str()).collect();
        expanded.sort_unstable();

        let projection = match (session.active_id(), session.projection()) {
            (Some(active_id), Some(projection)) => format!(
                "{active_id} -> depth {}, parent {}",
                projection.depth,
                projection
                    .parent_id
                    .as_ref()
                    .map_or("<root>", |id| id.as_str())
            ),
            (Some(active_id), None) => format!("{active_id} -> <no target>"),
            _ => "<idle>".to_string(),
        };

        let last_drop = state
            .last_drop()
            .map(|outcome| {
                format!(
                    "{} -> depth {}, parent {}",
                    outcome.moved_id,
                    outcome.depth,
                    outcome
                        .parent_id
                        .as_ref()
                        .map_or("<root>", |id| id.as_str())
                )
            })
            .unwrap_or_else(|| "<none>".to_string());

        let debug_lines = [
            format!("Selected: {selected_id}"),
            format!("Expanded: {}", expanded.join(", ")),
            format!("Projection: {projection}"),
            format!("Last drop: {last_drop}"),
        ];

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Sortable Tree"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drag a row up or down to reorder it. Dragging right nests it under the row above (one level per 20px), dragging left moves it out. A dragged row's children travel with it."),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Tree"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(sortable_tree(
                                        &self.tree,
                                        move |ix, record, row_state, _window, cx| {
                                            render_tree_row(ix, record, row_state, cx)
                                        },
                                    )),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Debug"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .child(
                                        v_flex()
                                            .gap_y_3()
                                            .child(render_lines(debug_lines.join("\n")))
                                            .child(render_lines(tree_dump)),
                                    ),
                            ),
                    ),
            )
    }
}

fn render_tree_row(
    ix: usize,
    record: &FlatRecord,
    row_state: SortableTreeRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let marker = match (row_state.has_children, row_state.expanded) {
        (false, _) => " ",
        (true, true) => "▾",
        (true, false) => "▸",
    };

    ListItem::new(ix)
        .pl(px(10.) + row_state.indent)
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(
                    div()
                        .w(px(12.))
                        .text_color(theme.muted_foreground)
                        .child(marker),
                )
                .child(record.display_label().to_string())
                .when(row_state.has_children && !row_state.expanded, |this| {
                    this.child(
                        div()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(format!("({})", record.child_count)),
                    )
                }),
        )
}

fn render_lines(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn format_tree(items: &[TreeNode]) -> String {
    fn walk(items: &[TreeNode], depth: usize, out: &mut String) {
        for item in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(item.display_label());
            out.push('\n');
            walk(&item.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(items, 0, &mut out);
    out
}
