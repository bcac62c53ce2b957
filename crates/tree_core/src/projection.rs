use crate::flatten::FlatRecord;
use crate::id::ItemId;

/// Where the dragged item would land if dropped now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub depth: usize,
    /// `None` when the item would become a root-level item.
    pub parent_id: Option<ItemId>,
}

/// Move the element at `from` to `to`, keeping every other element in relative order.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Project the depth and parent the active row would get if dropped over `over_id`.
///
/// `offset_x` is the horizontal pointer displacement since the drag started; every
/// `indent_width` of it shifts the candidate depth by one level. Returns `None` when
/// either id is not among `visible`.
pub fn project(
    visible: &[FlatRecord],
    active_id: &ItemId,
    over_id: &ItemId,
    offset_x: f32,
    indent_width: f32,
) -> Option<Projection> {
    let active_ix = visible.iter().position(|record| record.id == *active_id)?;
    let over_ix = visible.iter().position(|record| record.id == *over_id)?;
    let active_depth = visible[active_ix].depth;

    let mut moved: Vec<&FlatRecord> = visible.iter().collect();
    move_item(&mut moved, active_ix, over_ix);

    let previous = over_ix.checked_sub(1).map(|ix| moved[ix]);
    let next = moved.get(over_ix + 1).copied();

    let drag_depth = round_half_up(offset_x / indent_width);
    let candidate = (active_depth as i64).saturating_add(drag_depth);
    let depth = clamp_depth(candidate, previous, next);
    let parent_id = resolve_parent_id(depth, over_ix, previous, &moved);

    Some(Projection { depth, parent_id })
}

/// Halves round toward positive infinity, so a drag of exactly half an indent to the left
/// does not outdent yet.
fn round_half_up(value: f32) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

fn clamp_depth(candidate: i64, previous: Option<&FlatRecord>, next: Option<&FlatRecord>) -> usize {
    let max_depth = previous.map_or(0, |prev| prev.depth + 1);
    let min_depth = next.map_or(0, |next| next.depth);

    if candidate >= max_depth as i64 {
        max_depth
    } else if candidate < min_depth as i64 {
        min_depth
    } else {
        // min_depth <= candidate < max_depth, so it is non-negative
        candidate as usize
    }
}

fn resolve_parent_id(
    depth: usize,
    over_ix: usize,
    previous: Option<&FlatRecord>,
    moved: &[&FlatRecord],
) -> Option<ItemId> {
    let previous = previous?;
    if depth == 0 {
        return None;
    }

    if depth == previous.depth {
        return previous.parent_id.clone();
    }
    if depth > previous.depth {
        return Some(previous.id.clone());
    }

    moved[..over_ix]
        .iter()
        .rev()
        .find(|record| record.depth == depth)
        .and_then(|record| record.parent_id.clone())
}
