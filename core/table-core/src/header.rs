//! FILENAME: core/table-core/src/header.rs
//! Header groups - the rows of headers a renderer draws above the body.
//!
//! Built from the column tree and an ordered list of leaf columns:
//! 1. The bottom group holds one header per leaf column.
//! 2. Walking upward, consecutive headers that share a parent column merge
//!    under one parent header.
//! 3. A header whose column does not reach the current depth is carried up
//!    as a placeholder for its own column, so shallow leaves next to deep
//!    groups still line up.
//! 4. `col_span` is the number of leaf headers under a header.

use std::fmt;
use std::rc::Rc;

use crate::column::{Column, ColumnPosition};
use crate::logging::log_debug;
use crate::state::slice;
use crate::table::Table;
use crate::value::RowData;

// ============================================================================
// TYPES
// ============================================================================

pub struct Header<T> {
    pub id: String,
    /// Position within its header group.
    pub index: usize,
    /// Depth of the header group this header belongs to.
    pub depth: usize,
    pub column: Rc<Column<T>>,
    pub is_placeholder: bool,
    /// Distinguishes repeated placeholders of the same column in one group.
    pub placeholder_id: Option<usize>,
    pub col_span: usize,
    pub sub_headers: Vec<Rc<Header<T>>>,
}

pub struct HeaderGroup<T> {
    pub id: String,
    pub depth: usize,
    pub headers: Vec<Rc<Header<T>>>,
}

/// What a renderer receives to draw one header.
pub struct HeaderContext<'a, T: RowData> {
    pub table: &'a Table<T>,
    pub header: &'a Header<T>,
    pub column: &'a Rc<Column<T>>,
}

pub type HeaderGroups<T> = Rc<Vec<Rc<HeaderGroup<T>>>>;
pub type Headers<T> = Rc<Vec<Rc<Header<T>>>>;

impl<T> Header<T> {
    /// Headers with no sub-headers under this one, left to right.
    pub fn get_leaf_headers(self: &Rc<Self>) -> Vec<Rc<Header<T>>> {
        if self.sub_headers.is_empty() {
            return vec![Rc::clone(self)];
        }
        self.sub_headers
            .iter()
            .flat_map(|sub| sub.get_leaf_headers())
            .collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.sub_headers.is_empty()
    }
}

impl<T: RowData> Header<T> {
    /// Width of the header: the summed sizes of its leaf columns.
    pub fn get_size(self: &Rc<Self>, table: &Table<T>) -> f64 {
        self.get_leaf_headers()
            .iter()
            .map(|leaf| leaf.column.get_size(table))
            .sum()
    }

    /// Offset of the header's left edge within `position`.
    pub fn get_start(self: &Rc<Self>, table: &Table<T>, position: ColumnPosition) -> f64 {
        self.get_leaf_headers()
            .first()
            .map_or(0.0, |leaf| leaf.column.get_start(table, position))
    }

    pub fn get_context<'a>(&'a self, table: &'a Table<T>) -> HeaderContext<'a, T> {
        HeaderContext {
            table,
            header: self,
            column: &self.column,
        }
    }
}

impl<T> fmt::Debug for Header<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("id", &self.id)
            .field("column", &self.column.id)
            .field("depth", &self.depth)
            .field("is_placeholder", &self.is_placeholder)
            .field("col_span", &self.col_span)
            .field("sub_headers", &self.sub_headers)
            .finish()
    }
}

impl<T> fmt::Debug for HeaderGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderGroup")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("headers", &self.headers)
            .finish()
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

/// A header under construction. Sub-headers are arena indices.
struct DraftHeader<T> {
    id: String,
    index: usize,
    depth: usize,
    column: Rc<Column<T>>,
    is_placeholder: bool,
    placeholder_id: Option<usize>,
    sub_headers: Vec<usize>,
}

fn header_id(family: &str, parts: &[&str]) -> String {
    std::iter::once(family)
        .chain(parts.iter().copied())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Builds the header groups for `leaf_columns`, top group first.
///
/// `max_depth` is the number of header rows; every family of one table is
/// built with the same value so pinned sections line up.
pub fn build_header_groups<T>(
    leaf_columns: &[Rc<Column<T>>],
    max_depth: usize,
    family: &str,
) -> Vec<Rc<HeaderGroup<T>>> {
    if leaf_columns.is_empty() || max_depth == 0 {
        return Vec::new();
    }

    let mut arena: Vec<DraftHeader<T>> = leaf_columns
        .iter()
        .enumerate()
        .map(|(index, column)| DraftHeader {
            id: column.id.clone(),
            index,
            depth: max_depth - 1,
            column: Rc::clone(column),
            is_placeholder: false,
            placeholder_id: None,
            sub_headers: Vec::new(),
        })
        .collect();

    let mut groups_bottom_up: Vec<(usize, Vec<usize>)> = Vec::with_capacity(max_depth);
    let mut level: Vec<usize> = (0..arena.len()).collect();

    for depth in (0..max_depth).rev() {
        groups_bottom_up.push((depth, level.clone()));
        if depth == 0 {
            break;
        }

        // Parent headers for the group above.
        let parent_depth = depth - 1;
        let mut pending: Vec<usize> = Vec::new();
        for &child in &level {
            let child_column = Rc::clone(&arena[child].column);
            let (column, is_placeholder) = match child_column.parent() {
                Some(parent) if child_column.depth == depth => (parent, false),
                _ => (child_column, true),
            };

            if let Some(&latest) = pending.last() {
                if Rc::ptr_eq(&arena[latest].column, &column) {
                    arena[latest].sub_headers.push(child);
                    continue;
                }
            }

            let placeholder_id = is_placeholder.then(|| {
                pending
                    .iter()
                    .filter(|&&p| Rc::ptr_eq(&arena[p].column, &column))
                    .count()
            });
            let depth_text = parent_depth.to_string();
            let id = header_id(family, &[&depth_text, &column.id, &arena[child].id]);
            arena.push(DraftHeader {
                id,
                index: pending.len(),
                depth: parent_depth,
                column,
                is_placeholder,
                placeholder_id,
                sub_headers: vec![child],
            });
            pending.push(arena.len() - 1);
        }
        level = pending;
    }

    // Children are always pushed before their parents.
    let mut spans = vec![0usize; arena.len()];
    for i in 0..arena.len() {
        spans[i] = if arena[i].sub_headers.is_empty() {
            1
        } else {
            arena[i].sub_headers.iter().map(|&s| spans[s]).sum()
        };
    }

    let mut built: Vec<Option<Rc<Header<T>>>> = Vec::with_capacity(arena.len());
    for (i, draft) in arena.iter().enumerate() {
        let sub_headers = draft
            .sub_headers
            .iter()
            .filter_map(|&s| built[s].clone())
            .collect();
        built.push(Some(Rc::new(Header {
            id: draft.id.clone(),
            index: draft.index,
            depth: draft.depth,
            column: Rc::clone(&draft.column),
            is_placeholder: draft.is_placeholder,
            placeholder_id: draft.placeholder_id,
            col_span: spans[i],
            sub_headers,
        })));
    }

    groups_bottom_up
        .into_iter()
        .rev()
        .map(|(depth, indices)| {
            let depth_text = depth.to_string();
            Rc::new(HeaderGroup {
                id: header_id(family, &[&depth_text]),
                depth,
                headers: indices.iter().filter_map(|&i| built[i].clone()).collect(),
            })
        })
        .collect()
}

// ============================================================================
// TABLE APIS
// ============================================================================

fn flatten_groups<T>(groups: &[Rc<HeaderGroup<T>>]) -> Vec<Rc<Header<T>>> {
    groups
        .iter()
        .flat_map(|group| group.headers.iter().cloned())
        .collect()
}

fn bottom_headers<T>(groups: &[Rc<HeaderGroup<T>>]) -> Vec<Rc<Header<T>>> {
    groups
        .last()
        .map(|group| group.headers.clone())
        .unwrap_or_default()
}

impl<T: RowData> Table<T> {
    /// Number of header rows needed for the visible columns.
    pub fn get_header_depth(&self) -> usize {
        self.get_visible_leaf_columns()
            .iter()
            .map(|column| column.depth + 1)
            .max()
            .unwrap_or(0)
    }

    fn header_groups_for(
        &self,
        api: &'static str,
        family: &'static str,
        leaves: Rc<Vec<Rc<Column<T>>>>,
    ) -> HeaderGroups<T> {
        let max_depth = self.get_header_depth();
        let compute = |(leaves, max_depth): &(Rc<Vec<Rc<Column<T>>>>, usize)| {
            log_debug!("HEADERS", "building {} header groups", if family.is_empty() { "all" } else { family });
            Rc::new(build_header_groups(leaves, *max_depth, family))
        };
        self.apis
            .memo(api, (Rc::clone(&leaves), max_depth), &compute)
            .unwrap_or_else(|| compute(&(leaves, max_depth)))
    }

    /// Header rows for every visible column, pinned sections included: left
    /// pinned columns first, then center, then right pinned.
    pub fn get_header_groups(&self) -> HeaderGroups<T> {
        let left = self.get_left_visible_leaf_columns();
        let center = self.get_center_visible_leaf_columns();
        let right = self.get_right_visible_leaf_columns();
        let leaves = self
            .apis
            .memo(
                "get_header_leaf_columns",
                (Rc::clone(&left), Rc::clone(&center), Rc::clone(&right)),
                |(left, center, right)| {
                    Rc::new(left.iter().chain(center.iter()).chain(right.iter()).cloned().collect())
                },
            )
            .unwrap_or_else(|| self.get_visible_leaf_columns());
        self.header_groups_for("get_header_groups", "", leaves)
    }

    pub fn get_left_header_groups(&self) -> HeaderGroups<T> {
        if self.store.get::<slice::ColumnPinning>().is_none() {
            return Rc::new(Vec::new());
        }
        self.header_groups_for("get_left_header_groups", "left", self.get_left_visible_leaf_columns())
    }

    pub fn get_center_header_groups(&self) -> HeaderGroups<T> {
        if self.store.get::<slice::ColumnPinning>().is_none() {
            return self.get_header_groups();
        }
        self.header_groups_for(
            "get_center_header_groups",
            "center",
            self.get_center_visible_leaf_columns(),
        )
    }

    pub fn get_right_header_groups(&self) -> HeaderGroups<T> {
        if self.store.get::<slice::ColumnPinning>().is_none() {
            return Rc::new(Vec::new());
        }
        self.header_groups_for("get_right_header_groups", "right", self.get_right_visible_leaf_columns())
    }

    /// Header groups bottom first, for drawing footers.
    pub fn get_footer_groups(&self) -> HeaderGroups<T> {
        let groups = self.get_header_groups();
        Rc::new(groups.iter().rev().cloned().collect())
    }

    pub fn get_left_footer_groups(&self) -> HeaderGroups<T> {
        Rc::new(self.get_left_header_groups().iter().rev().cloned().collect())
    }

    pub fn get_center_footer_groups(&self) -> HeaderGroups<T> {
        Rc::new(self.get_center_header_groups().iter().rev().cloned().collect())
    }

    pub fn get_right_footer_groups(&self) -> HeaderGroups<T> {
        Rc::new(self.get_right_header_groups().iter().rev().cloned().collect())
    }

    /// Every header of every group, top group first.
    pub fn get_flat_headers(&self) -> Headers<T> {
        let groups = self.get_header_groups();
        self.apis
            .memo("get_flat_headers", (Rc::clone(&groups),), |(groups,)| {
                Rc::new(flatten_groups(groups))
            })
            .unwrap_or_else(|| Rc::new(flatten_groups(&groups)))
    }

    pub fn get_left_flat_headers(&self) -> Headers<T> {
        Rc::new(flatten_groups(&self.get_left_header_groups()))
    }

    pub fn get_center_flat_headers(&self) -> Headers<T> {
        Rc::new(flatten_groups(&self.get_center_header_groups()))
    }

    pub fn get_right_flat_headers(&self) -> Headers<T> {
        Rc::new(flatten_groups(&self.get_right_header_groups()))
    }

    /// The bottom header of every visible leaf column.
    pub fn get_leaf_headers(&self) -> Headers<T> {
        let groups = self.get_header_groups();
        self.apis
            .memo("get_leaf_headers", (Rc::clone(&groups),), |(groups,)| {
                Rc::new(bottom_headers(groups))
            })
            .unwrap_or_else(|| Rc::new(bottom_headers(&groups)))
    }

    pub fn get_left_leaf_headers(&self) -> Headers<T> {
        Rc::new(bottom_headers(&self.get_left_header_groups()))
    }

    pub fn get_center_leaf_headers(&self) -> Headers<T> {
        Rc::new(bottom_headers(&self.get_center_header_groups()))
    }

    pub fn get_right_leaf_headers(&self) -> Headers<T> {
        Rc::new(bottom_headers(&self.get_right_header_groups()))
    }
}
