// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid layout driven by track templates.

use kurbo::{Point, Size};

use super::lazy::{LazyRows, RowSpec, plan_rows};
use super::template::{GridTemplate, TrackSizes, track_offsets, track_total};
use super::{JumpRequest, LayoutAlgorithm, ScrollMetrics};
use crate::constraint::LayoutConstraint;
use crate::cx::LayoutCx;
use crate::geometry::{Axis, OptionalSize, inflate};

/// A grid of cells.
///
/// The mode follows from which templates are set:
///
/// - Columns and rows: a fixed grid. Children fill cells in row-major order; children beyond
///   the last cell are inactive.
/// - Columns only: a vertically scrolling grid whose rows are sized by their content and
///   virtualized like a [`List`](super::List) with one lane per column.
/// - Rows only: the same, scrolling horizontally with one lane per row.
/// - Neither: a single-column scrolling grid.
///
/// ```
/// use arbor_layout::{Grid, LayoutTree, Leaf, NodeStyle};
/// use kurbo::{Point, Size};
///
/// let mut tree = LayoutTree::new();
/// let grid = Grid::new()
///     .with_columns_template("1fr 1fr")
///     .with_rows_template("50px 50px")
///     .with_gaps(10.0, 10.0);
/// let root = tree.insert(None, NodeStyle::fixed(110.0, 110.0), grid);
/// let cells: Vec<_> = (0..4)
///     .map(|_| tree.insert(Some(root), NodeStyle::default(), Leaf::new(Size::new(5.0, 5.0))))
///     .collect();
/// tree.flush(Size::new(200.0, 200.0));
/// assert_eq!(tree.geometry(cells[3]).unwrap().frame_offset, Point::new(60.0, 60.0));
/// ```
#[derive(Debug, Default)]
pub struct Grid {
    columns: Option<GridTemplate>,
    rows: Option<GridTemplate>,
    /// Gap between rows.
    pub row_gap: f64,
    /// Gap between columns.
    pub column_gap: f64,
    /// Rows kept active beyond each viewport edge in scrolling mode.
    pub cached_count: usize,
    state: LazyRows,
    /// Cell origins of the fixed grid, per child, from the last measure.
    cells: Vec<Option<Point>>,
}

impl Grid {
    /// A single-column scrolling grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cached_count: 1,
            ..Self::default()
        }
    }

    /// Sets the columns template from text. Invalid text falls back to one `1fr` track.
    #[must_use]
    pub fn with_columns_template(mut self, text: &str) -> Self {
        self.set_columns_template(Some(text));
        self
    }

    /// Sets the rows template from text. Invalid text falls back to one `1fr` track.
    #[must_use]
    pub fn with_rows_template(mut self, text: &str) -> Self {
        self.set_rows_template(Some(text));
        self
    }

    /// Sets the row and column gaps.
    #[must_use]
    pub fn with_gaps(mut self, row_gap: f64, column_gap: f64) -> Self {
        self.row_gap = row_gap.max(0.0);
        self.column_gap = column_gap.max(0.0);
        self
    }

    /// Sets or clears the columns template.
    pub fn set_columns_template(&mut self, text: Option<&str>) {
        self.columns = text.map(GridTemplate::parse_or_default);
        self.reset();
    }

    /// Sets or clears the rows template.
    pub fn set_rows_template(&mut self, text: Option<&str>) {
        self.rows = text.map(GridTemplate::parse_or_default);
        self.reset();
    }

    /// The columns template, if set.
    #[must_use]
    pub fn columns(&self) -> Option<&GridTemplate> {
        self.columns.as_ref()
    }

    /// The rows template, if set.
    #[must_use]
    pub fn rows(&self) -> Option<&GridTemplate> {
        self.rows.as_ref()
    }

    /// The scroll axis, or `None` for a fixed grid.
    #[must_use]
    pub fn scroll_axis(&self) -> Option<Axis> {
        match (&self.columns, &self.rows) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(Axis::Horizontal),
            _ => Some(Axis::Vertical),
        }
    }

    fn reset(&mut self) {
        self.state = LazyRows::default();
        self.cells.clear();
    }

    fn measure_fixed(
        &mut self,
        cx: &mut LayoutCx<'_>,
        content: &LayoutConstraint,
        columns: &GridTemplate,
        rows: &GridTemplate,
    ) -> Size {
        let width = content.main_limit(Axis::Horizontal).unwrap_or(f64::INFINITY);
        let height = content.main_limit(Axis::Vertical).unwrap_or(f64::INFINITY);
        let col_sizes = columns.resolve(width, self.column_gap);
        let row_sizes = rows.resolve(height, self.row_gap);
        let col_offsets = track_offsets(&col_sizes, self.column_gap);
        let row_offsets = track_offsets(&row_sizes, self.row_gap);
        let capacity = col_sizes.len() * row_sizes.len();

        self.cells.clear();
        for (index, child) in cx.children().into_iter().enumerate() {
            if index >= capacity {
                cx.set_child_active(child, false);
                self.cells.push(None);
                continue;
            }
            let (row, col) = (index / col_sizes.len(), index % col_sizes.len());
            let cell = Size::new(col_sizes[col], row_sizes[row]);
            let cell_constraint = LayoutConstraint {
                min_size: Size::ZERO,
                max_size: cell,
                self_ideal_size: OptionalSize::from_size(cell),
                parent_ideal_size: content.self_ideal_size,
                percent_reference: cell,
            };
            cx.set_child_active(child, true);
            cx.measure_child(child, &cell_constraint);
            self.cells.push(Some(Point::new(col_offsets[col], row_offsets[row])));
        }
        Size::new(
            track_total(&col_sizes, self.column_gap),
            track_total(&row_sizes, self.row_gap),
        )
    }

    fn measure_lazy(
        &mut self,
        cx: &mut LayoutCx<'_>,
        content: &LayoutConstraint,
        axis: Axis,
    ) -> Size {
        let (template, lane_gap, main_gap) = match axis {
            Axis::Vertical => (self.columns.clone(), self.column_gap, self.row_gap),
            Axis::Horizontal => (self.rows.clone(), self.row_gap, self.column_gap),
        };
        let template = template.unwrap_or_default();
        let cross = content.main_limit(axis.cross());
        let sizes: TrackSizes = template.resolve(cross.unwrap_or(f64::INFINITY), lane_gap);
        let offsets = track_offsets(&sizes, lane_gap);
        let (rows, full_span) = plan_rows(core::iter::repeat_n(false, cx.child_count()), sizes.len());
        let spec = RowSpec {
            axis,
            lanes: &sizes,
            lane_offsets: &offsets,
            cross_extent: cross.unwrap_or_else(|| track_total(&sizes, lane_gap)),
            main_gap,
            cached_count: self.cached_count,
            viewport: content.main_limit(axis),
            rows,
            full_span,
        };
        let metrics = self.state.measure(cx, &spec);
        axis.size(
            metrics.content_extent,
            cross.unwrap_or_else(|| track_total(&sizes, lane_gap)),
        )
    }
}

impl LayoutAlgorithm for Grid {
    fn measure(&mut self, cx: &mut LayoutCx<'_>, constraint: &LayoutConstraint) -> Size {
        let padding = cx.padding();
        let content = constraint.deflate(padding);
        let desired = match (self.columns.clone(), self.rows.clone(), self.scroll_axis()) {
            (Some(columns), Some(rows), _) => self.measure_fixed(cx, &content, &columns, &rows),
            (_, _, axis) => {
                let axis = axis.unwrap_or_default();
                let size = self.measure_lazy(cx, &content, axis);
                let frame = constraint.resolve(inflate(size, padding));
                self.state
                    .set_viewport_length((axis.main(frame) - axis.main_insets(padding)).max(0.0));
                size
            }
        };
        inflate(desired, padding)
    }

    fn layout(&mut self, cx: &mut LayoutCx<'_>) {
        match self.scroll_axis() {
            Some(axis) => self.state.layout(cx, axis),
            None => {
                for (child, cell) in cx.children().into_iter().zip(self.cells.clone()) {
                    if let Some(origin) = cell {
                        cx.place_child(child, origin);
                    }
                }
            }
        }
    }

    fn clips_children(&self) -> bool {
        true
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        self.scroll_axis().map(|_| self.state.metrics())
    }

    fn set_scroll_offset(&mut self, offset: f64) -> bool {
        self.scroll_axis().is_some() && self.state.set_offset(offset)
    }

    fn jump_to_index(&mut self, request: JumpRequest) -> bool {
        self.scroll_axis().is_some() && self.state.request_jump(request)
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;
    use crate::algorithm::Leaf;
    use crate::geometry::Axis;
    use crate::tree::LayoutTree;
    use crate::types::{Dimension, NodeId, NodeStyle};
    use kurbo::{Point, Size};

    fn fill() -> NodeStyle {
        NodeStyle {
            width: Dimension::MatchParent,
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        }
    }

    fn add(tree: &mut LayoutTree, parent: NodeId, count: usize, style: NodeStyle, size: Size) -> Vec<NodeId> {
        (0..count)
            .map(|_| tree.insert(Some(parent), style.clone(), Leaf::new(size)))
            .collect()
    }

    #[test]
    fn fixed_grid_fills_cells_row_major() {
        let mut tree = LayoutTree::new();
        let grid = Grid::new()
            .with_columns_template("1fr 1fr")
            .with_rows_template("1fr 1fr")
            .with_gaps(10.0, 10.0);
        let root = tree.insert(None, fill(), grid);
        let cells = add(&mut tree, root, 5, fill(), Size::ZERO);
        tree.flush(Size::new(110.0, 110.0));

        let offset = |id: NodeId| tree.geometry(id).unwrap().frame_offset;
        assert_eq!(offset(cells[0]), Point::new(0.0, 0.0));
        assert_eq!(offset(cells[1]), Point::new(60.0, 0.0));
        assert_eq!(offset(cells[2]), Point::new(0.0, 60.0));
        assert_eq!(offset(cells[3]), Point::new(60.0, 60.0));
        assert_eq!(tree.geometry(cells[3]).unwrap().frame_size, Size::new(50.0, 50.0));
        assert!(!tree.is_active(cells[4]));
        assert!(tree.scroll_metrics(root).is_none());
        assert!(!tree.set_scroll_offset(root, -10.0));
    }

    #[test]
    fn auto_children_keep_content_size_inside_cells() {
        let mut tree = LayoutTree::new();
        let grid = Grid::new()
            .with_columns_template("100px 1fr")
            .with_rows_template("40px");
        let root = tree.insert(None, fill(), grid);
        let cells = add(&mut tree, root, 2, NodeStyle::default(), Size::new(30.0, 80.0));
        tree.flush(Size::new(300.0, 100.0));

        assert_eq!(tree.geometry(cells[0]).unwrap().frame_size, Size::new(30.0, 40.0));
        assert_eq!(tree.geometry(cells[1]).unwrap().frame_offset, Point::new(100.0, 0.0));
    }

    #[test]
    fn columns_only_grid_scrolls_and_virtualizes() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, fill(), Grid::new().with_columns_template("repeat(3, 1fr)"));
        let items = add(&mut tree, root, 30, NodeStyle::default(), Size::new(10.0, 40.0));
        tree.flush(Size::new(90.0, 100.0));

        let offset = |tree: &LayoutTree, id: NodeId| tree.geometry(id).unwrap().frame_offset;
        assert_eq!(offset(&tree, items[4]), Point::new(30.0, 40.0));
        assert_eq!(offset(&tree, items[8]), Point::new(60.0, 80.0));
        assert!(tree.is_active(items[11]));
        assert!(!tree.is_active(items[12]));

        let metrics = tree.scroll_metrics(root).unwrap();
        assert_eq!(metrics.axis, Axis::Vertical);
        assert_eq!(metrics.content_extent, 400.0);
        assert_eq!(metrics.end_index, 12);

        assert!(tree.set_scroll_offset(root, -120.0));
        tree.flush(Size::new(90.0, 100.0));
        assert_eq!(offset(&tree, items[9]), Point::new(0.0, 0.0));
        assert!(!tree.is_active(items[5]));
    }

    #[test]
    fn rows_only_grid_scrolls_horizontally() {
        let mut tree = LayoutTree::new();
        let grid = Grid::new().with_rows_template("1fr 1fr").with_gaps(0.0, 5.0);
        let root = tree.insert(None, fill(), grid);
        let items = add(&mut tree, root, 6, NodeStyle::default(), Size::new(30.0, 10.0));
        tree.flush(Size::new(100.0, 100.0));

        let offset = |id: NodeId| tree.geometry(id).unwrap().frame_offset;
        assert_eq!(offset(items[1]), Point::new(0.0, 50.0));
        assert_eq!(offset(items[2]), Point::new(35.0, 0.0));
        assert_eq!(tree.scroll_metrics(root).unwrap().axis, Axis::Horizontal);
    }

    #[test]
    fn invalid_template_falls_back_to_one_track() {
        let grid = Grid::new().with_columns_template("3 bananas");
        assert_eq!(grid.columns().map(|t| t.len()), Some(1));
    }
}
