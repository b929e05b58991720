//! First-fit grid placement and overlap validation.

use crate::error::SceneError;
use crate::layout::{GridConstraints, LayoutItem, Placement};
use tracing::trace;

/// Grid layout over a fixed number of columns and unbounded rows.
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    constraints: GridConstraints,
}

impl GridLayout {
    pub fn new(constraints: GridConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &GridConstraints {
        &self.constraints
    }

    /// Assign a cell to every item.
    ///
    /// Explicitly positioned items keep their cells and are reserved first.
    /// Auto-placed items then go, in child order, into the first free cell
    /// scanning top-to-bottom, left-to-right. Floating items never reserve
    /// cells. The result is in child order.
    pub fn place(&self, items: &[LayoutItem]) -> Result<Vec<Placement>, SceneError> {
        let c = &self.constraints;
        let mut placements: Vec<Option<Placement>> = vec![None; items.len()];
        let mut occupied: Vec<Placement> = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if !item.meta.is_explicit() {
                continue;
            }
            let (width, height) = self.size_of(item)?;
            let x = item.meta.x.unwrap_or(0);
            let y = item.meta.y.unwrap_or(0);
            let inside = x.checked_add(width).is_some_and(|right| right <= c.columns)
                && y.checked_add(height).is_some();
            if !inside {
                return Err(out_of_bounds(item, x, width, c.columns));
            }
            let placement = Placement {
                key: item.key.clone(),
                x,
                y,
                width,
                height,
                is_floating: item.meta.is_floating,
            };
            if !placement.is_floating {
                occupied.push(placement.clone());
            }
            placements[index] = Some(placement);
        }

        for (index, item) in items.iter().enumerate() {
            if item.meta.is_explicit() {
                continue;
            }
            let (width, height) = self.size_of(item)?;
            let placement = self.first_fit(item, width, height, &occupied)?;
            trace!(node = %item.key, x = placement.x, y = placement.y, "Auto-placed");
            if !placement.is_floating {
                occupied.push(placement.clone());
            }
            placements[index] = Some(placement);
        }

        Ok(placements.into_iter().flatten().collect())
    }

    /// Fail with the first overlapping pair of non-floating placements, in child order.
    pub fn validate(&self, placements: &[Placement]) -> Result<(), SceneError> {
        for (i, first) in placements.iter().enumerate() {
            if first.is_floating {
                continue;
            }
            for second in &placements[i + 1..] {
                if !second.is_floating && first.intersects(second) {
                    return Err(SceneError::LayoutConflict {
                        first: first.key.clone(),
                        second: second.key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Full layout pass for one container. A collapsed container lays out
    /// nothing; its children keep their metadata for when it expands.
    pub fn arrange(
        &self,
        collapsed: bool,
        items: &[LayoutItem],
    ) -> Result<Vec<Placement>, SceneError> {
        if collapsed {
            return Ok(Vec::new());
        }
        let placements = self.place(items)?;
        self.validate(&placements)?;
        Ok(placements)
    }

    fn size_of(&self, item: &LayoutItem) -> Result<(u32, u32), SceneError> {
        let c = &self.constraints;
        let width = item.meta.width.unwrap_or(c.default_width).max(c.min_width);
        let height = item.meta.height.unwrap_or(c.default_height).max(c.min_height);
        if width > c.columns {
            return Err(out_of_bounds(
                item,
                item.meta.x.unwrap_or(0),
                width,
                c.columns,
            ));
        }
        Ok((width, height))
    }

    /// The topmost, then leftmost, free cell. Such a cell always starts at 0
    /// or on the bottom (right) edge of an occupied cell, so only those rows
    /// and columns are tried.
    fn first_fit(
        &self,
        item: &LayoutItem,
        width: u32,
        height: u32,
        occupied: &[Placement],
    ) -> Result<Placement, SceneError> {
        let columns = self.constraints.columns;
        let rows = candidate_edges(occupied.iter().map(Placement::bottom), u64::MAX);
        let cols = candidate_edges(
            occupied.iter().map(Placement::right),
            u64::from(columns - width),
        );
        for &y in &rows {
            for &x in &cols {
                let candidate = Placement {
                    key: item.key.clone(),
                    x,
                    y,
                    width,
                    height,
                    is_floating: item.meta.is_floating,
                };
                if y.checked_add(height).is_some()
                    && occupied.iter().all(|cell| !cell.intersects(&candidate))
                {
                    return Ok(candidate);
                }
            }
        }
        Err(out_of_bounds(item, 0, width, columns))
    }
}

/// 0 plus every edge up to `limit`, ascending, narrowed to `u32`.
fn candidate_edges(edges: impl Iterator<Item = u64>, limit: u64) -> Vec<u32> {
    let mut out: Vec<u32> = std::iter::once(0)
        .chain(edges)
        .filter(|edge| *edge <= limit)
        .filter_map(|edge| u32::try_from(edge).ok())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn out_of_bounds(item: &LayoutItem, x: u32, width: u32, columns: u32) -> SceneError {
    SceneError::OutOfBounds {
        node: item.key.clone(),
        x,
        width,
        columns,
    }
}
