//! The fixed-level analyzer: a prior whole-tensor pass that computes the
//! maximum segment fan-out a `Fixed` mode must pad every segment to.
//!
//! Grounded on `findMaxFixedValue` in the original packer: the "levels above
//! the fixed one" branch is a single O(n) pass over the current subtree that
//! both finds the maximum run length and filters coordinates sharing it,
//! rather than a sort or a hash-based dedup.

/// Coordinates visible to the analyzer: one slice per axis, all the same
/// length, holding the subtree currently under consideration.
pub struct CoordSlices<'a> {
    pub axes: Vec<&'a [i64]>,
}

impl<'a> CoordSlices<'a> {
    pub fn new(axes: Vec<&'a [i64]>) -> Self {
        Self { axes }
    }

    fn order(&self) -> usize {
        self.axes.len()
    }
}

/// Computes the maximum segment fan-out observed at `fixed_level` across
/// every parent prefix in `coords[0..n)`.
pub fn analyze_fixed_level(coords: &CoordSlices, fixed_level: usize, i: usize, n: usize) -> usize {
    let order = coords.order();

    if i == order {
        return n;
    }

    if n == 0 {
        return 0;
    }

    if i == fixed_level {
        return count_runs(&coords.axes[i][..n]);
    }

    // Find the distinct values at this level that achieve the maximum run
    // length, then recurse into each such run's filtered subtree.
    let level = &coords.axes[i][..n];
    let mut max_size = 0usize;
    let mut max_coords: Vec<i64> = Vec::new();

    let mut cur = level[0];
    let mut cur_size = 1usize;
    for &value in &level[1..n] {
        if value == cur {
            cur_size += 1;
        } else {
            record_run(cur, cur_size, &mut max_size, &mut max_coords);
            cur = value;
            cur_size = 1;
        }
    }
    record_run(cur, cur_size, &mut max_size, &mut max_coords);

    let mut max_fixed_value = 0usize;
    for &parent in &max_coords {
        let mut new_axes: Vec<Vec<i64>> = vec![Vec::new(); order];
        for j in 0..n {
            if coords.axes[i][j] == parent {
                for k in 0..order {
                    new_axes[k].push(coords.axes[k][j]);
                }
            }
        }
        let new_slices = CoordSlices::new(new_axes.iter().map(|v| v.as_slice()).collect());
        let segment = analyze_fixed_level(&new_slices, fixed_level, i + 1, max_size);
        max_fixed_value = max_fixed_value.max(segment);
    }

    max_fixed_value
}

fn record_run(value: i64, size: usize, max_size: &mut usize, max_coords: &mut Vec<i64>) {
    match size.cmp(max_size) {
        std::cmp::Ordering::Greater => {
            *max_size = size;
            max_coords.clear();
            max_coords.push(value);
        }
        std::cmp::Ordering::Equal => {
            max_coords.push(value);
        }
        std::cmp::Ordering::Less => {}
    }
}

/// Counts distinct runs in an already-sorted slice.
fn count_runs(sorted: &[i64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    let mut count = 1;
    for w in sorted.windows(2) {
        if w[1] != w[0] {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn empty_input_is_zero() {
        let coords = CoordSlices::new(vec![&[], &[]]);
        assert_eq!(analyze_fixed_level(&coords, 1, 0, 0), 0);
    }

    #[test]
    fn s4_fixed_inner_fanout_is_two() {
        // Dimensions [2,3]; COO (0,0),(0,2),(1,1); fixed_level = 1 (inner mode).
        let rows = [0i64, 0, 1];
        let cols = [0i64, 2, 1];
        let coords = CoordSlices::new(vec![&rows, &cols]);
        assert_eq!(analyze_fixed_level(&coords, 1, 0, 3), 2);
    }

    #[test]
    fn fixed_at_outermost_level_is_run_count() {
        let rows = [0i64, 0, 1, 1, 1];
        let coords = CoordSlices::new(vec![&rows]);
        assert_eq!(analyze_fixed_level(&coords, 0, 0, 5), 2);
    }

    #[test]
    fn terminal_level_returns_n() {
        let coords = CoordSlices::new(vec![]);
        assert_eq!(analyze_fixed_level(&coords, 0, 0, 7), 7);
    }
}
