//! Table structure detection.
//!
//! The detector turns page edges (painted, synthetic, explicit, or derived
//! from text alignment) into a grid of cells: snap nearby parallel edges,
//! join collinear segments, intersect, build cells from complete corner
//! sets, then group adjacent cells into distinct tables.

use std::collections::BTreeMap;
use std::fmt;

use crate::edges::{Edge, EdgeSource};
use crate::geometry::{BBox, Orientation};
use crate::text::Char;
use crate::words::{Word, WordExtractor, WordOptions};

/// Detection strategy for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Strategy {
    /// Use visible lines and rect edges.
    #[default]
    Lines,
    /// Use only painted (or injected) lines, ignoring rect edges.
    LinesStrict,
    /// Derive ruling positions from text alignment patterns.
    Text,
    /// Use caller-supplied explicit line coordinates.
    Explicit,
}

impl Strategy {
    /// Parse a stored-template strategy name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lines" => Some(Strategy::Lines),
            "lines_strict" => Some(Strategy::LinesStrict),
            "text" => Some(Strategy::Text),
            "explicit" => Some(Strategy::Explicit),
            _ => None,
        }
    }
}

/// Configuration for table detection.
///
/// All tolerances default to 3.0. Stored templates carry overrides as a
/// name/value bag; [`TableSettings::apply_override`] preserves that
/// contract on top of the fully-defaulted struct.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSettings {
    /// Strategy for vertical ruling detection (columns).
    pub vertical_strategy: Strategy,
    /// Strategy for horizontal ruling detection (rows).
    pub horizontal_strategy: Strategy,
    /// General snap tolerance for aligning nearby edges.
    pub snap_tolerance: f64,
    /// Snap tolerance along x (vertical edges).
    pub snap_x_tolerance: f64,
    /// Snap tolerance along y (horizontal edges).
    pub snap_y_tolerance: f64,
    /// General gap-closing tolerance for collinear segments.
    pub join_tolerance: f64,
    /// Join tolerance along x.
    pub join_x_tolerance: f64,
    /// Join tolerance along y.
    pub join_y_tolerance: f64,
    /// Minimum edge length considered for detection.
    pub edge_min_length: f64,
    /// Minimum words sharing a vertical alignment to form a column line.
    pub min_words_vertical: usize,
    /// Minimum words sharing a horizontal alignment to form a row line.
    pub min_words_horizontal: usize,
    /// General text-alignment tolerance.
    pub text_tolerance: f64,
    /// Text-alignment tolerance along x.
    pub text_x_tolerance: f64,
    /// Text-alignment tolerance along y.
    pub text_y_tolerance: f64,
    /// General tolerance for detecting edge crossings.
    pub intersection_tolerance: f64,
    /// Intersection tolerance along x.
    pub intersection_x_tolerance: f64,
    /// Intersection tolerance along y.
    pub intersection_y_tolerance: f64,
    /// X coordinates for explicit vertical lines.
    pub explicit_vertical_lines: Vec<f64>,
    /// Y coordinates for explicit horizontal lines.
    pub explicit_horizontal_lines: Vec<f64>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            vertical_strategy: Strategy::Lines,
            horizontal_strategy: Strategy::Lines,
            snap_tolerance: 3.0,
            snap_x_tolerance: 3.0,
            snap_y_tolerance: 3.0,
            join_tolerance: 3.0,
            join_x_tolerance: 3.0,
            join_y_tolerance: 3.0,
            edge_min_length: 3.0,
            min_words_vertical: 3,
            min_words_horizontal: 1,
            text_tolerance: 3.0,
            text_x_tolerance: 3.0,
            text_y_tolerance: 3.0,
            intersection_tolerance: 3.0,
            intersection_x_tolerance: 3.0,
            intersection_y_tolerance: 3.0,
            explicit_vertical_lines: Vec::new(),
            explicit_horizontal_lines: Vec::new(),
        }
    }
}

/// A single override value from a stored settings bag.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Text(String),
    Numbers(Vec<f64>),
}

/// Error applying a settings-bag override.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSettingsError {
    /// The override key is not a known setting.
    UnknownSetting(String),
    /// The value has the wrong shape for the named setting.
    InvalidValue { name: String, expected: &'static str },
}

impl fmt::Display for TableSettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSettingsError::UnknownSetting(name) => {
                write!(f, "unknown table setting: {name}")
            }
            TableSettingsError::InvalidValue { name, expected } => {
                write!(f, "invalid value for table setting {name}: expected {expected}")
            }
        }
    }
}

impl std::error::Error for TableSettingsError {}

impl TableSettings {
    /// Apply one named override.
    ///
    /// Generic tolerance names (`snap_tolerance`, `join_tolerance`,
    /// `text_tolerance`, `intersection_tolerance`) also set their per-axis
    /// variants, matching how stored templates used the original options
    /// bag. Per-axis names override only their own axis.
    pub fn apply_override(&mut self, name: &str, value: &SettingValue) -> Result<(), TableSettingsError> {
        fn number(name: &str, value: &SettingValue) -> Result<f64, TableSettingsError> {
            match value {
                SettingValue::Number(n) => Ok(*n),
                _ => Err(TableSettingsError::InvalidValue {
                    name: name.to_string(),
                    expected: "number",
                }),
            }
        }
        fn count(name: &str, value: &SettingValue) -> Result<usize, TableSettingsError> {
            match value {
                SettingValue::Number(n) if *n >= 0.0 => Ok(*n as usize),
                _ => Err(TableSettingsError::InvalidValue {
                    name: name.to_string(),
                    expected: "non-negative integer",
                }),
            }
        }
        fn strategy(name: &str, value: &SettingValue) -> Result<Strategy, TableSettingsError> {
            match value {
                SettingValue::Text(s) => {
                    Strategy::from_name(s).ok_or_else(|| TableSettingsError::InvalidValue {
                        name: name.to_string(),
                        expected: "one of lines, lines_strict, text, explicit",
                    })
                }
                _ => Err(TableSettingsError::InvalidValue {
                    name: name.to_string(),
                    expected: "strategy name",
                }),
            }
        }
        fn numbers(name: &str, value: &SettingValue) -> Result<Vec<f64>, TableSettingsError> {
            match value {
                SettingValue::Numbers(v) => Ok(v.clone()),
                _ => Err(TableSettingsError::InvalidValue {
                    name: name.to_string(),
                    expected: "list of numbers",
                }),
            }
        }

        match name {
            "vertical_strategy" => self.vertical_strategy = strategy(name, value)?,
            "horizontal_strategy" => self.horizontal_strategy = strategy(name, value)?,
            "snap_tolerance" => {
                let v = number(name, value)?;
                self.snap_tolerance = v;
                self.snap_x_tolerance = v;
                self.snap_y_tolerance = v;
            }
            "snap_x_tolerance" => self.snap_x_tolerance = number(name, value)?,
            "snap_y_tolerance" => self.snap_y_tolerance = number(name, value)?,
            "join_tolerance" => {
                let v = number(name, value)?;
                self.join_tolerance = v;
                self.join_x_tolerance = v;
                self.join_y_tolerance = v;
            }
            "join_x_tolerance" => self.join_x_tolerance = number(name, value)?,
            "join_y_tolerance" => self.join_y_tolerance = number(name, value)?,
            "edge_min_length" => self.edge_min_length = number(name, value)?,
            "min_words_vertical" => self.min_words_vertical = count(name, value)?,
            "min_words_horizontal" => self.min_words_horizontal = count(name, value)?,
            "text_tolerance" => {
                let v = number(name, value)?;
                self.text_tolerance = v;
                self.text_x_tolerance = v;
                self.text_y_tolerance = v;
            }
            "text_x_tolerance" => self.text_x_tolerance = number(name, value)?,
            "text_y_tolerance" => self.text_y_tolerance = number(name, value)?,
            "intersection_tolerance" => {
                let v = number(name, value)?;
                self.intersection_tolerance = v;
                self.intersection_x_tolerance = v;
                self.intersection_y_tolerance = v;
            }
            "intersection_x_tolerance" => self.intersection_x_tolerance = number(name, value)?,
            "intersection_y_tolerance" => self.intersection_y_tolerance = number(name, value)?,
            "explicit_vertical_lines" => self.explicit_vertical_lines = numbers(name, value)?,
            "explicit_horizontal_lines" => self.explicit_horizontal_lines = numbers(name, value)?,
            _ => return Err(TableSettingsError::UnknownSetting(name.to_string())),
        }
        Ok(())
    }
}

/// A detected cell within a table grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    /// Bounding box of the cell.
    pub bbox: BBox,
    /// Text content, filled by [`fill_cell_text`].
    pub text: Option<String>,
}

/// A detected table: cells organized into rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    /// Bounding box enclosing the entire table.
    pub bbox: BBox,
    /// Cells organized top-to-bottom, left-to-right within each row.
    pub rows: Vec<Vec<GridCell>>,
}

impl TableGrid {
    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// An intersection point between horizontal and vertical edges, with the
/// indices of the edges passing through it.
#[derive(Debug, Clone, PartialEq)]
struct Crossing {
    x: f64,
    y: f64,
    h_edges: std::collections::BTreeSet<usize>,
    v_edges: std::collections::BTreeSet<usize>,
}

/// Quantize a coordinate for grouping (3 decimal places).
fn coord_key(v: f64) -> i64 {
    (v * 1000.0).round() as i64
}

/// Cluster a sorted slice of items along one coordinate and snap each
/// cluster to its mean.
fn snap_cluster<T>(items: &mut [T], tolerance: f64, key: impl Fn(&T) -> f64, set: impl Fn(&mut T, f64)) {
    if items.is_empty() {
        return;
    }
    items.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap());

    let mut start = 0;
    for i in 1..=items.len() {
        let boundary = i == items.len() || (key(&items[i]) - key(&items[start])).abs() > tolerance;
        if boundary {
            let mean = (start..i).map(|j| key(&items[j])).sum::<f64>() / (i - start) as f64;
            for item in &mut items[start..i] {
                set(item, mean);
            }
            start = i;
        }
    }
}

/// Snap nearby parallel edges to shared positions.
///
/// Horizontal edges cluster by y within `snap_y_tolerance`; vertical edges
/// cluster by x within `snap_x_tolerance`. Diagonals pass through.
pub fn snap_edges(edges: Vec<Edge>, snap_x_tolerance: f64, snap_y_tolerance: f64) -> Vec<Edge> {
    let (mut horizontal, rest): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);
    let (mut vertical, mut out): (Vec<Edge>, Vec<Edge>) =
        rest.into_iter().partition(|e| e.orientation == Orientation::Vertical);

    snap_cluster(&mut horizontal, snap_y_tolerance, |e| e.top, |e, v| {
        e.top = v;
        e.bottom = v;
    });
    snap_cluster(&mut vertical, snap_x_tolerance, |e| e.x0, |e, v| {
        e.x0 = v;
        e.x1 = v;
    });

    out.extend(horizontal);
    out.extend(vertical);
    out
}

/// Merge overlapping or near-adjacent collinear segments.
///
/// Horizontal edges on the same y-line merge when their x-gap is within
/// `join_x_tolerance`; vertical edges analogously along y. Run after
/// [`snap_edges`] so collinear groups share exact positions.
pub fn join_edges(edges: Vec<Edge>, join_x_tolerance: f64, join_y_tolerance: f64) -> Vec<Edge> {
    let (horizontal, rest): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);
    let (vertical, mut out): (Vec<Edge>, Vec<Edge>) =
        rest.into_iter().partition(|e| e.orientation == Orientation::Vertical);

    out.extend(join_collinear(
        horizontal,
        join_x_tolerance,
        |e| e.top,
        |e| (e.x0, e.x1),
        |proto, start, end| Edge {
            x0: start,
            x1: end,
            ..proto.clone()
        },
    ));
    out.extend(join_collinear(
        vertical,
        join_y_tolerance,
        |e| e.x0,
        |e| (e.top, e.bottom),
        |proto, start, end| Edge {
            top: start,
            bottom: end,
            ..proto.clone()
        },
    ));
    out
}

fn join_collinear(
    mut edges: Vec<Edge>,
    tolerance: f64,
    line_of: impl Fn(&Edge) -> f64,
    span_of: impl Fn(&Edge) -> (f64, f64),
    rebuild: impl Fn(&Edge, f64, f64) -> Edge,
) -> Vec<Edge> {
    let mut out = Vec::new();
    if edges.is_empty() {
        return out;
    }

    edges.sort_by(|a, b| {
        line_of(a)
            .partial_cmp(&line_of(b))
            .unwrap()
            .then_with(|| span_of(a).0.partial_cmp(&span_of(b).0).unwrap())
    });

    let mut i = 0;
    while i < edges.len() {
        let line = line_of(&edges[i]);
        let mut j = i + 1;
        while j < edges.len() && (line_of(&edges[j]) - line).abs() < 1e-9 {
            j += 1;
        }

        let (mut start, mut end) = span_of(&edges[i]);
        let mut proto = i;
        for k in (i + 1)..j {
            let (s, e) = span_of(&edges[k]);
            if s <= end + tolerance {
                end = end.max(e);
            } else {
                out.push(rebuild(&edges[proto], start, end));
                start = s;
                end = e;
                proto = k;
            }
        }
        out.push(rebuild(&edges[proto], start, end));
        i = j;
    }
    out
}

/// Find crossings between horizontal and vertical edges.
///
/// A crossing exists where a vertical edge's x falls within a horizontal
/// edge's x-span (within `x_tolerance`) and the horizontal edge's y falls
/// within the vertical edge's y-span (within `y_tolerance`). Only actual
/// overlapping segments count; diagonals are ignored.
fn find_crossings(edges: &[Edge], x_tolerance: f64, y_tolerance: f64) -> Vec<Crossing> {
    use std::collections::{BTreeMap, BTreeSet};

    let mut by_point: BTreeMap<(i64, i64), Crossing> = BTreeMap::new();
    for (hi, h) in edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.orientation == Orientation::Horizontal)
    {
        for (vi, v) in edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.orientation == Orientation::Vertical)
        {
            let in_x_span = v.x0 >= h.x0 - x_tolerance && v.x0 <= h.x1 + x_tolerance;
            let in_y_span = h.top >= v.top - y_tolerance && h.top <= v.bottom + y_tolerance;
            if in_x_span && in_y_span {
                let crossing = by_point
                    .entry((coord_key(v.x0), coord_key(h.top)))
                    .or_insert_with(|| Crossing {
                        x: v.x0,
                        y: h.top,
                        h_edges: BTreeSet::new(),
                        v_edges: BTreeSet::new(),
                    });
                crossing.h_edges.insert(hi);
                crossing.v_edges.insert(vi);
            }
        }
    }
    by_point.into_values().collect()
}

/// Build cells from crossings.
///
/// Each crossing is a candidate top-left corner: walk the crossings to its
/// right along the same row and below along the same column, and take the
/// smallest rectangle whose four corners exist and are pairwise connected
/// by a shared ruling edge. The connectivity requirement keeps coordinate
/// coincidences between disconnected grids from fusing them into one.
fn crossings_to_cells(crossings: &[Crossing]) -> Vec<GridCell> {
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::ops::Bound;

    if crossings.is_empty() {
        return Vec::new();
    }

    let mut lookup: HashMap<(i64, i64), &Crossing> = HashMap::new();
    let mut by_row: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    let mut by_col: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for c in crossings {
        let (x, y) = (coord_key(c.x), coord_key(c.y));
        lookup.insert((x, y), c);
        by_row.entry(y).or_default().insert(x);
        by_col.entry(x).or_default().insert(y);
    }

    fn shares(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> bool {
        a.intersection(b).next().is_some()
    }
    let cell_exists = |x: i64, y: i64, x1: i64, y1: i64| -> bool {
        let (Some(tl), Some(tr), Some(bl), Some(br)) = (
            lookup.get(&(x, y)),
            lookup.get(&(x1, y)),
            lookup.get(&(x, y1)),
            lookup.get(&(x1, y1)),
        ) else {
            return false;
        };
        shares(&tl.h_edges, &tr.h_edges)
            && shares(&bl.h_edges, &br.h_edges)
            && shares(&tl.v_edges, &bl.v_edges)
            && shares(&tr.v_edges, &br.v_edges)
    };

    let mut cells = Vec::new();
    for (&y, xs) in &by_row {
        for &x in xs {
            'corner: for &x1 in xs.range((Bound::Excluded(x), Bound::Unbounded)) {
                for &y1 in by_col[&x].range((Bound::Excluded(y), Bound::Unbounded)) {
                    if cell_exists(x, y, x1, y1) {
                        cells.push(GridCell {
                            bbox: BBox::new(
                                x as f64 / 1000.0,
                                y as f64 / 1000.0,
                                x1 as f64 / 1000.0,
                                y1 as f64 / 1000.0,
                            ),
                            text: None,
                        });
                        break 'corner;
                    }
                }
            }
        }
    }
    cells
}

/// Group adjacent cells into distinct tables via union-find.
///
/// Cells sharing a boundary segment belong to the same table. Output tables
/// are sorted top-to-bottom then left-to-right, and each table's rows are
/// grouped by top coordinate with left-to-right ordering inside a row, so
/// repeated runs yield identical ordering.
fn cells_to_grids(cells: Vec<GridCell>) -> Vec<TableGrid> {
    if cells.is_empty() {
        return Vec::new();
    }

    let n = cells.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if cells_adjacent(&cells[i], &cells[j]) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }

    let mut grids: Vec<TableGrid> = groups
        .into_values()
        .map(|indices| {
            let mut bbox = cells[indices[0]].bbox;
            for &i in &indices[1..] {
                bbox = bbox.union(&cells[i].bbox);
            }

            let mut row_map: BTreeMap<i64, Vec<GridCell>> = BTreeMap::new();
            for &i in &indices {
                row_map
                    .entry(coord_key(cells[i].bbox.top))
                    .or_default()
                    .push(cells[i].clone());
            }
            let rows: Vec<Vec<GridCell>> = row_map
                .into_values()
                .map(|mut row| {
                    row.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap());
                    row
                })
                .collect();

            TableGrid { bbox, rows }
        })
        .collect();

    grids.sort_by(|a, b| {
        a.bbox
            .top
            .partial_cmp(&b.bbox.top)
            .unwrap()
            .then_with(|| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap())
    });
    grids
}

/// Whether two cells share a boundary segment.
fn cells_adjacent(a: &GridCell, b: &GridCell) -> bool {
    let eps = 1e-6;
    let shared_vertical = ((a.bbox.x1 - b.bbox.x0).abs() < eps || (a.bbox.x0 - b.bbox.x1).abs() < eps)
        && a.bbox.top < b.bbox.bottom + eps
        && b.bbox.top < a.bbox.bottom + eps;
    let shared_horizontal = ((a.bbox.bottom - b.bbox.top).abs() < eps
        || (a.bbox.top - b.bbox.bottom).abs() < eps)
        && a.bbox.x0 < b.bbox.x1 + eps
        && b.bbox.x0 < a.bbox.x1 + eps;
    shared_vertical || shared_horizontal
}

/// Fill structural cell text: chars whose bbox center falls inside a cell,
/// grouped into words and joined with spaces (lines with newlines).
pub fn fill_cell_text(grid: &mut TableGrid, chars: &[Char]) {
    let options = WordOptions::default();
    for row in &mut grid.rows {
        for cell in row {
            let cell_chars: Vec<Char> = chars
                .iter()
                .filter(|ch| cell.bbox.contains_center(&ch.bbox))
                .cloned()
                .collect();
            if cell_chars.is_empty() {
                cell.text = None;
                continue;
            }
            let words = WordExtractor::extract(&cell_chars, &options);
            if words.is_empty() {
                cell.text = None;
                continue;
            }
            let rows = crate::words::group_words_into_rows(&words, options.y_tolerance);
            let text = rows
                .iter()
                .map(|line| {
                    line.iter()
                        .map(|w| w.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n");
            cell.text = Some(text);
        }
    }
}

/// Generate synthetic edges of one orientation from text alignment.
///
/// Words sharing x0 or x1 within `tolerance` produce vertical edges; words
/// sharing top or bottom produce horizontal edges. A cluster must hold at
/// least `min_words` members to qualify.
pub fn words_to_edges(
    words: &[Word],
    orientation: Orientation,
    tolerance: f64,
    min_words: usize,
) -> Vec<Edge> {
    let keys: [fn(&Word) -> f64; 2] = match orientation {
        Orientation::Vertical => [|w| w.bbox.x0, |w| w.bbox.x1],
        Orientation::Horizontal => [|w| w.bbox.top, |w| w.bbox.bottom],
        Orientation::Diagonal => return Vec::new(),
    };

    let mut edges = Vec::new();
    for key in keys {
        edges.extend(cluster_to_edges(words, key, tolerance, min_words, orientation));
    }
    edges
}

fn cluster_to_edges(
    words: &[Word],
    key: fn(&Word) -> f64,
    tolerance: f64,
    min_words: usize,
    orientation: Orientation,
) -> Vec<Edge> {
    if words.is_empty() || min_words == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..words.len()).collect();
    indices.sort_by(|&a, &b| key(&words[a]).partial_cmp(&key(&words[b])).unwrap());

    let mut edges = Vec::new();
    let mut start = 0;
    for i in 1..=indices.len() {
        let boundary = i == indices.len()
            || (key(&words[indices[i]]) - key(&words[indices[start]])).abs() > tolerance;
        if !boundary {
            continue;
        }
        if i - start >= min_words {
            let members: Vec<&Word> = indices[start..i].iter().map(|&j| &words[j]).collect();
            let pos = members.iter().map(|w| key(w)).sum::<f64>() / members.len() as f64;
            let edge = match orientation {
                Orientation::Vertical => {
                    let top = members.iter().map(|w| w.bbox.top).fold(f64::INFINITY, f64::min);
                    let bottom = members
                        .iter()
                        .map(|w| w.bbox.bottom)
                        .fold(f64::NEG_INFINITY, f64::max);
                    Edge {
                        x0: pos,
                        top,
                        x1: pos,
                        bottom,
                        orientation,
                        source: EdgeSource::Text,
                    }
                }
                _ => {
                    let x0 = members.iter().map(|w| w.bbox.x0).fold(f64::INFINITY, f64::min);
                    let x1 = members.iter().map(|w| w.bbox.x1).fold(f64::NEG_INFINITY, f64::max);
                    Edge {
                        x0,
                        top: pos,
                        x1,
                        bottom: pos,
                        orientation,
                        source: EdgeSource::Text,
                    }
                }
            };
            edges.push(edge);
        }
        start = i;
    }
    edges
}

/// Runs the table detection pipeline over a page's edges and words.
pub struct TableFinder {
    edges: Vec<Edge>,
    words: Vec<Word>,
    settings: TableSettings,
}

impl TableFinder {
    pub fn new(edges: Vec<Edge>, words: Vec<Word>, settings: TableSettings) -> Self {
        Self {
            edges,
            words,
            settings,
        }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Run detection: per-axis edge selection → min-length filter → snap →
    /// join → crossings → cells → grids.
    pub fn find_tables(&self) -> Vec<TableGrid> {
        let mut edges = Vec::new();
        edges.extend(self.axis_edges(Orientation::Vertical, self.settings.vertical_strategy));
        edges.extend(self.axis_edges(Orientation::Horizontal, self.settings.horizontal_strategy));

        let min_len = self.settings.edge_min_length;
        let edges: Vec<Edge> = edges.into_iter().filter(|e| e.length() >= min_len).collect();
        if edges.is_empty() {
            return Vec::new();
        }

        let edges = snap_edges(
            edges,
            self.settings.snap_x_tolerance,
            self.settings.snap_y_tolerance,
        );
        let edges = join_edges(
            edges,
            self.settings.join_x_tolerance,
            self.settings.join_y_tolerance,
        );
        let crossings = find_crossings(
            &edges,
            self.settings.intersection_x_tolerance,
            self.settings.intersection_y_tolerance,
        );
        cells_to_grids(crossings_to_cells(&crossings))
    }

    /// Select the edges of one orientation per that axis's strategy.
    fn axis_edges(&self, orientation: Orientation, strategy: Strategy) -> Vec<Edge> {
        match strategy {
            Strategy::Lines => self
                .edges
                .iter()
                .filter(|e| e.orientation == orientation && e.source != EdgeSource::Text)
                .cloned()
                .collect(),
            Strategy::LinesStrict => self
                .edges
                .iter()
                .filter(|e| {
                    e.orientation == orientation
                        && matches!(e.source, EdgeSource::Line | EdgeSource::Synthetic)
                })
                .cloned()
                .collect(),
            Strategy::Text => {
                let (tolerance, min_words) = match orientation {
                    Orientation::Vertical => {
                        (self.settings.text_x_tolerance, self.settings.min_words_vertical)
                    }
                    _ => (self.settings.text_y_tolerance, self.settings.min_words_horizontal),
                };
                words_to_edges(&self.words, orientation, tolerance, min_words)
            }
            Strategy::Explicit => self.explicit_edges(orientation),
        }
    }

    /// Build edges from explicit coordinates, spanning the detected extent.
    fn explicit_edges(&self, orientation: Orientation) -> Vec<Edge> {
        let coords = match orientation {
            Orientation::Vertical => &self.settings.explicit_vertical_lines,
            _ => &self.settings.explicit_horizontal_lines,
        };
        if coords.is_empty() {
            return Vec::new();
        }

        // Span from all known edges plus both explicit coordinate sets.
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for e in &self.edges {
            min_x = min_x.min(e.x0);
            max_x = max_x.max(e.x1);
            min_y = min_y.min(e.top);
            max_y = max_y.max(e.bottom);
        }
        for &x in &self.settings.explicit_vertical_lines {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
        for &y in &self.settings.explicit_horizontal_lines {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if min_x > max_x || min_y > max_y {
            return Vec::new();
        }

        coords
            .iter()
            .map(|&c| match orientation {
                Orientation::Vertical => Edge {
                    x0: c,
                    top: min_y,
                    x1: c,
                    bottom: max_y,
                    orientation,
                    source: EdgeSource::Explicit,
                },
                _ => Edge {
                    x0: min_x,
                    top: c,
                    x1: max_x,
                    bottom: c,
                    orientation,
                    source: EdgeSource::Explicit,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Line;

    fn h_edge(x0: f64, x1: f64, y: f64) -> Edge {
        Edge {
            x0,
            top: y,
            x1,
            bottom: y,
            orientation: Orientation::Horizontal,
            source: EdgeSource::Line,
        }
    }

    fn v_edge(x: f64, top: f64, bottom: f64) -> Edge {
        Edge {
            x0: x,
            top,
            x1: x,
            bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::Line,
        }
    }

    /// Edges forming a 2x2 grid from (0,0) to (100,60).
    fn grid_2x2_edges() -> Vec<Edge> {
        vec![
            h_edge(0.0, 100.0, 0.0),
            h_edge(0.0, 100.0, 30.0),
            h_edge(0.0, 100.0, 60.0),
            v_edge(0.0, 0.0, 60.0),
            v_edge(50.0, 0.0, 60.0),
            v_edge(100.0, 0.0, 60.0),
        ]
    }

    #[test]
    fn test_settings_defaults() {
        let s = TableSettings::default();
        assert_eq!(s.vertical_strategy, Strategy::Lines);
        assert_eq!(s.horizontal_strategy, Strategy::Lines);
        assert_eq!(s.snap_tolerance, 3.0);
        assert_eq!(s.min_words_vertical, 3);
        assert_eq!(s.min_words_horizontal, 1);
        assert!(s.explicit_vertical_lines.is_empty());
    }

    #[test]
    fn test_apply_override_generic_sets_axes() {
        let mut s = TableSettings::default();
        s.apply_override("snap_tolerance", &SettingValue::Number(5.0)).unwrap();
        assert_eq!(s.snap_tolerance, 5.0);
        assert_eq!(s.snap_x_tolerance, 5.0);
        assert_eq!(s.snap_y_tolerance, 5.0);
    }

    #[test]
    fn test_apply_override_axis_specific() {
        let mut s = TableSettings::default();
        s.apply_override("join_y_tolerance", &SettingValue::Number(7.0)).unwrap();
        assert_eq!(s.join_tolerance, 3.0);
        assert_eq!(s.join_x_tolerance, 3.0);
        assert_eq!(s.join_y_tolerance, 7.0);
    }

    #[test]
    fn test_apply_override_strategy() {
        let mut s = TableSettings::default();
        s.apply_override("vertical_strategy", &SettingValue::Text("text".into()))
            .unwrap();
        assert_eq!(s.vertical_strategy, Strategy::Text);
        assert_eq!(s.horizontal_strategy, Strategy::Lines);
    }

    #[test]
    fn test_apply_override_rejects_unknown_key() {
        let mut s = TableSettings::default();
        let err = s
            .apply_override("snap_tollerance", &SettingValue::Number(5.0))
            .unwrap_err();
        assert_eq!(err, TableSettingsError::UnknownSetting("snap_tollerance".into()));
    }

    #[test]
    fn test_apply_override_rejects_wrong_type() {
        let mut s = TableSettings::default();
        assert!(matches!(
            s.apply_override("snap_tolerance", &SettingValue::Text("big".into())),
            Err(TableSettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_snap_edges_clusters_to_mean() {
        let edges = vec![h_edge(0.0, 100.0, 10.0), h_edge(0.0, 100.0, 12.0)];
        let snapped = snap_edges(edges, 3.0, 3.0);
        assert!(snapped.iter().all(|e| e.top == 11.0));
    }

    #[test]
    fn test_snap_edges_respects_tolerance() {
        let edges = vec![h_edge(0.0, 100.0, 10.0), h_edge(0.0, 100.0, 20.0)];
        let mut tops: Vec<f64> = snap_edges(edges, 3.0, 3.0).iter().map(|e| e.top).collect();
        tops.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(tops, vec![10.0, 20.0]);
    }

    #[test]
    fn test_join_edges_merges_within_gap() {
        let edges = vec![h_edge(0.0, 48.0, 10.0), h_edge(50.0, 100.0, 10.0)];
        let joined = join_edges(edges, 3.0, 3.0);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].x0, 0.0);
        assert_eq!(joined[0].x1, 100.0);
    }

    #[test]
    fn test_join_edges_keeps_large_gaps() {
        let edges = vec![h_edge(0.0, 40.0, 10.0), h_edge(60.0, 100.0, 10.0)];
        let joined = join_edges(edges, 3.0, 3.0);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_find_crossings_grid() {
        let crossings = find_crossings(&grid_2x2_edges(), 3.0, 3.0);
        // 3 horizontal x 3 vertical lines = 9 crossings.
        assert_eq!(crossings.len(), 9);
    }

    #[test]
    fn test_detects_2x2_grid() {
        let finder = TableFinder::new(grid_2x2_edges(), Vec::new(), TableSettings::default());
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 1);
        let grid = &grids[0];
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 2);
        assert_eq!(grid.bbox, BBox::new(0.0, 0.0, 100.0, 60.0));
    }

    #[test]
    fn test_detection_is_order_stable() {
        let finder = TableFinder::new(grid_2x2_edges(), Vec::new(), TableSettings::default());
        let a = finder.find_tables();
        let b = finder.find_tables();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_corner_skips_cell() {
        // Right column has no bottom segment: the bottom-right cell is
        // missing its corner crossings.
        let edges = vec![
            h_edge(0.0, 100.0, 0.0),
            h_edge(0.0, 100.0, 30.0),
            h_edge(0.0, 50.0, 60.0),
            v_edge(0.0, 0.0, 60.0),
            v_edge(50.0, 0.0, 60.0),
            v_edge(100.0, 0.0, 30.0),
        ];
        let finder = TableFinder::new(edges, Vec::new(), TableSettings::default());
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 1);
        let total_cells: usize = grids[0].rows.iter().map(Vec::len).sum();
        assert_eq!(total_cells, 3);
    }

    #[test]
    fn test_separate_grids_produce_separate_tables() {
        let mut edges = grid_2x2_edges();
        // A second detached grid far below.
        edges.extend(vec![
            h_edge(0.0, 100.0, 300.0),
            h_edge(0.0, 100.0, 330.0),
            v_edge(0.0, 300.0, 330.0),
            v_edge(100.0, 300.0, 330.0),
        ]);
        let finder = TableFinder::new(edges, Vec::new(), TableSettings::default());
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 2);
        assert!(grids[0].bbox.top < grids[1].bbox.top);
    }

    #[test]
    fn test_detached_grids_with_unaligned_columns() {
        // Two detached 1x2 grids whose column rulings share no x
        // positions. Neither grid's cells may be suppressed by the
        // other's coordinates.
        let edges = vec![
            h_edge(0.0, 100.0, 0.0),
            h_edge(0.0, 100.0, 30.0),
            v_edge(0.0, 0.0, 30.0),
            v_edge(50.0, 0.0, 30.0),
            v_edge(100.0, 0.0, 30.0),
            h_edge(10.0, 90.0, 300.0),
            h_edge(10.0, 90.0, 330.0),
            v_edge(10.0, 300.0, 330.0),
            v_edge(45.0, 300.0, 330.0),
            v_edge(90.0, 300.0, 330.0),
        ];
        let finder = TableFinder::new(edges, Vec::new(), TableSettings::default());
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 2);
        for grid in &grids {
            assert_eq!(grid.row_count(), 1);
            assert_eq!(grid.col_count(), 2);
        }
    }

    #[test]
    fn test_lines_strict_ignores_rect_edges() {
        let rect_edges = crate::edges::edges_from_rect(&crate::shapes::Rect::new(0.0, 0.0, 100.0, 60.0));
        let settings = TableSettings {
            vertical_strategy: Strategy::LinesStrict,
            horizontal_strategy: Strategy::LinesStrict,
            ..TableSettings::default()
        };
        let finder = TableFinder::new(rect_edges, Vec::new(), settings);
        assert!(finder.find_tables().is_empty());
    }

    #[test]
    fn test_lines_strict_sees_synthetic_edges() {
        let lines: Vec<Line> = vec![
            Line::from_points((0.0, 0.0), (100.0, 0.0), 1.0),
            Line::from_points((0.0, 30.0), (100.0, 30.0), 1.0),
            Line::from_points((0.0, 0.0), (0.0, 30.0), 1.0),
            Line::from_points((100.0, 0.0), (100.0, 30.0), 1.0),
        ];
        // Every line is injected rather than painted.
        let edges = crate::edges::derive_edges(&lines, &[], 0);
        let settings = TableSettings {
            vertical_strategy: Strategy::LinesStrict,
            horizontal_strategy: Strategy::LinesStrict,
            ..TableSettings::default()
        };
        let finder = TableFinder::new(edges, Vec::new(), settings);
        assert_eq!(finder.find_tables().len(), 1);
    }

    #[test]
    fn test_explicit_strategy_uses_supplied_coordinates() {
        let settings = TableSettings {
            vertical_strategy: Strategy::Explicit,
            horizontal_strategy: Strategy::Explicit,
            explicit_vertical_lines: vec![0.0, 50.0, 100.0],
            explicit_horizontal_lines: vec![0.0, 30.0, 60.0],
            ..TableSettings::default()
        };
        let finder = TableFinder::new(Vec::new(), Vec::new(), settings);
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].row_count(), 2);
        assert_eq!(grids[0].col_count(), 2);
    }

    #[test]
    fn test_text_strategy_from_word_alignment() {
        use crate::words::Word;
        // Three rows of two aligned columns.
        let mut words = Vec::new();
        for (i, y) in [10.0, 30.0, 50.0].iter().enumerate() {
            words.push(Word {
                text: format!("left{i}"),
                bbox: BBox::new(10.0, *y, 40.0, y + 10.0),
            });
            words.push(Word {
                text: format!("right{i}"),
                bbox: BBox::new(60.0, *y, 90.0, y + 10.0),
            });
        }
        let settings = TableSettings {
            vertical_strategy: Strategy::Text,
            horizontal_strategy: Strategy::Text,
            ..TableSettings::default()
        };
        let finder = TableFinder::new(Vec::new(), words, settings);
        let grids = finder.find_tables();
        assert_eq!(grids.len(), 1);
        assert!(grids[0].row_count() >= 2);
    }

    #[test]
    fn test_fill_cell_text() {
        let finder = TableFinder::new(grid_2x2_edges(), Vec::new(), TableSettings::default());
        let mut grid = finder.find_tables().remove(0);
        let chars = vec![
            Char::new("A", BBox::new(10.0, 10.0, 18.0, 20.0)),
            Char::new("B", BBox::new(60.0, 40.0, 68.0, 50.0)),
        ];
        fill_cell_text(&mut grid, &chars);
        assert_eq!(grid.rows[0][0].text.as_deref(), Some("A"));
        assert_eq!(grid.rows[0][1].text, None);
        assert_eq!(grid.rows[1][1].text.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_edges_yield_no_tables() {
        let finder = TableFinder::new(Vec::new(), Vec::new(), TableSettings::default());
        assert!(finder.find_tables().is_empty());
    }
}
