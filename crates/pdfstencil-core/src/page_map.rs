//! Page-offset resolution between template page space and target documents.
//!
//! Templates are authored against a reference document; the document being
//! processed may carry extra leading/trailing pages (cover sheets,
//! advertisement pages) or lack pages the reference had. Page rules describe
//! how to shift authored page numbers before reading the target.
//!
//! This is the only place 1-based authored page numbers meet 0-based page
//! indices. Everything downstream operates on [`PageIndex`].

/// A 0-based page index into a concrete document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageIndex(pub usize);

impl PageIndex {
    /// Convert a 1-based authored page number. Returns `None` for page 0,
    /// which cannot exist in authored space.
    pub fn from_page_number(page: i64) -> Option<Self> {
        if page >= 1 {
            Some(PageIndex((page - 1) as usize))
        } else {
            None
        }
    }

    /// The 1-based page number for display.
    pub fn page_number(&self) -> usize {
        self.0 + 1
    }
}

/// A rule describing pages to exclude or offset when mapping template page
/// numbers onto a target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "position", rename_all = "snake_case")
)]
pub enum PageRule {
    /// Extra/removed pages at the front: effective page = declared + delta.
    First { delta: i64 },
    /// Pages counted back from the end: effective page =
    /// declared + (target_pages - template_pages) - delta.
    Last { delta: i64 },
    /// Fires only for declared pages at or after `page_number`, shifting
    /// them by `delta`.
    Custom { page_number: i64, delta: i64 },
}

/// Resolve a 1-based declared page number to a 0-based index in the target
/// document.
///
/// Custom rules take precedence: they are applied before any first/last
/// rules, preserving definition order within each class. Deltas compose
/// additively. Returns `None` when the effective page falls outside
/// `[1, target_page_count]` — the field resolves to "no data" rather than
/// erroring the run.
pub fn resolve_page(
    declared_page: i64,
    rules: &[PageRule],
    template_page_count: usize,
    target_page_count: usize,
) -> Option<PageIndex> {
    if target_page_count == 0 {
        return None;
    }

    let mut effective = declared_page;

    for rule in rules.iter().filter(|r| matches!(r, PageRule::Custom { .. })) {
        if let PageRule::Custom { page_number, delta } = rule {
            if declared_page >= *page_number {
                effective += delta;
            }
        }
    }

    for rule in rules.iter().filter(|r| !matches!(r, PageRule::Custom { .. })) {
        match rule {
            PageRule::First { delta } => effective += delta,
            PageRule::Last { delta } => {
                effective += target_page_count as i64 - template_page_count as i64 - delta;
            }
            PageRule::Custom { .. } => unreachable!(),
        }
    }

    if effective < 1 || effective > target_page_count as i64 {
        return None;
    }
    PageIndex::from_page_number(effective)
}
