use serde::Serialize;

pub const PAGE_RANGE_DISPLAYED: usize = 5;
pub const MARGIN_PAGES_DISPLAYED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageItem {
    Previous { enabled: bool },
    Page { index: usize, selected: bool },
    Break,
    Next { enabled: bool },
}

/// Previous/next links, numbered pages and `...` breaks for a pager with
/// `page_count` pages and `selected` active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControl {
    pub items: Vec<PageItem>,
}

impl PaginationControl {
    pub fn new(page_count: usize, selected: usize) -> Self {
        Self::with_layout(page_count, selected, PAGE_RANGE_DISPLAYED, MARGIN_PAGES_DISPLAYED)
    }

    /// Layout of a react-paginate pager: every page when they fit in the
    /// range, otherwise `margin` pages at each end, a window of `range` pages
    /// around `selected`, and a break for each gap longer than one page.
    pub fn with_layout(page_count: usize, selected: usize, range: usize, margin: usize) -> Self {
        let mut items = Vec::with_capacity(page_count.min(range + 2 * margin + 2) + 2);
        items.push(PageItem::Previous {
            enabled: selected > 0,
        });

        if page_count <= range {
            items.extend((0..page_count).map(|index| PageItem::Page {
                index,
                selected: index == selected,
            }));
        } else {
            items.extend(windowed(page_count, selected, range, margin));
        }

        items.push(PageItem::Next {
            enabled: selected + 1 < page_count,
        });
        Self { items }
    }

    /// Compact text form, e.g. `< previous 1 2 [3] 4 ... 20 next >`.
    pub fn to_text(&self) -> String {
        self.items
            .iter()
            .map(|item| match item {
                PageItem::Previous { .. } => "< previous".to_string(),
                PageItem::Page { index, selected: true } => format!("[{}]", index + 1),
                PageItem::Page { index, .. } => (index + 1).to_string(),
                PageItem::Break => "...".to_string(),
                PageItem::Next { .. } => "next >".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Windowed page list. The window is split in half sizes (so `range = 5`
/// leaves 2.5 pages on each side) and shifted when it hits either end.
fn windowed(page_count: usize, selected: usize, range: usize, margin: usize) -> Vec<PageItem> {
    let count = page_count as f64;
    let range_f = range as f64;
    let sel = selected as f64;

    let (left, right) = if sel > count - range_f / 2.0 {
        let right = count - sel;
        (range_f - right, right)
    } else if sel < range_f / 2.0 {
        (sel, range_f - sel)
    } else {
        (range_f / 2.0, range_f - range_f / 2.0)
    };
    // the selected page itself counts against the window on the first page
    let right = if selected == 0 && range > 1 { right - 1.0 } else { right };

    let mut laid_out: Vec<PageItem> = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let page = PageItem::Page {
            index,
            selected: index == selected,
        };
        let in_margin = index < margin || index >= page_count.saturating_sub(margin);
        let at = index as f64;
        if in_margin || (at >= sel - left && at <= sel + right) {
            laid_out.push(page);
        } else if !laid_out.is_empty()
            && laid_out.last() != Some(&PageItem::Break)
            && (range > 0 || margin > 0)
        {
            laid_out.push(PageItem::Break);
        }
    }

    // a break hiding exactly one page shows that page instead
    let mut items = Vec::with_capacity(laid_out.len());
    for (i, item) in laid_out.iter().enumerate() {
        let hidden = match (i.checked_sub(1).map(|p| laid_out[p]), laid_out.get(i + 1)) {
            (Some(PageItem::Page { index: before, .. }), Some(PageItem::Page { index: after, .. }))
                if *item == PageItem::Break && after - before == 2 =>
            {
                Some(before + 1)
            }
            _ => None,
        };
        items.push(match hidden {
            Some(index) => PageItem::Page {
                index,
                selected: index == selected,
            },
            None => *item,
        });
    }
    items
}
