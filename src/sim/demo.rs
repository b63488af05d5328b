// Demo mode: a synthetic project table to showcase an export end to end
//
// The generated table exercises the awkward parts of real captures:
// - names with commas, quotes and ampersands (escaped in the output)
// - multi-line descriptions (collapsed to one line)
// - rows without an identity attribute (skipped)
// - lazy page loading, so the list grows while it is being scrolled
//
// Run with: scrollgrab demo --rows 250

use super::{Layout, SimRow, SimulatedPage, SimulatedView};

const PROJECT_TYPES: &[&str] = &["Client", "Internal", "Research", "Maintenance"];

const CATEGORIES: &[&str] = &["Design", "Engineering", "R&D", "Operations; Finance"];

const NAMES: &[&str] = &[
    "Atlas",
    "Beacon, Phase 2",
    "Cobalt \"Lite\"",
    "Drift",
    "Ember & Ash",
    "Fjord",
    "Gantry",
    "Halyard",
];

/// Header row as a virtualized table renders it: nested wrappers repeat
/// labels and the toolbar adds a "+" affordance
fn demo_header_labels() -> Vec<String> {
    [
        "Name",
        "Name",
        "Project type",
        "Main category",
        "Main category",
        "Description",
        "+",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Generate `count` synthetic rows
pub fn demo_rows(count: usize) -> Vec<SimRow> {
    (0..count)
        .map(|i| {
            let cells = vec![
                format!("{} {}", NAMES[i % NAMES.len()], i + 1),
                PROJECT_TYPES[i % PROJECT_TYPES.len()].to_string(),
                CATEGORIES[(i / 3) % CATEGORIES.len()].to_string(),
                if i % 5 == 0 {
                    format!("Kickoff notes\nmilestone {}\r\nowner TBD", i / 5)
                } else {
                    format!("Milestone {}", i / 5)
                },
            ];
            // Every 17th element is a detached placeholder without identity
            if i % 17 == 16 {
                SimRow::anonymous(cells)
            } else {
                SimRow::new(format!("blk-{:05x}", 0x1000 + i * 7), cells)
            }
        })
        .collect()
}

/// Build the demo page mounted under `selector`
pub fn demo_page(selector: &str, count: usize) -> SimulatedPage {
    let layout = Layout {
        page_size: Some(50),
        load_delay_reads: 5,
        ..Layout::default()
    };
    let view = SimulatedView::new(demo_rows(count), layout).with_header_labels(demo_header_labels());
    SimulatedPage::new(selector, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_rows_have_unique_ids() {
        let rows = demo_rows(200);
        let mut ids: Vec<&str> = rows.iter().filter_map(|r| r.id.as_deref()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        // 200 / 17 rounds down to 11 anonymous rows
        assert_eq!(total, 200 - 11);
    }
}
