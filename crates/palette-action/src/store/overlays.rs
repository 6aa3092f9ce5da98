//! Chart overlay slice.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Comparison,
    Projection,
}

/// One plotted point of an overlay series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// An extra series drawn over the baseline revenue chart.
///
/// Overlays are never edited after creation; they are removed by id or
/// all at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOverlay {
    pub id: String,
    pub kind: OverlayKind,
    pub series: Vec<SeriesPoint>,
    pub label: String,
    /// CSS hex color.
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayList {
    items: Vec<ChartOverlay>,
}

impl OverlayList {
    pub fn add(&mut self, overlay: ChartOverlay) {
        self.items.push(overlay);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|o| o.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    pub fn get(&self, id: &str) -> Option<&ChartOverlay> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartOverlay> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(id: &str, kind: OverlayKind) -> ChartOverlay {
        ChartOverlay {
            id: id.to_string(),
            kind,
            series: vec![SeriesPoint {
                date: "2024-01".to_string(),
                value: 1.0,
            }],
            label: id.to_string(),
            color: "#000000".to_string(),
        }
    }

    #[test]
    fn test_add_and_remove_by_id() {
        let mut list = OverlayList::default();
        list.add(overlay("comparison-a", OverlayKind::Comparison));
        list.add(overlay("projection-b", OverlayKind::Projection));
        assert_eq!(list.len(), 2);

        assert!(list.remove("comparison-a"));
        assert!(!list.remove("comparison-a"));
        assert!(list.get("projection-b").is_some());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut list = OverlayList::default();
        assert!(!list.clear());
        list.add(overlay("x", OverlayKind::Comparison));
        assert!(list.clear());
        assert!(list.is_empty());
    }

    #[test]
    fn test_serializes_as_array() {
        let mut list = OverlayList::default();
        list.add(overlay("x", OverlayKind::Projection));
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["kind"], "projection");
    }
}
