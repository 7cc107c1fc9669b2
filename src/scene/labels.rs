use crate::scene::model::Timeline;

/// Named inclusive frame range `[start, end]` exported as one animation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FrameLabel {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl FrameLabel {
    /// Number of frames covered.
    pub fn frame_count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Partition `timeline` into label ranges.
///
/// Labels are collected across all layers (topmost layer first), ordered by start index and
/// turned into ranges that end one frame before the next label. The first range is widened to
/// start at frame 0 and the last one runs to the final frame, so the ranges always cover
/// `[0, frame_count - 1]` exactly. When two labels share a start index, or a name repeats, the
/// first one seen wins. Without any label a single `default_name` range spans the timeline.
pub fn derive_labels(timeline: &Timeline, default_name: &str) -> Vec<FrameLabel> {
    let last = timeline.frame_count().saturating_sub(1);

    let mut found: Vec<(usize, &str)> = Vec::new();
    for layer in timeline.layers.iter().rev() {
        for frame in &layer.frames {
            if let Some(name) = frame.label.as_deref().filter(|n| !n.is_empty()) {
                found.push((frame.start, name));
            }
        }
    }
    // Stable: equal starts keep layer scan order.
    found.sort_by_key(|(start, _)| *start);

    let mut starts: Vec<(usize, &str)> = Vec::with_capacity(found.len());
    for (start, name) in found {
        if start > last {
            continue;
        }
        if starts.iter().any(|(s, n)| *s == start || *n == name) {
            tracing::debug!(label = name, start, "skipping shadowed frame label");
            continue;
        }
        starts.push((start, name));
    }

    if starts.is_empty() {
        return vec![FrameLabel {
            name: default_name.to_string(),
            start: 0,
            end: last,
        }];
    }

    let mut labels = Vec::with_capacity(starts.len());
    for (i, (start, name)) in starts.iter().enumerate() {
        let start = if i == 0 { 0 } else { *start };
        let end = starts.get(i + 1).map_or(last, |(next, _)| next - 1);
        labels.push(FrameLabel {
            name: (*name).to_string(),
            start,
            end,
        });
    }
    labels
}

#[cfg(test)]
#[path = "../../tests/unit/scene/labels.rs"]
mod tests;
