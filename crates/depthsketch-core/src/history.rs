//! Linear stroke history with undo/redo.

use crate::brush::{BrushSettings, BrushType};
use crate::camera::ViewMode;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One accepted segment of a gesture.
///
/// Carries everything needed to regenerate its geometry during a redraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub start: Vec3,
    pub end: Vec3,
    pub brush_type: BrushType,
    pub layer_index: usize,
    /// Brush settings at the time the segment was drawn.
    pub settings: BrushSettings,
    pub view_mode: ViewMode,
    /// Camera position blob brushes turn towards in 3D.
    pub eye: Vec3,
    /// Seed of the spray scatter.
    pub seed: u64,
}

/// Applied strokes and the redo buffer. The two never share a stroke.
#[derive(Debug, Clone, Default)]
pub struct StrokeHistory {
    strokes: Vec<Stroke>,
    redo_stack: Vec<Stroke>,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new stroke. Clears the redo buffer.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.redo_stack.clear();
    }

    /// Move the last stroke to the redo buffer.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if let Some(stroke) = self.strokes.pop() {
            self.redo_stack.push(stroke);
            true
        } else {
            false
        }
    }

    /// Move the most recently undone stroke back.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if let Some(stroke) = self.redo_stack.pop() {
            self.strokes.push(stroke);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.strokes.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo_stack
    }

    /// Forget every stroke of a deleted layer and shift later layer indices
    /// down, in both stacks.
    pub fn purge_layer(&mut self, index: usize) {
        for stack in [&mut self.strokes, &mut self.redo_stack] {
            stack.retain(|stroke| stroke.layer_index != index);
            for stroke in stack.iter_mut() {
                if stroke.layer_index > index {
                    stroke.layer_index -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(x: f32, layer_index: usize) -> Stroke {
        Stroke {
            start: Vec3::new(x, 0.0, 0.0),
            end: Vec3::new(x + 1.0, 0.0, 0.0),
            brush_type: BrushType::Round,
            layer_index,
            settings: BrushSettings::defaults_for(BrushType::Round),
            view_mode: ViewMode::TwoD,
            eye: Vec3::Z,
            seed: 0,
        }
    }

    #[test]
    fn test_undo_redo_moves_strokes() {
        let mut history = StrokeHistory::new();
        history.push(stroke(0.0, 0));
        history.push(stroke(1.0, 0));

        assert!(history.undo());
        assert_eq!(history.strokes().len(), 1);
        assert_eq!(history.redo_stack(), &[stroke(1.0, 0)]);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.strokes().len(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = StrokeHistory::new();
        history.push(stroke(0.0, 0));
        history.undo();
        assert!(history.can_redo());

        history.push(stroke(2.0, 0));
        assert!(!history.can_redo());
        assert_eq!(history.strokes(), &[stroke(2.0, 0)]);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = StrokeHistory::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_purge_layer_shifts_indices() {
        let mut history = StrokeHistory::new();
        history.push(stroke(0.0, 0));
        history.push(stroke(1.0, 1));
        history.push(stroke(2.0, 2));
        history.undo();

        history.purge_layer(1);
        assert_eq!(history.strokes(), &[stroke(0.0, 0)]);
        assert_eq!(history.redo_stack(), &[stroke(2.0, 1)]);
    }
}
