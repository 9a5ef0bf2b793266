//! Toolbar and panel actions.

use depthsketch_core::{Canvas, Color, NodeId};
use serde::{Deserialize, Serialize};

/// Actions triggered from the toolbar, the layer panel and the object panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum UiAction {
    /// Append a layer and make it current.
    AddLayer,
    /// Delete the layer at an index.
    DeleteLayer(usize),
    /// Delete the last layer.
    RemoveLastLayer,
    /// Show or hide a layer.
    ToggleLayer(usize),
    /// Make a layer current.
    SelectLayer(usize),
    /// Pick a brush by toolbar name.
    SetBrush(String),
    SetBrushColor(Color),
    SetBrushThickness(f32),
    /// Brush opacity in percent.
    SetBrushOpacity(f32),
    SetPrimitiveColor(Color),
    /// Insert a primitive by toolbar name.
    InsertPrimitive(String),
    /// Select an entry of a layer's object panel.
    SelectObject {
        layer: usize,
        index: usize,
        #[serde(default)]
        additive: bool,
    },
    ToggleViewMode,
    Undo,
    Redo,
    Redraw,
}

/// Object of a layer's panel by position, in panel order.
fn panel_object(canvas: &Canvas, layer: usize, index: usize) -> Option<NodeId> {
    let list = canvas.object_list(layer)?;
    list.primitives
        .iter()
        .chain(&list.lines)
        .chain(&list.other)
        .nth(index)
        .map(|entry| entry.id)
}

/// Apply an action to the canvas.
///
/// Invalid names and indices are logged and ignored, the way the toolbar
/// ignores them.
pub fn apply_action(canvas: &mut Canvas, action: &UiAction) {
    match action {
        UiAction::AddLayer => {
            canvas.add_layer();
        }
        UiAction::DeleteLayer(index) => {
            if !canvas.delete_layer(*index) {
                log::warn!("No layer at index {index}");
            }
        }
        UiAction::RemoveLastLayer => {
            canvas.remove_last_layer();
        }
        UiAction::ToggleLayer(index) => {
            if canvas.toggle_layer_visibility(*index).is_none() {
                log::warn!("No layer at index {index}");
            }
        }
        UiAction::SelectLayer(index) => {
            if !canvas.set_current_layer(*index) {
                log::warn!("No layer at index {index}");
            }
        }
        UiAction::SetBrush(name) => {
            if let Err(err) = canvas.set_brush_type_named(name) {
                log::warn!("{err}");
            }
        }
        UiAction::SetBrushColor(color) => canvas.set_brush_color(*color),
        UiAction::SetBrushThickness(value) => canvas.set_brush_thickness(*value),
        UiAction::SetBrushOpacity(percent) => canvas.set_brush_opacity_percent(*percent),
        UiAction::SetPrimitiveColor(color) => canvas.set_primitive_color(*color),
        UiAction::InsertPrimitive(name) => {
            canvas.insert_primitive_named(name);
        }
        UiAction::SelectObject {
            layer,
            index,
            additive,
        } => match panel_object(canvas, *layer, *index) {
            Some(id) => {
                canvas.select_object(id, *additive);
            }
            None => log::warn!("No object {index} on layer {layer}"),
        },
        UiAction::ToggleViewMode => canvas.toggle_view_mode(),
        UiAction::Undo => {
            canvas.undo();
        }
        UiAction::Redo => {
            canvas.redo();
        }
        UiAction::Redraw => canvas.redraw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthsketch_core::{BrushType, TransformMode};

    #[test]
    fn test_action_json_shape() {
        let action: UiAction = serde_json::from_str(r#"{"action":"delete_layer","value":2}"#).unwrap();
        assert_eq!(action, UiAction::DeleteLayer(2));
        let action: UiAction = serde_json::from_str(r#"{"action":"add_layer"}"#).unwrap();
        assert_eq!(action, UiAction::AddLayer);
        let action: UiAction =
            serde_json::from_str(r##"{"action":"set_brush_color","value":"#ff0000"}"##).unwrap();
        assert_eq!(action, UiAction::SetBrushColor(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_invalid_names_are_ignored() {
        let mut canvas = Canvas::default();
        apply_action(&mut canvas, &UiAction::AddLayer);
        apply_action(&mut canvas, &UiAction::SetBrush("charcoal".to_string()));
        assert_eq!(canvas.brushes().active(), BrushType::Round);
        apply_action(&mut canvas, &UiAction::InsertPrimitive("teapot".to_string()));
        assert!(canvas.layers().objects(0).is_empty());
        apply_action(&mut canvas, &UiAction::DeleteLayer(5));
        assert_eq!(canvas.layers().len(), 1);
    }

    #[test]
    fn test_select_object_from_panel() {
        let mut canvas = Canvas::default();
        apply_action(&mut canvas, &UiAction::AddLayer);
        apply_action(&mut canvas, &UiAction::InsertPrimitive("cube".to_string()));
        apply_action(&mut canvas, &UiAction::InsertPrimitive("sphere".to_string()));
        apply_action(
            &mut canvas,
            &UiAction::SelectObject {
                layer: 0,
                index: 1,
                additive: false,
            },
        );
        assert_eq!(canvas.mode(), TransformMode::Translate);
        assert_eq!(canvas.transform().selection(), &[canvas.layers().objects(0)[1]]);
    }
}
