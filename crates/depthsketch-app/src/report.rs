//! Text rendering of the layer and object panels, and the run summary.

use crate::error::{AppError, AppResult};
use depthsketch_core::{Canvas, ObjectEntry, TransformMode, ViewMode};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// The layer panel: one row per layer, current layer marked.
pub fn layer_panel(canvas: &Canvas) -> String {
    let layers = canvas.layers();
    if layers.is_empty() {
        return "No layers\n".to_string();
    }
    let mut out = String::new();
    for (index, layer) in layers.layers().iter().enumerate() {
        let marker = if layers.current() == Some(index) { '>' } else { ' ' };
        let eye = if layer.visible { "[x]" } else { "[ ]" };
        let _ = writeln!(
            out,
            "{marker} {eye} {:<10} {} objects",
            layer.name,
            layers.objects(index).len()
        );
    }
    out
}

/// The object panel of one layer, grouped into primitives, lines and
/// everything else. Empty groups are left out.
pub fn object_panel(canvas: &Canvas, layer: usize) -> Option<String> {
    let list = canvas.object_list(layer)?;
    let name = &canvas.layers().layer(layer)?.name;
    let mut out = format!("{name}\n");
    if list.is_empty() {
        out.push_str("  (empty)\n");
        return Some(out);
    }
    let selection = canvas.transform().selection();
    let mut position = 0;
    for (title, entries) in [
        ("Primitives", &list.primitives),
        ("Lines", &list.lines),
        ("Other", &list.other),
    ] {
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {title}");
        for ObjectEntry { id, name, .. } in entries {
            let marker = if selection.contains(id) { '*' } else { ' ' };
            let _ = writeln!(out, "   {marker}{position:>3} {name}");
            position += 1;
        }
    }
    Some(out)
}

/// Per-layer part of the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub visible: bool,
    pub objects: usize,
}

/// State of the canvas at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub view_mode: ViewMode,
    pub mode: String,
    pub strokes: usize,
    pub redo: usize,
    pub current_layer: Option<usize>,
    pub layers: Vec<LayerSummary>,
    pub selected: usize,
    pub scene_nodes: usize,
}

impl Summary {
    pub fn of(canvas: &Canvas) -> Self {
        let layers = canvas.layers();
        Self {
            view_mode: canvas.view_mode(),
            mode: mode_name(canvas.mode()).to_string(),
            strokes: canvas.history().strokes().len(),
            redo: canvas.history().redo_stack().len(),
            current_layer: layers.current(),
            layers: layers
                .layers()
                .iter()
                .enumerate()
                .map(|(index, layer)| LayerSummary {
                    name: layer.name.clone(),
                    visible: layer.visible,
                    objects: layers.objects(index).len(),
                })
                .collect(),
            selected: canvas.transform().selection().len(),
            scene_nodes: canvas.scene().len(),
        }
    }

    /// Write the summary as JSON.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}

fn mode_name(mode: TransformMode) -> &'static str {
    match mode {
        TransformMode::Idle => "idle",
        TransformMode::Translate => "translate",
        TransformMode::Rotate => "rotate",
        TransformMode::Scale => "scale",
    }
}
