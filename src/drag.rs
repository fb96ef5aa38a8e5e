//! Drag-to-reposition state machine.
//!
//! Converts pointer-down/move/up events into incremental layer translations.
//! Runs on the single event-dispatch path; holds no locks and no layer data
//! of its own.

use crate::geometry::{CanvasFrame, PixelPoint};
use crate::hit;
use crate::layer::{LayerId, LayerStore};
use crate::render::font::FontFace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { layer: LayerId, last: PixelPoint },
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub const fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Runs the hit-test priority chain; on a hit, marks that layer as the
    /// sole selected layer, records the pointer and enters `Dragging`. A
    /// miss leaves the machine `Idle` with no session — not an error.
    pub fn pointer_down<F: FontFace>(
        &mut self,
        store: &mut LayerStore,
        font: &F,
        frame: CanvasFrame,
        pointer: PixelPoint,
    ) -> Option<LayerId> {
        let layer = hit::hit_test(store, font, pointer, frame)?;

        // At most one layer selected at a time; enforced here, not in the
        // store.
        if let Some(previous) = store.selected_layer() {
            store.set_selected(previous, false);
        }
        store.set_selected(layer, true);
        self.state = DragState::Dragging {
            layer,
            last: pointer,
        };
        tracing::debug!(?layer, x = pointer.x, y = pointer.y, "drag session started");
        Some(layer)
    }

    /// Incremental tracking: translate by the normalized delta since the
    /// last event, then re-anchor on the new pointer. No session -> no-op.
    pub fn pointer_move(
        &mut self,
        store: &mut LayerStore,
        frame: CanvasFrame,
        pointer: PixelPoint,
    ) -> bool {
        let DragState::Dragging { layer, last } = self.state else {
            return false;
        };
        let dx = (pointer.x - last.x) / frame.width as f32;
        let dy = (pointer.y - last.y) / frame.height as f32;
        store.translate(layer, dx, dy);
        self.state = DragState::Dragging {
            layer,
            last: pointer,
        };
        true
    }

    /// Clears the selection flag on the active layer and discards the
    /// session.
    pub fn pointer_up(&mut self, store: &mut LayerStore) -> Option<LayerId> {
        let DragState::Dragging { layer, .. } = self.state else {
            return None;
        };
        store.set_selected(layer, false);
        self.state = DragState::Idle;
        tracing::debug!(?layer, "drag session finished");
        Some(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompositionConfig;
    use crate::layer::SharedStyle;
    use crate::render::font::testing::BlockFace;
    use image::RgbaImage;

    const FRAME: CanvasFrame = CanvasFrame::new(800, 500);

    fn store_with_texts() -> LayerStore {
        let defaults = CompositionConfig::default();
        let mut store = LayerStore::new(SharedStyle {
            color: defaults.text_color,
            font_size: defaults.font_size,
            text_rotation: defaults.text_rotation,
        });
        store.set_text(LayerId::Name, "JEAN DUPONT");
        store.set_text(LayerId::Id, "12345678-A");
        store
    }

    fn name_anchor(store: &LayerStore) -> PixelPoint {
        FRAME.to_pixels(store.name().position)
    }

    #[test]
    fn down_move_up_repositions_the_name_layer() {
        let mut store = store_with_texts();
        let mut drag = DragController::new();

        let anchor = name_anchor(&store);
        let start = PixelPoint::new(anchor.x + 2.0, anchor.y + 2.0);
        assert_eq!(
            drag.pointer_down(&mut store, &BlockFace, FRAME, start),
            Some(LayerId::Name)
        );

        drag.pointer_move(&mut store, FRAME, PixelPoint::new(start.x + 20.0, start.y));
        drag.pointer_up(&mut store);

        assert!((store.name().position.x - 0.535).abs() < 1e-6);
        assert!((store.name().position.y - 0.44).abs() < 1e-6);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn split_deltas_match_single_drag_of_their_sum() {
        let mut split = store_with_texts();
        let mut whole = store_with_texts();

        let anchor = name_anchor(&split);
        let start = PixelPoint::new(anchor.x + 2.0, anchor.y + 2.0);

        let mut drag = DragController::new();
        drag.pointer_down(&mut split, &BlockFace, FRAME, start);
        let mut cursor = start;
        for (dx, dy) in [(7.0, -3.0), (5.5, 10.0), (-2.5, 1.0), (10.0, -4.0)] {
            cursor = PixelPoint::new(cursor.x + dx, cursor.y + dy);
            drag.pointer_move(&mut split, FRAME, cursor);
        }
        drag.pointer_up(&mut split);

        let mut drag = DragController::new();
        drag.pointer_down(&mut whole, &BlockFace, FRAME, start);
        drag.pointer_move(&mut whole, FRAME, PixelPoint::new(start.x + 20.0, start.y + 4.0));
        drag.pointer_up(&mut whole);

        assert!((split.name().position.x - whole.name().position.x).abs() < 1e-5);
        assert!((split.name().position.y - whole.name().position.y).abs() < 1e-5);
    }

    #[test]
    fn exactly_one_layer_selected_while_dragging_none_after_release() {
        let mut store = store_with_texts();
        store.set_portrait_image(Some(RgbaImage::new(300, 400)));
        let mut drag = DragController::new();

        let anchor = name_anchor(&store);
        drag.pointer_down(
            &mut store,
            &BlockFace,
            FRAME,
            PixelPoint::new(anchor.x + 1.0, anchor.y + 1.0),
        );
        assert_eq!(store.selected_layer(), Some(LayerId::Name));
        assert!(store.name().selected);
        assert!(!store.id().selected);
        assert!(!store.portrait().selected);

        drag.pointer_up(&mut store);
        assert_eq!(store.selected_layer(), None);
    }

    #[test]
    fn miss_leaves_machine_idle_and_selection_empty() {
        let mut store = store_with_texts();
        let mut drag = DragController::new();

        let outcome = drag.pointer_down(
            &mut store,
            &BlockFace,
            FRAME,
            PixelPoint::new(5.0, 5.0),
        );
        assert_eq!(outcome, None);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(store.selected_layer(), None);
    }

    #[test]
    fn move_without_session_is_a_no_op() {
        let mut store = store_with_texts();
        let before = store.name().position;
        let mut drag = DragController::new();

        assert!(!drag.pointer_move(&mut store, FRAME, PixelPoint::new(100.0, 100.0)));
        assert_eq!(store.name().position, before);
        assert_eq!(drag.pointer_up(&mut store), None);
    }

    #[test]
    fn new_press_moves_selection_to_the_newly_struck_layer() {
        let mut store = store_with_texts();
        let mut drag = DragController::new();

        let anchor = name_anchor(&store);
        drag.pointer_down(
            &mut store,
            &BlockFace,
            FRAME,
            PixelPoint::new(anchor.x + 1.0, anchor.y + 1.0),
        );
        drag.pointer_up(&mut store);

        let id_anchor = FRAME.to_pixels(store.id().position);
        drag.pointer_down(
            &mut store,
            &BlockFace,
            FRAME,
            PixelPoint::new(id_anchor.x + 1.0, id_anchor.y + 1.0),
        );
        assert_eq!(store.selected_layer(), Some(LayerId::Id));
        assert!(!store.name().selected);
    }
}
