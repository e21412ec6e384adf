//! End-to-end gesture tests: pointer events through the drag coordinator,
//! routed into tree mutations.
//!
//! The spatial index here mirrors what a host renderer would expose: one
//! drop container for the canvas, one per plain container, and one per
//! column slot (tagged with the composite slot id).

use mosaic_drag::{DragCoordinator, Orientation, Point, Rect, SpatialIndex};
use mosaic_editor::drop_router::{apply_drop, slot_container_id};
use mosaic_editor::{tree, Applied, Block};
use mosaic_model::ColumnSlot;

const CANVAS: &str = "canvas";

/// Fixed-rectangle spatial index built by hand for each scenario
struct StubLayout {
    /// (container id, bounds, ordered child block ids with rects)
    containers: Vec<(String, Rect, Vec<(String, Rect)>)>,
}

impl StubLayout {
    fn container(&self, id: &str) -> Option<&(String, Rect, Vec<(String, Rect)>)> {
        self.containers.iter().find(|(cid, _, _)| cid == id)
    }
}

impl SpatialIndex for StubLayout {
    fn container_at(&self, point: Point) -> Option<String> {
        // Innermost (smallest) enclosing container, like a DOM hit test
        self.containers
            .iter()
            .filter(|(_, bounds, _)| bounds.contains(point))
            .min_by(|(_, a, _), (_, b, _)| (a.width * a.height).total_cmp(&(b.width * b.height)))
            .map(|(id, _, _)| id.clone())
    }

    fn child_rects(&self, container_id: &str) -> Option<Vec<Rect>> {
        self.container(container_id)
            .map(|(_, _, children)| children.iter().map(|(_, rect)| *rect).collect())
    }

    fn orientation(&self, _container_id: &str) -> Orientation {
        Orientation::Vertical
    }

    fn index_of(&self, container_id: &str, block_id: &str) -> Option<usize> {
        self.container(container_id)?
            .2
            .iter()
            .position(|(id, _)| id == block_id)
    }

    fn is_inside(&self, _container_id: &str, _block_id: &str) -> bool {
        false
    }
}

/// Canvas = [h1, cols(p1 | p2)], rendered as two stacked areas with the
/// column slots side by side inside the second one.
fn fixture() -> (Vec<Block>, StubLayout) {
    let mut cols = Block::container("cols", "core/columns");
    for id in ["p1", "p2"] {
        let mut child = Block::leaf(id, "core/paragraph");
        child.parent_id = Some("cols".to_string());
        cols.children.push(child);
    }
    cols.column_layout = Some(vec![
        ColumnSlot {
            column_id: "col-a".to_string(),
            width: "50%".to_string(),
            block_ids: vec!["p1".to_string()],
        },
        ColumnSlot {
            column_id: "col-b".to_string(),
            width: "50%".to_string(),
            block_ids: vec!["p2".to_string()],
        },
    ]);
    let blocks = vec![Block::leaf("h1", "core/heading"), cols];

    let layout = StubLayout {
        containers: vec![
            (
                CANVAS.to_string(),
                Rect::new(0.0, 0.0, 800.0, 1000.0),
                vec![
                    ("h1".to_string(), Rect::new(0.0, 0.0, 800.0, 100.0)),
                    ("cols".to_string(), Rect::new(0.0, 100.0, 800.0, 400.0)),
                ],
            ),
            (
                slot_container_id("cols", 0),
                Rect::new(0.0, 100.0, 400.0, 400.0),
                vec![("p1".to_string(), Rect::new(0.0, 100.0, 400.0, 100.0))],
            ),
            (
                slot_container_id("cols", 1),
                Rect::new(400.0, 100.0, 400.0, 400.0),
                vec![("p2".to_string(), Rect::new(400.0, 100.0, 400.0, 100.0))],
            ),
        ],
    };

    (blocks, layout)
}

#[test]
fn test_gesture_canvas_block_into_slot() {
    let (mut blocks, layout) = fixture();
    let mut coordinator = DragCoordinator::new(layout);

    // Pick up h1 from the canvas (pointer over h1, outside the column area)
    assert!(coordinator.start("h1", Point::new(700.0, 50.0)));

    // Drag into column B, below p2's midpoint (y = 150)
    let over = coordinator.hover(Point::new(500.0, 300.0)).unwrap();
    assert_eq!(over.container_id, slot_container_id("cols", 1));
    assert_eq!(over.index, 1);

    let result = coordinator.drop(Point::new(500.0, 300.0), None).unwrap();
    let applied = apply_drop(&mut blocks, &result, CANVAS);

    assert!(applied.changed());
    assert_eq!(blocks.len(), 1, "h1 left the canvas");
    let cols = tree::find(&blocks, "cols").unwrap();
    assert_eq!(
        cols.column_layout.as_ref().unwrap()[1].block_ids,
        vec!["p2", "h1"]
    );
    assert_eq!(
        tree::find(&blocks, "h1").unwrap().parent_id.as_deref(),
        Some("cols")
    );
}

#[test]
fn test_gesture_between_slots() {
    let (mut blocks, layout) = fixture();
    let mut coordinator = DragCoordinator::new(layout);

    // p1 from column A into column B, above p2's midpoint
    assert!(coordinator.start("p1", Point::new(100.0, 150.0)));
    coordinator.hover(Point::new(500.0, 120.0));

    let result = coordinator.drop(Point::new(500.0, 120.0), None).unwrap();
    assert_eq!(result.source.container_id, slot_container_id("cols", 0));
    assert_eq!(result.source.index, 0);

    let applied = apply_drop(&mut blocks, &result, CANVAS);

    assert!(applied.changed());
    let layout = tree::find(&blocks, "cols")
        .unwrap()
        .column_layout
        .clone()
        .unwrap();
    assert!(layout[0].block_ids.is_empty());
    assert_eq!(layout[1].block_ids, vec!["p1", "p2"]);
    // Still owned by the same container
    assert_eq!(
        tree::find(&blocks, "p1").unwrap().parent_id.as_deref(),
        Some("cols")
    );
}

#[test]
fn test_gesture_slot_to_canvas_via_fallback() {
    let (mut blocks, layout) = fixture();
    let mut coordinator = DragCoordinator::new(layout);

    // Fast touch gesture: no hover events at all; the drop recomputes from
    // the release point (bottom of the canvas, past both children)
    assert!(coordinator.start("p2", Point::new(500.0, 150.0)));
    let result = coordinator.drop(Point::new(700.0, 900.0), None).unwrap();

    assert_eq!(result.destination.as_ref().unwrap().container_id, CANVAS);
    assert_eq!(result.destination.as_ref().unwrap().index, 2);

    let applied = apply_drop(&mut blocks, &result, CANVAS);

    assert!(applied.changed());
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].id, "p2");
    assert_eq!(blocks[2].parent_id, None);
    let cols = tree::find(&blocks, "cols").unwrap();
    assert!(cols.column_layout.as_ref().unwrap()[1].block_ids.is_empty());
}

#[test]
fn test_gesture_released_outside_everything_cancels() {
    let (mut blocks, layout) = fixture();
    let before = blocks.clone();
    let mut coordinator = DragCoordinator::new(layout);

    coordinator.start("h1", Point::new(700.0, 50.0));
    let result = coordinator.end(Some(Point::new(5000.0, 5000.0))).unwrap();
    assert!(result.destination.is_none());

    let applied = apply_drop(&mut blocks, &result, CANVAS);

    assert_eq!(applied, Applied::Unchanged);
    assert_eq!(blocks, before);
}
