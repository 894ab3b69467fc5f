use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::{Rect, Size};

use term_balloon::layout::{BalloonPositioner, Placement};
use term_balloon::position::{PanelPosition, PositionError};
use term_balloon::ui::UiFrame;
use term_balloon::{BalloonError, ContextualBalloon, MAIN_STACK, PositionSpec, Positioner, StackEntry};

const VIEWPORT: Rect = Rect {
    x: 0,
    y: 0,
    width: 60,
    height: 20,
};

#[derive(Debug, Clone, Default)]
struct CountingPositioner {
    calls: Rc<Cell<usize>>,
    targets: Rc<RefCell<Vec<Rect>>>,
}

impl Positioner for CountingPositioner {
    fn position(&self, panel: Size, spec: &PositionSpec) -> Result<PanelPosition, PositionError> {
        self.calls.set(self.calls.get() + 1);
        self.targets.borrow_mut().push(spec.target.resolve());
        BalloonPositioner::new(VIEWPORT).position(panel, spec)
    }
}

fn target(x: u16) -> PositionSpec {
    PositionSpec::at(Rect {
        x,
        y: 8,
        width: 3,
        height: 1,
    })
}

#[test]
fn removal_promotion_and_silent_hidden_removal() {
    let positioner = CountingPositioner::default();
    let mut balloon = ContextualBalloon::new(positioner.clone());
    balloon.add(StackEntry::new('A', target(1))).unwrap();
    balloon.add(StackEntry::new('B', target(2))).unwrap();

    // [A, B] with B visible: removing B shows A again.
    balloon.remove('B').unwrap();
    assert_eq!(balloon.visible_view(), Some('A'));
    assert_eq!(positioner.targets.borrow().last().unwrap().x, 1);

    // [A, B] with B visible: removing A never repositions.
    balloon.add(StackEntry::new('B', target(2))).unwrap();
    let calls = positioner.calls.get();
    balloon.remove('A').unwrap();
    assert_eq!(balloon.visible_view(), Some('B'));
    assert_eq!(positioner.calls.get(), calls);
}

#[test]
fn at_most_one_entry_is_visible_through_any_sequence() {
    let mut balloon = ContextualBalloon::new(BalloonPositioner::new(VIEWPORT));
    let mut expected_main: Vec<u8> = Vec::new();
    for step in 0u8..40 {
        let view = step % 7;
        if balloon.has_view(view) {
            balloon.remove(view).unwrap();
            expected_main.retain(|v| *v != view);
        } else {
            balloon
                .add(StackEntry::new(view, target(view as u16)))
                .unwrap();
            expected_main.push(view);
        }
        assert_eq!(balloon.visible_view(), expected_main.last().copied());
        assert_eq!(balloon.panel().visible(), !expected_main.is_empty());
        if step % 11 == 10 {
            balloon.clear(None).unwrap();
            expected_main.clear();
            assert!(balloon.visible_entry().is_none());
        }
    }
}

#[test]
fn duplicate_across_stacks_is_rejected() {
    let mut balloon = ContextualBalloon::new(BalloonPositioner::new(VIEWPORT));
    balloon
        .add_to(StackEntry::new("link", target(4)), "link")
        .unwrap();
    let err = balloon
        .add(StackEntry::new("link", target(9)))
        .unwrap_err();
    assert!(matches!(err, BalloonError::DuplicateView { .. }));
    assert_eq!(balloon.stack_len(MAIN_STACK), 0);
    assert_eq!(balloon.visible_view(), Some("link"));
    assert_eq!(err.to_string(), "view \"link\" already exists in the balloon");
}

#[test]
fn panel_follows_the_first_fitting_placement() {
    let mut balloon = ContextualBalloon::new(BalloonPositioner::new(VIEWPORT));
    balloon
        .set_panel_size(Size {
            width: 10,
            height: 3,
        })
        .unwrap();
    // Too close to the bottom for a south placement.
    let spec = PositionSpec::at(Rect {
        x: 20,
        y: 19,
        width: 4,
        height: 1,
    })
    .with_positions(vec![
        Placement::SOUTH_ARROW_NORTH,
        Placement::NORTH_ARROW_SOUTH,
    ]);
    balloon.add(StackEntry::new(1u8, spec)).unwrap();
    let position = balloon.panel().position().unwrap();
    assert_eq!(position.placement, Placement::NORTH_ARROW_SOUTH);
    assert!(position.rect.fits_within(VIEWPORT));
}

#[test]
fn rendered_balloon_shows_content_and_arrow() {
    let mut balloon = ContextualBalloon::new(BalloonPositioner::new(VIEWPORT));
    balloon
        .set_panel_size(Size {
            width: 12,
            height: 3,
        })
        .unwrap();
    balloon
        .add(StackEntry::new("hello", target(20)).with_class_name("greeting"))
        .unwrap();

    let backend = TestBackend::new(VIEWPORT.width, VIEWPORT.height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let mut ui = UiFrame::new(frame);
            balloon.panel().render(&mut ui, |ui, view, inner| {
                ui.set_string(inner.x, inner.y, view, Default::default());
            });
        })
        .unwrap();

    let rect = balloon.panel().rect().unwrap();
    let buffer = terminal.backend().buffer();
    let text: String = (0..5)
        .map(|i| {
            buffer
                .cell(((rect.x + 1 + i) as u16, (rect.y + 1) as u16))
                .unwrap()
                .symbol()
                .to_string()
        })
        .collect();
    assert_eq!(text, "hello");
    let arrow_row = rect.y as u16;
    let row: String = (0..VIEWPORT.width)
        .map(|x| buffer.cell((x, arrow_row)).unwrap().symbol().to_string())
        .collect();
    assert!(row.contains('▲'));
}
