use tiny_mandelbrot::{
    arithmetic::{Arithmetic, SplitFixed},
    explorer::{Colouring, Explorer, Input, State},
    geometry::Position,
    pixel::Rgba,
    render::BorderScan,
};

type TestExplorer = Explorer<SplitFixed, BorderScan>;

struct Session {
    explorer: TestExplorer,
    frame: Vec<Rgba>,
    now_ms: u64,
}

impl Session {
    fn new() -> Self {
        let explorer = TestExplorer::new();
        let frame = vec![Rgba::default(); (explorer.width() * explorer.height()) as usize];
        Self {
            explorer,
            frame,
            now_ms: 0,
        }
    }

    fn step(&mut self, elapsed_ms: u64, input: Input) {
        self.now_ms += elapsed_ms;
        self.explorer.update(self.now_ms, &input);
        self.explorer.draw(self.now_ms, &mut self.frame).unwrap();
    }

    fn assert_frame_matches_grid(&self) {
        let grid = self.explorer.mandelbrot().grid();
        let palette = self.explorer.palette();
        let width = self.explorer.width();
        for y in 0..self.explorer.height() {
            for x in 0..width {
                let expected = palette.colour(grid[Position::new(x, y)]);
                assert_eq!(
                    self.frame[(y * width + x) as usize],
                    expected,
                    "({}, {}) at {} ms",
                    x,
                    y,
                    self.now_ms
                );
            }
        }
    }
}

fn held(left: bool, right: bool, up: bool, down: bool) -> Input {
    Input {
        left,
        right,
        up,
        down,
        ..Input::default()
    }
}

#[test_log::test]
fn panning_keeps_the_frame_coloured() {
    let mut session = Session::new();
    session.step(0, Input::default());
    session.assert_frame_matches_grid();

    for _ in 0..8 {
        session.step(16, held(false, true, false, true));
    }
    session.assert_frame_matches_grid();

    for _ in 0..8 {
        session.step(33, held(true, false, true, false));
    }
    session.assert_frame_matches_grid();
}

#[test]
fn panning_stops_at_the_edge_of_the_plane() {
    let mut session = Session::new();
    session.step(0, Input::default());

    for _ in 0..12 {
        session.step(1000, held(true, false, false, false));
        session.assert_frame_matches_grid();
    }
    let mandelbrot = session.explorer.mandelbrot();
    assert_eq!(mandelbrot.a(), SplitFixed::from_f64(-2.0));
    assert!(mandelbrot.no_change());
}

#[test]
fn zoom_round_trip() {
    let mut session = Session::new();
    session.step(0, Input::default());

    session.step(
        16,
        Input {
            zoom_in: true,
            ..Input::default()
        },
    );
    assert!(matches!(session.explorer.state(), State::Zoom(zoom) if zoom.zoom_in));
    assert_eq!(session.explorer.mandelbrot().zoom(), 1);

    while matches!(session.explorer.state(), State::Zoom(_)) {
        session.step(16, Input::default());
    }
    session.step(16, Input::default());
    session.assert_frame_matches_grid();

    session.step(
        16,
        Input {
            zoom_out: true,
            ..Input::default()
        },
    );
    assert!(matches!(session.explorer.state(), State::Zoom(zoom) if !zoom.zoom_in));
    while matches!(session.explorer.state(), State::Zoom(_)) {
        session.step(16, Input::default());
    }
    session.step(16, Input::default());
    assert_eq!(session.explorer.mandelbrot().zoom(), 0);
    session.assert_frame_matches_grid();
}

#[test]
fn toggling_colouring_recolours_everything() {
    let mut session = Session::new();
    session.step(0, Input::default());
    let palette_frame = session.frame.clone();
    session.step(
        16,
        Input {
            toggle_colouring: true,
            ..Input::default()
        },
    );
    assert_eq!(session.explorer.colouring(), Colouring::Histogram);

    assert_ne!(session.frame, palette_frame);
    assert!(session.frame.contains(&Rgba::BLACK));

    session.step(
        16,
        Input {
            toggle_colouring: true,
            ..Input::default()
        },
    );
    session.assert_frame_matches_grid();
}
