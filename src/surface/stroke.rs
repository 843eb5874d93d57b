//! Pointer-event gate that turns raw canvas input into stroke commands.
//!
//! A stroke only consumes moves between a button press and the first of
//! release or leave. Events are handled strictly in arrival order, so two
//! quick gestures are serialized and never interleave.

/// Raw pointer input, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Leave,
}

/// What the surface has to render for an accepted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeCommand {
    /// Move the pen without emitting ink.
    MoveTo((f32, f32)),
    /// Ink a segment between two points.
    LineTo { from: (f32, f32), to: (f32, f32) },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        last: (f32, f32),
    },
}

/// Subscription to the pointer stream of one surface.
///
/// The gate has to be attached (surface mounted) before it accepts anything;
/// detaching drops whatever stroke is in progress.
#[derive(Debug, Default)]
pub struct StrokeGate {
    state: StrokeState,
    attached: bool,
}

impl StrokeGate {
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
        self.state = StrokeState::Idle;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Ends the active stroke, if any. Moves are ignored until the next press.
    pub fn end_stroke(&mut self) {
        self.state = StrokeState::Idle;
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<StrokeCommand> {
        if !self.attached {
            return None;
        }

        match (self.state, event) {
            (_, PointerEvent::Down { x, y }) => {
                self.state = StrokeState::Drawing { last: (x, y) };
                Some(StrokeCommand::MoveTo((x, y)))
            }
            (StrokeState::Drawing { last }, PointerEvent::Move { x, y }) => {
                self.state = StrokeState::Drawing { last: (x, y) };
                Some(StrokeCommand::LineTo { from: last, to: (x, y) })
            }
            (StrokeState::Idle, PointerEvent::Move { .. }) => None,
            (_, PointerEvent::Up | PointerEvent::Leave) => {
                self.state = StrokeState::Idle;
                None
            }
        }
    }
}
