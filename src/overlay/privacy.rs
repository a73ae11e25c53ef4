use cg_ui::{DragState, MouseButton, Point, Rect};

use crate::constants::{
    PRIVACY_BALL_FONT_FACTOR, PRIVACY_BALL_MAX, PRIVACY_BALL_MAX_SIZE, PRIVACY_BALL_MIN_SIZE,
    PRIVACY_BALL_SIZE,
};
use crate::surface::PrivacyBallRender;

#[derive(Debug, Clone)]
struct PrivacyBall {
    id: u32,
    drag: DragState,
    size: f32,
}

/// What the current press does to a ball.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Grab {
    Move(u32),
    Resize { id: u32, start_y: f32, start_size: f32 },
}

impl Grab {
    fn id(&self) -> u32 {
        match self {
            Grab::Move(id) | Grab::Resize { id, .. } => *id,
        }
    }
}

/// Round covers the user can drop over parts of the gallery.
///
/// Left drag moves a ball, right drag resizes it and a double click removes
/// it. At most [`PRIVACY_BALL_MAX`] exist at a time.
#[derive(Debug, Clone, Default)]
pub struct PrivacyBalls {
    balls: Vec<PrivacyBall>,
    next_id: u32,
    grab: Option<Grab>,
}

impl PrivacyBalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    fn ball_mut(&mut self, id: u32) -> Option<&mut PrivacyBall> {
        self.balls.iter_mut().find(|ball| ball.id == id)
    }

    /// Add a ball centred on the gallery. Returns its id, or `None` when the
    /// limit is reached.
    pub fn spawn(&mut self, gallery: Rect) -> Option<u32> {
        if self.balls.len() >= PRIVACY_BALL_MAX {
            log::info!("[privacy] maximum of {} balls reached", PRIVACY_BALL_MAX);
            return None;
        }
        let half = PRIVACY_BALL_SIZE / 2.0;
        let origin = Point::new(
            gallery.x + gallery.width / 2.0 - half,
            gallery.y + gallery.height / 2.0 - half,
        );
        let id = self.next_id;
        self.next_id += 1;
        self.balls.push(PrivacyBall {
            id,
            drag: DragState::new(origin),
            size: PRIVACY_BALL_SIZE,
        });
        Some(id)
    }

    /// Press on ball `id`. Returns true when the press grabbed it.
    pub fn pointer_down(&mut self, id: u32, button: MouseButton, pointer: Point) -> bool {
        let Some(ball) = self.ball_mut(id) else {
            return false;
        };
        let grab = match button {
            MouseButton::Left => {
                ball.drag.begin(pointer);
                Grab::Move(id)
            }
            MouseButton::Right => Grab::Resize {
                id,
                start_y: pointer.y,
                start_size: ball.size,
            },
            _ => return false,
        };
        self.grab = Some(grab);
        true
    }

    /// Returns true when a ball moved or changed size.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        match self.grab {
            Some(Grab::Move(id)) => self
                .ball_mut(id)
                .is_some_and(|ball| ball.drag.motion(pointer).is_some()),
            Some(Grab::Resize { id, start_y, start_size }) => match self.ball_mut(id) {
                Some(ball) => {
                    ball.size = (start_size + pointer.y - start_y)
                        .clamp(PRIVACY_BALL_MIN_SIZE, PRIVACY_BALL_MAX_SIZE);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Returns true when a press was released.
    pub fn pointer_up(&mut self) -> bool {
        match self.grab.take() {
            Some(Grab::Move(id)) => {
                if let Some(ball) = self.ball_mut(id) {
                    ball.drag.release();
                }
                true
            }
            Some(Grab::Resize { .. }) => true,
            None => false,
        }
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.balls.len();
        self.balls.retain(|ball| ball.id != id);
        if self.grab.is_some_and(|grab| grab.id() == id) {
            self.grab = None;
        }
        self.balls.len() != before
    }

    pub fn render(&self) -> Vec<PrivacyBallRender> {
        self.balls
            .iter()
            .map(|ball| PrivacyBallRender {
                id: ball.id,
                position: ball.drag.position(),
                size: ball.size,
                font_size: ball.size * PRIVACY_BALL_FONT_FACTOR,
                dragging: self.grab == Some(Grab::Move(ball.id)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GALLERY: Rect = Rect {
        x: 100.0,
        y: 50.0,
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_spawn_centred_up_to_limit() {
        let mut balls = PrivacyBalls::new();
        let id = balls.spawn(GALLERY);
        assert_eq!(id, Some(0));

        let render = balls.render();
        assert_eq!(render[0].position, Point::new(450.0, 300.0));
        assert_eq!(render[0].size, 100.0);
        assert!((render[0].font_size - 20.0).abs() < 1e-4);

        for _ in 1..PRIVACY_BALL_MAX {
            assert!(balls.spawn(GALLERY).is_some());
        }
        assert_eq!(balls.spawn(GALLERY), None);
        assert_eq!(balls.len(), PRIVACY_BALL_MAX);

        // Removing one frees a slot; ids are not reused
        assert!(balls.remove(2));
        assert!(!balls.remove(2));
        assert_eq!(balls.spawn(GALLERY), Some(5));
    }

    #[test]
    fn test_left_drag_moves() {
        let mut balls = PrivacyBalls::new();
        let id = balls.spawn(GALLERY).unwrap();

        assert!(balls.pointer_down(id, MouseButton::Left, Point::new(460.0, 320.0)));
        assert!(balls.render()[0].dragging);
        assert!(balls.pointer_move(Point::new(60.0, 20.0)));
        assert_eq!(balls.render()[0].position, Point::new(50.0, 0.0));

        // Balls may leave the viewport; nothing snaps back
        assert!(balls.pointer_move(Point::new(-100.0, 20.0)));
        assert!(balls.pointer_up());
        let render = balls.render();
        assert_eq!(render[0].position, Point::new(-110.0, 0.0));
        assert!(!render[0].dragging);

        assert!(!balls.pointer_move(Point::new(0.0, 0.0)));
        assert!(!balls.pointer_up());
    }

    #[test]
    fn test_right_drag_resizes_within_limits() {
        let mut balls = PrivacyBalls::new();
        let id = balls.spawn(GALLERY).unwrap();

        assert!(balls.pointer_down(id, MouseButton::Right, Point::new(500.0, 350.0)));
        balls.pointer_move(Point::new(900.0, 400.0));
        let render = balls.render();
        assert_eq!(render[0].size, 150.0);
        assert!((render[0].font_size - 30.0).abs() < 1e-4);
        // Resizing keeps the top-left corner
        assert_eq!(render[0].position, Point::new(450.0, 300.0));

        balls.pointer_move(Point::new(500.0, 1000.0));
        assert_eq!(balls.render()[0].size, PRIVACY_BALL_MAX_SIZE);
        balls.pointer_move(Point::new(500.0, 0.0));
        assert_eq!(balls.render()[0].size, PRIVACY_BALL_MIN_SIZE);
        assert!(balls.pointer_up());

        // A later press starts from the current size
        balls.pointer_down(id, MouseButton::Right, Point::new(0.0, 100.0));
        balls.pointer_move(Point::new(0.0, 110.0));
        assert_eq!(balls.render()[0].size, 30.0);
    }

    #[test]
    fn test_other_buttons_and_unknown_ids() {
        let mut balls = PrivacyBalls::new();
        let id = balls.spawn(GALLERY).unwrap();
        assert!(!balls.pointer_down(id, MouseButton::Middle, Point::ORIGIN));
        assert!(!balls.pointer_down(42, MouseButton::Left, Point::ORIGIN));
        assert!(!balls.pointer_move(Point::new(10.0, 10.0)));

        // Removing the grabbed ball ends the press
        balls.pointer_down(id, MouseButton::Left, Point::ORIGIN);
        assert!(balls.remove(id));
        assert!(!balls.pointer_move(Point::new(10.0, 10.0)));
        assert!(balls.is_empty());
    }
}
