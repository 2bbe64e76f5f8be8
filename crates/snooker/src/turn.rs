use crate::balls::{Ball, BallType};

/// Facts gathered while the balls roll after a shot.
#[derive(Debug, Default)]
pub struct TurnContext {
    first_hit: Option<BallType>,
    potted: Vec<Ball>,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a contact between two bodies; `None` means the body is not a ball.
    /// Records the first ball the cue ball strikes, once per turn.
    /// Returns `true` when this contact set the first hit.
    pub fn on_collision(&mut self, a: Option<BallType>, b: Option<BallType>) -> bool {
        if self.first_hit.is_some() {
            return false;
        }
        let struck = match (a, b) {
            (Some(BallType::Cue), Some(other)) | (Some(other), Some(BallType::Cue))
                if other != BallType::Cue =>
            {
                other
            }
            _ => return false,
        };
        self.first_hit = Some(struck);
        true
    }

    pub fn record_pot(&mut self, ball: Ball) {
        self.potted.push(ball);
    }

    pub fn first_hit(&self) -> Option<BallType> {
        self.first_hit
    }

    pub fn potted(&self) -> &[Ball] {
        &self.potted
    }

    pub fn potted_kinds(&self) -> Vec<BallType> {
        self.potted.iter().map(Ball::kind).collect()
    }

    /// Hand over the potted balls and forget the turn.
    pub fn take(&mut self) -> (Option<BallType>, Vec<Ball>) {
        (self.first_hit.take(), std::mem::take(&mut self.potted))
    }

    pub fn clear(&mut self) {
        self.first_hit = None;
        self.potted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_the_first_ball_struck_by_the_cue() {
        let mut turn = TurnContext::new();
        assert!(turn.on_collision(Some(BallType::Cue), Some(BallType::Red)));
        assert!(!turn.on_collision(Some(BallType::Blue), Some(BallType::Cue)));
        assert_eq!(turn.first_hit(), Some(BallType::Red));
    }

    #[test]
    fn order_of_bodies_does_not_matter() {
        let mut turn = TurnContext::new();
        assert!(turn.on_collision(Some(BallType::Pink), Some(BallType::Cue)));
        assert_eq!(turn.first_hit(), Some(BallType::Pink));
    }

    #[test]
    fn cushions_and_object_ball_contacts_are_ignored() {
        let mut turn = TurnContext::new();
        assert!(!turn.on_collision(Some(BallType::Cue), None));
        assert!(!turn.on_collision(None, Some(BallType::Cue)));
        assert!(!turn.on_collision(Some(BallType::Red), Some(BallType::Black)));
        assert_eq!(turn.first_hit(), None);

        assert!(turn.on_collision(Some(BallType::Cue), Some(BallType::Black)));
        assert_eq!(turn.first_hit(), Some(BallType::Black));
    }

    #[test]
    fn take_resets_the_turn() {
        let mut turn = TurnContext::new();
        turn.on_collision(Some(BallType::Cue), Some(BallType::Red));
        turn.record_pot(Ball::new(BallType::Red));
        assert_eq!(turn.potted_kinds(), vec![BallType::Red]);

        let (first, potted) = turn.take();
        assert_eq!(first, Some(BallType::Red));
        assert_eq!(potted.len(), 1);
        assert_eq!(turn.first_hit(), None);
        assert!(turn.potted().is_empty());
    }
}
