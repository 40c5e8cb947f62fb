//! Text label mirroring the world score.

use log::info;
use marble_maze_core::Event;

#[derive(Debug)]
pub(crate) struct ScoreLabel {
    text: String,
}

impl ScoreLabel {
    pub(crate) fn new() -> Self {
        Self {
            text: format_score(0),
        }
    }

    /// Refreshes the label on every score mutation.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::ScoreChanged { score } = event {
                self.text = format_score(*score);
                info!("{}", self.text);
            }
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }
}

fn format_score(score: i64) -> String {
    format!("Score: {score}")
}
