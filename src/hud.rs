//! HUD text and presentation values derived from the game state

use serde::Serialize;

use crate::sim::{GamePhase, GameState};

/// Yeti distance at which the warning (and camera shake) begins
pub const YETI_WARNING_RANGE: f32 = 60.0;

/// `"{whole meters} m"`
pub fn format_distance(distance: f32) -> String {
    format!("{} m", distance.max(0.0).floor() as u64)
}

/// `"M:SS"` from whole elapsed seconds
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Shake intensity in `[0, 1]`: zero with no yeti or beyond `range`, one at contact
pub fn yeti_shake(distance: Option<f32>, range: f32) -> f32 {
    match distance {
        Some(d) if range > 0.0 && d < range => (1.0 - d / range).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Everything the DOM HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudView {
    pub phase: GamePhase,
    pub distance: String,
    pub time: String,
    pub sats: u32,
    pub yeti_warning: bool,
    /// Camera shake after the user's motion preference
    pub shake: f32,
}

impl HudView {
    /// `shake_scale` is 0 when the player opted out of camera shake
    pub fn from_state(state: &GameState, shake_scale: f32) -> Self {
        let yeti_distance = state.yeti.distance_to(&state.player);
        let playing = state.phase == GamePhase::Playing;
        Self {
            phase: state.phase,
            distance: format_distance(state.player.distance),
            time: format_time(state.elapsed),
            sats: state.sats,
            yeti_warning: playing && yeti_distance.is_some_and(|d| d < YETI_WARNING_RANGE),
            shake: if playing {
                yeti_shake(yeti_distance, YETI_WARNING_RANGE) * shake_scale
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::{NullSink, TickInput, tick};
    use glam::Vec2;

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(123.9), "123 m");
        assert_eq!(format_distance(-4.0), "0 m");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn test_yeti_shake() {
        assert_eq!(yeti_shake(None, 60.0), 0.0);
        assert_eq!(yeti_shake(Some(60.0), 60.0), 0.0);
        assert_eq!(yeti_shake(Some(0.0), 60.0), 1.0);
        assert_eq!(yeti_shake(Some(30.0), 60.0), 0.5);
        assert_eq!(yeti_shake(Some(10.0), 0.0), 0.0);
    }

    #[test]
    fn test_hud_view_tracks_yeti() {
        let mut state = GameState::new(GameConfig::default(), 5);
        let confirm = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &confirm, 0.0, &mut NullSink);

        let hud = HudView::from_state(&state, 1.0);
        assert_eq!(hud.distance, "0 m");
        assert_eq!(hud.time, "0:00");
        assert!(!hud.yeti_warning);
        assert_eq!(hud.shake, 0.0);

        state.yeti.activate(state.player.pos() - Vec2::new(0.0, 30.0), 0.0);
        let hud = HudView::from_state(&state, 1.0);
        assert!(hud.yeti_warning);
        assert_eq!(hud.shake, 0.5);
        assert_eq!(HudView::from_state(&state, 0.0).shake, 0.0);
    }
}
