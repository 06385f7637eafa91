//! Run sharing: the payload handed to the page's note publisher
//!
//! The publisher itself (signing, relays) lives in the page. This module
//! only decides what gets said about a finished run.

use serde::{Deserialize, Serialize};

use crate::hud::format_distance;
use crate::sim::RunStats;

pub const PROMO_LINE: &str =
    "Race the slopes in Ski Sats: endless skiing, sats collecting, and yeti dodging.";
pub const SERIES: &str = "skisats";
pub const GAME: &str = "SkiSats";
pub const FALLBACK_BASE_URL: &str = "https://skisats.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStats {
    pub distance: f32,
    pub sats: u32,
    pub time_seconds: f32,
}

/// Serialized and passed to the page when the player shares a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub score: u64,
    pub stats: ShareStats,
    pub base_url: String,
}

impl SharePayload {
    pub fn from_stats(stats: &RunStats, base_url: &str) -> Self {
        let base_url = if base_url.trim().is_empty() {
            FALLBACK_BASE_URL
        } else {
            base_url
        };
        Self {
            score: whole(stats.distance, f32::floor),
            stats: ShareStats {
                distance: stats.distance,
                sats: stats.sats,
                time_seconds: stats.elapsed,
            },
            base_url: base_url.to_string(),
        }
    }
}

fn whole(value: f32, round: fn(f32) -> f32) -> u64 {
    if value.is_finite() {
        round(value.max(0.0)) as u64
    } else {
        0
    }
}

/// `"{m}m {s}s"` from one minute up, `"{s}s"` below
pub fn format_seconds(seconds: f32) -> String {
    let total = whole(seconds, f32::round);
    let (mins, secs) = (total / 60, total % 60);
    if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Text body of the shared note
pub fn share_note_content(payload: &SharePayload) -> String {
    let lines = [
        format!("Just skied {}m in Ski Sats!", whole(payload.stats.distance, f32::round)),
        format!("Sats collected: {}", payload.stats.sats),
        format!("Survived for {}", format_seconds(payload.stats.time_seconds)),
        String::new(),
        format!("Play at {}", payload.base_url),
        String::new(),
        PROMO_LINE.to_string(),
    ];
    lines.join("\n")
}

/// Metadata tags attached to the shared note
pub fn share_note_tags(payload: &SharePayload) -> Vec<[String; 2]> {
    vec![
        ["series".into(), SERIES.into()],
        ["game".into(), GAME.into()],
        ["distance".into(), whole(payload.stats.distance, f32::round).to_string()],
        ["sats".into(), payload.stats.sats.to_string()],
        ["time_s".into(), whole(payload.stats.time_seconds, f32::round).to_string()],
    ]
}

/// Detail of the page's run-ended event: stats, summary and a ready-to-publish note
pub fn run_ended_payload(stats: &RunStats, base_url: &str) -> serde_json::Value {
    let share = SharePayload::from_stats(stats, base_url);
    serde_json::json!({
        "stats": stats,
        "summary": summary_line(stats),
        "note": share_note_content(&share),
        "tags": share_note_tags(&share),
        "share": share,
    })
}

/// One-line run summary for the end-of-run panel
pub fn summary_line(stats: &RunStats) -> String {
    format!(
        "Distance: {} \u{2022} Time: {} \u{2022} Sats: {}",
        format_distance(stats.distance),
        format_seconds(stats.elapsed),
        stats.sats
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TerminationReason;

    fn stats() -> RunStats {
        RunStats {
            run: 3,
            distance: 1234.6,
            elapsed: 75.4,
            sats: 12,
            reason: TerminationReason::Obstacle,
        }
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(59.4), "59s");
        assert_eq!(format_seconds(59.6), "1m 0s");
        assert_eq!(format_seconds(125.0), "2m 5s");
        assert_eq!(format_seconds(-3.0), "0s");
        assert_eq!(format_seconds(f32::NAN), "0s");
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = SharePayload::from_stats(&stats(), "https://example.org");
        assert_eq!(payload.score, 1234);
        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["score"], 1234);
        assert_eq!(json["stats"]["sats"], 12);
        assert!(json["stats"]["timeSeconds"].is_number());
        assert_eq!(json["baseUrl"], "https://example.org");
    }

    #[test]
    fn test_empty_base_url_falls_back() {
        let payload = SharePayload::from_stats(&stats(), "  ");
        assert_eq!(payload.base_url, FALLBACK_BASE_URL);
    }

    #[test]
    fn test_note_content() {
        let payload = SharePayload::from_stats(&stats(), "https://example.org");
        let content = share_note_content(&payload);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Just skied 1235m in Ski Sats!",
                "Sats collected: 12",
                "Survived for 1m 15s",
                "",
                "Play at https://example.org",
                "",
                PROMO_LINE,
            ]
        );
    }

    #[test]
    fn test_note_tags() {
        let payload = SharePayload::from_stats(&stats(), "https://example.org");
        let tags = share_note_tags(&payload);
        assert!(tags.contains(&["distance".to_string(), "1235".to_string()]));
        assert!(tags.contains(&["time_s".to_string(), "75".to_string()]));
    }

    #[test]
    fn test_run_ended_payload_carries_note() {
        let detail = run_ended_payload(&stats(), "");
        assert_eq!(detail["share"]["baseUrl"], FALLBACK_BASE_URL);
        let note = detail["note"].as_str().unwrap();
        assert!(note.starts_with("Just skied 1235m in Ski Sats!"));
        assert!(note.contains(&format!("Play at {}", FALLBACK_BASE_URL)));
        assert_eq!(detail["tags"][0], serde_json::json!(["series", SERIES]));
        assert!(
            detail["tags"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!(["sats", "12"]))
        );
        assert_eq!(detail["summary"], summary_line(&stats()));
        assert_eq!(detail["stats"]["sats"], 12);
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&stats()),
            "Distance: 1234 m \u{2022} Time: 1m 15s \u{2022} Sats: 12"
        );
    }
}
