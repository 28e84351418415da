//! Minimal diffs between snapshots
//!
//! The reconciler is a pure function: it compares two normalized snapshots
//! field by field and returns one [`AttributeChange`] per field that
//! differs, in [`Attribute`] priority order.

use crate::model::{AttributeChange, DeviceSnapshot};

/// Changes needed to move the host from `previous` to `next`
///
/// With no previous snapshot (first tick of an epoch) every attribute is
/// reported so the host starts from a complete picture.
pub fn reconcile(previous: Option<&DeviceSnapshot>, next: &DeviceSnapshot) -> Vec<AttributeChange> {
    let next = next.clone().filter_placeholders();
    let previous = previous.map(|p| p.clone().filter_placeholders());
    let mut changes = Vec::new();

    macro_rules! diff {
        ($($field:ident).+ => $variant:ident) => {
            if previous.as_ref().map_or(true, |p| p.$($field).+ != next.$($field).+) {
                changes.push(AttributeChange::$variant(next.$($field).+.clone()));
            }
        };
    }

    diff!(playback => PlaybackStatus);
    diff!(position_secs => Position);
    diff!(duration_secs => Duration);
    diff!(now_playing.title => Title);
    diff!(now_playing.artist => Artist);
    diff!(now_playing.album => Album);
    diff!(now_playing.artwork => Artwork);
    diff!(volume => Volume);
    diff!(muted => Muted);
    diff!(repeat => Repeat);
    diff!(shuffle => Shuffle);
    diff!(source => Source);
    diff!(output => AudioOutput);

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, NowPlaying, PlaybackState, RepeatMode};
    use proptest::prelude::*;

    fn playing() -> DeviceSnapshot {
        DeviceSnapshot {
            playback: PlaybackState::Playing,
            position_secs: Some(10),
            duration_secs: Some(200),
            now_playing: NowPlaying {
                title: Some("So What".to_string()),
                artist: Some("Miles Davis".to_string()),
                album: Some("Kind of Blue".to_string()),
                artwork: None,
            },
            volume: 30,
            muted: false,
            repeat: RepeatMode::Off,
            shuffle: false,
            source: Some("wifi".to_string()),
            output: Some(2),
        }
    }

    #[test]
    fn test_identical_snapshots_emit_nothing() {
        assert!(reconcile(Some(&playing()), &playing()).is_empty());
    }

    #[test]
    fn test_single_field_change() {
        let mut next = playing();
        next.volume = 31;
        assert_eq!(reconcile(Some(&playing()), &next), vec![AttributeChange::Volume(31)]);
    }

    #[test]
    fn test_first_snapshot_emits_everything() {
        let changes = reconcile(None, &playing());
        assert_eq!(changes.len(), 13);
        assert_eq!(changes[0], AttributeChange::PlaybackStatus(PlaybackState::Playing));
    }

    #[test]
    fn test_priority_order() {
        let mut next = playing();
        next.muted = true;
        next.playback = PlaybackState::Paused;
        next.now_playing.title = Some("Freddie Freeloader".to_string());
        next.position_secs = Some(0);

        let attributes: Vec<Attribute> = reconcile(Some(&playing()), &next)
            .iter()
            .map(AttributeChange::attribute)
            .collect();

        assert_eq!(
            attributes,
            vec![
                Attribute::PlaybackStatus,
                Attribute::Position,
                Attribute::Title,
                Attribute::Muted
            ]
        );
    }

    #[test]
    fn test_placeholder_difference_is_not_a_change() {
        let mut previous = playing();
        previous.now_playing.artwork = Some("un_known".to_string());
        assert!(reconcile(Some(&previous), &playing()).is_empty());
    }

    /// Apply a change to exactly one field, chosen by index
    fn mutate(mut snapshot: DeviceSnapshot, field: usize) -> (DeviceSnapshot, Attribute) {
        let attribute = match field {
            0 => {
                snapshot.playback = PlaybackState::Stopped;
                Attribute::PlaybackStatus
            }
            1 => {
                snapshot.position_secs = snapshot.position_secs.map(|p| p + 1);
                Attribute::Position
            }
            2 => {
                snapshot.duration_secs = None;
                Attribute::Duration
            }
            3 => {
                snapshot.now_playing.title = Some("Other".to_string());
                Attribute::Title
            }
            4 => {
                snapshot.now_playing.artist = None;
                Attribute::Artist
            }
            5 => {
                snapshot.now_playing.album = Some("Other".to_string());
                Attribute::Album
            }
            6 => {
                snapshot.now_playing.artwork = Some("https://x/b.jpg".to_string());
                Attribute::Artwork
            }
            7 => {
                snapshot.volume = (snapshot.volume + 1) % 101;
                Attribute::Volume
            }
            8 => {
                snapshot.muted = !snapshot.muted;
                Attribute::Muted
            }
            9 => {
                snapshot.repeat = snapshot.repeat.cycle();
                Attribute::Repeat
            }
            10 => {
                snapshot.shuffle = !snapshot.shuffle;
                Attribute::Shuffle
            }
            11 => {
                snapshot.source = Some("optical".to_string());
                Attribute::Source
            }
            _ => {
                snapshot.output = Some(1);
                Attribute::AudioOutput
            }
        };
        (snapshot, attribute)
    }

    fn arb_snapshot() -> impl Strategy<Value = DeviceSnapshot> {
        (0u8..=100, any::<bool>(), any::<bool>(), 0u64..10_000).prop_map(
            |(volume, muted, shuffle, position)| DeviceSnapshot {
                volume,
                muted,
                shuffle,
                position_secs: Some(position),
                ..playing()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_one_field_one_change(base in arb_snapshot(), field in 0usize..13) {
            let (next, attribute) = mutate(base.clone(), field);
            let changes = reconcile(Some(&base), &next);
            prop_assert_eq!(changes.len(), 1);
            prop_assert_eq!(changes[0].attribute(), attribute);
        }

        #[test]
        fn prop_no_op_tick_is_silent(base in arb_snapshot()) {
            prop_assert!(reconcile(Some(&base), &base.clone()).is_empty());
        }

        #[test]
        fn prop_changes_are_priority_ordered(a in arb_snapshot(), b in arb_snapshot()) {
            let changes = reconcile(Some(&a), &b);
            let attributes: Vec<Attribute> = changes.iter().map(AttributeChange::attribute).collect();
            let mut sorted = attributes.clone();
            sorted.sort();
            prop_assert_eq!(attributes, sorted);
        }
    }
}
