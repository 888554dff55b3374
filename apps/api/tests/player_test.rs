//! Integration tests for the shared playback session

mod common;

use assert_matches::assert_matches;
use rstest::rstest;

use cantata_api::player::{PlaybackError, PlaybackEvent, RepeatMode};

use common::{player_with, track};

#[rstest]
#[case(150, 100)]
#[case(-5, 0)]
#[case(0, 0)]
#[case(100, 100)]
#[case(50, 50)]
fn volume_is_clamped(#[case] requested: i64, #[case] expected: u8) {
    let player = player_with(&[]);
    let state = player.set_volume(requested);
    assert_eq!(state.volume, expected);
    assert_eq!(player.state().volume, expected);
}

#[tokio::test]
async fn start_plays_from_the_beginning() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);

    let state = player.start(t1.id).await.unwrap();
    assert!(state.is_playing);
    assert_eq!(state.position, 0.0);
    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t1.id));
    assert_eq!(state.current_track.as_ref().map(|t| t.title.as_str()), Some("First"));
}

#[tokio::test]
async fn seek_validates_bounds() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);
    player.start(t1.id).await.unwrap();
    player.seek_to(42.0).unwrap();

    assert_matches!(
        player.seek_to(-10.0),
        Err(PlaybackError::InvalidSeekPosition(_))
    );
    assert_matches!(
        player.seek_to(200.5),
        Err(PlaybackError::InvalidSeekPosition(_))
    );
    // A rejected seek leaves the position untouched.
    assert_eq!(player.state().position, 42.0);

    let state = player.seek_to(200.0).unwrap();
    assert_eq!(state.position, 200.0);
}

#[tokio::test]
async fn seek_without_current_track_fails() {
    let player = player_with(&[]);
    assert_matches!(
        player.seek_to(10.0),
        Err(PlaybackError::InvalidSeekPosition(_))
    );
}

#[tokio::test]
async fn queue_add_then_remove_round_trips() {
    let t1 = track("First", 200);
    let t2 = track("Second", 180);
    let player = player_with(&[t1.clone(), t2.clone()]);

    player.add_to_queue(t1.id, None).await.unwrap();
    let before = player.state().queue;

    player.add_to_queue(t2.id, Some(0)).await.unwrap();
    let state = player.remove_from_queue(0).unwrap();

    assert_eq!(state.queue, before);
}

#[tokio::test]
async fn queue_insert_past_end_appends() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);

    let state = player.add_to_queue(t1.id, Some(99)).await.unwrap();
    assert_eq!(state.queue.len(), 1);
    assert_eq!(state.queue[0].id, t1.id);
}

#[tokio::test]
async fn queue_remove_out_of_range_fails() {
    let player = player_with(&[]);
    assert_matches!(
        player.remove_from_queue(0),
        Err(PlaybackError::QueueIndexOutOfRange(0))
    );
}

#[tokio::test]
async fn enqueue_unknown_track_fails() {
    let player = player_with(&[]);
    let missing = uuid::Uuid::new_v4();
    assert_matches!(
        player.add_to_queue(missing, None).await,
        Err(PlaybackError::TrackNotFound(id)) if id == missing
    );
}

#[tokio::test]
async fn next_consumes_the_queue_head() {
    let t1 = track("First", 200);
    let t2 = track("Second", 180);
    let player = player_with(&[t1.clone(), t2.clone()]);
    let mut events = player.subscribe();

    player.start(t1.id).await.unwrap();
    player.add_to_queue(t2.id, None).await.unwrap();
    let state = player.play_next().unwrap();

    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t2.id));
    assert!(state.queue.is_empty());

    // started -> queue_added -> next
    assert_eq!(
        events.recv().await.unwrap().event,
        PlaybackEvent::Started { track_id: t1.id }
    );
    assert_eq!(
        events.recv().await.unwrap().event,
        PlaybackEvent::QueueAdded {
            track_id: t2.id,
            index: 0
        }
    );
    let change = events.recv().await.unwrap();
    assert_eq!(change.event, PlaybackEvent::Next { track_id: t2.id });
    assert!(change.state.queue.is_empty());
}

#[tokio::test]
async fn next_with_empty_queue_and_no_repeat_fails() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);
    player.start(t1.id).await.unwrap();

    assert_matches!(player.play_next(), Err(PlaybackError::NoNextTrack));
    // The failed advance leaves the current track alone.
    assert_eq!(
        player.state().current_track.as_ref().map(|t| t.id),
        Some(t1.id)
    );
}

#[tokio::test]
async fn repeat_queue_cycles_through_the_queue() {
    let t1 = track("First", 200);
    let t2 = track("Second", 180);
    let player = player_with(&[t1.clone(), t2.clone()]);

    player.start(t1.id).await.unwrap();
    player.add_to_queue(t2.id, None).await.unwrap();
    player.set_repeat(RepeatMode::Queue);

    // T1 goes back to the tail as T2 takes over, and vice versa.
    let state = player.play_next().unwrap();
    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t2.id));
    assert_eq!(state.queue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t1.id]);

    let state = player.play_next().unwrap();
    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t1.id));
    assert_eq!(state.queue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![t2.id]);
}

#[tokio::test]
async fn previous_steps_back_through_history() {
    let t1 = track("First", 200);
    let t2 = track("Second", 180);
    let player = player_with(&[t1.clone(), t2.clone()]);

    player.start(t1.id).await.unwrap();
    player.start(t2.id).await.unwrap();

    let state = player.play_previous().unwrap();
    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t1.id));
    assert!(state.is_playing);
    assert_eq!(state.position, 0.0);
}

#[tokio::test]
async fn previous_with_no_history_fails() {
    let player = player_with(&[]);
    assert_matches!(player.play_previous(), Err(PlaybackError::NoPreviousTrack));
}

#[tokio::test]
async fn previous_after_stop_resumes_last_played() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);

    player.start(t1.id).await.unwrap();
    player.stop();

    let state = player.play_previous().unwrap();
    assert_eq!(state.current_track.as_ref().map(|t| t.id), Some(t1.id));
    assert!(state.is_playing);
}

#[tokio::test]
async fn pause_and_resume_are_noops_without_a_track() {
    let player = player_with(&[]);

    let state = player.pause();
    assert!(!state.is_playing);
    assert!(state.current_track.is_none());

    let state = player.resume();
    assert!(!state.is_playing);
}

#[tokio::test]
async fn pause_then_resume_keeps_the_position() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);
    player.start(t1.id).await.unwrap();
    player.seek_to(30.0).unwrap();

    let state = player.pause();
    assert!(!state.is_playing);
    assert_eq!(state.position, 30.0);

    // Pausing again changes nothing.
    let state = player.pause();
    assert!(!state.is_playing);

    let state = player.resume();
    assert!(state.is_playing);
    assert_eq!(state.position, 30.0);
}

#[tokio::test]
async fn stop_clears_the_session() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);
    player.start(t1.id).await.unwrap();

    let state = player.stop();
    assert!(state.current_track.is_none());
    assert!(!state.is_playing);
    assert_eq!(state.position, 0.0);
}

#[tokio::test]
async fn toggle_shuffle_flips_the_flag() {
    let player = player_with(&[]);
    assert!(!player.state().shuffle);
    assert!(player.toggle_shuffle().shuffle);
    assert!(!player.toggle_shuffle().shuffle);
}

#[tokio::test]
async fn clear_queue_empties_the_queue() {
    let t1 = track("First", 200);
    let player = player_with(&[t1.clone()]);
    player.add_to_queue(t1.id, None).await.unwrap();
    player.add_to_queue(t1.id, None).await.unwrap();

    let state = player.clear_queue();
    assert!(state.queue.is_empty());
}
