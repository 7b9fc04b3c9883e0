//! Property-based tests for the stored data formats.
//!
//! Uses proptest to verify:
//! 1. Any valid `Task` survives encode then decode, with camelCase keys and
//!    absent optionals omitted.
//! 2. Any `UserProfile` survives encode then decode.
//! 3. Arbitrary text never causes a panic in `decode` (returns `Err`).
//! 4. Avatar hues are always below 360 and deterministic.
//! 5. Initials are at most two uppercase-mapped characters.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use taskdeck_model::codec;
use taskdeck_model::task::{Task, TaskId, TaskStatus};
use taskdeck_model::user::{UserProfile, avatar_color, avatar_hue};

// --- Strategies for model types ---

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2100-01-01, millisecond precision.
    (946_684_800_000i64..4_102_444_800_000).prop_map(|ms| {
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    })
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![Just(TaskStatus::Pending), Just(TaskStatus::Completed)]
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[A-Za-z0-9_-]{1,36}",
        "\\PC{1,60}",
        proptest::option::of("\\PC{0,200}"),
        arb_status(),
        arb_instant(),
        0i64..1_000_000_000,
        proptest::option::of(arb_instant()),
    )
        .prop_map(
            |(id, name, description, status, created_at, later_ms, due_date)| Task {
                id: TaskId::from_string(id),
                name,
                description,
                status,
                created_at,
                updated_at: created_at + chrono::Duration::milliseconds(later_ms),
                due_date,
            },
        )
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    ("\\PC{0,40}", "[a-z0-9.]{1,20}@[a-z]{1,10}\\.[a-z]{2,4}")
        .prop_map(|(name, email)| UserProfile::new(&name, &email, None))
}

proptest! {
    #[test]
    fn task_round_trip(task in arb_task()) {
        let text = codec::encode(&task).unwrap();
        let decoded: Task = codec::decode(&text).unwrap();
        prop_assert_eq!(&decoded, &task);

        prop_assert!(text.contains("\"createdAt\""));
        prop_assert!(text.contains("\"updatedAt\""));
        prop_assert_eq!(text.contains("\"dueDate\""), task.due_date.is_some());
        prop_assert_eq!(text.contains("\"description\""), task.description.is_some());
    }

    #[test]
    fn task_list_round_trip(tasks in prop::collection::vec(arb_task(), 0..10)) {
        let text = codec::encode(&tasks).unwrap();
        let decoded: Vec<Task> = codec::decode(&text).unwrap();
        prop_assert_eq!(decoded, tasks);
    }

    #[test]
    fn profile_round_trip(profile in arb_profile()) {
        let text = codec::encode(&profile).unwrap();
        let decoded: UserProfile = codec::decode(&text).unwrap();
        prop_assert_eq!(decoded, profile);
        prop_assert!(text.contains("\"avatarColor\""));
    }

    #[test]
    fn decode_arbitrary_text_never_panics(text in "\\PC{0,200}") {
        let _ = codec::decode::<Vec<Task>>(&text);
        let _ = codec::decode::<UserProfile>(&text);
    }

    #[test]
    fn avatar_hue_in_range(seed in "\\PC{0,80}") {
        let hue = avatar_hue(&seed);
        prop_assert!(hue < 360);
        prop_assert_eq!(hue, avatar_hue(&seed));
        prop_assert_eq!(avatar_color(&seed), format!("hsl({hue}, 70%, 55%)"));
    }

    #[test]
    fn initials_are_short(name in "[a-zA-Z ]{0,60}") {
        let profile = UserProfile::new(&name, "x@y.z", None);
        let initials = profile.initials();
        prop_assert!(initials.chars().count() <= 2);
        prop_assert!(!initials.chars().any(char::is_lowercase));
    }
}
