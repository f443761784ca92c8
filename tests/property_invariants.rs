use proptest::prelude::*;

use quizdrill::{
    core::store::QuizStore,
    persist::{OpSink, sqlite::SqliteOpSink},
    quiz::{QuizDraft, QuizPatch, QuizRecord},
    session::{SessionError, answers_match, validate_id},
};

#[derive(Debug, Clone)]
enum Action {
    Create { q: u8, blank: bool },
    EditAnswer { target: u8, a: u8 },
    Destroy { target: u8 },
    DestroyMissing,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..50, prop::bool::weighted(0.1)).prop_map(|(q, blank)| Action::Create { q, blank }),
        (0u8..24, 0u8..50).prop_map(|(target, a)| Action::EditAnswer { target, a }),
        (0u8..24).prop_map(|target| Action::Destroy { target }),
        Just(Action::DestroyMissing),
    ]
}

fn pick(store: &QuizStore, target: u8) -> Option<i64> {
    let ids = store.ordered_ids();
    (!ids.is_empty()).then(|| ids[usize::from(target) % ids.len()])
}

proptest! {
    #[test]
    fn random_sequences_match_model_and_replay(actions in prop::collection::vec(action_strategy(), 1..150)) {
        let mut store = QuizStore::new();
        let mut model: Vec<QuizRecord> = Vec::new();
        let mut next_id = 1i64;

        for action in actions {
            match action {
                Action::Create { q, blank } => {
                    let answer = if blank { String::new() } else { format!("a{q}") };
                    let res = store.create(QuizDraft::new(format!("q{q}?"), answer.clone()));
                    prop_assert_eq!(res.is_ok(), !blank);
                    if let Ok((quiz, _)) = res {
                        prop_assert_eq!(quiz.id, next_id);
                        next_id += 1;
                        model.push(quiz);
                    }
                }
                Action::EditAnswer { target, a } => {
                    let Some(id) = pick(&store, target) else { continue };
                    let patch = QuizPatch { answer: Some(format!("e{a}")), ..QuizPatch::default() };
                    let (updated, _) = store.update(id, patch).expect("update");
                    let slot = model.iter_mut().find(|q| q.id == id).expect("model has id");
                    *slot = updated;
                }
                Action::Destroy { target } => {
                    let Some(id) = pick(&store, target) else { continue };
                    prop_assert_eq!(store.destroy(id).0, 1);
                    model.retain(|q| q.id != id);
                }
                Action::DestroyMissing => {
                    let before = store.len();
                    prop_assert_eq!(store.destroy(-1).0, 0);
                    prop_assert_eq!(store.len(), before);
                }
            }

            prop_assert_eq!(store.all_cloned(), model.clone());
        }

        let mut sink = SqliteOpSink::open_in_memory().expect("sink");
        sink.append_ops(&store.drain_pending_ops()).expect("append");
        let replayed = sink.load_store().expect("replay");
        prop_assert_eq!(replayed.export_snapshot(), store.export_snapshot());
    }

    #[test]
    fn any_integer_with_padding_validates(n in any::<i64>(), left in 0usize..3, right in 0usize..3) {
        let raw = format!("{}{n}{}", " ".repeat(left), " ".repeat(right));
        prop_assert_eq!(validate_id(Some(raw.as_str())).expect("valid"), n);
    }

    #[test]
    fn strings_without_leading_digits_are_invalid(s in "[a-zA-Z_?!][a-zA-Z0-9 ]{0,8}") {
        prop_assert!(matches!(validate_id(Some(s.as_str())), Err(SessionError::InvalidParameter(_))));
    }

    #[test]
    fn answer_equality_ignores_case_and_padding(s in "[a-zA-Z0-9]{1,12}", pad in " {0,3}") {
        let padded = format!("{pad}{}{pad}", s.to_uppercase());
        prop_assert!(answers_match(&s, &padded));
        let suffixed = format!("{s}x");
        prop_assert!(!answers_match(&s, &suffixed));
    }
}
