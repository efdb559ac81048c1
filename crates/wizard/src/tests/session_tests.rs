use super::*;

fn session() -> WizardSession {
    WizardSession::book_wizard().expect("graph")
}

fn names(items: &[&str]) -> AnswerValue {
    AnswerValue::List(items.iter().map(|s| s.to_string()).collect())
}

/// Answers every step of a fiction path and returns the count of answers.
fn walk_fiction(session: &mut WizardSession) -> usize {
    let path: Vec<AnswerValue> = vec![
        "start".into(),
        "fiction".into(),
        "fantasy".into(),
        "Zoo".into(),
        "adults".into(),
        7i64.into(),
        names(&["love", "adventure"]),
        3i64.into(),
        names(&["One", "Two", "Three"]),
    ];
    let len = path.len();
    for value in path {
        assert!(matches!(
            session.answer(value),
            AnswerOutcome::Advanced { .. }
        ));
    }
    len
}

#[test]
fn new_session_starts_at_init() {
    let session = session();
    assert_eq!(session.current_step(), StepId::Init);
    assert!(session.answers().is_empty());
    assert!(!session.is_complete());
    assert_eq!(session.progress(), 1);
    assert_eq!(session.current_step_data().id, StepId::Init);
}

#[test]
fn fiction_branch_skips_category() {
    let mut session = session();
    assert_eq!(
        session.answer("start"),
        AnswerOutcome::Advanced {
            from: StepId::Init,
            to: StepId::BookType
        }
    );
    session.answer("fiction");
    assert_eq!(session.current_step(), StepId::FictionGenre);
    session.answer("fantasy");
    assert_eq!(session.current_step(), StepId::BookTitle);
    assert!(session.answer_for(StepId::NonFictionCategory).is_none());
}

#[test]
fn non_fiction_branch_asks_for_category() {
    let mut session = session();
    session.answer("start");
    session.answer("non-fiction");
    assert_eq!(session.current_step(), StepId::NonFictionCategory);
    session.answer("programming");
    assert_eq!(session.current_step(), StepId::BookTitle);
}

#[test]
fn short_title_is_rejected_without_state_change() {
    let mut session = session();
    session.answer("start");
    session.answer("fiction");
    session.answer("fantasy");
    let before = session.answers().to_vec();

    assert_eq!(
        session.answer("ab"),
        AnswerOutcome::Rejected {
            step: StepId::BookTitle
        }
    );
    assert_eq!(session.current_step(), StepId::BookTitle);
    assert_eq!(session.answers(), before.as_slice());
    assert!(!session.is_complete());

    session.answer("Zoo");
    assert_eq!(session.current_step(), StepId::TargetAudience);
    assert_eq!(
        session.answer_for(StepId::BookTitle),
        Some(&AnswerValue::Text("Zoo".to_string()))
    );
}

#[test]
fn chapter_count_then_names_completes() {
    let mut session = session();
    for value in [
        AnswerValue::from("start"),
        "fiction".into(),
        "mystery".into(),
        "The Case".into(),
        "adults".into(),
        5i64.into(),
        names(&["mystery"]),
    ] {
        session.answer(value);
    }
    assert_eq!(session.current_step(), StepId::ChapterCount);

    assert!(matches!(
        session.answer(0i64),
        AnswerOutcome::Rejected { .. }
    ));
    assert!(matches!(
        session.answer(51i64),
        AnswerOutcome::Rejected { .. }
    ));
    session.answer(3i64);
    assert_eq!(session.current_step(), StepId::ChapterNames);

    session.answer(names(&["A", "B", "C"]));
    assert_eq!(session.current_step(), StepId::Complete);
    assert!(session.is_complete());
}

#[test]
fn full_path_reaches_terminal_after_path_length() {
    let mut session = session();
    let steps = walk_fiction(&mut session);
    assert!(session.is_complete());
    assert_eq!(session.answers().len(), steps);
    assert_eq!(session.progress(), steps + 1);
}

#[test]
fn going_back_undoes_the_last_answer() {
    let mut session = session();
    session.answer("start");
    session.answer("fiction");

    let step_before = session.current_step();
    let answers_before = session.answers().to_vec();
    session.answer("romance");
    assert_eq!(session.current_step(), StepId::BookTitle);

    assert!(session.go_to_previous_step());
    assert_eq!(session.current_step(), step_before);
    assert_eq!(session.answers(), answers_before.as_slice());
}

#[test]
fn going_back_from_every_step_restores_the_previous_one() {
    let mut session = session();
    walk_fiction(&mut session);

    let mut visited: Vec<StepId> = session.answers().iter().map(|a| a.step_id).collect();
    while let Some(expected) = visited.pop() {
        assert!(session.go_to_previous_step());
        assert_eq!(session.current_step(), expected);
        assert!(!session.is_complete());
        assert_eq!(session.answers().len(), visited.len());
    }
    assert_eq!(session.current_step(), StepId::Init);
    assert!(!session.go_to_previous_step());
}

#[test]
fn going_back_clears_temp_input_but_keeps_writing_flag() {
    let mut session = session();
    session.answer("start");
    session.set_temp_input("half typed");
    session.set_writing(true);

    session.go_to_previous_step();
    assert_eq!(session.temp_input(), "");
    assert!(session.is_writing());
}

#[test]
fn going_back_on_empty_history_is_a_no_op() {
    let mut session = session();
    session.set_temp_input("draft");
    assert!(!session.go_to_previous_step());
    assert_eq!(session.current_step(), StepId::Init);
    assert_eq!(session.temp_input(), "draft");
}

#[test]
fn unmatched_choice_falls_back_to_terminal() {
    let mut session = session();
    session.answer("start");
    assert_eq!(
        session.answer("poetry"),
        AnswerOutcome::Advanced {
            from: StepId::BookType,
            to: StepId::Complete
        }
    );
    assert!(session.is_complete());
    assert_eq!(session.answers().len(), 2);
}

#[test]
fn answering_clears_temp_input() {
    let mut session = session();
    session.answer("start");
    session.answer("fiction");
    session.answer("sci-fi");
    session.set_temp_input("Dune");
    session.set_writing(true);
    assert_eq!(session.snapshot().temp_input, "Dune");

    session.answer("Dune Again");
    assert_eq!(session.temp_input(), "");
}

#[test]
fn reset_returns_to_init_from_anywhere() {
    let mut session = session();
    walk_fiction(&mut session);
    session.set_writing(true);
    session.set_temp_input("x");

    session.reset();
    assert_eq!(session.current_step(), StepId::Init);
    assert!(session.answers().is_empty());
    assert!(!session.is_complete());
    assert!(!session.is_writing());
    assert_eq!(session.temp_input(), "");

    session.start();
    assert_eq!(session.current_step(), StepId::Init);
}

#[test]
fn answer_for_returns_first_recorded_value() {
    let mut session = session();
    walk_fiction(&mut session);
    session.answer("save");
    session.answer("export");
    assert_eq!(session.current_step(), StepId::Complete);
    assert_eq!(
        session.answer_for(StepId::Complete),
        Some(&AnswerValue::Text("save".to_string()))
    );
}

#[test]
fn independent_sessions_share_a_graph() {
    let graph = Arc::new(StepGraph::book_wizard().expect("graph"));
    let mut first = WizardSession::new(graph.clone());
    let second = WizardSession::new(graph);
    first.answer("start");
    assert_eq!(first.current_step(), StepId::BookType);
    assert_eq!(second.current_step(), StepId::Init);
}

#[test]
fn snapshot_serializes_for_presentation() {
    let mut session = session();
    session.answer("start");
    let json = serde_json::to_value(session.snapshot()).expect("json");
    assert_eq!(json["current_step"], "BOOK_TYPE");
    assert_eq!(json["step"]["input"], "choice");
    assert_eq!(json["progress"], 2);
    assert_eq!(json["answers"][0]["value"], "start");
}
