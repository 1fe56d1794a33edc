//! Author workflow scenarios: create, edit, soft delete, dialog guards

mod helpers;

use bookshop_editor::{
    ConfirmOutcome, DialogKind, DialogMode, DialogState, EditorConfig, GatewayCall, GatewayOp,
    SessionError, WorkflowOutcome,
};
use helpers::Fixture;
use serde_json::json;

#[tokio::test]
async fn test_create_author_trims_and_refreshes() {
    let fx = Fixture::new().await;

    fx.session.open_author_create().await.unwrap();
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Open
    );
    assert_eq!(
        fx.session.dialog_mode(DialogKind::Author).await,
        Some(DialogMode::Create)
    );
    fx.presenter.type_into(DialogKind::Author, "name", " Ada ");
    fx.presenter.type_into(DialogKind::Author, "bio", "");

    let outcome = fx.session.confirm_author_dialog().await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    let creates: Vec<_> = fx
        .gateway
        .calls()
        .into_iter()
        .filter(|c| c.op() == GatewayOp::Create)
        .collect();
    assert_eq!(
        creates,
        vec![GatewayCall::Create {
            collection: "Authors".to_string(),
            payload: json!({ "name": "Ada", "bio": "" }),
        }]
    );

    assert_eq!(fx.notifier.infos(), vec!["Author created"]);
    assert!(fx.notifier.errors().is_empty());
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Closed
    );
    assert_eq!(fx.session.dialog_mode(DialogKind::Author).await, None);
    assert_eq!(fx.presenter.live(DialogKind::Author), 0);
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
    assert_eq!(fx.gateway.count(GatewayOp::Bind), 0);
}

#[tokio::test]
async fn test_configured_messages_reach_the_user() {
    let mut config = EditorConfig::default();
    config.messages.author_created = "Writer added".to_string();
    let fx = Fixture::with_config(config).await;
    assert_eq!(fx.session.config().messages.author_created, "Writer added");

    fx.session.open_author_create().await.unwrap();
    fx.presenter.type_into(DialogKind::Author, "name", "Ada");
    fx.session.confirm_author_dialog().await.unwrap();

    assert_eq!(fx.notifier.infos(), vec!["Writer added"]);
}

#[tokio::test]
async fn test_create_author_failure_still_closes_and_refreshes() {
    let fx = Fixture::new().await;
    fx.gateway.fail_next(GatewayOp::Create, "Service unavailable");

    fx.session.open_author_create().await.unwrap();
    fx.presenter.type_into(DialogKind::Author, "name", "Ada");
    let outcome = fx.session.confirm_author_dialog().await.unwrap();

    assert_eq!(
        outcome,
        WorkflowOutcome::Rejected("Service unavailable".to_string())
    );
    assert_eq!(fx.notifier.errors(), vec!["Service unavailable"]);
    assert!(fx.notifier.infos().is_empty());
    assert!(!fx.presenter.is_open(DialogKind::Author));
    assert_eq!(fx.presenter.live(DialogKind::Author), 0);
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
}

#[tokio::test]
async fn test_empty_name_is_left_to_the_gateway() {
    let fx = Fixture::new().await;

    fx.session.open_author_create().await.unwrap();
    fx.presenter.type_into(DialogKind::Author, "name", "   ");
    let outcome = fx.session.confirm_author_dialog().await.unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Rejected(_)));
    assert_eq!(fx.gateway.count(GatewayOp::Create), 1);
    assert_eq!(fx.notifier.errors(), vec!["Author name is required"]);
}

#[tokio::test]
async fn test_edit_author_commits_one_batch() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "Mathematician");
    fx.authors.select(ada.clone());

    fx.session.open_author_edit().await.unwrap();
    assert_eq!(
        fx.presenter.field(DialogKind::Author, "name").as_deref(),
        Some("Ada")
    );
    assert_eq!(
        fx.presenter.field(DialogKind::Author, "bio").as_deref(),
        Some("Mathematician")
    );
    assert_eq!(fx.session.pending_edit().await, Some(ada.clone()));
    assert_eq!(
        fx.session.dialog_mode(DialogKind::Author).await,
        Some(DialogMode::Edit)
    );

    fx.presenter.type_into(DialogKind::Author, "bio", " Analyst ");
    let outcome = fx.session.confirm_author_dialog().await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    let commits = fx.commits();
    assert_eq!(commits.len(), 1);
    let GatewayCall::Commit { changes, .. } = &commits[0] else {
        panic!("expected a commit");
    };
    let fields: Vec<_> = changes.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "bio"]);

    let record = fx.gateway.record("Authors", ada.id).unwrap();
    assert_eq!(record["bio"], "Analyst");
    assert_eq!(fx.notifier.infos(), vec!["Author updated"]);
    assert_eq!(fx.session.pending_edit().await, None);
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
    assert_eq!(fx.gateway.count(GatewayOp::Bind), 0);
}

#[tokio::test]
async fn test_edit_author_rejection_releases_handle() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.authors.select(ada);

    fx.session.open_author_edit().await.unwrap();
    fx.presenter.type_into(DialogKind::Author, "name", "");
    let outcome = fx.session.confirm_author_dialog().await.unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Rejected(_)));
    assert_eq!(fx.notifier.errors().len(), 1);
    assert_eq!(fx.session.pending_edit().await, None);
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Closed
    );
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
}

#[tokio::test]
async fn test_edit_requires_exactly_one_author() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    let bob = fx.gateway.seed_author("Bob", "");

    assert_eq!(
        fx.session.open_author_edit().await.unwrap(),
        WorkflowOutcome::Aborted
    );

    fx.authors.set(vec![ada, bob]);
    assert_eq!(
        fx.session.open_author_edit().await.unwrap(),
        WorkflowOutcome::Aborted
    );

    assert!(fx.gateway.calls().is_empty());
    assert_eq!(
        fx.notifier.infos(),
        vec!["Select exactly one author", "Select exactly one author"]
    );
    assert_eq!(fx.presenter.load_count(DialogKind::Author), 0);
}

#[tokio::test]
async fn test_edit_read_failure_reports_and_closes() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.authors.select(ada);
    fx.gateway.fail_next(GatewayOp::Read, "Record locked");

    let outcome = fx.session.open_author_edit().await.unwrap();

    assert_eq!(outcome, WorkflowOutcome::Rejected("Record locked".to_string()));
    assert_eq!(fx.notifier.errors(), vec!["Record locked"]);
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Closed
    );
    assert!(!fx.presenter.is_open(DialogKind::Author));
    assert_eq!(fx.session.pending_edit().await, None);
}

#[tokio::test]
async fn test_delete_author_is_soft() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.authors.select(ada.clone());
    fx.notifier.answer_next(ConfirmOutcome::Confirm);

    let outcome = fx.session.delete_author().await.unwrap();
    assert_eq!(outcome, WorkflowOutcome::Completed);

    assert_eq!(fx.gateway.count(GatewayOp::Delete), 0);
    let commits = fx.commits();
    assert_eq!(commits.len(), 1);
    let GatewayCall::Commit { changes, .. } = &commits[0] else {
        panic!("expected a commit");
    };
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, "isDeleted");
    assert_eq!(changes[0].value, json!(true));

    let record = fx.gateway.record("Authors", ada.id).unwrap();
    assert_eq!(record["isDeleted"], true);
    assert!(fx.gateway.rows(fx.author_view()).is_empty());
    assert_eq!(fx.notifier.infos(), vec!["Author deleted"]);
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
}

#[tokio::test]
async fn test_delete_author_declined_is_silent() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.authors.select(ada);
    fx.notifier.answer_next(ConfirmOutcome::Cancel);

    let outcome = fx.session.delete_author().await.unwrap();

    assert_eq!(outcome, WorkflowOutcome::Cancelled);
    assert!(fx.gateway.calls().is_empty());
    assert!(fx.notifier.notices().is_empty());
    assert_eq!(fx.notifier.prompts(), vec!["Delete the selected author?"]);
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Closed
    );
}

#[tokio::test]
async fn test_delete_selected_author_unbinds_books() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.select_author(&ada).await;
    let book_view = fx.session.book_view().await.unwrap();
    fx.notifier.answer_next(ConfirmOutcome::Confirm);

    fx.session.delete_author().await.unwrap();

    assert_eq!(fx.session.selected_author().await, None);
    assert_eq!(fx.session.book_view().await, None);
    assert!(!fx.gateway.is_bound(book_view.id));
}

#[tokio::test]
async fn test_delete_author_failure_keeps_scope() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "");
    fx.select_author(&ada).await;
    fx.gateway.fail_next(GatewayOp::Commit, "Conflict");
    fx.notifier.answer_next(ConfirmOutcome::Confirm);

    let outcome = fx.session.delete_author().await.unwrap();

    assert_eq!(outcome, WorkflowOutcome::Rejected("Conflict".to_string()));
    assert_eq!(fx.session.selected_author().await, Some(ada.id));
    assert!(fx.session.book_view().await.is_some());
    assert_eq!(fx.refreshes_of(fx.author_view()), 1);
}

#[tokio::test]
async fn test_second_open_is_a_guarded_error() {
    let fx = Fixture::new().await;

    let (first, second) = tokio::join!(
        fx.session.open_author_create(),
        fx.session.open_author_create()
    );
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(SessionError::DialogBusy { .. }))));
    assert_eq!(fx.presenter.load_count(DialogKind::Author), 1);
}

#[tokio::test]
async fn test_confirm_without_open_dialog() {
    let fx = Fixture::new().await;

    let result = fx.session.confirm_author_dialog().await;
    assert!(matches!(
        result,
        Err(SessionError::DialogNotOpen {
            kind: DialogKind::Author
        })
    ));
    assert!(matches!(
        fx.session.cancel_author_dialog().await,
        Err(SessionError::DialogNotOpen { .. })
    ));
    assert!(fx.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_reuses_dialog_and_confirm_reloads() {
    let fx = Fixture::new().await;
    let ada = fx.gateway.seed_author("Ada", "Notes");
    fx.authors.select(ada);

    fx.session.open_author_create().await.unwrap();
    fx.presenter.type_into(DialogKind::Author, "name", "Draft");
    fx.session.cancel_author_dialog().await.unwrap();
    assert_eq!(fx.presenter.live(DialogKind::Author), 1);
    assert!(fx.gateway.calls().is_empty());

    // Cached dialog, prefilled for the edit
    fx.session.open_author_edit().await.unwrap();
    assert_eq!(fx.presenter.load_count(DialogKind::Author), 1);
    assert_eq!(
        fx.presenter.field(DialogKind::Author, "name").as_deref(),
        Some("Ada")
    );
    fx.session.cancel_author_dialog().await.unwrap();
    assert_eq!(fx.session.pending_edit().await, None);

    // Cached dialog reused for create starts blank
    fx.session.open_author_create().await.unwrap();
    assert_eq!(
        fx.presenter.field(DialogKind::Author, "name").as_deref(),
        Some("")
    );
    fx.presenter.type_into(DialogKind::Author, "name", "Grace");
    fx.session.confirm_author_dialog().await.unwrap();
    assert_eq!(fx.presenter.live(DialogKind::Author), 0);

    fx.session.open_author_create().await.unwrap();
    assert_eq!(fx.presenter.load_count(DialogKind::Author), 2);
}

#[tokio::test]
async fn test_load_failure_leaves_slot_closed() {
    let fx = Fixture::new().await;
    fx.presenter.fail_next_load("fragment missing");

    let result = fx.session.open_author_create().await;
    assert!(matches!(result, Err(SessionError::Presenter(_))));
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Closed
    );

    fx.session.open_author_create().await.unwrap();
    assert_eq!(
        fx.session.dialog_state(DialogKind::Author).await,
        DialogState::Open
    );
}
