use std::path::Path;

use roster::shell::Shell;
use roster::store::SqliteBackend;
use roster::{Candidate, Error, Field, Intent, Mode, RecordStore, ViewController};

async fn sqlite_controller(path: &Path) -> ViewController {
    let backend = SqliteBackend::open(path).unwrap();
    ViewController::new(RecordStore::open(Box::new(backend)).await.unwrap())
}

#[tokio::test]
async fn add_edit_delete_against_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");
    let mut ctl = sqlite_controller(&path).await;

    ctl.handle(Intent::Add).await.unwrap();
    ctl.handle(Intent::Submit(Candidate::new("Ann", "ann@x.com", "30")))
        .await
        .unwrap();
    assert_eq!(ctl.records().len(), 1);
    let id = ctl.records()[0].id.clone();

    ctl.handle(Intent::Edit(0)).await.unwrap();
    assert_eq!(ctl.form(), &Candidate::new("Ann", "ann@x.com", "30"));
    assert!(matches!(ctl.mode(), Mode::Edit { index: 0, .. }));

    ctl.handle(Intent::Submit(Candidate::new("Ann B", "ann@x.com", "31")))
        .await
        .unwrap();
    assert_eq!(ctl.mode(), &Mode::View);
    assert_eq!(ctl.records()[0].id, id);
    assert_eq!(ctl.records()[0].name, "Ann B");
    assert_eq!(ctl.records()[0].age, 31);

    // A second controller over the same file sees the edit.
    drop(ctl);
    let mut ctl = sqlite_controller(&path).await;
    assert_eq!(ctl.records()[0].name, "Ann B");

    ctl.handle(Intent::Delete(0)).await.unwrap();
    assert!(ctl.records().is_empty());

    drop(ctl);
    let ctl = sqlite_controller(&path).await;
    assert!(ctl.records().is_empty());
}

#[tokio::test]
async fn rejected_submit_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");
    let mut ctl = sqlite_controller(&path).await;

    ctl.handle(Intent::Add).await.unwrap();
    let err = ctl
        .handle(Intent::Submit(Candidate::new("", "not-an-email", "-3")))
        .await
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors.get(Field::Name), Some("Name is required"));
    assert_eq!(errors.get(Field::Email), Some("Invalid email address"));
    assert_eq!(errors.get(Field::Age), Some("Age must be a positive number"));
    assert_eq!(ctl.mode(), &Mode::Add);
    assert_eq!(ctl.form().email, "not-an-email");

    ctl.handle(Intent::Cancel).await.unwrap();
    assert_eq!(ctl.mode(), &Mode::View);

    drop(ctl);
    let ctl = sqlite_controller(&path).await;
    assert!(ctl.records().is_empty());
}

#[tokio::test]
async fn out_of_mode_intents_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctl = sqlite_controller(&dir.path().join("records.db")).await;

    let err = ctl.handle(Intent::Cancel).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            state: "view",
            intent: "cancel"
        }
    ));

    ctl.handle(Intent::Add).await.unwrap();
    let err = ctl.handle(Intent::Delete(0)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { state: "add", .. }));
    assert_eq!(ctl.mode(), &Mode::Add);
}

#[tokio::test]
async fn scripted_shell_session_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    let script = "\
add
name Ann
email ann@x.com
age 30
submit
add
name Bob
email bob@x.com
age abc
submit
age 41
submit
list
edit 0
age 31
submit
quit
";
    let controller = sqlite_controller(&path).await;
    let mut shell = Shell::new(controller, script.as_bytes(), Vec::new());
    shell.run().await.unwrap();
    let (_controller, output) = shell.into_parts();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Age must be a number"));
    assert!(output.contains("bob@x.com"));

    let ctl = sqlite_controller(&path).await;
    let rows: Vec<(&str, u32)> = ctl
        .records()
        .iter()
        .map(|r| (r.name.as_str(), r.age))
        .collect();
    assert_eq!(rows, [("Ann", 31), ("Bob", 41)]);
}
