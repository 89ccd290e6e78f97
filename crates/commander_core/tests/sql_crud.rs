use commander_core::db::migrations::latest_version;
use commander_core::db::open_db_in_memory;
use commander_core::{Command, CommandRepository, NewCommand, RepoError, SqlCommandRepository};
use rusqlite::Connection;

fn create_one(repo: &mut SqlCommandRepository<'_>, new: NewCommand) -> i64 {
    repo.create_command(new).unwrap();
    let summary = repo.save_changes().unwrap();
    assert_eq!(summary.inserted_ids.len(), 1);
    summary.inserted_ids[0]
}

#[test]
fn create_then_save_assigns_id_and_roundtrips_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();

    repo.create_command(NewCommand::new("List files", "ls -la", "Linux"))
        .unwrap();
    let summary = repo.save_changes().unwrap();
    assert!(summary.persisted());
    assert_eq!(summary.rows_affected, 1);

    let id = summary.inserted_ids[0];
    let loaded = repo.get_command_by_id(id).unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.how_to, "List files");
    assert_eq!(loaded.line, "ls -la");
    assert_eq!(loaded.platform, "Linux");
}

#[test]
fn staged_create_is_invisible_until_saved() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();

    repo.create_command(NewCommand::new("a", "b", "c")).unwrap();
    assert_eq!(repo.pending_changes(), 1);
    assert!(repo.get_all_commands().unwrap().is_empty());

    repo.save_changes().unwrap();
    assert_eq!(repo.pending_changes(), 0);
    assert_eq!(repo.get_all_commands().unwrap().len(), 1);
}

#[test]
fn dropping_repository_discards_unsaved_changes() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqlCommandRepository::try_new(&conn).unwrap();
        repo.create_command(NewCommand::new("a", "b", "c")).unwrap();
    }

    let repo = SqlCommandRepository::try_new(&conn).unwrap();
    assert!(repo.get_all_commands().unwrap().is_empty());
}

#[test]
fn update_then_save_replaces_every_field() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();
    let id = create_one(&mut repo, NewCommand::new("Old", "old --line", "OldOS"));

    let mut command = repo.get_command_by_id(id).unwrap();
    command.how_to = "New".to_string();
    command.line = "new --line".to_string();
    command.platform = "NewOS".to_string();
    repo.update_command(&command).unwrap();

    let before_save = repo.get_command_by_id(id).unwrap();
    assert_eq!(before_save.how_to, "Old");

    let summary = repo.save_changes().unwrap();
    assert_eq!(summary.rows_affected, 1);
    assert!(summary.inserted_ids.is_empty());

    let loaded = repo.get_command_by_id(id).unwrap();
    assert_eq!(loaded, command);
}

#[test]
fn delete_then_save_makes_get_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();
    let id = create_one(&mut repo, NewCommand::new("a", "b", "c"));

    let command = repo.get_command_by_id(id).unwrap();
    repo.delete_command(&command).unwrap();
    assert!(repo.save_changes().unwrap().persisted());

    let err = repo.get_command_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn save_without_staged_changes_reports_zero_rows() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();

    let summary = repo.save_changes().unwrap();
    assert_eq!(summary.rows_affected, 0);
    assert!(!summary.persisted());
    assert!(summary.inserted_ids.is_empty());
}

#[test]
fn get_missing_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlCommandRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.get_command_by_id(404),
        Err(RepoError::NotFound(404))
    ));
}

#[test]
fn batch_with_missing_target_rolls_back_entirely() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();

    let ghost = Command::from_new(77, NewCommand::new("x", "y", "z"));
    repo.create_command(NewCommand::new("a", "b", "c")).unwrap();
    repo.update_command(&ghost).unwrap();

    let err = repo.save_changes().unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
    assert!(repo.get_all_commands().unwrap().is_empty());
    assert_eq!(repo.pending_changes(), 0);

    repo.delete_command(&ghost).unwrap();
    assert!(matches!(repo.save_changes(), Err(RepoError::NotFound(77))));
}

#[test]
fn multiple_staged_changes_commit_in_one_save() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();
    let doomed = create_one(&mut repo, NewCommand::new("old", "old", "old"));

    repo.create_command(NewCommand::new("one", "1", "p")).unwrap();
    repo.create_command(NewCommand::new("two", "2", "p")).unwrap();
    let doomed_command = repo.get_command_by_id(doomed).unwrap();
    repo.delete_command(&doomed_command).unwrap();

    let summary = repo.save_changes().unwrap();
    assert_eq!(summary.rows_affected, 3);
    assert_eq!(summary.inserted_ids.len(), 2);
    assert!(summary.inserted_ids[0] < summary.inserted_ids[1]);

    let all = repo.get_all_commands().unwrap();
    let how_tos: Vec<_> = all.iter().map(|c| c.how_to.as_str()).collect();
    assert_eq!(how_tos, vec!["one", "two"]);
}

#[test]
fn changes_from_one_scope_are_visible_to_the_next() {
    let conn = open_db_in_memory().unwrap();
    let id = {
        let mut repo = SqlCommandRepository::try_new(&conn).unwrap();
        create_one(&mut repo, NewCommand::new("a", "b", "c"))
    };

    let repo = SqlCommandRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_command_by_id(id).unwrap().how_to, "a");
}

#[test]
fn validation_failure_blocks_staging() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqlCommandRepository::try_new(&conn).unwrap();

    let err = repo
        .create_command(NewCommand::new("", "line", "platform"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.pending_changes(), 0);
}

#[test]
fn invalid_persisted_row_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO Commands (HowTo, Line, Platform) VALUES ('', 'line', 'platform');",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let repo = SqlCommandRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.get_command_by_id(id),
        Err(RepoError::InvalidData(_))
    ));
    assert!(matches!(
        repo.get_all_commands(),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqlCommandRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_commands_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlCommandRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("Commands"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE Commands (
            Id INTEGER PRIMARY KEY AUTOINCREMENT,
            HowTo TEXT NOT NULL,
            Line TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlCommandRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "Commands",
            column: "Platform"
        })
    ));
}
