use commander_core::{Command, CommandRepository, InMemoryCommandStore, NewCommand, RepoError};

#[test]
fn create_update_delete_lifecycle() {
    let store = InMemoryCommandStore::new();
    let mut repo = store.repository();

    repo.create_command(NewCommand::new("Build", "cargo build", "Rust"))
        .unwrap();
    assert!(repo.get_all_commands().unwrap().is_empty());
    let id = repo.save_changes().unwrap().inserted_ids[0];
    assert_eq!(id, 1);

    let mut command = repo.get_command_by_id(id).unwrap();
    assert_eq!(command.line, "cargo build");

    command.line = "cargo build --release".to_string();
    repo.update_command(&command).unwrap();
    assert_eq!(repo.save_changes().unwrap().rows_affected, 1);
    assert_eq!(repo.get_command_by_id(id).unwrap(), command);

    repo.delete_command(&command).unwrap();
    assert!(repo.save_changes().unwrap().persisted());
    assert!(matches!(
        repo.get_command_by_id(id),
        Err(RepoError::NotFound(missing)) if missing == id
    ));
}

#[test]
fn scopes_share_committed_state_but_not_staged_changes() {
    let store = InMemoryCommandStore::new();
    let mut writer = store.repository();
    let reader = store.repository();

    writer
        .create_command(NewCommand::new("a", "b", "c"))
        .unwrap();
    assert!(reader.get_all_commands().unwrap().is_empty());

    writer.save_changes().unwrap();
    assert_eq!(reader.get_all_commands().unwrap().len(), 1);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn save_without_staged_changes_reports_zero_rows() {
    let store = InMemoryCommandStore::new();
    let mut repo = store.repository();

    let summary = repo.save_changes().unwrap();
    assert!(!summary.persisted());
    assert_eq!(summary.rows_affected, 0);
}

#[test]
fn get_all_is_ordered_by_id() {
    let store = InMemoryCommandStore::new();
    let mut repo = store.repository();
    for name in ["first", "second", "third"] {
        repo.create_command(NewCommand::new(name, "line", "platform"))
            .unwrap();
    }
    let summary = repo.save_changes().unwrap();
    assert_eq!(summary.inserted_ids, vec![1, 2, 3]);

    let ids: Vec<_> = repo
        .get_all_commands()
        .unwrap()
        .into_iter()
        .map(|command| command.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn update_of_missing_id_fails_and_discards_the_batch() {
    let store = InMemoryCommandStore::new();
    let mut repo = store.repository();

    repo.create_command(NewCommand::new("Build", "cargo build", "Rust"))
        .unwrap();
    let missing = Command::from_new(42, NewCommand::new("x", "y", "z"));
    repo.update_command(&missing).unwrap();
    assert_eq!(repo.pending_changes(), 2);

    let err = repo.save_changes().unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert!(store.is_empty().unwrap());
    assert_eq!(repo.pending_changes(), 0);
    assert!(repo.get_all_commands().unwrap().is_empty());
}
