use commander_core::{Command, CommandRepository, MockCommandRepository, NewCommand, RepoError};

fn command(id: i64, how_to: &str, line: &str, platform: &str) -> Command {
    Command {
        id,
        how_to: how_to.to_string(),
        line: line.to_string(),
        platform: platform.to_string(),
    }
}

#[test]
fn get_all_returns_three_fixed_samples_every_time() {
    let repo = MockCommandRepository::new();
    let expected = vec![
        command(0, "Drive a car", "Pass the driving test", "Car"),
        command(1, "Ride a horse", "Make the horse calm", "Horse"),
        command(2, "Play football", "Discipline & hard work", "Ground"),
    ];

    let first = repo.get_all_commands().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, expected);
    assert_eq!(repo.get_all_commands().unwrap(), expected);
}

#[test]
fn get_by_id_ignores_the_id_argument() {
    let repo = MockCommandRepository::new();
    let expected = command(0, "Drive a car", "Pass the driving test", "Ground");

    assert_eq!(repo.get_command_by_id(0).unwrap(), expected);
    assert_eq!(repo.get_command_by_id(99).unwrap(), expected);
    assert_eq!(repo.get_command_by_id(-1).unwrap(), expected);
}

#[test]
fn every_write_is_unsupported() {
    let mut repo = MockCommandRepository::new();
    let existing = command(1, "Ride a horse", "Make the horse calm", "Horse");

    assert!(matches!(
        repo.create_command(NewCommand::new("a", "b", "c")),
        Err(RepoError::Unsupported("create_command"))
    ));
    assert!(matches!(
        repo.create_command(NewCommand::new("", "", "")),
        Err(RepoError::Unsupported(_))
    ));
    assert!(matches!(
        repo.update_command(&existing),
        Err(RepoError::Unsupported("update_command"))
    ));
    assert!(matches!(
        repo.delete_command(&existing),
        Err(RepoError::Unsupported("delete_command"))
    ));
    assert!(matches!(
        repo.save_changes(),
        Err(RepoError::Unsupported("save_changes"))
    ));
}

#[test]
fn writes_do_not_change_the_samples() {
    let mut repo = MockCommandRepository::new();
    let _ = repo.create_command(NewCommand::new("a", "b", "c"));
    let _ = repo.delete_command(&command(0, "x", "y", "z"));

    assert_eq!(repo.get_all_commands().unwrap().len(), 3);
}
