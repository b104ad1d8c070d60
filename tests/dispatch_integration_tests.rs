//! Integration tests for command dispatch
//!
//! These tests drive `Flip::execute` end to end with a captured usage sink
//! and a journal context that every command appends its tag to, verifying:
//! - priority ordering and per-command argument slices
//! - escaping commands and the built-in help and version commands
//! - outcome codes and which cleanup buckets run for each of them

use flip::{Capture, Cleanup, Command, ErrorHandling, ExitStatus, FlagSet, Flip, Outcome};
use std::cell::RefCell;
use std::rc::Rc;

type Journal = Vec<String>;

fn create_test_flip() -> (Flip<Journal>, Capture) {
    let capture = Capture::new();
    let mut flip = Flip::new("prog");
    flip.set_output(Box::new(capture.clone()));
    (flip, capture)
}

/// A command that records its tag and arguments, then returns `status`
fn create_test_command(tag: &str, priority: i32, status: ExitStatus) -> Command<Journal> {
    let name = tag.to_string();
    Command::new(tag, FlagSet::new(tag, ErrorHandling::ContinueOnError))
        .with_usage(format!("The {} command", tag))
        .with_priority(priority)
        .with_action(move |mut journal: Journal, args: &[String]| {
            journal.push(format!("{} {:?}", name, args));
            (journal, status)
        })
}

/// Registers a recording cleanup on every status bucket
fn record_cleanups(flip: &mut Flip<Journal>) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for (status, label) in [
        (ExitStatus::Success, "success"),
        (ExitStatus::Failure, "failure"),
        (ExitStatus::UsageError, "usage"),
        (ExitStatus::Any, "any"),
    ] {
        let seen = Rc::clone(&seen);
        flip.set_cleanup(
            status,
            vec![Cleanup::new(move |_journal: &Journal| {
                seen.borrow_mut().push(label.to_string());
                None
            })],
        );
    }
    seen
}

#[test]
fn test_commands_run_in_priority_order_with_their_flags() {
    let (mut flip, _capture) = create_test_flip();
    let mut flags = FlagSet::new("cmdA", ErrorHandling::ContinueOnError);
    let flag = flags.string("flag", "", "A flag for cmdA").unwrap();
    let name = Rc::new(RefCell::new(String::new()));
    let observed = Rc::clone(&name);

    let cmd_a = Command::new("cmdA", flags)
        .with_priority(10)
        .with_action(move |mut journal: Journal, _args: &[String]| {
            *observed.borrow_mut() = flag.get();
            journal.push("cmdA".to_string());
            (journal, ExitStatus::Success)
        });
    flip.set_group("", 0, vec![cmd_a, create_test_command("cmdB", 1, ExitStatus::No)]);

    let journal = Rc::new(RefCell::new(Journal::new()));
    let sink = Rc::clone(&journal);
    flip.set_cleanup(
        ExitStatus::Any,
        vec![Cleanup::new(move |j: &Journal| {
            *sink.borrow_mut() = j.clone();
            None
        })],
    );

    let code = flip.execute(Journal::new(), &["x", "cmdA", "--flag", "v", "cmdB"]);

    assert_eq!(code, 0);
    assert_eq!(*journal.borrow(), vec!["cmdB []".to_string(), "cmdA".to_string()]);
    assert_eq!(*name.borrow(), "v");
}

#[test]
fn test_empty_arguments_is_usage_error() {
    let (mut flip, capture) = create_test_flip();
    flip.set_command(vec![create_test_command("build", 1, ExitStatus::Success)]);
    let seen = record_cleanups(&mut flip);

    let code = flip.execute(Journal::new(), &[] as &[&str]);

    assert_eq!(code, Outcome::UsageError.code());
    assert_eq!(*seen.borrow(), vec!["usage", "any"]);
    // The default instruction cleanup still runs ahead of the recorder
    assert!(capture.contents().starts_with("prog [OPTIONS...] {COMMAND} ..."));
}

#[test]
fn test_unrecognized_arguments_render_instruction() {
    let (mut flip, capture) = create_test_flip();
    flip.set_command(vec![create_test_command("build", 1, ExitStatus::Success)]);

    let code = flip.execute(Journal::new(), &["nothing", "here"]);

    assert_eq!(code, -2);
    let text = capture.contents();
    assert!(text.starts_with("prog [OPTIONS...] {COMMAND} ...\n\n"), "{}", text);
    assert!(text.contains("build [<flags>]:"), "{}", text);
    assert!(text.contains("The build command"), "{}", text);
}

#[test]
fn test_success_halts_the_queue() {
    let (mut flip, _capture) = create_test_flip();
    flip.set_command(vec![
        create_test_command("first", 1, ExitStatus::No),
        create_test_command("second", 2, ExitStatus::Success),
        create_test_command("third", 3, ExitStatus::Success),
    ]);
    let seen = record_cleanups(&mut flip);
    let journal = Rc::new(RefCell::new(Journal::new()));
    let sink = Rc::clone(&journal);
    flip.set_cleanup(
        ExitStatus::Success,
        vec![Cleanup::new(move |j: &Journal| {
            *sink.borrow_mut() = j.clone();
            None
        })],
    );

    let code = flip.execute(Journal::new(), &["third", "second", "first"]);

    assert_eq!(code, 0);
    assert_eq!(*seen.borrow(), vec!["success", "any"]);
    assert_eq!(*journal.borrow(), vec!["first []".to_string(), "second []".to_string()]);
}

#[test]
fn test_failure_returns_minus_one() {
    let (mut flip, _capture) = create_test_flip();
    flip.set_command(vec![
        create_test_command("broken", 1, ExitStatus::Failure),
        create_test_command("never", 2, ExitStatus::Success),
    ]);
    let seen = record_cleanups(&mut flip);

    let code = flip.execute(Journal::new(), &["never", "broken"]);

    assert_eq!(code, -1);
    assert_eq!(*seen.borrow(), vec!["failure", "any"]);
}

#[test]
fn test_usage_error_status_stops_dispatch() {
    let (mut flip, capture) = create_test_flip();
    flip.set_command(vec![
        create_test_command("confused", 1, ExitStatus::UsageError),
        create_test_command("never", 2, ExitStatus::Success),
    ]);

    let code = flip.execute(Journal::new(), &["confused", "never"]);

    assert_eq!(code, -2);
    assert!(capture.contents().contains("confused [<flags>]:"));
}

#[test]
fn test_flag_parse_error_skips_the_command() {
    let (mut flip, capture) = create_test_flip();
    let ran = Rc::new(RefCell::new(false));
    let marker = Rc::clone(&ran);
    let mut flags = FlagSet::new("count", ErrorHandling::ContinueOnError);
    flags.int("n", 0, "How many").unwrap();
    let cmd = Command::new("count", flags).with_action(move |journal: Journal, _args: &[String]| {
        *marker.borrow_mut() = true;
        (journal, ExitStatus::Success)
    });
    flip.set_command(vec![cmd]);

    let code = flip.execute(Journal::new(), &["count", "-n", "many"]);

    assert_eq!(code, -2);
    assert!(!*ran.borrow(), "command should not run after a flag error");
    assert!(capture.contents().contains("-n int"));
}

#[test]
fn test_escaping_command_receives_the_rest() {
    let (mut flip, _capture) = create_test_flip();
    let exec = create_test_command("exec", 1, ExitStatus::Success).with_escapes(true);
    flip.set_command(vec![exec, create_test_command("other", 0, ExitStatus::Failure)]);

    let journal = Rc::new(RefCell::new(Journal::new()));
    let sink = Rc::clone(&journal);
    flip.set_cleanup(
        ExitStatus::Success,
        vec![Cleanup::new(move |j: &Journal| {
            *sink.borrow_mut() = j.clone();
            None
        })],
    );

    let code = flip.execute(Journal::new(), &["exec", "other", "-x"]);

    assert_eq!(code, 0);
    assert_eq!(*journal.borrow(), vec![r#"exec ["other", "-x"]"#.to_string()]);
}

#[test]
fn test_context_threads_through_commands() {
    let mut flip: Flip<u32> = Flip::new("prog");
    flip.set_output(Box::new(Capture::new()));
    let bump = |tag: &str, priority: i32, status: ExitStatus| {
        Command::new(tag, FlagSet::new(tag, ErrorHandling::ContinueOnError))
            .with_priority(priority)
            .with_action(move |n: u32, _args: &[String]| (n + 1, status))
    };
    flip.set_command(vec![
        bump("a", 1, ExitStatus::No),
        bump("b", 2, ExitStatus::Any),
        bump("c", 3, ExitStatus::Success),
    ]);

    let total = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&total);
    flip.set_cleanup(
        ExitStatus::Success,
        vec![Cleanup::new(move |n: &u32| {
            *sink.borrow_mut() = *n;
            None
        })],
    );

    let code = flip.execute(40, &["c", "a", "b"]);

    assert_eq!(code, 0);
    assert_eq!(*total.borrow(), 43);
}

#[test]
fn test_cleanup_can_override_outcome() {
    let (mut flip, _capture) = create_test_flip();
    flip.set_command(vec![create_test_command("flaky", 1, ExitStatus::Failure)]);
    flip.set_cleanup(
        ExitStatus::Failure,
        vec![
            Cleanup::new(|_: &Journal| None),
            Cleanup::new(|_: &Journal| Some(Outcome::Success)),
            Cleanup::new(|_: &Journal| Some(Outcome::UsageError)),
        ],
    );

    assert_eq!(flip.execute(Journal::new(), &["flaky"]), 0);
}

#[test]
fn test_command_without_action_fails() {
    let (mut flip, _capture) = create_test_flip();
    flip.set_command(vec![Command::new(
        "stub",
        FlagSet::new("stub", ErrorHandling::ContinueOnError),
    )]);

    assert_eq!(flip.execute(Journal::new(), &["stub"]), -1);
}

#[test]
fn test_help_preempts_other_commands() {
    let (mut flip, capture) = create_test_flip();
    flip.add_help();
    flip.set_group("build", 1, vec![create_test_command("compile", 1, ExitStatus::Success)]);
    let seen = record_cleanups(&mut flip);

    let code = flip.execute(Journal::new(), &["compile", "help", "compile"]);

    assert_eq!(code, -2);
    assert_eq!(*seen.borrow(), vec!["usage", "any"]);
    let text = capture.contents();
    assert!(text.contains("help [<flags>]:"), "{}", text);
    assert!(text.contains("compile [<flags>]:"), "{}", text);
}

#[test]
fn test_version_prints_and_succeeds() {
    let (mut flip, capture) = create_test_flip();
    flip.add_version("1.4.0");
    flip.set_command(vec![create_test_command("serve", 1, ExitStatus::Failure)]);

    let code = flip.execute(Journal::new(), &["serve", "version"]);

    assert_eq!(code, 0);
    assert_eq!(capture.contents(), "prog 1.4.0\n");
}

#[test]
fn test_subset_instruction_on_failure() {
    let (mut flip, capture) = create_test_flip();
    flip.set_command(vec![
        create_test_command("deploy", 1, ExitStatus::Failure),
        create_test_command("status", 2, ExitStatus::Success),
    ]);
    let subset = flip.subset_instruction(["deploy"]);
    flip.set_cleanup(ExitStatus::Failure, vec![subset]);

    let code = flip.execute(Journal::new(), &["deploy"]);

    // The subset cleanup asks for a usage-error outcome
    assert_eq!(code, -2);
    let text = capture.contents();
    assert!(text.contains("deploy [<flags>]:"), "{}", text);
    assert!(!text.contains("status [<flags>]:"), "{}", text);
}
