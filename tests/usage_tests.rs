use std::collections::BTreeSet;

use edict::prelude::*;

/// The demo tree used across the usage and path tests. Sources are a bare
/// admin flag.
fn build() -> CommandDispatcher<bool> {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register(literal("help").executes(|_| Ok(0)));
    dispatcher.register(
        literal("kick")
            .then(argument("id", integer()).executes(|ctx| Ok(ctx.get_integer("id")))),
    );
    dispatcher.register(
        literal("ban")
            .requires(|admin: &bool| *admin)
            .executes(|_| Ok(1)),
    );
    let root = dispatcher.root();
    dispatcher.register(literal("again").redirect(root));
    dispatcher
}

#[test]
fn all_usage_lists_every_executable_path() {
    let dispatcher = build();
    let usage = dispatcher.get_all_usage(dispatcher.root(), &true, false);
    assert_eq!(usage, vec!["help", "kick <id>", "ban", "again ..."]);
}

#[test]
fn restricted_usage_hides_unreachable_commands() {
    let dispatcher = build();
    let usage = dispatcher.get_all_usage(dispatcher.root(), &false, true);
    assert_eq!(usage, vec!["help", "kick <id>", "again ..."]);
}

#[test]
fn smart_usage_renders_required_arguments() {
    let dispatcher = build();
    let usage: Vec<String> = dispatcher
        .get_smart_usage(dispatcher.root(), &true)
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(usage, vec!["help", "kick <id>", "ban", "again ..."]);
}

#[test]
fn smart_usage_marks_optional_children() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("time")
            .executes(|_| Ok(0))
            .then(literal("set").executes(|_| Ok(1))),
    );

    let usage: Vec<String> = dispatcher
        .get_smart_usage(dispatcher.root(), &())
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(usage, vec!["time [set]"]);
}

#[test]
fn smart_usage_renders_alternatives() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("gamemode")
            .then(literal("survival").executes(|_| Ok(0)))
            .then(literal("creative").executes(|_| Ok(1))),
    );

    let usage: Vec<String> = dispatcher
        .get_smart_usage(dispatcher.root(), &())
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(usage, vec!["gamemode (survival|creative)"]);
}

#[test]
fn smart_usage_renders_named_redirect_targets() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    let target = dispatcher.register(literal("destination").executes(|_| Ok(0)));
    dispatcher.register(literal("hop").redirect(target));

    let usage: Vec<String> = dispatcher
        .get_smart_usage(dispatcher.root(), &())
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert_eq!(usage, vec!["destination", "hop -> destination"]);
}

#[test]
fn path_round_trips_for_every_reachable_node() {
    let dispatcher = build();
    for path in dispatcher.get_all_paths(None) {
        let target = *path.last().unwrap();
        let names = dispatcher.get_path(target);
        assert_eq!(dispatcher.find_node(&names), Some(target));
    }
}

#[test]
fn find_node_rejects_bogus_paths() {
    let dispatcher = build();
    assert_eq!(dispatcher.find_node(["nope"]), None);
    assert_eq!(dispatcher.find_node(["kick", "nope"]), None);
    assert!(dispatcher.find_node(["kick", "id"]).is_some());
}

#[test]
fn get_path_names_the_chain() {
    let dispatcher = build();
    let id_node = dispatcher.find_node(["kick", "id"]).unwrap();
    assert_eq!(dispatcher.get_path(id_node), vec!["kick", "id"]);
}

#[test]
fn all_paths_start_at_the_given_node() {
    let dispatcher = build();
    let paths = dispatcher.get_all_paths(None);
    // Root itself, four literals, plus kick's argument child.
    assert_eq!(paths.len(), 6);
    assert!(paths.iter().all(|path| path[0] == dispatcher.root()));

    let kick = dispatcher.find_node(["kick"]).unwrap();
    let sub_paths = dispatcher.get_all_paths(Some(kick));
    assert_eq!(sub_paths.len(), 2);
    assert_eq!(sub_paths[0], vec![kick]);
}

#[test]
fn ambiguity_scan_reports_overlapping_siblings() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("test")
            .then(literal("hello").executes(|_| Ok(1)))
            .then(argument("word", word()).executes(|_| Ok(2))),
    );

    let mut reports: Vec<(NodeId, NodeId, NodeId, BTreeSet<String>)> = Vec::new();
    dispatcher.find_ambiguities(&mut |parent, child, sibling, examples| {
        reports.push((parent, child, sibling, examples.clone()));
    });

    // The literal's own example "hello" is accepted by the word sibling.
    let test = dispatcher.find_node(["test"]).unwrap();
    let hello = dispatcher.find_node(["test", "hello"]).unwrap();
    let word_node = dispatcher.find_node(["test", "word"]).unwrap();

    assert_eq!(reports.len(), 1);
    let (parent, child, sibling, examples) = &reports[0];
    assert_eq!(*parent, test);
    assert_eq!(*child, hello);
    assert_eq!(*sibling, word_node);
    assert!(examples.contains("hello"));
}

#[test]
fn unambiguous_trees_stay_silent() {
    let dispatcher = build();
    let mut count = 0;
    dispatcher.find_ambiguities(&mut |_, _, _, _| count += 1);
    assert_eq!(count, 0);
}
