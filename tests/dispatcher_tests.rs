use std::sync::{Arc, Mutex};

use edict::prelude::*;

fn single_literal() -> CommandDispatcher<()> {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register(literal("foo").executes(|_| Ok(42)));
    dispatcher
}

fn kick_tree() -> CommandDispatcher<()> {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register(
        literal("kick").then(
            argument("id", IntegerArgumentType::between(0, 100))
                .executes(|ctx| Ok(ctx.get_integer("id"))),
        ),
    );
    dispatcher
}

#[test]
fn literal_command_executes() {
    let dispatcher = single_literal();
    assert_eq!(dispatcher.execute_input("foo", ()).unwrap(), 42);
}

#[test]
fn incomplete_literal_is_unknown_command() {
    let dispatcher = single_literal();
    let err = dispatcher.execute_input("fo", ()).unwrap_err();
    assert!(matches!(err, CommandError::DispatcherUnknownCommand { .. }));
    assert_eq!(err.cursor(), Some(0));
}

#[test]
fn trailing_input_is_unknown_argument() {
    let dispatcher = single_literal();
    let err = dispatcher.execute_input("foo bar", ()).unwrap_err();
    assert!(matches!(err, CommandError::DispatcherUnknownArgument { .. }));
    assert_eq!(err.cursor(), Some(4));
}

#[test]
fn bounded_integer_argument_binds() {
    let dispatcher = kick_tree();
    assert_eq!(dispatcher.execute_input("kick 5", ()).unwrap(), 5);
    assert_eq!(dispatcher.execute_input("kick 0", ()).unwrap(), 0);
    assert_eq!(dispatcher.execute_input("kick 100", ()).unwrap(), 100);
}

#[test]
fn bounded_integer_out_of_range() {
    let dispatcher = kick_tree();

    let err = dispatcher.execute_input("kick 200", ()).unwrap_err();
    assert!(matches!(
        err,
        CommandError::IntegerTooHigh {
            found: 200,
            max: 100,
            ..
        }
    ));

    let err = dispatcher.execute_input("kick -1", ()).unwrap_err();
    assert!(matches!(
        err,
        CommandError::IntegerTooLow {
            found: -1,
            min: 0,
            ..
        }
    ));
}

#[test]
fn non_numeric_argument_reports_expected_int() {
    let dispatcher = kick_tree();
    let err = dispatcher.execute_input("kick abc", ()).unwrap_err();
    assert!(matches!(err, CommandError::ReaderExpectedInt { .. }));
    assert_eq!(err.cursor(), Some(5));
}

#[test]
fn greedy_string_takes_rest_verbatim() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("say").then(
        argument("msg", greedy_string()).executes(|ctx| Ok(ctx.get_string("msg").len() as i32)),
    ));

    assert_eq!(dispatcher.execute_input("say hello world", ()).unwrap(), 11);
    // The greedy flavour never interprets quotes.
    assert_eq!(dispatcher.execute_input("say \"a\\\"b\"", ()).unwrap(), 6);
}

#[test]
fn quotable_phrase_resolves_escapes() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("phrase").then(argument("msg", string()).executes(|ctx| {
        assert_eq!(ctx.get_string("msg"), "a\\b");
        Ok(ctx.get_string("msg").len() as i32)
    })));

    assert_eq!(dispatcher.execute_input("phrase \"a\\\\b\"", ()).unwrap(), 3);
}

#[test]
fn quotable_phrase_invalid_escape_surfaces() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("phrase")
            .then(argument("msg", string()).executes(|ctx| Ok(ctx.get_string("msg").len() as i32))),
    );

    let err = dispatcher.execute_input("phrase \"a\\b\"", ()).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ReaderInvalidEscape { character: 'b', .. }
    ));
}

#[test]
fn redirect_to_root_reroutes_parsing() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("foo").executes(|_| Ok(42)));
    let root = dispatcher.root();
    dispatcher.register(literal("alias").redirect(root));

    assert_eq!(dispatcher.execute_input("alias foo", ()).unwrap(), 42);
    // Redirection is cyclic, guarded by input consumption.
    assert_eq!(dispatcher.execute_input("alias alias foo", ()).unwrap(), 42);
}

#[test]
fn redirect_with_single_modifier_swaps_the_source() {
    let mut dispatcher: CommandDispatcher<String> = CommandDispatcher::new();
    dispatcher.register(
        literal("whoami")
            .executes(|ctx: &edict::context::CommandContext<String>| Ok(if ctx.source().as_str() == "admin" { 7 } else { 1 })),
    );
    let root = dispatcher.root();
    dispatcher.register(
        literal("sudo").redirect_with(root, |_ctx| Ok("admin".to_string())),
    );

    assert_eq!(dispatcher.execute_input("whoami", "guest".to_string()).unwrap(), 1);
    assert_eq!(dispatcher.execute_input("sudo whoami", "guest".to_string()).unwrap(), 7);
}

#[test]
fn fork_counts_successful_leaves_and_notifies_consumer() {
    let mut dispatcher: CommandDispatcher<String> = CommandDispatcher::new();
    dispatcher.register(literal("echo").executes(|_| Ok(1)));
    let root = dispatcher.root();
    dispatcher.register(literal("each").fork(root, |_ctx| {
        Ok(vec!["first".to_string(), "second".to_string()])
    }));

    let notifications: Arc<Mutex<Vec<(String, bool, i32)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notifications);
    dispatcher.set_consumer(Arc::new(
        move |ctx: &CommandContext<String>, success: bool, result: i32| {
            sink.lock().unwrap().push((ctx.source().clone(), success, result));
        },
    ));

    assert_eq!(
        dispatcher.execute_input("each echo", "console".to_string()).unwrap(),
        2
    );
    let seen = notifications.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("first".to_string(), true, 1),
            ("second".to_string(), true, 1),
        ]
    );
}

#[test]
fn forked_execution_swallows_handler_errors() {
    let mut dispatcher: CommandDispatcher<String> = CommandDispatcher::new();
    dispatcher.register(literal("probe").executes(|ctx: &edict::context::CommandContext<String>| {
        if ctx.source().as_str() == "bad" {
            Err(CommandError::DispatcherParseException {
                message: "probe failed".to_string(),
                ctx: ErrorContext::none(),
            })
        } else {
            Ok(1)
        }
    }));
    let root = dispatcher.root();
    dispatcher.register(literal("all").fork(root, |_ctx| {
        Ok(vec!["good".to_string(), "bad".to_string(), "good".to_string()])
    }));

    // Two of the three leaves succeed; the failure is swallowed.
    assert_eq!(
        dispatcher.execute_input("all probe", "console".to_string()).unwrap(),
        2
    );
}

#[test]
fn non_forked_result_is_the_handler_result() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("value").executes(|_| Ok(1234)));
    assert_eq!(dispatcher.execute_input("value", ()).unwrap(), 1234);
}

#[test]
fn context_chain_exposes_stages() {
    use edict::context::{ContextChain, Stage};

    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("foo").executes(|_| Ok(42)));
    let root = dispatcher.root();
    dispatcher.register(literal("alias").redirect(root));

    let parse = dispatcher.parse("alias foo", ());
    let context = parse.context().build(&parse.reader().string_arc());
    let chain = ContextChain::try_flatten(context).unwrap();

    assert_eq!(chain.stage(), Stage::Modify);
    assert!(chain.top_context().command().is_none());
    let next = chain.next_stage().unwrap();
    assert_eq!(next.stage(), Stage::Execute);
    assert!(next.top_context().command().is_some());
    assert!(next.next_stage().is_none());
}

#[test]
fn redirect_chain_without_executable_tail_is_unknown_command() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("foo").executes(|_| Ok(42)));
    let root = dispatcher.root();
    dispatcher.register(literal("alias").redirect(root));

    // The chain ends on a node with no handler.
    let err = dispatcher.execute_input("alias alias", ()).unwrap_err();
    assert!(matches!(err, CommandError::DispatcherUnknownCommand { .. }));
}

#[test]
fn duplicate_literal_registration_merges() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("base").then(literal("one").executes(|_| Ok(1))));
    dispatcher.register(literal("base").then(literal("two").executes(|_| Ok(2))));

    let root = dispatcher.root();
    assert_eq!(dispatcher.tree().node(root).children().len(), 1);
    assert_eq!(dispatcher.execute_input("base one", ()).unwrap(), 1);
    assert_eq!(dispatcher.execute_input("base two", ()).unwrap(), 2);
}

#[test]
fn duplicate_registration_adopts_the_new_handler() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("cmd").then(literal("sub").executes(|_| Ok(1))));
    dispatcher.register(literal("cmd").executes(|_| Ok(9)));

    assert_eq!(dispatcher.execute_input("cmd", ()).unwrap(), 9);
    assert_eq!(dispatcher.execute_input("cmd sub", ()).unwrap(), 1);
}

#[test]
fn matching_literal_is_preferred_over_arguments() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("test")
            .then(argument("word", word()).executes(|_| Ok(1)))
            .then(literal("hello").executes(|_| Ok(2))),
    );

    assert_eq!(dispatcher.execute_input("test hello", ()).unwrap(), 2);
    assert_eq!(dispatcher.execute_input("test other", ()).unwrap(), 1);
}

#[test]
fn ambiguous_arguments_resolve_in_insertion_order() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(
        literal("num")
            .then(argument("i", integer()).executes(|ctx| Ok(ctx.get_integer("i"))))
            .then(argument("w", word()).executes(|_| Ok(-1))),
    );

    // Both argument children accept "42"; the first registered wins.
    assert_eq!(dispatcher.execute_input("num 42", ()).unwrap(), 42);
    // Only the word child accepts "abc"; the failed sibling leaves no trace.
    assert_eq!(dispatcher.execute_input("num abc", ()).unwrap(), -1);
}

#[test]
fn parse_is_deterministic() {
    let dispatcher = kick_tree();
    let first = dispatcher.parse("kick 5", ());
    let second = dispatcher.parse("kick 5", ());

    assert_eq!(first.reader().cursor(), second.reader().cursor());
    assert_eq!(first.exceptions().len(), second.exceptions().len());
    assert_eq!(dispatcher.execute(&first).unwrap(), dispatcher.execute(&second).unwrap());
}

#[test]
fn consecutive_spaces_are_not_normalised() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("a").then(literal("b").executes(|_| Ok(1))));

    assert_eq!(dispatcher.execute_input("a b", ()).unwrap(), 1);
    let err = dispatcher.execute_input("a  b", ()).unwrap_err();
    assert!(matches!(err, CommandError::DispatcherUnknownArgument { .. }));
}

#[test]
fn requirement_hides_branches_from_unqualified_sources() {
    let mut dispatcher: CommandDispatcher<bool> = CommandDispatcher::new();
    dispatcher.register(
        literal("ban")
            .requires(|admin: &bool| *admin)
            .executes(|_| Ok(1)),
    );

    assert_eq!(dispatcher.execute_input("ban", true).unwrap(), 1);
    let err = dispatcher.execute_input("ban", false).unwrap_err();
    assert!(matches!(err, CommandError::DispatcherUnknownCommand { .. }));
}

#[test]
fn boolean_argument() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("toggle").then(
        argument("state", boolean()).executes(|ctx| Ok(if ctx.get_bool("state") { 1 } else { 0 })),
    ));

    assert_eq!(dispatcher.execute_input("toggle true", ()).unwrap(), 1);
    assert_eq!(dispatcher.execute_input("toggle false", ()).unwrap(), 0);
    let err = dispatcher.execute_input("toggle maybe", ()).unwrap_err();
    assert!(matches!(err, CommandError::ReaderInvalidBool { .. }));
}

#[test]
fn long_and_double_bounds() {
    let ty = LongArgumentType::between(0, 10);
    let mut reader = StringReader::new("11");
    let err = ArgumentType::<()>::parse(&ty, &mut reader).unwrap_err();
    assert!(matches!(err, CommandError::LongTooHigh { found: 11, max: 10, .. }));
    assert_eq!(reader.cursor(), 0);

    let ty = DoubleArgumentType::between(-1.5, 1.5);
    let mut reader = StringReader::new("2.5");
    let err = ArgumentType::<()>::parse(&ty, &mut reader).unwrap_err();
    assert!(matches!(err, CommandError::DoubleTooHigh { .. }));

    let ty = FloatArgumentType::at_least(0.0);
    let mut reader = StringReader::new("-0.5");
    let err = ArgumentType::<()>::parse(&ty, &mut reader).unwrap_err();
    assert!(matches!(err, CommandError::FloatTooLow { .. }));
}

#[derive(Debug, PartialEq)]
struct Coord {
    x: i32,
    y: i32,
}

struct CoordArgumentType;

#[async_trait::async_trait]
impl<S: Send + Sync> ArgumentType<S> for CoordArgumentType {
    fn parse(&self, reader: &mut StringReader) -> Result<ArgValue, CommandError> {
        let x = reader.read_int()?;
        reader.expect(',')?;
        let y = reader.read_int()?;
        Ok(ArgValue::Other(std::sync::Arc::new(Coord { x, y })))
    }

    fn examples(&self) -> Vec<String> {
        vec!["0,0".to_string(), "3,-4".to_string()]
    }
}

#[test]
fn custom_argument_type_round_trips_through_downcast() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("tp").then(argument("pos", CoordArgumentType).executes(|ctx| {
        let pos = ctx.get::<Coord>("pos").unwrap();
        Ok(pos.x + pos.y)
    })));

    assert_eq!(dispatcher.execute_input("tp 3,4", ()).unwrap(), 7);
    let err = dispatcher.execute_input("tp 3;4", ()).unwrap_err();
    assert!(matches!(err, CommandError::ReaderExpectedSymbol { symbol: ',', .. }));
}

#[test]
fn create_builder_carries_handler_and_requirement() {
    use edict::builder::ChildBuilder;

    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    let foo = dispatcher.register(literal("foo").executes(|_| Ok(42)));

    let rebuilt = dispatcher.tree().node(foo).create_builder().unwrap();
    let mut copy: CommandDispatcher<()> = CommandDispatcher::new();
    match rebuilt {
        ChildBuilder::Literal(builder) => {
            copy.register(builder);
        }
        ChildBuilder::Argument(_) => panic!("expected a literal builder"),
    }
    assert_eq!(copy.execute_input("foo", ()).unwrap(), 42);
}

#[test]
fn parse_results_expose_branch_errors() {
    let dispatcher = kick_tree();
    let parse = dispatcher.parse("kick abc", ());
    assert_eq!(parse.exceptions().len(), 1);
    assert!(matches!(
        parse.exceptions()[0].1,
        CommandError::ReaderExpectedInt { .. }
    ));
    assert!(parse.reader().can_read());
}

#[test]
fn argument_accessor_panics_on_wrong_type() {
    let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
    dispatcher.register(literal("n").then(argument("v", integer()).executes(|ctx| {
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| ctx.get_bool("v")));
        assert!(caught.is_err());
        Ok(ctx.get_integer("v"))
    })));

    assert_eq!(dispatcher.execute_input("n 3", ()).unwrap(), 3);
}
