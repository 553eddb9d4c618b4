use snipcore::{ExecutionEvent, GraphSpec, NodeBinding, NodeId, Value};
use sniphost::SnippetHost;
use snipunits::builtin_snippets;
use std::collections::HashMap;
use uuid::Uuid;

async fn host_with_builtins() -> SnippetHost {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let host = SnippetHost::new();
    for (id, result) in host.registry().load_all(builtin_snippets()).await {
        result.unwrap_or_else(|e| panic!("failed to load '{id}': {e}"));
    }
    host
}

fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn add_two_and_three_is_five() {
    let host = host_with_builtins().await;

    let result = host
        .run_node(
            Uuid::new_v4(),
            "math.add",
            inputs(&[("a", Value::Integer(2)), ("b", Value::Integer(3))]),
            HashMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.outputs().unwrap()["c"], Value::Integer(5));
}

#[tokio::test]
async fn remove_index_out_of_bounds_fails_with_message() {
    let host = host_with_builtins().await;

    let result = host
        .run_node(
            Uuid::new_v4(),
            "string.remove_index",
            inputs(&[
                ("index", Value::Integer(10)),
                ("str", Value::Text("hi".to_string())),
            ]),
            HashMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        result.error().unwrap().message,
        "index to remove is out of bounds"
    );
}

#[tokio::test]
async fn remove_index_in_the_middle() {
    let host = host_with_builtins().await;

    let result = host
        .run_node(
            Uuid::new_v4(),
            "string.remove_index",
            inputs(&[
                ("index", Value::Integer(1)),
                ("str", Value::Text("abc".to_string())),
            ]),
            HashMap::new(),
        )
        .await
        .unwrap();

    let outputs = result.outputs().unwrap();
    assert_eq!(outputs["new_str"], Value::Text("ac".to_string()));
    assert_eq!(outputs["original_str"], Value::Text("abc".to_string()));
}

#[tokio::test]
async fn text_parameter_concatenates_instead_of_adding() {
    let host = host_with_builtins().await;

    // declared kind is short-text, so "3" + '4' is "34", not 7
    let result = host
        .run_node(
            Uuid::new_v4(),
            "param.number_text",
            HashMap::new(),
            inputs(&[("num_input", Value::Text("3".to_string()))]),
        )
        .await
        .unwrap();

    assert_eq!(
        result.outputs().unwrap()["num"],
        Value::Text("34".to_string())
    );
}

#[tokio::test]
async fn missing_required_input_reports_the_port_without_crashing() {
    let host = host_with_builtins().await;

    let result = host
        .run_node(
            Uuid::new_v4(),
            "math.add",
            inputs(&[("a", Value::Integer(2))]),
            HashMap::new(),
        )
        .await
        .unwrap();

    assert!(result.error().unwrap().message.contains("'b'"));
}

#[tokio::test]
async fn graph_relays_loose_text_into_an_integer_port() {
    let host = host_with_builtins().await;

    // param.number_text emits text "34"; math.add's input 'a' is declared
    // integer, so the value coerces at the consuming port
    let mut graph = GraphSpec::new("text-into-integer");
    let source = graph.add_node(
        NodeBinding::new("param.number_text").with_parameter("num_input", "3"),
    );
    let adder = graph.add_node(NodeBinding::new("math.add"));
    graph.connect(source, "num", adder, "a").unwrap();

    let mut external: HashMap<NodeId, HashMap<String, Value>> = HashMap::new();
    external.insert(adder, inputs(&[("b", Value::Integer(8))]));

    let report = host.run_graph(&graph, external).await.unwrap();

    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(
        report.results[&adder].outputs().unwrap()["c"],
        Value::Integer(42)
    );
}

#[tokio::test]
async fn failed_node_skips_descendants_but_not_siblings() {
    let host = host_with_builtins().await;

    let mut graph = GraphSpec::new("failure-isolation");
    let failing = graph.add_node(NodeBinding::new("string.remove_index"));
    let downstream = graph.add_node(NodeBinding::new("debug.log"));
    let sibling = graph.add_node(
        NodeBinding::new("param.text").with_parameter("str_input", "still here"),
    );
    graph.connect(failing, "new_str", downstream, "value").unwrap();

    let mut external: HashMap<NodeId, HashMap<String, Value>> = HashMap::new();
    external.insert(
        failing,
        inputs(&[
            ("index", Value::Integer(10)),
            ("str", Value::Text("hi".to_string())),
        ]),
    );

    let report = host.run_graph(&graph, external).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.completed, 1);

    // the skip record points back at the failed upstream node
    let skip = report.results[&downstream].error().unwrap();
    assert_eq!(skip.origin, failing);
    assert!(skip.message.contains("skipped"));

    assert_eq!(
        report.results[&sibling].outputs().unwrap()["text"],
        Value::Text("still here".to_string())
    );
}

#[tokio::test]
async fn fan_out_consumers_get_independent_values() {
    let host = host_with_builtins().await;

    let mut graph = GraphSpec::new("fan-out");
    let source =
        graph.add_node(NodeBinding::new("param.text").with_parameter("str_input", "shared"));
    let left = graph.add_node(NodeBinding::new("debug.log"));
    let right = graph.add_node(NodeBinding::new("debug.log"));
    graph.connect(source, "text", left, "value").unwrap();
    graph.connect(source, "text", right, "value").unwrap();

    let report = host.run_graph(&graph, HashMap::new()).await.unwrap();

    assert_eq!(report.completed, 3);
    assert_eq!(
        report.results[&left].outputs().unwrap()["value"],
        Value::Text("shared".to_string())
    );
    assert_eq!(
        report.results[&right].outputs().unwrap()["value"],
        Value::Text("shared".to_string())
    );
}

#[tokio::test]
async fn node_events_are_emitted_for_the_reporting_sink() {
    let host = host_with_builtins().await;
    let mut events = host.subscribe_events();

    let node = Uuid::new_v4();
    host.run_node(
        node,
        "math.add",
        inputs(&[("a", Value::Integer(2)), ("b", Value::Integer(3))]),
        HashMap::new(),
    )
    .await
    .unwrap();

    let started = events.recv().await.unwrap();
    assert!(matches!(
        started,
        ExecutionEvent::NodeStarted { node_id, ref snippet_id, .. }
            if node_id == node && snippet_id == "math.add"
    ));

    let succeeded = events.recv().await.unwrap();
    match succeeded {
        ExecutionEvent::NodeSucceeded {
            node_id, outputs, ..
        } => {
            assert_eq!(node_id, node);
            assert_eq!(outputs["c"], Value::Integer(5));
        }
        other => panic!("expected NodeSucceeded, got {other:?}"),
    }
}
