use dslab_fog_market::core::error::ConfigurationError;
use dslab_fog_market::core::sla::Sla;
use dslab_fog_market::test_util::helpers::{make_simulation, market_and_edge_topology};
use dslab_fog_market::trace::generic::GenericWorkloadTrace;
use dslab_fog_market::trace::interface::Trace;

#[test]
fn test_deserialize_empty_trace() {
    let trace_yaml = r#"
    events: []
    "#;

    let deserialized: GenericWorkloadTrace = serde_yaml::from_str(&trace_yaml).unwrap();
    assert_eq!(GenericWorkloadTrace { events: vec![] }, deserialized);
}

#[test]
fn test_trace_arrivals_mix_timestamps_and_sleeps() {
    let trace_yaml = r#"
    events:
    - timestamp: 100
      function: {target_node: edge, mem: 128, cpu: 500, latency: 15, duration: 1000}
    - sleep_before: 50
      function: {target_node: market, mem: 64, cpu: 250, latency: 40, duration: 200}
    - function: {target_node: edge, mem: 32, cpu: 100, latency: 5, duration: 10}
    - timestamp: 20
      function: {target_node: market, mem: 16, cpu: 1000, latency: 1, duration: 1}
    "#;

    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(&trace_yaml).unwrap();
    let events = trace.convert_to_simulator_events().unwrap();
    assert!(trace.events.is_empty());

    let arrivals: Vec<f64> = events.iter().map(|(arrival, _)| *arrival).collect();
    assert_eq!(arrivals, vec![20.0, 100.0, 150.0, 150.0]);
    assert_eq!(events[0].1.sla, Sla::new(16.0, 1.0, 1.0, 1.0));
    assert_eq!(events[2].1.target_node, "market");
    assert_eq!(events[3].1.target_node, "edge");
    assert_eq!(events[1].1.sla.core, 0.5);
}

#[test]
fn test_trace_rejects_ambiguous_or_negative_arrivals() {
    let both = r#"
    events:
    - timestamp: 100
      sleep_before: 10
      function: {target_node: edge, mem: 128, cpu: 500, latency: 15, duration: 1000}
    "#;
    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(both).unwrap();
    assert!(matches!(
        trace.convert_to_simulator_events(),
        Err(ConfigurationError::InvalidWorkload(_))
    ));

    let negative = r#"
    events:
    - sleep_before: -10
      function: {target_node: edge, mem: 128, cpu: 500, latency: 15, duration: 1000}
    "#;
    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(negative).unwrap();
    assert!(matches!(
        trace.convert_to_simulator_events(),
        Err(ConfigurationError::InvalidWorkload(_))
    ));

    let bad_resources = r#"
    events:
    - timestamp: 0
      function: {target_node: edge, mem: -1, cpu: 500, latency: 15, duration: 1000}
    "#;
    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(bad_resources).unwrap();
    assert!(trace.convert_to_simulator_events().is_err());
}

#[test]
fn test_trace_with_unknown_node_submits_nothing() {
    let trace_yaml = r#"
    events:
    - timestamp: 0
      function: {target_node: edge, mem: 128, cpu: 500, latency: 15, duration: 1000}
    - timestamp: 10
      function: {target_node: fog_42, mem: 128, cpu: 500, latency: 15, duration: 1000}
    "#;
    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(&trace_yaml).unwrap();
    let mut sim = make_simulation("auction", None, &market_and_edge_topology());

    assert_eq!(
        sim.initialize(&mut trace),
        Err(ConfigurationError::UnknownNode("fog_42".to_string()))
    );
    assert_eq!(sim.submitted_functions, 0);
    assert!(!sim.step());
}

#[test]
fn test_trace_functions_arrive_at_their_timestamps() {
    let trace_yaml = r#"
    events:
    - timestamp: 250
      function: {target_node: edge, mem: 128, cpu: 500, latency: 15, duration: 1000}
    "#;
    let mut trace: GenericWorkloadTrace = serde_yaml::from_str(&trace_yaml).unwrap();
    let mut sim = make_simulation("edge_ward", None, &market_and_edge_topology());
    sim.initialize(&mut trace).unwrap();

    sim.step();
    assert_eq!(sim.current_time(), 250.0);
    // edge_ward keeps the function on its entry node, commit is immediate
    sim.step();
    let monitoring = sim.monitoring.borrow();
    let record = &monitoring.earnings["edge"][0];
    assert_eq!(record.start_time, 250.0);
    assert_eq!(record.end_time, 1250.0);
}
