//! The seven-location campus road network.

use mcr_core::NodeId;
use mcr_network::{Graph, GraphBuilder, GraphResult, NodeAttrs};

/// Build the campus graph.  Every road is two units long; travel time
/// samples are seconds.
///
/// ```text
///  Station ─────────── Jay-Bergman Field
///     │                      │
///  Softball Field ────── CFE Arena ────── Lake Claire
///                            │                 │
///                      Child Center ───── Milican Hall
/// ```
pub fn build_campus(obstruction: f64) -> GraphResult<Graph> {
    let mut b = GraphBuilder::new().default_obstruction(obstruction);

    let station  = b.add_node("Station",           NodeAttrs::at(10.0, 8.0));
    let field    = b.add_node("Jay-Bergman Field", NodeAttrs::at(8.0, 8.0).with_emergency_probability(0.10));
    let softball = b.add_node("Softball Field",    NodeAttrs::at(10.0, 6.0).with_emergency_probability(0.10));
    let arena    = b.add_node("CFE Arena",         NodeAttrs::at(8.0, 6.0).with_elevation(2.0).with_emergency_probability(0.30));
    let lake     = b.add_node("Lake Claire",       NodeAttrs::at(6.0, 6.0).with_elevation(-1.0).with_emergency_probability(0.15));
    let child    = b.add_node("Child Center",      NodeAttrs::at(8.0, 4.0).with_emergency_probability(0.15));
    let milican  = b.add_node("Milican Hall",      NodeAttrs::at(6.0, 4.0).with_elevation(1.0).with_emergency_probability(0.20));

    b.add_road(station, field, vec![100.0, 120.0, 150.0]);
    b.add_road(station, softball, vec![90.0, 110.0, 200.0]);
    b.add_road(field, arena, vec![60.0, 80.0]);
    b.add_road(softball, arena, vec![70.0, 75.0, 95.0]);
    b.add_road(arena, lake, vec![100.0, 200.0]);
    b.add_road(arena, child, vec![50.0, 55.0, 70.0]);
    b.add_road(lake, milican, vec![40.0, 90.0]);
    b.add_road(child, milican, vec![80.0, 85.0]);

    b.build()
}

/// Look a node up by name, failing with a readable message.
pub fn node(graph: &Graph, name: &str) -> anyhow::Result<NodeId> {
    graph
        .node_id(name)
        .ok_or_else(|| anyhow::anyhow!("campus has no node named {name:?}"))
}
