use dslab_fog_market::core::sla::{Bid, Sla};
use dslab_fog_market::core::topology::{Topology, TopologyDescription};
use dslab_fog_market::placement::auction::AuctionPlacement;
use dslab_fog_market::placement::cloud_only::CloudOnlyPlacement;
use dslab_fog_market::placement::edge_first::{EdgeFirstPlacement, EdgeFirstV2Placement};
use dslab_fog_market::placement::edge_ward::EdgeWardPlacement;
use dslab_fog_market::placement::furthest::FurthestPlacement;
use dslab_fog_market::placement::interface::PlacementStrategy;
use dslab_fog_market::pricing::helpers::default_pricing_config;
use dslab_fog_market::test_util::helpers::{
    build_topology, constant_pricing, market_and_edge_topology, sla, three_level_topology,
};

fn fill_node(topology: &mut Topology, name: &str) {
    let id = topology.node_id(name).unwrap();
    let node = topology.node_mut(id);
    let filler = Sla::new(0.0, node.free_cores(), 0.0, 1.0);
    assert!(node.provision(u64::MAX, &filler, 0.0, 0.0));
}

fn bidders(bids: &[Bid]) -> Vec<String> {
    let mut names: Vec<String> = bids.iter().map(|b| b.bidder.clone()).collect();
    names.sort();
    names
}

fn place_from(
    strategy: &dyn PlacementStrategy,
    topology: &Topology,
    entry: &str,
    sla: &Sla,
) -> Vec<Bid> {
    strategy.place(topology, topology.node_id(entry).unwrap(), None, sla, 0.0)
}

#[test]
fn test_auction_collects_edge_and_cloud_bids() {
    let topology = build_topology(&market_and_edge_topology(), &default_pricing_config());
    let bids = place_from(
        &AuctionPlacement {},
        &topology,
        "edge",
        &sla(100.0, 1000.0, 15.0, 5000.0),
    );

    assert_eq!(bidders(&bids), vec!["edge", "market"]);
    let market_bid = bids.iter().find(|b| b.bidder == "market").unwrap();
    assert_eq!(market_bid.accumulated_latency, 10.0);
    assert_eq!(market_bid.level, 0);
}

#[test]
fn test_auction_respects_latency_bound() {
    let mut topology = build_topology(&market_and_edge_topology(), &default_pricing_config());
    let strict = sla(100.0, 1000.0, 5.0, 5000.0);

    let bids = place_from(&AuctionPlacement {}, &topology, "edge", &strict);
    assert_eq!(bidders(&bids), vec!["edge"]);

    fill_node(&mut topology, "edge");
    assert!(place_from(&AuctionPlacement {}, &topology, "edge", &strict).is_empty());
}

#[test]
fn test_flood_bids_never_exceed_latency_and_follow_shortest_paths() {
    let topology = build_topology(&three_level_topology(), &default_pricing_config());
    for entry in ["edge_0", "edge_3", "region_1", "market"] {
        for latency in [0.0, 5.0, 13.0, 25.0, 40.0, 100.0] {
            let sla = sla(64.0, 500.0, latency, 100.0);
            let bids = place_from(&AuctionPlacement {}, &topology, entry, &sla);
            let entry_id = topology.node_id(entry).unwrap();

            let expected = topology
                .nodes()
                .filter(|n| topology.latency_between(entry_id, n.id) <= latency)
                .count();
            assert_eq!(bids.len(), expected, "entry {} latency {}", entry, latency);
            for bid in bids {
                assert!(bid.accumulated_latency <= latency);
                let bidder = topology.node_id(&bid.bidder).unwrap();
                assert_eq!(
                    bid.accumulated_latency,
                    topology.latency_between(entry_id, bidder)
                );
            }
        }
    }
}

#[test]
fn test_cloud_only_bids_only_root() {
    let topology = build_topology(&market_and_edge_topology(), &default_pricing_config());
    for latency in [1.0, 15.0] {
        let bids = place_from(
            &CloudOnlyPlacement {},
            &topology,
            "edge",
            &sla(100.0, 1000.0, latency, 5000.0),
        );
        assert_eq!(bidders(&bids), vec!["market"]);
        assert_eq!(bids[0].accumulated_latency, 10.0);
    }
}

#[test]
fn test_edge_ward_climbs_only_when_needed() {
    let mut topology = build_topology(&market_and_edge_topology(), &default_pricing_config());
    let relaxed = sla(100.0, 1000.0, 15.0, 5000.0);
    let strict = sla(100.0, 1000.0, 5.0, 5000.0);

    let bids = place_from(&EdgeWardPlacement {}, &topology, "edge", &relaxed);
    assert_eq!(bidders(&bids), vec!["edge"]);

    fill_node(&mut topology, "edge");
    let bids = place_from(&EdgeWardPlacement {}, &topology, "edge", &relaxed);
    assert_eq!(bidders(&bids), vec!["market"]);
    assert!(place_from(&EdgeWardPlacement {}, &topology, "edge", &strict).is_empty());
}

#[test]
fn test_edge_ward_never_explores_siblings() {
    let mut topology = build_topology(&three_level_topology(), &default_pricing_config());
    fill_node(&mut topology, "edge_0");
    fill_node(&mut topology, "region_0");
    fill_node(&mut topology, "market");
    let bids = place_from(
        &EdgeWardPlacement {},
        &topology,
        "edge_0",
        &sla(64.0, 500.0, 1000.0, 10.0),
    );
    assert!(bids.is_empty());
}

#[test]
fn test_edge_first_takes_nearest_branch() {
    let mut topology = build_topology(&three_level_topology(), &default_pricing_config());
    let request = sla(64.0, 500.0, 100.0, 10.0);

    let bids = place_from(&EdgeFirstPlacement {}, &topology, "edge_0", &request);
    assert_eq!(bidders(&bids), vec!["edge_0"]);

    fill_node(&mut topology, "edge_0");
    fill_node(&mut topology, "region_0");
    // from region_0: edge_1 is 8 ms away, the market 20 ms
    let bids = place_from(&EdgeFirstPlacement {}, &topology, "edge_0", &request);
    assert_eq!(bidders(&bids), vec!["edge_1"]);
    assert_eq!(bids[0].accumulated_latency, 13.0);
}

fn uneven_topology() -> TopologyDescription {
    serde_yaml::from_str(
        r#"
    name: market
    flavor: {core: 8, mem: 8192}
    children:
    - name: near
      flavor: {core: 2, mem: 2048}
      latency: 10
      children:
      - name: deep
        flavor: {core: 2, mem: 2048}
        latency: 30
    - name: other
      flavor: {core: 2, mem: 2048}
      latency: 15
    "#,
    )
    .unwrap()
}

#[test]
fn test_edge_first_v2_prefers_closer_bid_in_later_branch() {
    let mut topology = build_topology(&uneven_topology(), &constant_pricing(1.0));
    fill_node(&mut topology, "market");
    fill_node(&mut topology, "near");
    let request = sla(64.0, 500.0, 100.0, 10.0);

    // first branch ends at deep (40 ms), the second one starts at 15 ms
    let v1 = place_from(&EdgeFirstPlacement {}, &topology, "market", &request);
    assert_eq!(bidders(&v1), vec!["deep"]);
    assert_eq!(v1[0].accumulated_latency, 40.0);

    let v2 = place_from(&EdgeFirstV2Placement {}, &topology, "market", &request);
    assert_eq!(bidders(&v2), vec!["other"]);
    assert_eq!(v2[0].accumulated_latency, 15.0);
}

#[test]
fn test_edge_first_v2_stops_when_next_branch_cannot_be_closer() {
    let mut topology = build_topology(&uneven_topology(), &constant_pricing(1.0));
    fill_node(&mut topology, "market");
    let request = sla(64.0, 500.0, 100.0, 10.0);

    let bids = place_from(&EdgeFirstV2Placement {}, &topology, "market", &request);
    assert_eq!(bidders(&bids), vec!["near"]);
    assert_eq!(bids[0].accumulated_latency, 10.0);
}

#[test]
fn test_furthest_selects_deepest_bidder_at_its_own_price() {
    let topology = build_topology(&three_level_topology(), &default_pricing_config());
    let strategy = FurthestPlacement {};
    let bids = place_from(&strategy, &topology, "region_0", &sla(64.0, 500.0, 10.0, 10.0));
    assert_eq!(bidders(&bids), vec!["edge_0", "edge_1", "region_0"]);

    // edges have less cores, so their linear price is higher
    let outcome = strategy.select_winner(bids).unwrap();
    assert_eq!(outcome.winner.level, 2);
    assert_eq!(outcome.winner.bidder, "edge_0");
    assert_eq!(outcome.price, outcome.winner.price);
}
