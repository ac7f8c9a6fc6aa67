//! Fog topology: a tree of nodes rooted at the market (cloud) node, plus the all-pairs network
//! table derived from it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::common::NodeId;
use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::pricing::helpers::pricing_strategy_from_config;
use crate::pricing::interface::PricingConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Flavor {
    pub core: f64,
    pub mem: f64, // in MiB
    /// Share of the node given to the marketplace, the whole node is used when not set.
    #[serde(default)]
    pub reserved_core: Option<f64>,
    #[serde(default)]
    pub reserved_mem: Option<f64>,
}

impl Flavor {
    pub fn usable_core(&self) -> f64 {
        self.reserved_core.unwrap_or(self.core)
    }

    pub fn usable_mem(&self) -> f64 {
        self.reserved_mem.unwrap_or(self.mem)
    }
}

/// Tree description of the topology as supplied by the infrastructure.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TopologyDescription {
    pub name: String,
    pub flavor: Flavor,
    /// One-way latency to the parent in ms, ignored for the root.
    #[serde(default)]
    pub latency: f64,
    /// Link rate to the parent in Mbit/s, unlimited when not set.
    #[serde(default)]
    pub rate: Option<f64>,
    /// Packet loss on the link to the parent, as a fraction.
    #[serde(default)]
    pub loss: Option<f64>,
    #[serde(default)]
    pub children: Vec<TopologyDescription>,
}

/// Characteristics of a single tree edge, or of the shortest path between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetworkLink {
    pub latency: f64,
    /// Bottleneck bandwidth in Mbit/s.
    pub bandwidth: f64,
    pub loss: f64,
}

impl NetworkLink {
    fn local() -> Self {
        Self {
            latency: 0.0,
            bandwidth: f64::INFINITY,
            loss: 0.0,
        }
    }

    fn unreachable() -> Self {
        Self {
            latency: f64::INFINITY,
            bandwidth: 0.0,
            loss: 1.0,
        }
    }

    /// Path extended by one more link.
    fn then(&self, link: &NetworkLink) -> Self {
        Self {
            latency: self.latency + link.latency,
            bandwidth: self.bandwidth.min(link.bandwidth),
            loss: 1.0 - (1.0 - self.loss) * (1.0 - link.loss),
        }
    }
}

pub struct Topology {
    nodes: Vec<FogNode>,
    node_ids: HashMap<String, NodeId>,
    /// Link from each node to its parent, None for the root.
    uplinks: Vec<Option<NetworkLink>>,
    /// Shortest path characteristics for every ordered pair of nodes.
    network: Vec<Vec<NetworkLink>>,
}

impl Topology {
    /// Builds nodes from the description (the root gets id 0 and level 0, children are numbered
    /// in depth-first order) and computes the network table.
    pub fn build(
        description: &TopologyDescription,
        pricing: &PricingConfig,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        let mut topology = Topology {
            nodes: vec![],
            node_ids: HashMap::new(),
            uplinks: vec![],
            network: vec![],
        };
        topology.add_subtree(description, None, 0, pricing, seed)?;
        topology.network = (0..topology.nodes.len())
            .map(|source| topology.shortest_paths(source))
            .collect();

        for row in topology.network.iter() {
            if let Some(unreachable) = row.iter().position(|link| link.latency.is_infinite()) {
                return Err(ConfigurationError::UnreachableNode(
                    topology.nodes[unreachable].name.clone(),
                ));
            }
        }
        Ok(topology)
    }

    fn add_subtree(
        &mut self,
        description: &TopologyDescription,
        parent: Option<NodeId>,
        level: usize,
        pricing: &PricingConfig,
        seed: u64,
    ) -> Result<NodeId, ConfigurationError> {
        let name = &description.name;
        if self.node_ids.contains_key(name) {
            return Err(ConfigurationError::DuplicateNodeName(name.clone()));
        }
        let cores = description.flavor.usable_core();
        let mem = description.flavor.usable_mem();
        if !(cores > 0.0 && mem > 0.0) || !cores.is_finite() || !mem.is_finite() {
            return Err(ConfigurationError::NonPositiveCapacity {
                name: name.clone(),
                core: cores,
                mem,
            });
        }
        let uplink = match parent {
            Some(_) => Some(Self::parse_link(description)?),
            None => None,
        };

        let id = self.nodes.len();
        let pricing_strategy = pricing_strategy_from_config(pricing, level, id, seed)?;
        self.nodes.push(FogNode::new(
            id,
            name.clone(),
            level,
            parent,
            cores,
            mem,
            pricing_strategy,
        ));
        self.node_ids.insert(name.clone(), id);
        self.uplinks.push(uplink);

        for child in description.children.iter() {
            let child_id = self.add_subtree(child, Some(id), level + 1, pricing, seed)?;
            self.nodes[id].children.push(child_id);
        }
        Ok(id)
    }

    fn parse_link(description: &TopologyDescription) -> Result<NetworkLink, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidLink {
            name: description.name.clone(),
            reason,
        };
        if !description.latency.is_finite() || description.latency < 0.0 {
            return Err(invalid(format!("latency {}", description.latency)));
        }
        let bandwidth = description.rate.unwrap_or(f64::INFINITY);
        if bandwidth.is_nan() || bandwidth <= 0.0 {
            return Err(invalid(format!("rate {}", bandwidth)));
        }
        let loss = description.loss.unwrap_or(0.0);
        if !(0.0..1.0).contains(&loss) {
            return Err(invalid(format!("loss {}", loss)));
        }
        Ok(NetworkLink {
            latency: description.latency,
            bandwidth,
            loss,
        })
    }

    /// Dijkstra over the undirected tree edges from `source`.
    fn shortest_paths(&self, source: NodeId) -> Vec<NetworkLink> {
        let mut paths = vec![NetworkLink::unreachable(); self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        paths[source] = NetworkLink::local();

        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            latency: 0.0,
            node: source,
        });
        while let Some(QueueEntry { node, .. }) = queue.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            for (neighbor, link) in self.adjacent_links(node) {
                let candidate = paths[node].then(&link);
                if candidate.latency < paths[neighbor].latency {
                    paths[neighbor] = candidate;
                    queue.push(QueueEntry {
                        latency: candidate.latency,
                        node: neighbor,
                    });
                }
            }
        }
        paths
    }

    fn adjacent_links(&self, id: NodeId) -> Vec<(NodeId, NetworkLink)> {
        let node = &self.nodes[id];
        let mut links: Vec<(NodeId, NetworkLink)> = node
            .children
            .iter()
            .filter_map(|&child| self.uplinks[child].map(|link| (child, link)))
            .collect();
        if let (Some(parent), Some(link)) = (node.parent, self.uplinks[id]) {
            links.push((parent, link));
        }
        links
    }

    /// Children first, then the parent, each with the latency of the connecting edge.
    pub fn neighbors(&self, id: NodeId) -> Vec<(NodeId, f64)> {
        self.adjacent_links(id)
            .into_iter()
            .map(|(neighbor, link)| (neighbor, link.latency))
            .collect()
    }

    pub fn node(&self, id: NodeId) -> &FogNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FogNode {
        &mut self.nodes[id]
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_ids.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&FogNode> {
        self.node_id(name).map(|id| &self.nodes[id])
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FogNode> {
        self.nodes.iter()
    }

    pub fn max_level(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    pub fn link_between(&self, source: NodeId, destination: NodeId) -> &NetworkLink {
        &self.network[source][destination]
    }

    pub fn latency_between(&self, source: NodeId, destination: NodeId) -> f64 {
        self.network[source][destination].latency
    }

    /// One-way latency between two nodes given by name.
    pub fn latency(&self, source: &str, destination: &str) -> Option<f64> {
        Some(self.latency_between(self.node_id(source)?, self.node_id(destination)?))
    }
}

#[derive(Debug, PartialEq)]
struct QueueEntry {
    latency: f64,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed to make BinaryHeap a min-heap
        other
            .latency
            .total_cmp(&self.latency)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
