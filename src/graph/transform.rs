use std::collections::HashMap;

use crate::interactome::InteractionRecord;

pub const DEFAULT_MIN_VISUAL_WEIGHT: f64 = 1.0 / 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Center,
    Peer,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Peer => "peer",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub score: f64,
    pub weight: f64,
    pub verified: bool,
}

impl Edge {
    fn from_record(record: &InteractionRecord, min_visual_weight: f64) -> Self {
        Self {
            from: record.entity_a().to_owned(),
            to: record.entity_b().to_owned(),
            score: record.score(),
            weight: record.score().max(min_visual_weight),
            verified: record.is_verified(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    center: String,
    index_by_id: HashMap<String, usize>,
}

impl GraphSnapshot {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn center(&self) -> &str {
        &self.center
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn role_of(&self, id: &str) -> Option<Role> {
        self.node(id).map(|node| node.role)
    }

    pub fn center_node(&self) -> Option<&Node> {
        self.node(&self.center)
            .filter(|node| node.role == Role::Center)
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.from == id || edge.to == id)
            .count()
    }

    pub(super) fn promote(&mut self, id: &str) {
        if let Some(index) = self.index_of(&self.center) {
            self.nodes[index].role = Role::Peer;
        }
        if let Some(index) = self.index_of(id) {
            self.nodes[index].role = Role::Center;
        }
        self.center = id.to_owned();
    }
}

pub fn transform(
    records: &[InteractionRecord],
    center: &str,
    min_visual_weight: f64,
) -> GraphSnapshot {
    let mut nodes = Vec::new();
    let mut index_by_id = HashMap::new();
    let mut edges = Vec::with_capacity(records.len());

    for record in records {
        for id in [record.entity_a(), record.entity_b()] {
            if index_by_id.contains_key(id) {
                continue;
            }

            let role = if id == center {
                Role::Center
            } else {
                Role::Peer
            };
            index_by_id.insert(id.to_owned(), nodes.len());
            nodes.push(Node {
                id: id.to_owned(),
                role,
            });
        }

        edges.push(Edge::from_record(record, min_visual_weight));
    }

    GraphSnapshot {
        nodes,
        edges,
        center: center.to_owned(),
        index_by_id,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn record(a: &str, b: &str, score: f64) -> InteractionRecord {
        InteractionRecord::new(a, b, score).unwrap()
    }

    #[test]
    fn builds_center_and_peers_with_weighted_edges() {
        let records = vec![record("A", "B", 1.0), record("A", "C", 0.4)];
        let snapshot = transform(&records, "A", DEFAULT_MIN_VISUAL_WEIGHT);

        let roles = snapshot
            .nodes()
            .iter()
            .map(|node| (node.id.as_str(), node.role))
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![("A", Role::Center), ("B", Role::Peer), ("C", Role::Peer)]
        );

        let edges = snapshot.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].from.as_str(), edges[0].to.as_str()), ("A", "B"));
        assert!(edges[0].verified);
        assert_eq!(edges[0].weight, 1.0);
        assert_eq!((edges[1].from.as_str(), edges[1].to.as_str()), ("A", "C"));
        assert!(!edges[1].verified);
        assert!((edges[1].weight - 0.4).abs() < 1e-12);
    }

    #[test]
    fn weak_scores_are_raised_to_the_visual_floor() {
        let snapshot = transform(&[record("A", "B", 0.05)], "A", DEFAULT_MIN_VISUAL_WEIGHT);
        let edge = &snapshot.edges()[0];
        assert_eq!(edge.weight, DEFAULT_MIN_VISUAL_WEIGHT);
        assert_eq!(edge.score, 0.05);
    }

    #[test]
    fn reciprocal_records_stay_distinct_edges() {
        let records = vec![record("A", "B", 0.5), record("B", "A", 0.5)];
        let snapshot = transform(&records, "A", DEFAULT_MIN_VISUAL_WEIGHT);
        assert_eq!(snapshot.nodes().len(), 2);
        assert_eq!(snapshot.edges().len(), 2);
        assert_eq!(snapshot.degree("A"), 2);
    }

    #[test]
    fn empty_input_and_absent_center_are_valid() {
        let empty = transform(&[], "A", DEFAULT_MIN_VISUAL_WEIGHT);
        assert!(empty.nodes().is_empty());
        assert!(empty.center_node().is_none());

        let absent = transform(&[record("B", "C", 0.7)], "A", DEFAULT_MIN_VISUAL_WEIGHT);
        assert_eq!(absent.nodes().len(), 2);
        assert!(absent.nodes().iter().all(|node| node.role == Role::Peer));
        assert_eq!(absent.center(), "A");
    }

    #[test]
    fn promote_swaps_roles_only() {
        let records = vec![record("A", "B", 1.0), record("A", "C", 0.4)];
        let mut snapshot = transform(&records, "A", DEFAULT_MIN_VISUAL_WEIGHT);
        let edges_before = snapshot.edges().to_vec();

        snapshot.promote("C");
        assert_eq!(snapshot.center(), "C");
        assert_eq!(snapshot.role_of("A"), Some(Role::Peer));
        assert_eq!(snapshot.role_of("C"), Some(Role::Center));
        assert_eq!(snapshot.edges(), edges_before.as_slice());
    }

    fn arb_records() -> impl Strategy<Value = Vec<InteractionRecord>> {
        let ids = vec!["A", "B", "C", "D", "E", "F"];
        let row = (
            prop::sample::select(ids.clone()),
            prop::sample::select(ids),
            0.0..=1.0f64,
        );
        prop::collection::vec(row, 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(a, b, score)| record(a, b, score))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_node_ids_are_unique_and_cover_every_edge(records in arb_records()) {
            let snapshot = transform(&records, "A", DEFAULT_MIN_VISUAL_WEIGHT);

            let ids = snapshot.nodes().iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
            prop_assert_eq!(ids.len(), snapshot.nodes().len());
            prop_assert_eq!(snapshot.edges().len(), records.len());
            for edge in snapshot.edges() {
                prop_assert!(ids.contains(edge.from.as_str()));
                prop_assert!(ids.contains(edge.to.as_str()));
                prop_assert!(edge.weight >= DEFAULT_MIN_VISUAL_WEIGHT);
            }
        }

        #[test]
        fn prop_center_role_iff_center_is_an_endpoint(records in arb_records()) {
            let snapshot = transform(&records, "A", DEFAULT_MIN_VISUAL_WEIGHT);
            let centers = snapshot
                .nodes()
                .iter()
                .filter(|node| node.role == Role::Center)
                .count();
            let expected = usize::from(records.iter().any(|record| record.involves("A")));
            prop_assert_eq!(centers, expected);
        }
    }
}
